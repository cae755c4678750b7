use anyhow::Result;
use clap::Parser;
use image_insight::app::App;
use image_insight::models::{Config, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_WIDTH};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-insight")]
#[command(about = "Upload an image and get detailed information using Gemini AI")]
struct CliArgs {
    /// Analyze this image once after the key is validated, then exit.
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// Gemini model used for image analysis.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Gemini API base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds. Unset means no timeout.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Width of the rendered result panel.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
}

impl From<CliArgs> for Config {
    fn from(args: CliArgs) -> Self {
        Self {
            base_url: args.base_url,
            model: args.model,
            timeout: args.timeout_secs.map(Duration::from_secs),
            width: args.width,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_insight=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = CliArgs::parse();
    let image = args.image.take();
    let mut app =
        App::new(Config::from(args)).with_masked_key_input(std::io::stdin().is_terminal());

    info!("Starting image-insight");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    if let Err(e) = app.run(stdin, &mut stdout, image.as_deref()).await {
        error!("Session ended with an error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["image-insight"]).unwrap();
        let config = Config::from(args);

        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.timeout.is_none());
        assert_eq!(config.width, 100);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "image-insight",
            "--image",
            "cat.webp",
            "--model",
            "gemini-2.0-flash",
            "--timeout-secs",
            "30",
            "--width",
            "72",
        ])
        .unwrap();

        assert_eq!(args.image.as_deref(), Some(std::path::Path::new("cat.webp")));
        let config = Config::from(args);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.width, 72);
    }
}
