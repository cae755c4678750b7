//! Interactive terminal front-end driving one [`Session`].

use crate::ai::{
    CredentialValidator, GeminiCredentialValidator, GeminiHttpClient, GeminiImageAnalyzer,
    ImageAnalyzer,
};
use crate::models::{Config, ImageFormat};
use crate::render::render_outcome;
use crate::session::{AnalysisOutcome, CredentialStatus, Session, Upload};
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::info;
use zeroize::Zeroizing;

const KEY_PROMPT: &str = "Enter your Google Gemini API Key: ";
const KEY_HELP: &str = "You can get your API key from https://makersuite.google.com/app/apikey";
const CHANGE_KEY_COMMAND: &str = ":key";
const QUIT_COMMANDS: [&str; 2] = [":quit", ":q"];

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub validator: Box<dyn CredentialValidator>,
    pub analyzer: Box<dyn ImageAnalyzer>,
}

enum Next {
    ChangeKey,
    Quit,
}

/// Prompts for a key, then for image paths, rendering each analysis.
pub struct App {
    session: Session,
    config: Config,
    mask_key_input: bool,
}

impl App {
    /// Build an app talking to the Gemini REST API described by `config`.
    pub fn new(config: Config) -> Self {
        // One connection pool for both listing and generation.
        let http = GeminiHttpClient::new(config.base_url.clone(), config.timeout);
        info!(
            "Using model {} at {} (timeout: {:?})",
            config.model,
            http.base_url(),
            config.timeout
        );

        let services = AppServices {
            validator: Box::new(GeminiCredentialValidator::new(http.clone())),
            analyzer: Box::new(GeminiImageAnalyzer::new(http, config.model.clone())),
        };
        Self::with_services(services, config)
    }

    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, config: Config) -> Self {
        Self {
            session: Session::new(services.validator, services.analyzer),
            config,
            mask_key_input: false,
        }
    }

    /// Read the API key from the controlling terminal without echo instead
    /// of from the input stream. Only meaningful when stdin is a TTY.
    pub fn with_masked_key_input(mut self, masked: bool) -> Self {
        self.mask_key_input = masked;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs until the user quits or `input` is exhausted.
    ///
    /// With `image` set, that single file is analyzed right after the key is
    /// validated and the app returns.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W, image: Option<&Path>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        writeln!(out, "Image Information Generator")?;
        writeln!(
            out,
            "Upload an image and get detailed information using Gemini AI"
        )?;
        writeln!(out, "{}", KEY_HELP)?;

        loop {
            if !self.read_credential(&mut lines, out).await? {
                return Ok(());
            }

            if let Some(path) = image {
                let outcome = self.analyze_path(path, out).await?;
                write!(out, "{}", render_outcome(&outcome, self.config.width))?;
                return Ok(());
            }

            match self.read_images(&mut lines, out).await? {
                Next::ChangeKey => continue,
                Next::Quit => return Ok(()),
            }
        }
    }

    /// Prompts until a key validates. Returns `false` on end of input.
    async fn read_credential<R, W>(&mut self, lines: &mut Lines<R>, out: &mut W) -> Result<bool>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        loop {
            let line = if self.mask_key_input {
                read_masked_key().await?
            } else {
                write!(out, "{}", KEY_PROMPT)?;
                out.flush()?;
                lines.next_line().await?.map(Zeroizing::new)
            };
            let Some(line) = line else {
                writeln!(out)?;
                return Ok(false);
            };

            let status = self.session.submit_credential(line.as_str()).await;
            writeln!(out, "{}", status.message())?;
            if let CredentialStatus::Validated(handle) = status {
                writeln!(out, "{} compatible models available", handle.models().len())?;
                return Ok(true);
            }
        }
    }

    async fn read_images<R, W>(&mut self, lines: &mut Lines<R>, out: &mut W) -> Result<Next>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        loop {
            write!(
                out,
                "Choose an image ({}), '{}' to change the API key, '{}' to exit: ",
                ImageFormat::EXTENSIONS.join(", "),
                CHANGE_KEY_COMMAND,
                QUIT_COMMANDS[0]
            )?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                return Ok(Next::Quit);
            };

            let outcome = match line.trim() {
                cmd if QUIT_COMMANDS.contains(&cmd) => return Ok(Next::Quit),
                CHANGE_KEY_COMMAND => return Ok(Next::ChangeKey),
                "" => self.session.analyze(None).await,
                path => self.analyze_path(Path::new(path), out).await?,
            };
            write!(out, "{}", render_outcome(&outcome, self.config.width))?;
        }
    }

    async fn analyze_path<W: Write>(&self, path: &Path, out: &mut W) -> Result<AnalysisOutcome> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Ok(AnalysisOutcome::Rejected(format!(
                    "could not read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        writeln!(out, "Generating image information...")?;
        out.flush()?;
        Ok(self.session.analyze(Some(Upload::new(file_name, bytes))).await)
    }
}

/// Prompts on the terminal with echo disabled. `None` on end of input.
async fn read_masked_key() -> Result<Option<Zeroizing<String>>> {
    let read = tokio::task::spawn_blocking(|| rpassword::prompt_password(KEY_PROMPT))
        .await
        .map_err(|e| Error::Invariant(format!("Key prompt task join error: {}", e)))?;

    match read {
        Ok(key) => Ok(Some(Zeroizing::new(key))),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}
