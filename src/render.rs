//! Two-column text rendering of analysis outcomes.

use crate::session::{AnalysisOutcome, AnalysisReport, ImageSummary};

const GUTTER: &str = " | ";
const MIN_WIDTH: usize = 40;

/// Renders an outcome as the text block shown after each upload.
pub fn render_outcome(outcome: &AnalysisOutcome, width: usize) -> String {
    match outcome {
        AnalysisOutcome::Idle(reason) => format!("{}\n", reason.message()),
        AnalysisOutcome::Rejected(message) => format!("Upload rejected: {}\n", message),
        AnalysisOutcome::Ready(report) => render_report(report, width),
    }
}

/// Image details on the left, the analysis text on the right.
pub fn render_report(report: &AnalysisReport, width: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let column = (width - GUTTER.len()) / 2;

    let left = wrap_lines(&summary_lines(&report.image), column);

    let mut right = vec!["Image Analysis".to_string(), "-".repeat(14)];
    right.extend(wrap(report.result.text(), column));

    two_columns(&left, &right, column)
}

fn summary_lines(image: &ImageSummary) -> Vec<String> {
    let mut lines = vec![
        "Uploaded Image".to_string(),
        "-".repeat(14),
        image.file_name.clone(),
        format!("Format: {}", image.format.label()),
        format!("Size: {} bytes", image.byte_len),
    ];
    if let Some((w, h)) = image.dimensions {
        lines.push(format!("Dimensions: {}x{}", w, h));
    }
    lines
}

/// Lays out two columns side by side. The shorter column is padded with
/// blank lines; trailing whitespace is trimmed from every row.
pub fn two_columns(left: &[String], right: &[String], column: usize) -> String {
    let rows = left.len().max(right.len());
    let mut out = String::new();
    for i in 0..rows {
        let l = left.get(i).map(String::as_str).unwrap_or("");
        let r = right.get(i).map(String::as_str).unwrap_or("");
        let row = format!("{:<column$}{}{}", l, GUTTER, r, column = column);
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

fn wrap_lines(lines: &[String], width: usize) -> Vec<String> {
    lines.iter().flat_map(|line| wrap(line, width)).collect()
}

/// Greedy word wrap that keeps existing line breaks. Words longer than
/// `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();

            while chars.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = chars.split_off(width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }

            let word_len = chars.len();
            let needed = if current_len == 0 {
                word_len
            } else {
                current_len + 1 + word_len
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars);
            current_len += word_len;
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisResult, ImageFormat};
    use crate::session::IdleReason;
    use crate::AnalysisError;
    use pretty_assertions::assert_eq;

    fn report(result: AnalysisResult) -> AnalysisReport {
        AnalysisReport {
            image: ImageSummary {
                file_name: "cat.png".to_string(),
                format: ImageFormat::Png,
                byte_len: 2048,
                dimensions: Some((640, 480)),
            },
            result,
        }
    }

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_wrap_keeps_paragraphs_and_splits_long_words() {
        assert_eq!(
            wrap("abcdefghij klm\n\nend", 4),
            vec!["abcd", "efgh", "ij", "klm", "", "end"]
        );
    }

    #[test]
    fn test_two_columns_pads_shorter_side() {
        let left = vec!["a".to_string()];
        let right = vec!["b".to_string(), "c".to_string()];

        let expected = format!("a{}| b\n{}| c\n", " ".repeat(10), " ".repeat(11));
        assert_eq!(two_columns(&left, &right, 10), expected);
    }

    #[test]
    fn test_report_shows_summary_and_text() {
        let rendered = render_report(&report(AnalysisResult::Text("A tabby cat.".to_string())), 60);
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with("Uploaded Image"));
        assert!(lines[0].ends_with("| Image Analysis"));
        assert!(lines[2].starts_with("cat.png"));
        assert!(lines[2].ends_with("| A tabby cat."));
        assert!(rendered.contains("Format: PNG"));
        assert!(rendered.contains("Size: 2048 bytes"));
        assert!(rendered.contains("Dimensions: 640x480"));
    }

    #[test]
    fn test_report_shows_fallback_text() {
        let rendered = render_report(
            &report(AnalysisResult::Fallback(AnalysisError::Decode(
                "bad".to_string(),
            ))),
            80,
        );
        assert!(rendered.contains("Could not generate image information."));
        assert!(!rendered.contains("bad"));
    }

    #[test]
    fn test_rows_fit_requested_width() {
        let long = "word ".repeat(60);
        let rendered = render_report(&report(AnalysisResult::Text(long)), 50);
        assert!(rendered.lines().all(|line| line.chars().count() <= 50));
    }

    #[test]
    fn test_idle_and_rejected_outcomes() {
        assert_eq!(
            render_outcome(&AnalysisOutcome::Idle(IdleReason::AwaitingImage), 80),
            "Upload an image to generate detailed information\n"
        );
        assert_eq!(
            render_outcome(&AnalysisOutcome::Rejected("x.gif".to_string()), 80),
            "Upload rejected: x.gif\n"
        );
    }
}
