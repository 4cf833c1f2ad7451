//! `wkhtmltopdf` process wrapper.
//!
//! Every conversion runs in its own temporary directory and the PDF comes
//! back as bytes, so concurrent or consecutive requests never share a file.

use crate::domain::ports::DocumentConverter;
use crate::utils::error::{BotError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub const DEFAULT_BINARY: &str = "wkhtmltopdf";

const BASE_ARGS: [&str; 3] = ["--quiet", "--encoding", "utf-8"];
const INPUT_NAME: &str = "prescription.html";
const OUTPUT_NAME: &str = "prescription.pdf";

#[derive(Debug, Clone)]
pub struct WkhtmltopdfConverter {
    binary: String,
    extra_args: Vec<String>,
    timeout: Duration,
}

impl WkhtmltopdfConverter {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
            timeout,
        }
    }

    /// Options passed before the built-in ones, e.g. `--page-size A5`.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}

#[async_trait]
impl DocumentConverter for WkhtmltopdfConverter {
    async fn convert(&self, markup: &str) -> Result<Vec<u8>> {
        let work_dir = tempfile::tempdir()?;
        let input_path = work_dir.path().join(INPUT_NAME);
        let output_path = work_dir.path().join(OUTPUT_NAME);

        tokio::fs::write(&input_path, markup).await?;

        let child = Command::new(&self.binary)
            .args(&self.extra_args)
            .args(BASE_ARGS)
            .arg(&input_path)
            .arg(&output_path)
            .current_dir(work_dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BotError::Conversion {
                message: format!("failed to start '{}': {}", self.binary, e),
            })?;

        tracing::debug!("Converting {} bytes of markup with {}", markup.len(), self.binary);

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(BotError::Timeout {
                    operation: self.binary.clone(),
                    seconds: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BotError::Conversion {
                message: format!(
                    "'{}' exited with {}: {}",
                    self.binary,
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        let pdf = tokio::fs::read(&output_path).await.map_err(|e| BotError::Conversion {
            message: format!("no output produced: {}", e),
        })?;

        if !pdf.starts_with(b"%PDF") {
            return Err(BotError::Conversion {
                message: format!("output is not a PDF ({} bytes)", pdf.len()),
            });
        }

        Ok(pdf)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    // `sh -c <script> fake ...` stands in for wkhtmltopdf; the script sees the
    // converter's arguments as "$@" with input and output last.
    fn fake(script: &str, timeout: Duration) -> WkhtmltopdfConverter {
        WkhtmltopdfConverter::new("sh", timeout).with_extra_args(vec![
            "-c".to_string(),
            script.to_string(),
            "fake-wkhtmltopdf".to_string(),
        ])
    }

    const COPY_SCRIPT: &str =
        r#"for a in "$@"; do prev="$cur"; cur="$a"; done; { printf '%%PDF-1.4\n'; cat "$prev"; } > "$cur""#;

    #[tokio::test]
    async fn test_converts_through_process() {
        let converter = fake(COPY_SCRIPT, Duration::from_secs(10));
        let pdf = converter.convert("<p>Рецепт</p>").await.unwrap();

        let text = String::from_utf8(pdf).unwrap();
        assert!(text.starts_with("%PDF-1.4\n"));
        assert!(text.ends_with("<p>Рецепт</p>"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_conversion_error() {
        let converter = fake("echo 'boom' >&2; exit 3", Duration::from_secs(10));
        let err = converter.convert("<p/>").await.unwrap_err();

        match err {
            BotError::Conversion { message } => {
                assert!(message.contains("exited with 3"), "{}", message);
                assert!(message.contains("boom"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_pdf_output_rejected() {
        let script = r#"for a in "$@"; do cur="$a"; done; echo hello > "$cur""#;
        let err = fake(script, Duration::from_secs(10)).convert("<p/>").await.unwrap_err();
        assert!(matches!(err, BotError::Conversion { .. }));
    }

    #[tokio::test]
    async fn test_hung_process_times_out() {
        let converter = fake("sleep 5", Duration::from_millis(200));
        let err = converter.convert("<p/>").await.unwrap_err();
        assert!(matches!(err, BotError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let converter = WkhtmltopdfConverter::new("/nonexistent/wkhtmltopdf", Duration::from_secs(1));
        let err = converter.convert("<p/>").await.unwrap_err();
        assert!(matches!(err, BotError::Conversion { .. }));
    }
}
