use std::path::Path;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

use super::client::{SUBMIT_TIMEOUT, block_on, build_client};
use crate::core::errors::{Result, SendtoError};
use crate::core::models::identity::Identity;

/// Uploads sealed artifacts to the delivery server.
///
/// The request is a multipart form with the artifact under `file` and the
/// `sender` and `recipient` identities as text fields.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    timeout: Duration,
}

impl HttpSubmitter {
    pub fn new() -> Self {
        Self {
            timeout: SUBMIT_TIMEOUT,
        }
    }

    /// Post `artifact` to `url`. Success is exactly `200 OK`.
    pub fn submit(
        &self,
        url: &str,
        sender: &Identity,
        recipient: &Identity,
        artifact: &Path,
    ) -> Result<()> {
        let failed = |reason: String| SendtoError::SubmitFailed {
            path: artifact.to_path_buf(),
            url: url.to_string(),
            reason,
        };

        let bytes = std::fs::read(artifact).map_err(SendtoError::io_at(artifact))?;
        let file_name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let size = bytes.len();

        let form = Form::new()
            .part(
                "file",
                Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str("application/octet-stream")
                    .map_err(|e| failed(e.to_string()))?,
            )
            .text("sender", sender.to_string())
            .text("recipient", recipient.to_string());

        let status = block_on(async {
            let client = build_client(self.timeout).map_err(|e| failed(e.to_string()))?;
            let resp = client
                .post(url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| failed(format!("request failed: {e}")))?;
            Ok::<_, SendtoError>(resp.status())
        })??;

        if status != StatusCode::OK {
            return Err(failed(format!("server returned status {status}")));
        }

        tracing::info!(%url, %sender, %recipient, bytes = size, "artifact submitted");
        Ok(())
    }
}

impl Default for HttpSubmitter {
    fn default() -> Self {
        Self::new()
    }
}
