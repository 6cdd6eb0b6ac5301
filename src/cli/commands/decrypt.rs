use std::path::Path;

use crate::core::errors::{Result, SendtoError};

/// Execute `sendto decrypt <file>`.
///
/// Decrypting needs the recipient's private key, which this client never
/// holds. Use `gpg --decrypt` or `age --decrypt` on the artifact instead.
pub fn execute(file: &Path) -> Result<()> {
    tracing::debug!(file = %file.display(), "decrypt requested");
    Err(SendtoError::Unsupported {
        feature: format!(
            "Decrypting {} (use `gpg --decrypt` or `age --decrypt`)",
            file.display()
        ),
    })
}
