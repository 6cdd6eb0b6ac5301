use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::core::errors::{Result, SendtoError};
use crate::core::models::encryption_job::SealHints;
use crate::core::models::public_key::{KeyMaterial, PublicKeyRecord};
use crate::core::traits::cipher::{SealBackend, SealWriter};

/// Age encryption backend using X25519 + ChaCha20-Poly1305.
///
/// The cached key file holds a single `age1…` recipient line, optionally
/// preceded by `#` comments. Output is binary age format.
#[derive(Debug, Default)]
pub struct AgeBackend;

impl AgeBackend {
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint of an age recipient: SHA-256 of its bech32 string.
    pub fn fingerprint(recipient: &age::x25519::Recipient) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(recipient.to_string().as_bytes());
        hasher.finalize().to_vec()
    }
}

impl SealBackend for AgeBackend {
    fn name(&self) -> &str {
        "age"
    }

    fn artifact_suffix(&self) -> &str {
        "zip.age"
    }

    fn parse_public_key(&self, bytes: &[u8], origin: &Path) -> Result<PublicKeyRecord> {
        let malformed = |detail: String| SendtoError::MalformedKey {
            path: origin.to_path_buf(),
            detail,
        };

        let content = std::str::from_utf8(bytes)
            .map_err(|_| malformed("key file is not valid UTF-8".into()))?;

        let line = content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))
            .ok_or_else(|| malformed("no age recipient found".into()))?;

        if line.starts_with("AGE-SECRET-KEY-") {
            return Err(SendtoError::WrongKeyType {
                path: origin.to_path_buf(),
                found: "age secret key".into(),
            });
        }

        let recipient: age::x25519::Recipient = line
            .parse()
            .map_err(|e: &str| malformed(format!("invalid age recipient: {e}")))?;

        Ok(PublicKeyRecord::new(
            Self::fingerprint(&recipient),
            Vec::new(),
            KeyMaterial::Age(recipient),
        ))
    }

    fn seal<'a>(
        &self,
        key: &'a PublicKeyRecord,
        sink: &'a mut File,
        _hints: &SealHints,
    ) -> Result<Box<dyn SealWriter + 'a>> {
        let recipient = match key.material() {
            KeyMaterial::Age(recipient) => recipient,
            other => {
                return Err(SendtoError::KeyRejected {
                    fingerprint: key.fingerprint_hex(),
                    reason: format!("{} key cannot be used with the age backend", other.kind()),
                });
            }
        };

        // age has no literal-data metadata, so the hints have nowhere to go.
        let encryptor =
            age::Encryptor::with_recipients(std::iter::once(recipient as &dyn age::Recipient))
                .map_err(|e| SendtoError::KeyRejected {
                    fingerprint: key.fingerprint_hex(),
                    reason: e.to_string(),
                })?;

        let writer = encryptor
            .wrap_output(sink)
            .map_err(|e| SendtoError::SealFailure {
                reason: format!("Encryption stream failed: {e}"),
            })?;

        Ok(Box::new(AgeSealWriter { inner: writer }))
    }
}

struct AgeSealWriter<'a> {
    inner: age::stream::StreamWriter<&'a mut File>,
}

impl Write for AgeSealWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl SealWriter for AgeSealWriter<'_> {
    fn finish(self: Box<Self>) -> Result<()> {
        let file = self.inner.finish().map_err(|e| SendtoError::SealFailure {
            reason: format!("Encryption finish failed: {e}"),
        })?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek};
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("/cache/bob/key.pub")
    }

    #[test]
    fn parses_recipient_after_comments() {
        let identity = age::x25519::Identity::generate();
        let public = identity.to_public().to_string();
        let content = format!("# bob's key\n\n{public}\n");

        let record = AgeBackend::new()
            .parse_public_key(content.as_bytes(), &origin())
            .unwrap();

        assert_eq!(record.fingerprint().len(), 32);
        assert_eq!(record.material().kind(), "age");
    }

    #[test]
    fn secret_key_is_wrong_type() {
        let content = "AGE-SECRET-KEY-1QQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQQ";
        let err = AgeBackend::new()
            .parse_public_key(content.as_bytes(), &origin())
            .unwrap_err();
        assert!(matches!(err, SendtoError::WrongKeyType { .. }));
    }

    #[test]
    fn garbage_is_malformed() {
        for content in ["", "# only a comment\n", "age1notreallyakey"] {
            let err = AgeBackend::new()
                .parse_public_key(content.as_bytes(), &origin())
                .unwrap_err();
            assert!(matches!(err, SendtoError::MalformedKey { .. }), "{content}");
        }
    }

    #[test]
    fn seal_round_trip() {
        let identity = age::x25519::Identity::generate();
        let record = AgeBackend::new()
            .parse_public_key(identity.to_public().to_string().as_bytes(), &origin())
            .unwrap();

        let mut file = tempfile::tempfile().unwrap();
        {
            let mut writer = AgeBackend::new()
                .seal(&record, &mut file, &SealHints::for_archive("x"))
                .unwrap();
            writer.write_all(b"zip bytes would go here").unwrap();
            writer.finish().unwrap();
        }

        file.rewind().unwrap();
        let decryptor = age::Decryptor::new(&mut file).unwrap();
        let mut reader = decryptor
            .decrypt(std::iter::once(&identity as &dyn age::Identity))
            .unwrap();
        let mut plaintext = Vec::new();
        reader.read_to_end(&mut plaintext).unwrap();
        assert_eq!(plaintext, b"zip bytes would go here");
    }
}
