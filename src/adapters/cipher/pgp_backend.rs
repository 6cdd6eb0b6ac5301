use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use sequoia_openpgp as openpgp;

use openpgp::armor;
use openpgp::cert::CertParser;
use openpgp::parse::Parse;
use openpgp::policy::StandardPolicy;
use openpgp::serialize::stream::{Encryptor2, LiteralWriter, Message, Recipient};
use openpgp::types::DataFormat;

use crate::core::errors::{Result, SendtoError};
use crate::core::models::encryption_job::SealHints;
use crate::core::models::public_key::{KeyMaterial, PublicKeyRecord};
use crate::core::traits::cipher::{SealBackend, SealWriter};

/// Policy used to pick encryption-capable subkeys.
const POLICY: &StandardPolicy = &StandardPolicy::new();

/// OpenPGP backend: armored public keys in, binary `.gpg` messages out.
///
/// Pure Rust via sequoia-openpgp; no gpg binary or keyring is involved.
#[derive(Debug, Default)]
pub struct PgpBackend;

impl PgpBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Human-readable label for an armor block kind.
fn kind_label(kind: armor::Kind) -> &'static str {
    match kind {
        armor::Kind::PublicKey => "public key block",
        armor::Kind::SecretKey => "private key block",
        armor::Kind::Message => "message",
        armor::Kind::Signature => "signature",
        armor::Kind::File => "armored file",
    }
}

impl SealBackend for PgpBackend {
    fn name(&self) -> &str {
        "pgp"
    }

    fn artifact_suffix(&self) -> &str {
        "zip.gpg"
    }

    fn parse_public_key(&self, bytes: &[u8], origin: &Path) -> Result<PublicKeyRecord> {
        let malformed = |detail: String| SendtoError::MalformedKey {
            path: origin.to_path_buf(),
            detail,
        };
        let wrong_type = |found: String| SendtoError::WrongKeyType {
            path: origin.to_path_buf(),
            found,
        };

        let mut reader = armor::Reader::from_bytes(bytes, armor::ReaderMode::Tolerant(None));
        let mut body = Vec::new();
        reader
            .read_to_end(&mut body)
            .map_err(|e| malformed(format!("armor decoding failed: {e}")))?;

        match reader.kind() {
            Some(armor::Kind::PublicKey) => {}
            Some(other) => return Err(wrong_type(kind_label(other).into())),
            None => return Err(malformed("no armored key block found".into())),
        }

        let cert = CertParser::from_bytes(&body)
            .map_err(|e| malformed(e.to_string()))?
            .next()
            .ok_or_else(|| malformed("key block contains no certificate".into()))?
            .map_err(|e| malformed(e.to_string()))?;

        if cert.is_tsk() {
            return Err(wrong_type("public key block carrying secret key material".into()));
        }

        let user_ids = cert
            .userids()
            .map(|uid| String::from_utf8_lossy(uid.userid().value()).into_owned())
            .collect();

        Ok(PublicKeyRecord::new(
            cert.fingerprint().as_bytes().to_vec(),
            user_ids,
            KeyMaterial::OpenPgp(Box::new(cert)),
        ))
    }

    fn seal<'a>(
        &self,
        key: &'a PublicKeyRecord,
        sink: &'a mut File,
        hints: &SealHints,
    ) -> Result<Box<dyn SealWriter + 'a>> {
        let rejected = |reason: String| SendtoError::KeyRejected {
            fingerprint: key.fingerprint_hex(),
            reason,
        };

        let cert = match key.material() {
            KeyMaterial::OpenPgp(cert) => cert,
            other => {
                return Err(rejected(format!(
                    "{} key cannot be used with the pgp backend",
                    other.kind()
                )));
            }
        };

        let recipients: Vec<Recipient<'a>> = cert
            .keys()
            .with_policy(POLICY, None)
            .supported()
            .alive()
            .revoked(false)
            .for_transport_encryption()
            .map(Recipient::from)
            .collect();
        if recipients.is_empty() {
            return Err(rejected("no valid encryption-capable subkey".into()));
        }

        let seal_failure = |stage: &str, e: &dyn std::fmt::Display| SendtoError::SealFailure {
            reason: format!("{stage}: {e}"),
        };

        let message = Message::new(sink);
        let encryptor = Encryptor2::for_recipients(message, recipients)
            .build()
            .map_err(|e| seal_failure("starting encryption", &e))?;

        let format = if hints.binary {
            DataFormat::Binary
        } else {
            DataFormat::Text
        };
        let literal = LiteralWriter::new(encryptor)
            .format(format)
            .filename(&hints.inner_name)
            .map_err(|e| seal_failure("setting file name", &e))?
            .date(hints.modified)
            .map_err(|e| seal_failure("setting date", &e))?
            .build()
            .map_err(|e| seal_failure("starting literal data", &e))?;

        Ok(Box::new(PgpSealWriter { inner: literal }))
    }
}

/// Top of the OpenPGP writer stack: literal data inside an encrypted
/// container.
struct PgpSealWriter<'a> {
    inner: Message<'a>,
}

impl Write for PgpSealWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl SealWriter for PgpSealWriter<'_> {
    fn finish(self: Box<Self>) -> Result<()> {
        // Tears down literal, encryption and MDC layers, writing each
        // trailer to the file.
        self.inner
            .finalize()
            .map_err(|e| SendtoError::SealFailure {
                reason: format!("finishing encrypted message: {e}"),
            })
    }
}
