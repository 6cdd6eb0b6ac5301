use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::errors::Result;
use crate::core::models::encryption_job::SealHints;
use crate::core::models::public_key::PublicKeyRecord;

/// Port for public-key encryption formats.
///
/// Implementations live in `adapters::cipher` (PgpBackend, AgeBackend).
/// The archive pipeline only talks to this trait and to `SealWriter`.
pub trait SealBackend {
    /// Human-readable name of this backend (e.g. "pgp", "age").
    fn name(&self) -> &str;

    /// Artifact file suffix, e.g. `zip.gpg`.
    fn artifact_suffix(&self) -> &str;

    /// Parse the cached key bytes read from `origin`.
    fn parse_public_key(&self, bytes: &[u8], origin: &Path) -> Result<PublicKeyRecord>;

    /// Wrap `sink` in an encryption writer addressed to `key`.
    ///
    /// Plaintext written to the returned writer reaches `sink` as
    /// ciphertext. Nothing is complete until `SealWriter::finish` returns.
    fn seal<'a>(
        &self,
        key: &'a PublicKeyRecord,
        sink: &'a mut File,
        hints: &SealHints,
    ) -> Result<Box<dyn SealWriter + 'a>>;
}

/// An encryption stream that must be explicitly finished.
///
/// Dropping a `SealWriter` without calling `finish` leaves the ciphertext
/// without its trailer, which readers reject.
pub trait SealWriter: Write {
    /// Flush buffered plaintext and write the format's final framing.
    fn finish(self: Box<Self>) -> Result<()>;
}
