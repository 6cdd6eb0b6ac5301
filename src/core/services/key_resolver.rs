use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::app_config::KeyLocator;
use crate::core::errors::{Result, SendtoError};
use crate::core::models::identity::Identity;
use crate::core::models::public_key::PublicKeyRecord;
use crate::core::traits::cipher::SealBackend;
use crate::core::traits::key_fetcher::KeyFetcher;

/// File name of a cached key inside `users/<identity>/`.
pub const KEY_FILE_NAME: &str = "key.pub";

/// Resolves identities to cached public-key files, fetching on a miss.
///
/// The cache is authoritative: once `users/<identity>/key.pub` exists it is
/// returned as-is, never refreshed, never overwritten.
pub struct KeyResolver<F: KeyFetcher> {
    users_dir: PathBuf,
    fetcher: F,
}

impl<F: KeyFetcher> KeyResolver<F> {
    pub fn new(users_dir: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            users_dir: users_dir.into(),
            fetcher,
        }
    }

    /// Deterministic cache location for `identity`.
    pub fn cache_path(&self, identity: &Identity) -> PathBuf {
        self.users_dir.join(identity.as_str()).join(KEY_FILE_NAME)
    }

    /// Return the cached key path for `identity`, fetching it on a miss.
    pub fn resolve(&self, identity: &Identity, locator: &KeyLocator) -> Result<PathBuf> {
        let key_path = self.cache_path(identity);
        if key_path.is_file() {
            tracing::debug!(%identity, path = %key_path.display(), "key cache hit");
            return Ok(key_path);
        }

        let user_dir = key_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.users_dir.clone());
        std::fs::create_dir_all(&user_dir).map_err(SendtoError::io_at(&user_dir))?;

        let url = locator.url_for(identity);
        tracing::debug!(%identity, %url, "key cache miss, fetching");

        let unavailable = |reason: String| SendtoError::KeyUnavailable {
            identity: identity.to_string(),
            url: url.clone(),
            reason,
        };

        // Stream into a sibling temp file so a failed fetch never leaves
        // something at `key_path` that a later lookup would trust.
        let mut staged = NamedTempFile::new_in(&user_dir).map_err(SendtoError::io_at(&user_dir))?;
        let staged_path = staged.path().to_path_buf();
        let written = match fetch_into(&self.fetcher, &url, staged.as_file_mut()) {
            Ok(n) => n,
            Err(FetchError::Local(e)) => return Err(SendtoError::io_at(&staged_path)(e)),
            Err(FetchError::Remote(e)) => return Err(unavailable(e.to_string())),
        };

        match staged.persist_noclobber(&key_path) {
            Ok(_) => {}
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(%identity, "key cached concurrently, keeping existing file");
            }
            Err(e) => return Err(SendtoError::io_at(&key_path)(e.error)),
        }

        tracing::info!(%identity, %url, bytes = written, "fetched and cached key");
        Ok(key_path)
    }
}

/// Why a fetch into the cache failed.
#[derive(Debug)]
enum FetchError {
    /// Writing the fetched bytes to local storage failed.
    Local(io::Error),
    /// The transfer itself failed.
    Remote(io::Error),
}

/// Stream `url` into `sink`, keeping local write errors apart from
/// transfer errors.
fn fetch_into<F: KeyFetcher, W: Write>(
    fetcher: &F,
    url: &str,
    sink: W,
) -> std::result::Result<u64, FetchError> {
    let mut sink = RecordingSink { inner: sink, error: None };
    let fetched = fetcher.fetch(url, &mut sink).and_then(|n| sink.flush().map(|_| n));
    match (sink.error.take(), fetched) {
        (Some(local), _) => Err(FetchError::Local(local)),
        (None, Ok(n)) => Ok(n),
        (None, Err(remote)) => Err(FetchError::Remote(remote)),
    }
}

/// Passes writes through and keeps the first error it saw.
struct RecordingSink<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: Write> RecordingSink<W> {
    fn record(&mut self, e: io::Error) -> io::Error {
        let echo = io::Error::new(e.kind(), e.to_string());
        self.error.get_or_insert(e);
        echo
    }
}

impl<W: Write> Write for RecordingSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(|e| self.record(e))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(|e| self.record(e))
    }
}

/// Read and parse the key file at `path` with `backend`'s key format.
///
/// Only reads; the same file contents always give the same result.
pub fn parse_public_key(path: &Path, backend: &dyn SealBackend) -> Result<PublicKeyRecord> {
    let bytes = std::fs::read(path).map_err(SendtoError::io_at(path))?;
    let record = backend.parse_public_key(&bytes, path)?;
    tracing::debug!(
        path = %path.display(),
        backend = backend.name(),
        fingerprint = %record.fingerprint_hex(),
        "parsed public key"
    );
    Ok(record)
}
