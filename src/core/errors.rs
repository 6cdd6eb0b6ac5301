use std::path::PathBuf;

/// All domain errors for sendto.
///
/// Each variant carries the identity or path involved so the failure can
/// be reported without a debugger.
#[derive(Debug, thiserror::Error)]
pub enum SendtoError {
    #[error(
        "Key for '{identity}' is unavailable: {reason}\n\n  \
         No cached key exists and fetching it from {url} failed.\n\n  \
         Solutions:\n    \
         → Check the recipient name is spelled correctly\n    \
         → Check the keyserver setting in config.toml"
    )]
    KeyUnavailable {
        identity: String,
        url: String,
        reason: String,
    },

    #[error(
        "Key at {path} is of the wrong type: found {found}\n\n  \
         Only public keys can be used to encrypt for a recipient.\n  \
         Never share or cache a private key."
    )]
    WrongKeyType { path: PathBuf, found: String },

    #[error(
        "Key at {path} could not be parsed: {detail}\n\n  \
         Delete the cached file to fetch the key again."
    )]
    MalformedKey { path: PathBuf, detail: String },

    #[error("Key {fingerprint} cannot be used for encryption: {reason}")]
    KeyRejected { fingerprint: String, reason: String },

    #[error("I/O failure on {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive write failed at {path}: {reason}")]
    ArchiveWriteFailure { path: PathBuf, reason: String },

    #[error("Encryption failed: {reason}")]
    SealFailure { reason: String },

    #[error(
        "Invalid identity '{identity}': {reason}\n\n  \
         Identities are names like 'alice' or 'bob@example.org' and\n  \
         cannot contain path separators."
    )]
    InvalidIdentity { identity: String, reason: String },

    #[error("Invalid input: {detail}")]
    InvalidInput { detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    #[error("Submitting {path} to {url} failed: {reason}")]
    SubmitFailed {
        path: PathBuf,
        url: String,
        reason: String,
    },

    #[error("{feature} is not supported by this client yet")]
    Unsupported { feature: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SendtoError {
    /// Build a closure mapping an `io::Error` to `IoFailure` for `path`.
    pub fn io_at(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| SendtoError::IoFailure { path, source }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SendtoError>;
