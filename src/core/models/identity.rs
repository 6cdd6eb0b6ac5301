use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::{Result, SendtoError};

/// Longest identity accepted, in bytes.
const MAX_IDENTITY_LEN: usize = 128;

static IDENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._@+-]*$").expect("identity pattern is valid")
});

/// Name of a sender or recipient.
///
/// An `Identity` is used both as the key-cache key and as a single path
/// component under `users/` and `files/`, so construction rejects anything
/// that could escape that directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    /// Validate `name` and wrap it.
    pub fn new(name: &str) -> Result<Self> {
        let invalid = |reason: &str| SendtoError::InvalidIdentity {
            identity: name.to_string(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if name.len() > MAX_IDENTITY_LEN {
            return Err(invalid("longer than 128 bytes"));
        }
        if name == "." || name == ".." {
            return Err(invalid("reserved path name"));
        }
        if !IDENTITY_PATTERN.is_match(name) {
            return Err(invalid(
                "only letters, digits and . _ @ + - are allowed, starting with a letter or digit",
            ));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = SendtoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
