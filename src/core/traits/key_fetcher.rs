use std::io::{self, Write};

/// Port for retrieving raw public-key bytes from a remote source.
///
/// Errors are plain `io::Error`s; the key resolver turns any failure into
/// `SendtoError::KeyUnavailable` with the identity attached.
pub trait KeyFetcher {
    /// Copy the body found at `url` into `sink`, returning the byte count.
    ///
    /// Anything short of a complete, successful transfer is an error.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> io::Result<u64>;
}
