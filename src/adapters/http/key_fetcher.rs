use std::io::{self, Write};
use std::time::Duration;

use reqwest::StatusCode;

use super::client::{FETCH_TIMEOUT, block_on, build_client};
use crate::core::traits::key_fetcher::KeyFetcher;

/// Fetches armored keys over HTTP(S).
///
/// Only a `200 OK` counts as success; the body is streamed verbatim into
/// the sink chunk by chunk.
#[derive(Debug, Clone)]
pub struct HttpKeyFetcher {
    timeout: Duration,
}

impl HttpKeyFetcher {
    pub fn new() -> Self {
        Self {
            timeout: FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpKeyFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyFetcher for HttpKeyFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> io::Result<u64> {
        block_on(async {
            let client = build_client(self.timeout).map_err(io::Error::other)?;
            let mut resp = client
                .get(url)
                .send()
                .await
                .map_err(|e| io::Error::other(format!("request failed: {e}")))?;

            if resp.status() != StatusCode::OK {
                return Err(io::Error::other(format!(
                    "server returned status {}",
                    resp.status()
                )));
            }

            let mut written: u64 = 0;
            while let Some(chunk) = resp
                .chunk()
                .await
                .map_err(|e| io::Error::other(format!("reading body failed: {e}")))?
            {
                sink.write_all(&chunk)?;
                written += chunk.len() as u64;
            }

            tracing::debug!(%url, bytes = written, "downloaded key");
            Ok::<_, io::Error>(written)
        })?
    }
}
