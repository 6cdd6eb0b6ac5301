use std::future::Future;
use std::io;
use std::time::Duration;

/// Timeout for fetching a public key.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for uploading a sealed artifact.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Build a reqwest client with the given timeout.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("sendto/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Drive `future` to completion on a fresh current-thread runtime.
///
/// Keeps the public API blocking while reqwest stays async.
pub fn block_on<F: Future>(future: F) -> io::Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(future))
}
