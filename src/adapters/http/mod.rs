pub mod client;
pub mod key_fetcher;
pub mod submitter;
