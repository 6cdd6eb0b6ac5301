pub mod encryption_job;
pub mod identity;
pub mod public_key;
