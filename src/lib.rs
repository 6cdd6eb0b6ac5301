//! Zip, encrypt and send files to a recipient's public key.
//!
//! The core is two pieces: [`core::services::key_resolver`] turns an
//! identity into a cached, parsed public key, and
//! [`core::services::archive_pipeline`] streams input files through a zip
//! writer into an encryption writer into one sealed artifact.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
