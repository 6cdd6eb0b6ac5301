pub mod commands;
pub mod context;
pub mod logging;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Zip, encrypt and send files to a recipient's public key.
///
/// `sendto <recipient> <files...>` is shorthand for `sendto send`.
#[derive(Parser, Debug)]
#[command(
    name = "sendto",
    version,
    about,
    long_about = None,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Encryption backend to use: pgp or age (default: from config.toml)
    #[arg(long, global = true)]
    pub cipher: Option<String>,

    /// Configuration directory (default: ~/.sendto)
    #[arg(long, global = true, env = "SENDTO_HOME")]
    pub config_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt files for a recipient and send them to the server
    Send {
        /// Recipient identity
        recipient: String,
        /// Files or folders to send
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Encrypt files for a recipient without sending them
    #[command(alias = "e")]
    Encrypt {
        /// Recipient identity
        recipient: String,
        /// Files or folders to encrypt
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Fetch (or load from cache) a recipient's public key and show it
    Key {
        /// Recipient identity
        recipient: String,
    },

    /// Set the default sender identity
    #[command(alias = "i")]
    Identity {
        /// Sender name
        name: String,
    },

    /// Decrypt a received file
    #[command(alias = "d")]
    Decrypt {
        /// Encrypted file
        file: PathBuf,
    },

    /// Show the version
    #[command(alias = "v")]
    Version,

    /// Show commands and usage
    #[command(alias = "h")]
    Help,

    /// `sendto <recipient> <files...>`
    #[command(external_subcommand)]
    External(Vec<String>),
}
