use std::path::Path;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::identity::Identity;

use super::seal_helpers::load_key;

/// Execute `sendto key <recipient>`.
pub fn execute(config_dir: Option<&Path>, cipher: Option<&str>, recipient: &str) -> Result<()> {
    let recipient = Identity::new(recipient)?;
    let ctx = Context::load(config_dir, cipher)?;

    output::header(&format!("Key for {recipient}"));
    let (path, key) = load_key(&ctx, &recipient)?;

    println!("  Path:        {}", path.display());
    println!("  Fingerprint: {}", key.fingerprint_hex());
    println!("  Format:      {}", key.material().kind());
    for uid in key.user_ids() {
        println!("  User ID:     {uid}");
    }
    Ok(())
}
