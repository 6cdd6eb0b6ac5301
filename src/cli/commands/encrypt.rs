use std::path::{Path, PathBuf};

use crate::cli::context::{self, Context};
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::identity::Identity;

use super::seal_helpers::{files_string, load_key, seal_files};

/// Execute `sendto encrypt <recipient> <files...>`.
///
/// Same as sending, minus the upload: the artifact stays under
/// `files/<recipient>/`.
pub fn execute(
    config_dir: Option<&Path>,
    cipher: Option<&str>,
    recipient: &str,
    paths: &[PathBuf],
) -> Result<()> {
    let recipient = Identity::new(recipient)?;
    context::validate_paths(paths)?;
    let ctx = Context::load(config_dir, cipher)?;

    output::header(&format!(
        "Encrypting {} for {recipient}",
        files_string(paths.len())
    ));

    let (_, key) = load_key(&ctx, &recipient)?;
    let artifact = seal_files(&ctx, &recipient, &key, paths)?;

    output::success(&format!("Saved to {}", artifact.path.display()));
    Ok(())
}
