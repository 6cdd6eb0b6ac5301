use std::path::{Path, PathBuf};

use crate::adapters::http::submitter::HttpSubmitter;
use crate::cli::context::{self, Context};
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::identity::Identity;

use super::seal_helpers::{files_string, load_key, seal_files};

/// Execute `sendto <recipient> <files...>`.
///
/// Resolves the recipient's key, seals the files into one artifact and
/// posts it to the configured server.
pub fn execute(
    config_dir: Option<&Path>,
    cipher: Option<&str>,
    recipient: &str,
    paths: &[PathBuf],
) -> Result<()> {
    let recipient = Identity::new(recipient)?;
    context::validate_paths(paths)?;
    let ctx = Context::load(config_dir, cipher)?;
    let sender = ctx.sender()?;

    output::header(&format!(
        "Sending {} to {recipient} as {sender}",
        files_string(paths.len())
    ));

    let (_, key) = load_key(&ctx, &recipient)?;
    let artifact = seal_files(&ctx, &recipient, &key, paths)?;
    output::success(&format!("Saved to {}", artifact.path.display()));

    let url = ctx.config.submit_url();
    let sp = output::spinner(&format!("Sending to {url}..."));
    let submitted = HttpSubmitter::new().submit(&url, &sender, &recipient, &artifact.path);
    if let Err(e) = submitted {
        sp.finish_and_clear();
        output::warning(&format!(
            "Sealed file kept at {}",
            artifact.path.display()
        ));
        return Err(e);
    }
    output::finish_spinner(sp, &format!("Sent to {recipient} via {url}"));

    Ok(())
}
