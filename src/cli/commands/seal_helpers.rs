use std::path::PathBuf;

use crate::adapters::http::key_fetcher::HttpKeyFetcher;
use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::encryption_job::SealedArtifact;
use crate::core::models::identity::Identity;
use crate::core::models::public_key::PublicKeyRecord;
use crate::core::services::archive_pipeline::ArchivePipeline;
use crate::core::services::key_resolver::{KeyResolver, parse_public_key};

/// Resolve and parse `recipient`'s key, fetching it on first use.
pub fn load_key(ctx: &Context, recipient: &Identity) -> Result<(PathBuf, PublicKeyRecord)> {
    let locator = ctx.config.key_locator()?;
    let resolver = KeyResolver::new(ctx.layout.users_dir(), HttpKeyFetcher::new());

    let cached = resolver.cache_path(recipient).is_file();
    let sp = output::spinner(&format!("Loading key for {recipient}..."));
    let key_path = match resolver.resolve(recipient, &locator) {
        Ok(path) => path,
        Err(e) => {
            sp.finish_and_clear();
            return Err(e);
        }
    };
    if cached {
        output::finish_spinner(sp, &format!("Loaded cached key for {recipient}"));
    } else {
        output::finish_spinner(
            sp,
            &format!(
                "Fetched key for {recipient} from {}",
                locator.url_for(recipient)
            ),
        );
    }

    let key = parse_public_key(&key_path, ctx.backend.as_ref())?;
    output::detail(&format!("Key file: {}", key_path.display()));
    output::detail(&format!("Using key: {key}"));
    Ok((key_path, key))
}

/// Zip and encrypt `paths` for `recipient` with the context's backend.
pub fn seal_files(
    ctx: &Context,
    recipient: &Identity,
    key: &PublicKeyRecord,
    paths: &[PathBuf],
) -> Result<SealedArtifact> {
    let pipeline = ArchivePipeline::new(ctx.backend.as_ref(), ctx.layout.files_dir());

    let sp = output::spinner(&format!(
        "Encrypting {} with {}...",
        files_string(paths.len()),
        ctx.backend.name()
    ));
    let artifact = match pipeline.encrypt(paths, recipient, key) {
        Ok(artifact) => artifact,
        Err(e) => {
            sp.finish_and_clear();
            return Err(e);
        }
    };
    output::finish_spinner(
        sp,
        &format!(
            "Encrypted {} file(s), {} bytes, for {recipient}",
            artifact.entries, artifact.plaintext_bytes
        ),
    );
    Ok(artifact)
}

/// "1 file" / "3 files".
pub fn files_string(count: usize) -> String {
    if count == 1 {
        "1 file".to_string()
    } else {
        format!("{count} files")
    }
}
