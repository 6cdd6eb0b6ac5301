use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::errors::{Result, SendtoError};
use crate::core::models::encryption_job::{EncryptionJob, SealedArtifact};
use crate::core::models::identity::Identity;
use crate::core::models::public_key::PublicKeyRecord;
use crate::core::traits::cipher::SealBackend;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Zips input paths and encrypts the archive in a single streaming pass.
///
/// The writer chain is `zip → seal → file`: bytes written to the archive
/// become container bytes, which the seal backend turns into ciphertext,
/// which land in a temp file next to the artifact. Nothing is buffered
/// beyond one copy chunk.
pub struct ArchivePipeline<'c> {
    cipher: &'c dyn SealBackend,
    files_dir: PathBuf,
}

impl<'c> ArchivePipeline<'c> {
    pub fn new(cipher: &'c dyn SealBackend, files_dir: impl Into<PathBuf>) -> Self {
        Self {
            cipher,
            files_dir: files_dir.into(),
        }
    }

    /// Archive `paths`, seal the archive to `key`, and store it under
    /// `files/<identity>/`.
    ///
    /// An existing artifact with the same name is replaced. On error the
    /// destination is left as it was before the call.
    pub fn encrypt(
        &self,
        paths: &[PathBuf],
        identity: &Identity,
        key: &PublicKeyRecord,
    ) -> Result<SealedArtifact> {
        let job = EncryptionJob::plan(
            key,
            paths,
            identity,
            &self.files_dir,
            self.cipher.artifact_suffix(),
        )?;
        self.run(job)
    }

    /// Execute a planned job.
    pub fn run(&self, job: EncryptionJob<'_>) -> Result<SealedArtifact> {
        let out_dir = job
            .destination
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.files_dir.clone());
        std::fs::create_dir_all(&out_dir).map_err(SendtoError::io_at(&out_dir))?;

        tracing::debug!(
            destination = %job.destination.display(),
            backend = self.cipher.name(),
            key = %job.key.fingerprint_hex(),
            inputs = job.paths.len(),
            "starting encryption job"
        );

        let mut staged = NamedTempFile::new_in(&out_dir).map_err(SendtoError::io_at(&out_dir))?;
        let mut stats = ArchiveStats::default();
        {
            let mut sealer = self.cipher.seal(job.key, staged.as_file_mut(), &job.hints)?;
            {
                let mut archive = ZipWriter::new_stream(&mut sealer);
                for path in &job.paths {
                    add_path(&mut archive, path, &mut stats)?;
                }
                // Archive first: its central directory is still plaintext
                // that has to pass through the seal stage.
                archive
                    .finish()
                    .map_err(|e| SendtoError::ArchiveWriteFailure {
                        path: job.destination.clone(),
                        reason: format!("closing archive: {e}"),
                    })?;
            }
            sealer.finish()?;
        }

        staged
            .as_file()
            .sync_all()
            .map_err(SendtoError::io_at(staged.path()))?;
        staged
            .persist(&job.destination)
            .map_err(|e| SendtoError::io_at(&job.destination)(e.error))?;

        tracing::info!(
            artifact = %job.destination.display(),
            entries = stats.entries,
            bytes = stats.bytes,
            "sealed archive written"
        );

        Ok(SealedArtifact {
            path: job.destination,
            entries: stats.entries,
            plaintext_bytes: stats.bytes,
        })
    }
}

#[derive(Debug, Default)]
struct ArchiveStats {
    entries: usize,
    bytes: u64,
}

/// Add `path` to the archive: a file becomes one entry, a directory is
/// walked in lexical order.
fn add_path<W: Write + Seek>(
    archive: &mut ZipWriter<W>,
    path: &Path,
    stats: &mut ArchiveStats,
) -> Result<()> {
    let link_meta = std::fs::symlink_metadata(path).map_err(SendtoError::io_at(path))?;

    if link_meta.file_type().is_symlink() {
        let target_meta = std::fs::metadata(path).map_err(SendtoError::io_at(path))?;
        if target_meta.is_dir() {
            tracing::debug!(path = %path.display(), "not following directory symlink");
            return Ok(());
        }
        return add_file(archive, path, target_meta.len(), stats);
    }

    if link_meta.is_dir() {
        let mut children = std::fs::read_dir(path)
            .map_err(SendtoError::io_at(path))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(SendtoError::io_at(path))?;
        children.sort();

        for child in children {
            add_path(archive, &child, stats)?;
        }
        return Ok(());
    }

    add_file(archive, path, link_meta.len(), stats)
}

/// Copy one file into the archive under its literal path string.
fn add_file<W: Write + Seek>(
    archive: &mut ZipWriter<W>,
    path: &Path,
    len: u64,
    stats: &mut ArchiveStats,
) -> Result<()> {
    let mut file = File::open(path).map_err(SendtoError::io_at(path))?;

    let entry_name = path.to_string_lossy().into_owned();
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(len >= u64::from(u32::MAX));

    let archive_failure = |reason: String| SendtoError::ArchiveWriteFailure {
        path: path.to_path_buf(),
        reason,
    };

    archive
        .start_file(entry_name.as_str(), options)
        .map_err(|e| archive_failure(format!("starting entry: {e}")))?;

    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut copied: u64 = 0;
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SendtoError::io_at(path)(e)),
        };
        archive
            .write_all(&buf[..n])
            .map_err(|e| archive_failure(format!("writing entry: {e}")))?;
        copied += n as u64;
    }

    tracing::debug!(entry = %entry_name, bytes = copied, "archived file");
    stats.entries += 1;
    stats.bytes += copied;
    Ok(())
}
