use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::core::errors::{Result, SendtoError};
use crate::core::models::identity::Identity;
use crate::core::models::public_key::PublicKeyRecord;

/// Name used when the first input path has no usable base name.
const FALLBACK_BASE_NAME: &str = "archive";

/// Metadata handed to the encryption stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealHints {
    /// The plaintext is binary (a zip container), never text.
    pub binary: bool,
    /// File name recorded inside the encrypted message, e.g. `photos.zip`.
    pub inner_name: String,
    /// Modification time recorded inside the encrypted message.
    pub modified: SystemTime,
}

impl SealHints {
    /// Hints for an archive named after `base_name`, stamped now.
    pub fn for_archive(base_name: &str) -> Self {
        Self {
            binary: true,
            inner_name: format!("{base_name}.zip"),
            modified: SystemTime::now(),
        }
    }
}

/// One encryption run: key, inputs and destination, bound together.
///
/// Built fresh for every invocation and consumed by the pipeline.
#[derive(Debug)]
pub struct EncryptionJob<'k> {
    pub key: &'k PublicKeyRecord,
    pub paths: Vec<PathBuf>,
    pub destination: PathBuf,
    pub hints: SealHints,
}

impl<'k> EncryptionJob<'k> {
    /// Plan a job writing `<files_dir>/<identity>/<basename>.<suffix>`.
    pub fn plan(
        key: &'k PublicKeyRecord,
        paths: &[PathBuf],
        identity: &Identity,
        files_dir: &Path,
        suffix: &str,
    ) -> Result<Self> {
        let first = paths.first().ok_or_else(|| SendtoError::InvalidInput {
            detail: "at least one file or folder is required".into(),
        })?;

        let base_name = base_name(first);
        let destination = files_dir
            .join(identity.as_str())
            .join(format!("{base_name}.{suffix}"));

        Ok(Self {
            key,
            paths: paths.to_vec(),
            destination,
            hints: SealHints::for_archive(&base_name),
        })
    }
}

/// Base name of an input path, used to name the artifact.
///
/// `docs/` gives `docs`; paths like `.` or `..` are resolved against the
/// filesystem first.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            std::fs::canonicalize(path)
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string())
}

/// Outcome of a successful encryption run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedArtifact {
    pub path: PathBuf,
    /// Number of files stored in the archive.
    pub entries: usize,
    /// Plaintext bytes copied into the archive.
    pub plaintext_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::public_key::KeyMaterial;

    fn record() -> PublicKeyRecord {
        let recipient = age::x25519::Identity::generate().to_public();
        PublicKeyRecord::new(vec![1, 2, 3], Vec::new(), KeyMaterial::Age(recipient))
    }

    #[test]
    fn archive_hints_are_binary_and_stamped_now() {
        let before = SystemTime::now();
        let hints = SealHints::for_archive("report.pdf");
        let after = SystemTime::now();

        assert!(hints.binary);
        assert_eq!(hints.inner_name, "report.pdf.zip");
        assert!(hints.modified >= before && hints.modified <= after);
    }

    #[test]
    fn base_name_strips_directories_and_trailing_slash() {
        assert_eq!(base_name(Path::new("photos/holiday.jpg")), "holiday.jpg");
        assert_eq!(base_name(Path::new("docs/")), "docs");
        assert_eq!(base_name(Path::new("café.txt")), "café.txt");
    }

    #[test]
    fn base_name_of_root_falls_back() {
        assert_eq!(base_name(Path::new("/")), FALLBACK_BASE_NAME);
    }

    #[test]
    fn plan_names_artifact_after_first_path() {
        let key = record();
        let identity = Identity::new("bob").unwrap();
        let paths = vec![PathBuf::from("a/report.pdf"), PathBuf::from("b.txt")];

        let job = EncryptionJob::plan(&key, &paths, &identity, Path::new("/cfg/files"), "zip.gpg")
            .unwrap();

        assert_eq!(
            job.destination,
            PathBuf::from("/cfg/files/bob/report.pdf.zip.gpg")
        );
        assert_eq!(job.hints.inner_name, "report.pdf.zip");
        assert!(job.hints.binary);
        assert_eq!(job.paths, paths);
    }

    #[test]
    fn plan_rejects_empty_paths() {
        let key = record();
        let identity = Identity::new("bob").unwrap();
        let err = EncryptionJob::plan(&key, &[], &identity, Path::new("/cfg"), "zip.gpg")
            .unwrap_err();
        assert!(matches!(err, SendtoError::InvalidInput { .. }));
    }
}
