//! Input acceptance: decide whether a file may be submitted, then read it.
//!
//! Validation runs on the file *name* and the credential only, so a bad
//! submission is rejected before any disk or network I/O happens. Reading
//! the bytes is the first suspension point of an attempt.

use crate::error::SimplifyError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A file chosen by the user: either on disk or already in memory.
#[derive(Debug, Clone)]
pub enum SelectedFile {
    /// A file on the local file system.
    Path(PathBuf),
    /// Bytes already held by the caller, with the name they arrived under.
    Bytes { name: String, bytes: Vec<u8> },
}

impl SelectedFile {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        SelectedFile::Bytes {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// The display name: the final path component, or the supplied name.
    pub fn name(&self) -> String {
        match self {
            SelectedFile::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string()),
            SelectedFile::Bytes { name, .. } => name.clone(),
        }
    }

    /// Read the file contents.
    pub async fn read(&self) -> Result<Vec<u8>, SimplifyError> {
        match self {
            SelectedFile::Path(p) => {
                let bytes = tokio::fs::read(p)
                    .await
                    .map_err(|source| SimplifyError::FileUnreadable {
                        path: p.clone(),
                        source,
                    })?;
                debug!("Read {} bytes from {}", bytes.len(), p.display());
                Ok(bytes)
            }
            SelectedFile::Bytes { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

impl From<PathBuf> for SelectedFile {
    fn from(p: PathBuf) -> Self {
        SelectedFile::Path(p)
    }
}

impl From<&Path> for SelectedFile {
    fn from(p: &Path) -> Self {
        SelectedFile::Path(p.to_path_buf())
    }
}

impl From<&str> for SelectedFile {
    fn from(p: &str) -> Self {
        SelectedFile::Path(PathBuf::from(p))
    }
}

/// Check if the file name carries a `.pdf` extension (case-insensitive).
pub fn is_pdf_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Validate a submission before any I/O.
///
/// File type is checked first, so a wrong file with no key reports the file.
pub fn validate_submission(
    file_name: &str,
    credential: &str,
    require_credential: bool,
) -> Result<(), SimplifyError> {
    if !is_pdf_name(file_name) {
        return Err(SimplifyError::NotAPdf {
            file_name: file_name.to_string(),
        });
    }
    if require_credential && credential.trim().is_empty() {
        return Err(SimplifyError::CredentialRequired);
    }
    Ok(())
}
