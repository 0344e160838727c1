use crate::ports::outbound::SbomReader;
use crate::shared::error::SbomError;
use crate::shared::security::{validate_file_size, validate_regular_file, MAX_FILE_SIZE};
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// FileSystemReader adapter for reading SBOM documents from disk
///
/// This adapter implements the SbomReader port with the usual input
/// hygiene: no symbolic links, regular files only, bounded size.
pub struct FileSystemReader {
    max_file_size: u64,
}

impl FileSystemReader {
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
        }
    }

    /// Reader with a custom size limit
    pub fn with_max_file_size(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomReader for FileSystemReader {
    fn read_sbom(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(SbomError::FileReadError {
                path: path.to_path_buf(),
                details: "File does not exist".to_string(),
            }
            .into());
        }

        let file_size = validate_regular_file(path, "SBOM document")?;
        validate_file_size(file_size, path, self.max_file_size)?;

        let bytes = fs::read(path).map_err(|e| SbomError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let content = String::from_utf8(bytes).map_err(|e| SbomError::MalformedDocument {
            encoding: "UTF-8".to_string(),
            details: format!("{}: {}", path.display(), e),
        })?;

        // A leading byte order mark is legal in both JSON and XML files
        Ok(match content.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => content,
        })
    }
}
