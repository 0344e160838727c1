use crate::shared::Result;
use std::path::Path;

/// SbomReader port for loading SBOM documents
///
/// This port abstracts where document text comes from, so the load
/// pipeline can be driven from the file system or from in-memory fixtures.
pub trait SbomReader {
    /// Reads the full text of an SBOM document
    ///
    /// # Arguments
    /// * `path` - Location of the document
    ///
    /// # Returns
    /// The document content as UTF-8 text
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file does not exist or is not a regular file
    /// - The file is a symbolic link or exceeds the size limit
    /// - The content is not valid UTF-8
    fn read_sbom(&self, path: &Path) -> Result<String>;
}

impl<T: SbomReader + ?Sized> SbomReader for &T {
    fn read_sbom(&self, path: &Path) -> Result<String> {
        (**self).read_sbom(path)
    }
}
