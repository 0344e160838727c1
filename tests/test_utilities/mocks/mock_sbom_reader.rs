use sbom_visor::prelude::*;
use std::path::Path;

/// Mock SbomReader serving a fixed document regardless of the path
pub struct MockSbomReader {
    content: String,
}

impl MockSbomReader {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl SbomReader for MockSbomReader {
    fn read_sbom(&self, _path: &Path) -> Result<String> {
        Ok(self.content.clone())
    }
}
