use super::{Component, Relationship};
use crate::shared::error::SbomError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// SBOM standard a document claims to follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SbomFormat {
    CycloneDx,
    Spdx,
}

impl SbomFormat {
    pub fn display_name(self) -> &'static str {
        match self {
            SbomFormat::CycloneDx => "CycloneDX",
            SbomFormat::Spdx => "SPDX",
        }
    }
}

impl FromStr for SbomFormat {
    type Err = SbomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cyclonedx" => Ok(SbomFormat::CycloneDx),
            "spdx" => Ok(SbomFormat::Spdx),
            _ => Err(SbomError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Serialization a document is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentEncoding {
    Json,
    Xml,
}

impl DocumentEncoding {
    /// Picks the encoding from the file extension, then from the first
    /// non-whitespace character of the content.
    pub fn detect(path: &Path, content: &str) -> Result<Self, SbomError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("json") => return Ok(DocumentEncoding::Json),
            Some("xml") => return Ok(DocumentEncoding::Xml),
            _ => {}
        }

        match content.trim_start_matches('\u{feff}').trim_start().chars().next() {
            Some('{') => Ok(DocumentEncoding::Json),
            Some('<') => Ok(DocumentEncoding::Xml),
            Some(_) => Err(SbomError::UnknownEncoding {
                path: path.to_path_buf(),
                reason: "Content is neither a JSON object nor an XML document".to_string(),
            }),
            None => Err(SbomError::UnknownEncoding {
                path: path.to_path_buf(),
                reason: "File is empty".to_string(),
            }),
        }
    }
}

impl FromStr for DocumentEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(DocumentEncoding::Json),
            "xml" => Ok(DocumentEncoding::Xml),
            _ => Err(format!(
                "Invalid encoding: {}. Please specify 'json' or 'xml'",
                s
            )),
        }
    }
}

impl fmt::Display for DocumentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentEncoding::Json => f.write_str("JSON"),
            DocumentEncoding::Xml => f.write_str("XML"),
        }
    }
}

/// Normalized SBOM: the component inventory and the dependency edges
/// between components, independent of the source schema.
#[derive(Debug, Clone)]
pub struct ParsedSbom {
    pub format: SbomFormat,
    pub encoding: DocumentEncoding,
    pub spec_version: Option<String>,
    pub document_name: Option<String>,
    pub components: Vec<Component>,
    pub relationships: Vec<Relationship>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sbom_format_from_str() {
        assert_eq!(
            SbomFormat::from_str("cyclonedx").unwrap(),
            SbomFormat::CycloneDx
        );
        assert_eq!(
            SbomFormat::from_str("CycloneDX").unwrap(),
            SbomFormat::CycloneDx
        );
        assert_eq!(SbomFormat::from_str("SPDX").unwrap(), SbomFormat::Spdx);
    }

    #[test]
    fn test_sbom_format_unknown_is_format_error() {
        let err = SbomFormat::from_str("swid").unwrap_err();
        assert!(matches!(err, SbomError::UnsupportedFormat { ref format } if format == "swid"));
    }

    #[test]
    fn test_detect_by_extension() {
        let json = DocumentEncoding::detect(&PathBuf::from("bom.JSON"), "<bom/>").unwrap();
        assert_eq!(json, DocumentEncoding::Json);
        let xml = DocumentEncoding::detect(&PathBuf::from("bom.xml"), "{}").unwrap();
        assert_eq!(xml, DocumentEncoding::Xml);
    }

    #[test]
    fn test_detect_by_content() {
        let path = PathBuf::from("bom.cdx");
        assert_eq!(
            DocumentEncoding::detect(&path, "\n  {\"bomFormat\": \"CycloneDX\"}").unwrap(),
            DocumentEncoding::Json
        );
        assert_eq!(
            DocumentEncoding::detect(&path, "<?xml version=\"1.0\"?><bom/>").unwrap(),
            DocumentEncoding::Xml
        );
    }

    #[test]
    fn test_detect_unknown() {
        let path = PathBuf::from("bom.txt");
        assert!(matches!(
            DocumentEncoding::detect(&path, "name,version"),
            Err(SbomError::UnknownEncoding { .. })
        ));
        assert!(matches!(
            DocumentEncoding::detect(&path, "   "),
            Err(SbomError::UnknownEncoding { .. })
        ));
    }
}
