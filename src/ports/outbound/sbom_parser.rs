use crate::sbom_analysis::domain::{DocumentEncoding, ParsedSbom, SbomFormat};
use crate::shared::Result;

/// SbomParser port for turning document text into the normalized model
///
/// One implementation exists per SBOM standard; each handles both the
/// JSON and the XML serialization of its standard.
pub trait SbomParser {
    /// The standard this parser understands
    fn format(&self) -> SbomFormat;

    /// Parses and validates a document
    ///
    /// # Arguments
    /// * `content` - Raw document text
    /// * `encoding` - Serialization of `content`
    ///
    /// # Returns
    /// The component and relationship sets of the document
    ///
    /// # Errors
    /// Returns an error if:
    /// - The content is not well-formed JSON/XML (`ParseError`)
    /// - The document violates the schema of its standard (`SchemaError`)
    fn parse(&self, content: &str, encoding: DocumentEncoding) -> Result<ParsedSbom>;
}
