use crate::adapters::outbound::parsers::{CycloneDxParser, SchemaValidator, SpdxParser};
use crate::ports::outbound::SbomParser;
use crate::sbom_analysis::domain::SbomFormat;
use crate::shared::Result;
use std::path::Path;

/// Factory for creating SBOM parsers
///
/// Selects the parser for a standard and wires in either the embedded
/// JSON Schema or a user-supplied one.
pub struct ParserFactory;

impl ParserFactory {
    /// Creates a parser for the given standard
    ///
    /// # Arguments
    /// * `format` - The SBOM standard of the input
    /// * `schema_path` - Custom JSON Schema replacing the embedded one
    ///
    /// # Errors
    /// Returns an error if the schema cannot be read or does not compile
    pub fn create(format: SbomFormat, schema_path: Option<&Path>) -> Result<Box<dyn SbomParser>> {
        let validator = match schema_path {
            Some(path) => SchemaValidator::from_file(format, path)?,
            None => SchemaValidator::embedded(format)?,
        };

        Ok(match format {
            SbomFormat::CycloneDx => Box::new(CycloneDxParser::with_validator(validator)),
            SbomFormat::Spdx => Box::new(SpdxParser::with_validator(validator)),
        })
    }
}
