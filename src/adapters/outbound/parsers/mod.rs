/// Parser adapters turning SBOM documents into components and relationships
mod cyclonedx;
mod schema;
mod spdx;
mod xml;

pub use cyclonedx::CycloneDxParser;
pub use schema::SchemaValidator;
pub use spdx::SpdxParser;

use crate::sbom_analysis::domain::{Component, ComponentId, SbomFormat};
use crate::shared::error::SbomError;
use serde_json::Value;
use std::collections::HashSet;

/// Parses JSON text, reporting syntax errors with their position
fn parse_json(content: &str) -> Result<Value, SbomError> {
    serde_json::from_str(content).map_err(|e| SbomError::MalformedDocument {
        encoding: "JSON".to_string(),
        details: e.to_string(),
    })
}

fn schema_violation(format: SbomFormat, details: impl Into<String>) -> SbomError {
    SbomError::SchemaViolation {
        format: format.to_string(),
        details: details.into(),
    }
}

/// Builds an identifier, rejecting empty or oversized values as a schema problem
///
/// Surrounding whitespace is dropped, so declarations and references to the
/// same component always meet on the same identifier.
fn component_id(format: SbomFormat, value: &str, field: &str) -> Result<ComponentId, SbomError> {
    ComponentId::new(value.trim()).map_err(|e| schema_violation(format, format!("{}: {}", field, e)))
}

/// Rejects two components sharing an identifier
fn ensure_unique_ids(components: &[Component]) -> Result<(), SbomError> {
    let mut seen = HashSet::with_capacity(components.len());
    for component in components {
        if !seen.insert(component.id()) {
            return Err(SbomError::DuplicateIdentifier {
                identifier: component.id().to_string(),
            });
        }
    }
    Ok(())
}
