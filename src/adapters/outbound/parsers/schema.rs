use crate::sbom_analysis::domain::SbomFormat;
use crate::shared::error::SbomError;
use crate::shared::Result;
use anyhow::Context;
use jsonschema::Resource;
use serde_json::Value;
use std::fs;
use std::path::Path;

const CYCLONEDX_SCHEMA: &str = include_str!("schemas/cyclonedx/bom-1.5.schema.json");
const SPDX_SCHEMA: &str = include_str!("schemas/spdx/spdx-schema.json");

/// Documents the CycloneDX schema pulls in through `$ref`, keyed by the URI
/// the reference resolves to.
const CYCLONEDX_REFERENCED: [(&str, &str); 2] = [
    (
        "http://cyclonedx.org/schema/spdx.schema.json",
        include_str!("schemas/cyclonedx/spdx.schema.json"),
    ),
    (
        "http://cyclonedx.org/schema/jsf-0.82.schema.json",
        include_str!("schemas/cyclonedx/jsf-0.82.schema.json"),
    ),
];

/// Number of violations quoted in a schema error
const MAX_REPORTED_VIOLATIONS: usize = 5;

/// Compiled JSON Schema (draft 7) for one SBOM standard
pub struct SchemaValidator {
    format: SbomFormat,
    validator: jsonschema::Validator,
}

impl SchemaValidator {
    /// Validator for the published schema bundled with the tool
    ///
    /// CycloneDX is checked against 1.5 and SPDX against 2.3. Both reject
    /// properties the standard does not define.
    pub fn embedded(format: SbomFormat) -> Result<Self> {
        let (source, referenced): (&str, &[(&str, &str)]) = match format {
            SbomFormat::CycloneDx => (CYCLONEDX_SCHEMA, &CYCLONEDX_REFERENCED),
            SbomFormat::Spdx => (SPDX_SCHEMA, &[]),
        };
        let schema: Value = serde_json::from_str(source)
            .with_context(|| format!("Bundled {} schema is not valid JSON", format))?;

        let mut options = jsonschema::draft7::options();
        for (uri, content) in referenced {
            let contents: Value = serde_json::from_str(content)
                .with_context(|| format!("Bundled schema {} is not valid JSON", uri))?;
            options = options.with_resource(*uri, Resource::from_contents(contents));
        }
        let validator = options.build(&schema).map_err(|e| SbomError::Validation {
            message: format!("Failed to compile {} schema: {}", format, e),
        })?;
        Ok(Self { format, validator })
    }

    /// Validator for a user-supplied schema file
    pub fn from_file(format: SbomFormat, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SbomError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| SbomError::Validation {
            message: format!("Schema file {} is not valid JSON: {}", path.display(), e),
        })?;
        Self::compile_standalone(format, schema)
    }

    fn compile_standalone(format: SbomFormat, mut schema: Value) -> Result<Self> {
        // $id is a logical identifier; the compiler would try to resolve it as a URI
        if let Some(object) = schema.as_object_mut() {
            object.remove("$id");
        }
        let validator = jsonschema::draft7::new(&schema).map_err(|e| SbomError::Validation {
            message: format!("Failed to compile {} schema: {}", format, e),
        })?;
        Ok(Self { format, validator })
    }

    pub fn format(&self) -> SbomFormat {
        self.format
    }

    /// Checks a document against the schema
    ///
    /// # Errors
    /// Returns `SchemaViolation` quoting the first few violations
    pub fn validate(&self, instance: &Value) -> std::result::Result<(), SbomError> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|error| error.to_string())
            .collect();

        if violations.is_empty() {
            return Ok(());
        }

        let mut details = violations
            .iter()
            .take(MAX_REPORTED_VIOLATIONS)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");
        if violations.len() > MAX_REPORTED_VIOLATIONS {
            details.push_str(&format!(
                " (and {} more)",
                violations.len() - MAX_REPORTED_VIOLATIONS
            ));
        }

        Err(SbomError::SchemaViolation {
            format: self.format.to_string(),
            details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_embedded_schemas_compile() {
        assert!(SchemaValidator::embedded(SbomFormat::CycloneDx).is_ok());
        assert!(SchemaValidator::embedded(SbomFormat::Spdx).is_ok());
    }

    #[test]
    fn test_cyclonedx_minimal_document_is_valid() {
        let validator = SchemaValidator::embedded(SbomFormat::CycloneDx).unwrap();
        let document = json!({"bomFormat": "CycloneDX", "specVersion": "1.5"});
        assert!(validator.validate(&document).is_ok());
    }

    #[test]
    fn test_cyclonedx_component_without_name_is_rejected() {
        let validator = SchemaValidator::embedded(SbomFormat::CycloneDx).unwrap();
        let document = json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.5",
            "components": [{"type": "library", "version": "1.0"}]
        });
        let err = validator.validate(&document).unwrap_err();
        assert!(matches!(err, SbomError::SchemaViolation { .. }));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_cyclonedx_wrong_bom_format_is_rejected() {
        let validator = SchemaValidator::embedded(SbomFormat::CycloneDx).unwrap();
        let document = json!({"bomFormat": "SPDX", "specVersion": "1.5"});
        assert!(validator.validate(&document).is_err());
    }

    #[test]
    fn test_cyclonedx_unknown_properties_are_rejected() {
        let validator = SchemaValidator::embedded(SbomFormat::CycloneDx).unwrap();
        let document = json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.5",
            "notAField": true,
            "components": [{"type": "library", "name": "x", "version": "1", "colour": "red"}]
        });
        let err = validator.validate(&document).unwrap_err().to_string();
        assert!(err.contains("notAField"));
        assert!(err.contains("colour"));
    }

    #[test]
    fn test_cyclonedx_license_id_must_be_on_the_spdx_list() {
        let validator = SchemaValidator::embedded(SbomFormat::CycloneDx).unwrap();
        let with_license = |license: Value| {
            json!({
                "bomFormat": "CycloneDX",
                "specVersion": "1.5",
                "components": [{"type": "library", "name": "x", "licenses": [{"license": license}]}]
            })
        };
        assert!(validator.validate(&with_license(json!({"id": "MIT"}))).is_ok());
        assert!(validator.validate(&with_license(json!({"name": "Acme EULA"}))).is_ok());
        assert!(validator.validate(&with_license(json!({"id": "Acme-EULA"}))).is_err());
    }

    #[test]
    fn test_cyclonedx_license_expression_stands_alone() {
        let validator = SchemaValidator::embedded(SbomFormat::CycloneDx).unwrap();
        let document = json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.5",
            "components": [{
                "type": "library",
                "name": "x",
                "licenses": [{"license": {"id": "MIT"}}, {"expression": "MIT OR Apache-2.0"}]
            }]
        });
        assert!(validator.validate(&document).is_err());
    }

    #[test]
    fn test_cyclonedx_signature_resolves_against_jsf() {
        let validator = SchemaValidator::embedded(SbomFormat::CycloneDx).unwrap();
        let signed = |signature: Value| {
            json!({"bomFormat": "CycloneDX", "specVersion": "1.5", "signature": signature})
        };
        assert!(validator
            .validate(&signed(json!({"algorithm": "ES256", "value": "c2lnbmF0dXJl"})))
            .is_ok());
        assert!(validator
            .validate(&signed(json!({"algorithm": "ES256"})))
            .is_err());
    }

    #[test]
    fn test_spdx_unknown_package_property_is_rejected() {
        let validator = SchemaValidator::embedded(SbomFormat::Spdx).unwrap();
        let document = json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "spdxVersion": "SPDX-2.3",
            "name": "d",
            "dataLicense": "CC0-1.0",
            "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
            "packages": [
                {"SPDXID": "SPDXRef-a", "name": "a", "downloadLocation": "NONE", "colour": "red"}
            ]
        });
        let err = validator.validate(&document).unwrap_err();
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_spdx_unknown_relationship_type_is_rejected() {
        let validator = SchemaValidator::embedded(SbomFormat::Spdx).unwrap();
        let document = json!({
            "SPDXID": "SPDXRef-DOCUMENT",
            "spdxVersion": "SPDX-2.3",
            "name": "d",
            "dataLicense": "CC0-1.0",
            "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
            "relationships": [
                {"spdxElementId": "SPDXRef-a", "relationshipType": "LIKES", "relatedSpdxElement": "SPDXRef-b"}
            ]
        });
        assert!(validator.validate(&document).is_err());
    }

    #[test]
    fn test_spdx_missing_required_fields_is_rejected() {
        let validator = SchemaValidator::embedded(SbomFormat::Spdx).unwrap();
        let document = json!({"spdxVersion": "SPDX-2.3"});
        let err = validator.validate(&document).unwrap_err();
        assert!(err.to_string().contains("SPDX"));
    }

    #[test]
    fn test_many_violations_are_summarized() {
        let validator = SchemaValidator::embedded(SbomFormat::CycloneDx).unwrap();
        let components: Vec<Value> = (0..8).map(|_| json!({"version": "1"})).collect();
        let document = json!({
            "bomFormat": "CycloneDX",
            "specVersion": "1.5",
            "components": components
        });
        let err = validator.validate(&document).unwrap_err();
        assert!(err.to_string().contains("more)"));
    }

    #[test]
    fn test_custom_schema_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"$id": "urn:custom", "type": "object", "required": ["custom"]}}"#
        )
        .unwrap();

        let validator = SchemaValidator::from_file(SbomFormat::CycloneDx, file.path()).unwrap();
        assert!(validator.validate(&json!({"custom": true})).is_ok());
        assert!(validator.validate(&json!({})).is_err());
    }

    #[test]
    fn test_custom_schema_not_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let result = SchemaValidator::from_file(SbomFormat::Spdx, file.path());
        assert!(result.is_err());
    }
}
