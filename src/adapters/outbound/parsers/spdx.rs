use super::schema::SchemaValidator;
use super::{component_id, ensure_unique_ids, parse_json, schema_violation, xml};
use crate::ports::outbound::SbomParser;
use crate::sbom_analysis::domain::{
    Component, ComponentType, DocumentEncoding, ParsedSbom, Relationship, SbomFormat,
};
use crate::shared::error::SbomError;
use crate::shared::Result;
use serde::{Deserialize, Serialize};

const FORMAT: SbomFormat = SbomFormat::Spdx;
const DOCUMENT_ID: &str = "SPDXRef-DOCUMENT";
const SUPPLIER_PREFIXES: [&str; 3] = ["Organization:", "Person:", "Tool:"];

/// SPDX 2.x document. JSON and XML share the same element names, so one
/// model serves both; XML lists are repeated sibling elements.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxDocument {
    #[serde(rename = "SPDXID", default, skip_serializing_if = "Option::is_none")]
    spdx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spdx_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    creation_info: Option<CreationInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    document_describes: Vec<String>,
    #[serde(default)]
    packages: Vec<Package>,
    #[serde(default)]
    relationships: Vec<SpdxRelationship>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CreationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    creators: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Package {
    #[serde(rename = "SPDXID", default, skip_serializing_if = "Option::is_none")]
    spdx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    download_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    license_concluded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    license_declared: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary_package_purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    external_refs: Vec<ExternalRef>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExternalRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_locator: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpdxRelationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spdx_element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relationship_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    related_spdx_element: Option<String>,
}

/// Direction of a dependency edge expressed by an SPDX relationship type
#[derive(Debug, PartialEq, Eq)]
enum EdgeDirection {
    /// element depends on related element
    Forward,
    /// related element depends on element
    Reverse,
}

fn edge_direction(relationship_type: &str) -> Option<EdgeDirection> {
    let relationship_type = relationship_type.trim().to_uppercase();
    if relationship_type == "DEPENDS_ON" {
        Some(EdgeDirection::Forward)
    } else if relationship_type == "DEPENDENCY_OF" || relationship_type.ends_with("_DEPENDENCY_OF") {
        Some(EdgeDirection::Reverse)
    } else {
        None
    }
}

fn is_placeholder(value: &str) -> bool {
    matches!(value.trim(), "NOASSERTION" | "NONE")
}

fn meaningful(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !is_placeholder(v))
}

fn strip_supplier_prefix(supplier: &str) -> &str {
    SUPPLIER_PREFIXES
        .iter()
        .find_map(|prefix| supplier.strip_prefix(prefix))
        .unwrap_or(supplier)
        .trim()
}

/// SPDX parser adapter
pub struct SpdxParser {
    validator: SchemaValidator,
}

impl SpdxParser {
    /// Parser using the bundled schema
    pub fn new() -> Result<Self> {
        Ok(Self {
            validator: SchemaValidator::embedded(FORMAT)?,
        })
    }

    pub fn with_validator(validator: SchemaValidator) -> Self {
        Self { validator }
    }

    fn parse_json_document(&self, content: &str) -> Result<SpdxDocument> {
        let value = parse_json(content)?;
        self.validator.validate(&value)?;
        let document =
            serde_json::from_value(value).map_err(|e| schema_violation(FORMAT, e.to_string()))?;
        Ok(document)
    }

    fn parse_xml_document(&self, content: &str) -> Result<SpdxDocument> {
        let root = xml::inspect(content)?;
        if root.local_name != "Document" {
            return Err(schema_violation(
                FORMAT,
                format!("root element is <{}>, expected <Document>", root.local_name),
            )
            .into());
        }

        let document: SpdxDocument =
            quick_xml::de::from_str(content).map_err(|e| schema_violation(FORMAT, e.to_string()))?;
        let projection =
            serde_json::to_value(&document).map_err(|e| schema_violation(FORMAT, e.to_string()))?;
        self.validator.validate(&projection)?;
        Ok(document)
    }

    fn to_component(package: Package) -> std::result::Result<Component, SbomError> {
        let spdx_id = package
            .spdx_id
            .as_deref()
            .ok_or_else(|| schema_violation(FORMAT, "package without an SPDXID"))?;
        let name = package
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| schema_violation(FORMAT, format!("package {} has no name", spdx_id)))?;

        let license = meaningful(&package.license_concluded)
            .or(meaningful(&package.license_declared))
            .map(str::to_string);
        let supplier = meaningful(&package.supplier)
            .map(strip_supplier_prefix)
            .map(str::to_string);
        let purl = package
            .external_refs
            .iter()
            .find(|external| {
                external
                    .reference_type
                    .as_deref()
                    .is_some_and(|kind| kind.eq_ignore_ascii_case("purl"))
            })
            .and_then(|external| external.reference_locator.clone());
        let component_type = package
            .primary_package_purpose
            .as_deref()
            .map(ComponentType::parse)
            .unwrap_or(ComponentType::Library);

        Ok(
            Component::new(component_id(FORMAT, spdx_id, "SPDXID")?, name, component_type)
                .with_version(package.version_info.clone())
                .with_license(license)
                .with_supplier(supplier)
                .with_purl(purl),
        )
    }

    fn to_relationship(
        document_id: &str,
        relationship: &SpdxRelationship,
    ) -> std::result::Result<Option<Relationship>, SbomError> {
        let (Some(element), Some(kind), Some(related)) = (
            relationship.spdx_element_id.as_deref().map(str::trim),
            relationship.relationship_type.as_deref(),
            relationship.related_spdx_element.as_deref().map(str::trim),
        ) else {
            return Err(schema_violation(FORMAT, "incomplete relationship entry"));
        };

        let Some(direction) = edge_direction(kind) else {
            return Ok(None);
        };

        let outside_graph = |endpoint: &str| endpoint == document_id || is_placeholder(endpoint);
        if outside_graph(element) || outside_graph(related) {
            return Ok(None);
        }
        if element.starts_with("DocumentRef-") || related.starts_with("DocumentRef-") {
            tracing::warn!(
                element,
                related,
                "skipping relationship to an external SPDX document"
            );
            return Ok(None);
        }

        let element = component_id(FORMAT, element, "spdxElementId")?;
        let related = component_id(FORMAT, related, "relatedSpdxElement")?;
        Ok(Some(match direction {
            EdgeDirection::Forward => Relationship::new(element, related),
            EdgeDirection::Reverse => Relationship::new(related, element),
        }))
    }

    fn normalize(document: SpdxDocument, encoding: DocumentEncoding) -> Result<ParsedSbom> {
        let document_id = document
            .spdx_id
            .as_deref()
            .map(str::trim)
            .unwrap_or(DOCUMENT_ID)
            .to_string();

        let components = document
            .packages
            .into_iter()
            .map(Self::to_component)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        ensure_unique_ids(&components)?;

        let mut relationships = Vec::new();
        for relationship in &document.relationships {
            if let Some(edge) = Self::to_relationship(&document_id, relationship)? {
                relationships.push(edge);
            }
        }

        Ok(ParsedSbom {
            format: FORMAT,
            encoding,
            spec_version: document.spdx_version,
            document_name: document.name,
            components,
            relationships,
        })
    }
}

impl SbomParser for SpdxParser {
    fn format(&self) -> SbomFormat {
        FORMAT
    }

    fn parse(&self, content: &str, encoding: DocumentEncoding) -> Result<ParsedSbom> {
        let document = match encoding {
            DocumentEncoding::Json => self.parse_json_document(content)?,
            DocumentEncoding::Xml => self.parse_xml_document(content)?,
        };
        let parsed = Self::normalize(document, encoding)?;
        tracing::debug!(
            components = parsed.components.len(),
            relationships = parsed.relationships.len(),
            "parsed SPDX document"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::{category_of, ErrorCategory};

    fn parser() -> SpdxParser {
        SpdxParser::new().unwrap()
    }

    const JSON_DOCUMENT: &str = r#"{
        "SPDXID": "SPDXRef-DOCUMENT",
        "spdxVersion": "SPDX-2.3",
        "name": "sample-app",
        "dataLicense": "CC0-1.0",
        "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
        "packages": [
            {
                "SPDXID": "SPDXRef-app",
                "name": "sample-app",
                "versionInfo": "1.0.0",
                "downloadLocation": "NOASSERTION",
                "primaryPackagePurpose": "APPLICATION",
                "licenseConcluded": "NOASSERTION",
                "licenseDeclared": "MIT"
            },
            {
                "SPDXID": "SPDXRef-lodash",
                "name": "lodash",
                "versionInfo": "4.17.21",
                "downloadLocation": "https://registry.npmjs.org/lodash/-/lodash-4.17.21.tgz",
                "supplier": "Organization: OpenJS Foundation",
                "licenseConcluded": "MIT",
                "externalRefs": [
                    {"referenceCategory": "SECURITY", "referenceType": "cpe23Type", "referenceLocator": "cpe:2.3:a:lodash:lodash:4.17.21"},
                    {"referenceCategory": "PACKAGE-MANAGER", "referenceType": "purl", "referenceLocator": "pkg:npm/lodash@4.17.21"}
                ]
            },
            {
                "SPDXID": "SPDXRef-jest",
                "name": "jest",
                "downloadLocation": "NOASSERTION",
                "licenseConcluded": "NONE",
                "licenseDeclared": "NOASSERTION",
                "supplier": "NOASSERTION"
            }
        ],
        "relationships": [
            {"spdxElementId": "SPDXRef-DOCUMENT", "relationshipType": "DESCRIBES", "relatedSpdxElement": "SPDXRef-app"},
            {"spdxElementId": "SPDXRef-app", "relationshipType": "DEPENDS_ON", "relatedSpdxElement": "SPDXRef-lodash"},
            {"spdxElementId": "SPDXRef-jest", "relationshipType": "DEV_DEPENDENCY_OF", "relatedSpdxElement": "SPDXRef-app"},
            {"spdxElementId": "SPDXRef-app", "relationshipType": "CONTAINS", "relatedSpdxElement": "SPDXRef-jest"},
            {"spdxElementId": "SPDXRef-app", "relationshipType": "DEPENDS_ON", "relatedSpdxElement": "NOASSERTION"}
        ]
    }"#;

    const XML_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document>
  <SPDXID>SPDXRef-DOCUMENT</SPDXID>
  <spdxVersion>SPDX-2.2</spdxVersion>
  <creationInfo>
    <created>2024-01-01T00:00:00Z</created>
    <creators>Tool: test</creators>
  </creationInfo>
  <name>xml-doc</name>
  <dataLicense>CC0-1.0</dataLicense>
  <packages>
    <SPDXID>SPDXRef-a</SPDXID>
    <name>a</name>
    <versionInfo>1.0</versionInfo>
    <downloadLocation>NOASSERTION</downloadLocation>
    <supplier>Person: Jane Doe</supplier>
    <licenseConcluded>Apache-2.0</licenseConcluded>
  </packages>
  <packages>
    <SPDXID>SPDXRef-b</SPDXID>
    <name>b</name>
    <downloadLocation>NOASSERTION</downloadLocation>
    <externalRefs>
      <referenceCategory>PACKAGE-MANAGER</referenceCategory>
      <referenceType>purl</referenceType>
      <referenceLocator>pkg:pypi/b@2.0</referenceLocator>
    </externalRefs>
  </packages>
  <relationships>
    <spdxElementId>SPDXRef-b</spdxElementId>
    <relationshipType>DEPENDENCY_OF</relationshipType>
    <relatedSpdxElement>SPDXRef-a</relatedSpdxElement>
  </relationships>
</Document>"#;

    #[test]
    fn test_parse_json_document() {
        let parsed = parser().parse(JSON_DOCUMENT, DocumentEncoding::Json).unwrap();

        assert_eq!(parsed.format, SbomFormat::Spdx);
        assert_eq!(parsed.spec_version.as_deref(), Some("SPDX-2.3"));
        assert_eq!(parsed.document_name.as_deref(), Some("sample-app"));
        assert_eq!(parsed.components.len(), 3);

        let app = &parsed.components[0];
        assert_eq!(app.license(), Some("MIT"));
        assert_eq!(app.component_type(), &ComponentType::Application);

        let lodash = &parsed.components[1];
        assert_eq!(lodash.supplier(), Some("OpenJS Foundation"));
        assert_eq!(lodash.purl(), Some("pkg:npm/lodash@4.17.21"));
        assert_eq!(lodash.component_type(), &ComponentType::Library);

        let jest = &parsed.components[2];
        assert!(jest.license().is_none());
        assert!(jest.supplier().is_none());
        assert!(jest.version().is_none());

        let edges: Vec<(&str, &str)> = parsed
            .relationships
            .iter()
            .map(|r| (r.parent().as_str(), r.child().as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("SPDXRef-app", "SPDXRef-lodash"),
                ("SPDXRef-app", "SPDXRef-jest"),
            ]
        );
    }

    #[test]
    fn test_parse_xml_document() {
        let parsed = parser().parse(XML_DOCUMENT, DocumentEncoding::Xml).unwrap();

        assert_eq!(parsed.spec_version.as_deref(), Some("SPDX-2.2"));
        assert_eq!(parsed.components.len(), 2);
        assert_eq!(parsed.components[0].supplier(), Some("Jane Doe"));
        assert_eq!(parsed.components[0].license(), Some("Apache-2.0"));
        assert_eq!(parsed.components[1].purl(), Some("pkg:pypi/b@2.0"));

        assert_eq!(parsed.relationships.len(), 1);
        assert_eq!(parsed.relationships[0].parent().as_str(), "SPDXRef-a");
        assert_eq!(parsed.relationships[0].child().as_str(), "SPDXRef-b");
    }

    #[test]
    fn test_edge_direction() {
        assert_eq!(edge_direction("DEPENDS_ON"), Some(EdgeDirection::Forward));
        assert_eq!(edge_direction("DEPENDENCY_OF"), Some(EdgeDirection::Reverse));
        assert_eq!(edge_direction("BUILD_DEPENDENCY_OF"), Some(EdgeDirection::Reverse));
        assert_eq!(edge_direction("OPTIONAL_DEPENDENCY_OF"), Some(EdgeDirection::Reverse));
        assert_eq!(edge_direction("CONTAINS"), None);
        assert_eq!(edge_direction("DESCRIBES"), None);
    }

    #[test]
    fn test_strip_supplier_prefix() {
        assert_eq!(strip_supplier_prefix("Organization: Acme"), "Acme");
        assert_eq!(strip_supplier_prefix("Tool: scanner-1.0"), "scanner-1.0");
        assert_eq!(strip_supplier_prefix("Acme"), "Acme");
    }

    #[test]
    fn test_missing_required_document_fields() {
        let err = parser()
            .parse(r#"{"spdxVersion": "SPDX-2.3", "packages": []}"#, DocumentEncoding::Json)
            .unwrap_err();
        assert_eq!(category_of(&err), Some(ErrorCategory::Schema));
    }

    #[test]
    fn test_duplicate_spdx_id() {
        let content = r#"{
            "SPDXID": "SPDXRef-DOCUMENT", "spdxVersion": "SPDX-2.3", "name": "d",
            "dataLicense": "CC0-1.0", "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
            "packages": [
                {"SPDXID": "SPDXRef-a", "name": "a", "downloadLocation": "NONE"},
                {"SPDXID": "SPDXRef-a", "name": "a2", "downloadLocation": "NONE"}
            ]
        }"#;
        let err = parser().parse(content, DocumentEncoding::Json).unwrap_err();
        assert_eq!(category_of(&err), Some(ErrorCategory::Schema));
        assert!(err.to_string().contains("SPDXRef-a"));
    }

    #[test]
    fn test_xml_wrong_root() {
        let err = parser()
            .parse(
                r#"<bom xmlns="http://cyclonedx.org/schema/bom/1.5"/>"#,
                DocumentEncoding::Xml,
            )
            .unwrap_err();
        assert_eq!(category_of(&err), Some(ErrorCategory::Schema));
    }

    #[test]
    fn test_xml_missing_creation_info_fails_schema() {
        let content = r#"<Document>
            <SPDXID>SPDXRef-DOCUMENT</SPDXID>
            <spdxVersion>SPDX-2.3</spdxVersion>
            <name>x</name>
            <dataLicense>CC0-1.0</dataLicense>
        </Document>"#;
        let err = parser().parse(content, DocumentEncoding::Xml).unwrap_err();
        assert!(err.to_string().contains("creationInfo"));
    }

    #[test]
    fn test_external_document_reference_is_skipped() {
        let content = r#"{
            "SPDXID": "SPDXRef-DOCUMENT", "spdxVersion": "SPDX-2.3", "name": "d",
            "dataLicense": "CC0-1.0", "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
            "packages": [{"SPDXID": "SPDXRef-a", "name": "a", "downloadLocation": "NONE"}],
            "relationships": [
                {"spdxElementId": "SPDXRef-a", "relationshipType": "DEPENDS_ON", "relatedSpdxElement": "DocumentRef-other:SPDXRef-b"}
            ]
        }"#;
        let parsed = parser().parse(content, DocumentEncoding::Json).unwrap();
        assert!(parsed.relationships.is_empty());
    }

    #[test]
    fn test_padded_spdx_ids_meet_their_relationships() {
        let content = r#"{
            "SPDXID": " SPDXRef-DOCUMENT ", "spdxVersion": "SPDX-2.3", "name": "d",
            "dataLicense": "CC0-1.0", "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
            "packages": [
                {"SPDXID": "SPDXRef-a ", "name": "a", "downloadLocation": "NONE"},
                {"SPDXID": "\tSPDXRef-b", "name": "b", "downloadLocation": "NONE"}
            ],
            "relationships": [
                {"spdxElementId": "SPDXRef-DOCUMENT", "relationshipType": "DEPENDS_ON", "relatedSpdxElement": "SPDXRef-a"},
                {"spdxElementId": "SPDXRef-a", "relationshipType": "DEPENDS_ON", "relatedSpdxElement": "SPDXRef-b"}
            ]
        }"#;
        let parsed = parser().parse(content, DocumentEncoding::Json).unwrap();

        let ids: Vec<&str> = parsed.components.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["SPDXRef-a", "SPDXRef-b"]);
        assert_eq!(parsed.relationships.len(), 1);
        assert_eq!(parsed.relationships[0].parent().as_str(), "SPDXRef-a");
        assert_eq!(parsed.relationships[0].child().as_str(), "SPDXRef-b");
    }

    #[test]
    fn test_dangling_relationship_is_kept_for_the_graph_builder() {
        let content = r#"{
            "SPDXID": "SPDXRef-DOCUMENT", "spdxVersion": "SPDX-2.3", "name": "d",
            "dataLicense": "CC0-1.0", "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
            "packages": [{"SPDXID": "SPDXRef-a", "name": "a", "downloadLocation": "NONE"}],
            "relationships": [
                {"spdxElementId": "SPDXRef-a", "relationshipType": "DEPENDS_ON", "relatedSpdxElement": "SPDXRef-missing"}
            ]
        }"#;
        let parsed = parser().parse(content, DocumentEncoding::Json).unwrap();
        assert_eq!(parsed.relationships.len(), 1);
    }
}
