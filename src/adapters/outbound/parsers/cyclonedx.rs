use super::schema::SchemaValidator;
use super::{component_id, ensure_unique_ids, parse_json, schema_violation, xml};
use crate::ports::outbound::SbomParser;
use crate::sbom_analysis::domain::{
    Component, ComponentId, ComponentType, DocumentEncoding, ParsedSbom, Relationship, SbomFormat,
};
use crate::shared::error::SbomError;
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const FORMAT: SbomFormat = SbomFormat::CycloneDx;
const NAMESPACE_PREFIX: &str = "http://cyclonedx.org/schema/bom/";

// JSON model. It doubles as the projection XML documents are validated through.

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Bom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bom_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spec_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<BomComponent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    component: Option<BomComponent>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BomComponent {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    component_type: Option<String>,
    #[serde(rename = "bom-ref", default, skip_serializing_if = "Option::is_none")]
    bom_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    supplier: Option<Supplier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    licenses: Vec<LicenseChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<BomComponent>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Supplier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LicenseChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    license: Option<License>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expression: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct License {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Dependency {
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(rename = "dependsOn", default, skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
}

// XML model: attributes carry an `@` prefix, lists are wrapped in a container element.

#[derive(Debug, Deserialize)]
struct XmlBom {
    #[serde(rename = "@serialNumber", default)]
    serial_number: Option<String>,
    #[serde(rename = "@version", default)]
    version: Option<u32>,
    #[serde(default)]
    metadata: Option<XmlMetadata>,
    #[serde(default)]
    components: Option<XmlComponents>,
    #[serde(default)]
    dependencies: Option<XmlDependencies>,
}

#[derive(Debug, Deserialize)]
struct XmlMetadata {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    component: Option<XmlComponent>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlComponents {
    #[serde(rename = "component", default)]
    items: Vec<XmlComponent>,
}

#[derive(Debug, Deserialize)]
struct XmlComponent {
    #[serde(rename = "@type", default)]
    component_type: Option<String>,
    #[serde(rename = "@bom-ref", default)]
    bom_ref: Option<String>,
    #[serde(default)]
    supplier: Option<Supplier>,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    licenses: Option<XmlLicenses>,
    #[serde(default)]
    purl: Option<String>,
    #[serde(default)]
    components: Option<XmlComponents>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlLicenses {
    #[serde(default)]
    license: Vec<License>,
    #[serde(default)]
    expression: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct XmlDependencies {
    #[serde(rename = "dependency", default)]
    items: Vec<XmlDependency>,
}

#[derive(Debug, Deserialize)]
struct XmlDependency {
    #[serde(rename = "@ref", default)]
    reference: Option<String>,
    #[serde(rename = "dependency", default)]
    depends_on: Vec<XmlDependency>,
}

impl From<XmlComponent> for BomComponent {
    fn from(xml: XmlComponent) -> Self {
        let licenses = xml
            .licenses
            .map(|licenses| {
                let named = licenses.license.into_iter().map(|license| LicenseChoice {
                    license: Some(license),
                    expression: None,
                });
                let expressions = licenses.expression.into_iter().map(|expression| LicenseChoice {
                    license: None,
                    expression: Some(expression),
                });
                named.chain(expressions).collect()
            })
            .unwrap_or_default();

        BomComponent {
            component_type: xml.component_type,
            bom_ref: xml.bom_ref,
            group: xml.group,
            name: xml.name,
            version: xml.version,
            description: xml.description,
            purl: xml.purl,
            supplier: xml.supplier,
            licenses,
            components: xml
                .components
                .map(|nested| nested.items.into_iter().map(BomComponent::from).collect())
                .unwrap_or_default(),
        }
    }
}

impl XmlBom {
    fn into_bom(self, spec_version: String) -> Bom {
        Bom {
            bom_format: Some("CycloneDX".to_string()),
            spec_version: Some(spec_version),
            serial_number: self.serial_number,
            version: self.version,
            metadata: self.metadata.map(|metadata| Metadata {
                timestamp: metadata.timestamp,
                component: metadata.component.map(BomComponent::from),
            }),
            components: self
                .components
                .map(|c| c.items.into_iter().map(BomComponent::from).collect())
                .unwrap_or_default(),
            dependencies: self
                .dependencies
                .map(|d| {
                    d.items
                        .into_iter()
                        .map(|dependency| Dependency {
                            reference: dependency.reference,
                            depends_on: dependency
                                .depends_on
                                .into_iter()
                                .filter_map(|inner| inner.reference)
                                .collect(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// CycloneDX parser adapter
///
/// Handles JSON and XML documents. Both are checked against the same JSON
/// Schema before any component is produced.
pub struct CycloneDxParser {
    validator: SchemaValidator,
}

impl CycloneDxParser {
    /// Parser using the bundled schema
    pub fn new() -> Result<Self> {
        Ok(Self {
            validator: SchemaValidator::embedded(FORMAT)?,
        })
    }

    pub fn with_validator(validator: SchemaValidator) -> Self {
        Self { validator }
    }

    fn parse_json_document(&self, content: &str) -> Result<Bom> {
        let value = parse_json(content)?;
        self.validator.validate(&value)?;
        let bom = serde_json::from_value(value).map_err(|e| schema_violation(FORMAT, e.to_string()))?;
        Ok(bom)
    }

    fn parse_xml_document(&self, content: &str) -> Result<Bom> {
        let root = xml::inspect(content)?;
        if root.local_name != "bom" {
            return Err(schema_violation(
                FORMAT,
                format!("root element is <{}>, expected <bom>", root.local_name),
            )
            .into());
        }
        let spec_version = root
            .namespace
            .as_deref()
            .and_then(|ns| ns.strip_prefix(NAMESPACE_PREFIX))
            .map(|version| version.trim_end_matches('/').to_string())
            .ok_or_else(|| {
                schema_violation(
                    FORMAT,
                    format!(
                        "root element is not in the {}<version> namespace",
                        NAMESPACE_PREFIX
                    ),
                )
            })?;

        let xml_bom: XmlBom =
            quick_xml::de::from_str(content).map_err(|e| schema_violation(FORMAT, e.to_string()))?;
        let bom = xml_bom.into_bom(spec_version);

        let projection =
            serde_json::to_value(&bom).map_err(|e| schema_violation(FORMAT, e.to_string()))?;
        self.validator.validate(&projection)?;
        Ok(bom)
    }

    fn normalize(bom: Bom, encoding: DocumentEncoding) -> Result<ParsedSbom> {
        let document_name = bom
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.component.as_ref())
            .and_then(|component| non_blank(&component.name))
            .map(str::to_string);

        let mut components = Vec::new();
        let mut relationships = Vec::new();

        let mut queue: VecDeque<(Option<ComponentId>, BomComponent)> = VecDeque::new();
        if let Some(component) = bom.metadata.and_then(|metadata| metadata.component) {
            queue.push_back((None, component));
        }
        queue.extend(bom.components.into_iter().map(|component| (None, component)));

        while let Some((parent, mut raw)) = queue.pop_front() {
            let nested = std::mem::take(&mut raw.components);
            let component = Self::to_component(raw)?;
            let id = component.id().clone();
            if let Some(parent) = parent {
                relationships.push(Relationship::new(parent, id.clone()));
            }
            queue.extend(nested.into_iter().map(|child| (Some(id.clone()), child)));
            components.push(component);
        }

        ensure_unique_ids(&components)?;

        for dependency in bom.dependencies {
            let reference = non_blank(&dependency.reference)
                .ok_or_else(|| schema_violation(FORMAT, "dependency without a ref"))?;
            let parent = component_id(FORMAT, reference, "dependencies[].ref")?;
            for child in &dependency.depends_on {
                let child = component_id(FORMAT, child, "dependencies[].dependsOn")?;
                relationships.push(Relationship::new(parent.clone(), child));
            }
        }

        Ok(ParsedSbom {
            format: FORMAT,
            encoding,
            spec_version: bom.spec_version,
            document_name,
            components,
            relationships,
        })
    }

    fn to_component(raw: BomComponent) -> std::result::Result<Component, SbomError> {
        let name = non_blank(&raw.name)
            .ok_or_else(|| schema_violation(FORMAT, "component without a name"))?
            .to_string();

        let identifier = match (non_blank(&raw.bom_ref), non_blank(&raw.purl)) {
            (Some(bom_ref), _) => bom_ref.to_string(),
            (None, Some(purl)) => purl.to_string(),
            (None, None) => match non_blank(&raw.version) {
                Some(version) => format!("{}@{}", name, version),
                None => name.clone(),
            },
        };

        let license = raw
            .licenses
            .iter()
            .filter_map(|choice| {
                choice
                    .license
                    .as_ref()
                    .and_then(|license| non_blank(&license.id).or(non_blank(&license.name)))
                    .or(non_blank(&choice.expression))
            })
            .collect::<Vec<_>>()
            .join(", ");

        let component_type = raw
            .component_type
            .as_deref()
            .map(ComponentType::parse)
            .unwrap_or(ComponentType::Library);

        Ok(
            Component::new(component_id(FORMAT, &identifier, "component")?, name, component_type)
                .with_version(raw.version)
                .with_license(Some(license))
                .with_supplier(raw.supplier.and_then(|supplier| supplier.name))
                .with_purl(raw.purl),
        )
    }
}

impl SbomParser for CycloneDxParser {
    fn format(&self) -> SbomFormat {
        FORMAT
    }

    fn parse(&self, content: &str, encoding: DocumentEncoding) -> Result<ParsedSbom> {
        let bom = match encoding {
            DocumentEncoding::Json => self.parse_json_document(content)?,
            DocumentEncoding::Xml => self.parse_xml_document(content)?,
        };
        let parsed = Self::normalize(bom, encoding)?;
        tracing::debug!(
            components = parsed.components.len(),
            relationships = parsed.relationships.len(),
            "parsed CycloneDX document"
        );
        Ok(parsed)
    }
}
