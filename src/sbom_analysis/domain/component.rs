use crate::shared::Result;
use serde::{Serialize, Serializer};
use std::fmt;

/// Maximum length for component identifiers (security limit)
const MAX_IDENTIFIER_LENGTH: usize = 2048;

/// NewType wrapper for a component identifier (bom-ref, SPDXID, purl, ...)
///
/// Ordering is lexicographic on the raw string, which is what every
/// reproducible output (CSV rows, root order) sorts by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(identifier: impl Into<String>) -> Result<Self> {
        let identifier = identifier.into();

        if identifier.trim().is_empty() {
            anyhow::bail!("Component identifier cannot be empty");
        }

        // Security: Length limit to prevent DoS
        if identifier.len() > MAX_IDENTIFIER_LENGTH {
            anyhow::bail!(
                "Component identifier is too long ({} bytes). Maximum allowed: {} bytes",
                identifier.len(),
                MAX_IDENTIFIER_LENGTH
            );
        }

        Ok(Self(identifier))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ComponentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of software artifact a component describes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Application,
    Framework,
    Library,
    Container,
    Platform,
    OperatingSystem,
    Device,
    DeviceDriver,
    Firmware,
    File,
    MachineLearningModel,
    Data,
    CryptographicAsset,
    /// Anything the two schemas name that has no variant above
    Other(String),
}

impl ComponentType {
    /// Parses a CycloneDX `type` or an SPDX `primaryPackagePurpose`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().replace('_', "-").as_str() {
            "application" => ComponentType::Application,
            "framework" => ComponentType::Framework,
            "library" => ComponentType::Library,
            "container" => ComponentType::Container,
            "platform" => ComponentType::Platform,
            "operating-system" => ComponentType::OperatingSystem,
            "device" => ComponentType::Device,
            "device-driver" => ComponentType::DeviceDriver,
            "firmware" => ComponentType::Firmware,
            "file" => ComponentType::File,
            "machine-learning-model" => ComponentType::MachineLearningModel,
            "data" => ComponentType::Data,
            "cryptographic-asset" => ComponentType::CryptographicAsset,
            other => ComponentType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ComponentType::Application => "application",
            ComponentType::Framework => "framework",
            ComponentType::Library => "library",
            ComponentType::Container => "container",
            ComponentType::Platform => "platform",
            ComponentType::OperatingSystem => "operating-system",
            ComponentType::Device => "device",
            ComponentType::DeviceDriver => "device-driver",
            ComponentType::Firmware => "firmware",
            ComponentType::File => "file",
            ComponentType::MachineLearningModel => "machine-learning-model",
            ComponentType::Data => "data",
            ComponentType::CryptographicAsset => "cryptographic-asset",
            ComponentType::Other(value) => value,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component value object, one entry of the SBOM inventory
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    id: ComponentId,
    name: String,
    version: Option<String>,
    license: Option<String>,
    component_type: ComponentType,
    supplier: Option<String>,
    purl: Option<String>,
}

impl Component {
    pub fn new(id: ComponentId, name: impl Into<String>, component_type: ComponentType) -> Self {
        Self {
            id,
            name: name.into(),
            version: None,
            license: None,
            component_type,
            supplier: None,
            purl: None,
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = non_blank(version);
        self
    }

    pub fn with_license(mut self, license: Option<String>) -> Self {
        self.license = non_blank(license);
        self
    }

    pub fn with_supplier(mut self, supplier: Option<String>) -> Self {
        self.supplier = non_blank(supplier);
        self
    }

    pub fn with_purl(mut self, purl: Option<String>) -> Self {
        self.purl = non_blank(purl);
        self
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn component_type(&self) -> &ComponentType {
        &self.component_type
    }

    pub fn supplier(&self) -> Option<&str> {
        self.supplier.as_deref()
    }

    pub fn purl(&self) -> Option<&str> {
        self.purl.as_deref()
    }

    /// `name` or `name@version`, for human-facing labels
    pub fn display_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
