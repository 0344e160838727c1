//! Configuration file support for sbom-visor.
//!
//! Provides YAML-based configuration through `sbom-visor.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::Context;
use sbom_visor::application::dto::ReportFormat;
use sbom_visor::shared::error::SbomError;
use sbom_visor::shared::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "sbom-visor.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub output_dir: Option<PathBuf>,
    pub csv_file: Option<String>,
    pub graph_file: Option<String>,
    pub report_file: Option<String>,
    pub report_format: Option<String>,
    pub check_vulnerabilities: Option<bool>,
    pub osv_api_url: Option<String>,
    pub max_concurrent_lookups: Option<usize>,
    pub lookup_timeout_secs: Option<u64>,
    pub cyclonedx_schema: Option<PathBuf>,
    pub spdx_schema: Option<PathBuf>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    /// The validated report format, if one is configured
    pub fn report_format(&self) -> Result<Option<ReportFormat>> {
        self.report_format
            .as_deref()
            .map(|value| value.parse::<ReportFormat>().map_err(config_error))
            .transpose()
    }
}

fn config_error(message: String) -> anyhow::Error {
    SbomError::Validation {
        message: format!("Invalid config: {}", message),
    }
    .into()
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            anyhow::Error::new(SbomError::Validation {
                message: format!("cannot read config file: {}", e),
            })
        })
        .with_context(|| {
            format!(
                "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
                path.display()
            )
        })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content)
        .map_err(|e| {
            anyhow::Error::new(SbomError::Validation {
                message: format!("invalid YAML: {}", e),
            })
        })
        .with_context(|| {
            format!(
                "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
                path.display()
            )
        })?;

    validate_config(&config)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    warn_unknown_fields(&config);
    tracing::debug!(path = %path.display(), "config file loaded");

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    config.report_format()?;
    if config.max_concurrent_lookups == Some(0) {
        return Err(config_error(
            "max_concurrent_lookups must be greater than zero.\n\n\
             💡 Hint: Use a small positive number such as 4."
                .to_string(),
        ));
    }
    if config.lookup_timeout_secs == Some(0) {
        return Err(config_error(
            "lookup_timeout_secs must be greater than zero.\n\n\
             💡 Hint: The default timeout is 30 seconds."
                .to_string(),
        ));
    }
    for (field, value) in [
        ("csv_file", &config.csv_file),
        ("graph_file", &config.graph_file),
        ("report_file", &config.report_file),
    ] {
        if value.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(config_error(format!("{} must not be empty.", field)));
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    let mut keys: Vec<&String> = config.unknown_fields.keys().collect();
    keys.sort();
    for key in keys {
        tracing::warn!(field = %key, "unknown config field ignored");
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbom_visor::shared::error::{category_of, ErrorCategory};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
output_dir: reports
csv_file: inventory.csv
graph_file: "-"
report_format: json
check_vulnerabilities: true
osv_api_url: http://localhost:8080
max_concurrent_lookups: 8
lookup_timeout_secs: 10
cyclonedx_schema: schemas/bom-1.6.schema.json
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("reports")));
        assert_eq!(config.csv_file.as_deref(), Some("inventory.csv"));
        assert_eq!(config.graph_file.as_deref(), Some("-"));
        assert_eq!(config.report_format().unwrap(), Some(ReportFormat::Json));
        assert_eq!(config.check_vulnerabilities, Some(true));
        assert_eq!(config.osv_api_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.max_concurrent_lookups, Some(8));
        assert_eq!(config.lookup_timeout_secs, Some(10));
        assert_eq!(
            config.cyclonedx_schema,
            Some(PathBuf::from("schemas/bom-1.6.schema.json"))
        );
        assert!(config.spdx_schema.is_none());
        assert!(config.unknown_fields.is_empty());
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            "report_format: csv\ncheck_vulnerabilities: false\n",
        )
        .unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.report_format().unwrap(), Some(ReportFormat::Csv));
        assert_eq!(config.check_vulnerabilities, Some(false));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = result.unwrap_err();
        assert!(format!("{}", err).contains("Failed to read config file"));
        assert_eq!(category_of(&err), Some(ErrorCategory::Config));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("bad.yml");
        fs::write(&config_path, "invalid: yaml: [[[broken").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(format!("{}", err).contains("Failed to parse config file"));
        assert_eq!(category_of(&err), Some(ErrorCategory::Config));
    }

    #[test]
    fn test_zero_concurrency_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "max_concurrent_lookups: 0\n").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("max_concurrent_lookups must be greater than zero"));
        assert_eq!(category_of(&err), Some(ErrorCategory::Config));
    }

    #[test]
    fn test_zero_timeout_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "lookup_timeout_secs: 0\n").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("lookup_timeout_secs"));
    }

    #[test]
    fn test_unknown_report_format_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "report_format: markdown\n").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid report format: markdown"));
    }

    #[test]
    fn test_empty_file_name_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "csv_file: \"\"\n").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(format!("{:#}", err).contains("csv_file must not be empty"));
    }

    #[test]
    fn test_unknown_fields_warning() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
report_format: text
format: markdown
check_cve: true
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_fields.len(), 2);
        assert!(config.unknown_fields.contains_key("format"));
        assert!(config.unknown_fields.contains_key("check_cve"));
    }

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.output_dir.is_none());
        assert!(config.report_format().unwrap().is_none());
        assert!(config.check_vulnerabilities.is_none());
        assert!(config.unknown_fields.is_empty());
    }
}
