use crate::application::dto::ReportFormat;
use crate::sbom_analysis::domain::{DocumentEncoding, SbomFormat};
use crate::shared::error::SbomError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CSV_FILE: &str = "sbom_data.csv";
pub const DEFAULT_GRAPH_FILE: &str = "dependency_tree.gv";
pub const DEFAULT_OSV_API_URL: &str = "https://api.osv.dev";
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;

/// File name that sends an artifact to stdout instead of a file
pub const STDOUT_FILE_NAME: &str = "-";

/// Where the three artifacts of a run are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub output_dir: PathBuf,
    pub csv_file: String,
    pub graph_file: String,
    pub report_file: String,
}

/// Settings of the advisory lookup stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupSettings {
    pub api_url: String,
    pub max_concurrent: usize,
    /// Applied to each batch of lookups
    pub timeout: Duration,
}

/// RunRequest - Internal request DTO for one inspection run
///
/// Built through [`RunRequestBuilder`], which merges optional values from
/// the command line and the config file and fills in defaults.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub sbom_path: PathBuf,
    pub format: SbomFormat,
    /// `None` means detect from extension and content
    pub encoding: Option<DocumentEncoding>,
    /// Replaces the embedded JSON Schema when set
    pub schema_path: Option<PathBuf>,
    pub outputs: OutputPaths,
    pub report_format: ReportFormat,
    /// `None` when the advisory stage is disabled
    pub lookup: Option<LookupSettings>,
}

impl RunRequest {
    pub fn builder(sbom_path: impl Into<PathBuf>, format: SbomFormat) -> RunRequestBuilder {
        RunRequestBuilder::new(sbom_path.into(), format)
    }
}

/// Builder for [`RunRequest`]
///
/// Every setter takes an `Option` so that layered sources can be chained:
/// `builder.max_concurrent(cli.or(config))`. `None` keeps the default.
#[derive(Debug, Clone)]
pub struct RunRequestBuilder {
    sbom_path: PathBuf,
    format: SbomFormat,
    encoding: Option<DocumentEncoding>,
    schema_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    csv_file: Option<String>,
    graph_file: Option<String>,
    report_file: Option<String>,
    report_format: Option<ReportFormat>,
    check_vulnerabilities: bool,
    api_url: Option<String>,
    max_concurrent: Option<usize>,
    timeout_secs: Option<u64>,
}

impl RunRequestBuilder {
    fn new(sbom_path: PathBuf, format: SbomFormat) -> Self {
        Self {
            sbom_path,
            format,
            encoding: None,
            schema_path: None,
            output_dir: None,
            csv_file: None,
            graph_file: None,
            report_file: None,
            report_format: None,
            check_vulnerabilities: true,
            api_url: None,
            max_concurrent: None,
            timeout_secs: None,
        }
    }

    pub fn encoding(mut self, encoding: Option<DocumentEncoding>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn schema_path(mut self, schema_path: Option<PathBuf>) -> Self {
        self.schema_path = schema_path;
        self
    }

    pub fn output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn csv_file(mut self, csv_file: Option<String>) -> Self {
        self.csv_file = csv_file;
        self
    }

    pub fn graph_file(mut self, graph_file: Option<String>) -> Self {
        self.graph_file = graph_file;
        self
    }

    pub fn report_file(mut self, report_file: Option<String>) -> Self {
        self.report_file = report_file;
        self
    }

    pub fn report_format(mut self, report_format: Option<ReportFormat>) -> Self {
        self.report_format = report_format;
        self
    }

    pub fn check_vulnerabilities(mut self, enabled: bool) -> Self {
        self.check_vulnerabilities = enabled;
        self
    }

    pub fn api_url(mut self, api_url: Option<String>) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn max_concurrent(mut self, max_concurrent: Option<usize>) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validates the collected values and produces the request
    ///
    /// # Errors
    /// Returns `SbomError::Validation` for an empty file name, a zero
    /// concurrency bound or timeout, or an API URL that is not http(s)
    pub fn build(self) -> Result<RunRequest, SbomError> {
        let report_format = self.report_format.unwrap_or_default();
        let outputs = OutputPaths {
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            csv_file: validate_file_name(
                "csv file",
                self.csv_file.unwrap_or_else(|| DEFAULT_CSV_FILE.to_string()),
            )?,
            graph_file: validate_file_name(
                "graph file",
                self.graph_file
                    .unwrap_or_else(|| DEFAULT_GRAPH_FILE.to_string()),
            )?,
            report_file: validate_file_name(
                "report file",
                self.report_file
                    .unwrap_or_else(|| report_format.default_file_name()),
            )?,
        };

        let lookup = if self.check_vulnerabilities {
            Some(LookupSettings {
                api_url: validate_api_url(
                    self.api_url
                        .unwrap_or_else(|| DEFAULT_OSV_API_URL.to_string()),
                )?,
                max_concurrent: validate_positive(
                    "max concurrent lookups",
                    self.max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT_LOOKUPS),
                )?,
                timeout: Duration::from_secs(validate_positive(
                    "lookup timeout",
                    self.timeout_secs.unwrap_or(DEFAULT_LOOKUP_TIMEOUT_SECS),
                )?),
            })
        } else {
            None
        };

        Ok(RunRequest {
            sbom_path: self.sbom_path,
            format: self.format,
            encoding: self.encoding,
            schema_path: self.schema_path,
            outputs,
            report_format,
            lookup,
        })
    }
}

fn validate_file_name(field: &str, name: String) -> Result<String, SbomError> {
    if name.trim().is_empty() {
        return Err(SbomError::Validation {
            message: format!("{} name must not be empty", field),
        });
    }
    Ok(name)
}

fn validate_positive<T>(field: &str, value: T) -> Result<T, SbomError>
where
    T: PartialOrd + Default + std::fmt::Display + Copy,
{
    if value <= T::default() {
        return Err(SbomError::Validation {
            message: format!("{} must be greater than zero (got {})", field, value),
        });
    }
    Ok(value)
}

fn validate_api_url(url: String) -> Result<String, SbomError> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(SbomError::Validation {
            message: format!("advisory API URL must start with http:// or https:// (got '{}')", url),
        });
    }
    Ok(url)
}
