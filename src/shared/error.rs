use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between a clean run,
/// a run where some output stage failed, and a run that never got past
/// loading the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - every output stage completed
    Success = 0,
    /// The document loaded but at least one output stage failed
    StageFailed = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (unreadable or malformed input, bad config, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::StageFailed => write!(f, "Stage Failed (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Error categories surfaced at the CLI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Format,
    Schema,
    Parse,
    DanglingReference,
    EmptyGraph,
    Io,
    Config,
    AdvisoryLookup,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Format => "FormatError",
            ErrorCategory::Schema => "SchemaError",
            ErrorCategory::Parse => "ParseError",
            ErrorCategory::DanglingReference => "DanglingReferenceError",
            ErrorCategory::EmptyGraph => "EmptyGraphError",
            ErrorCategory::Io => "IOError",
            ErrorCategory::Config => "ConfigError",
            ErrorCategory::AdvisoryLookup => "AdvisoryLookupError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-specific errors for SBOM inspection.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// keeping the user-facing hints next to each failure mode.
#[derive(Debug, Error)]
pub enum SbomError {
    #[error("Unrecognized SBOM format: '{format}'\n\n💡 Hint: Supported formats are 'cyclonedx' and 'spdx'")]
    UnsupportedFormat { format: String },

    #[error("Cannot determine document encoding: {path}\nReason: {reason}\n\n💡 Hint: Use a .json or .xml file, or pass --encoding json|xml")]
    UnknownEncoding { path: PathBuf, reason: String },

    #[error("Document does not conform to the {format} schema\nDetails: {details}\n\n💡 Hint: Validate the document with the official {format} tooling")]
    SchemaViolation { format: String, details: String },

    #[error("Duplicate component identifier: '{identifier}'\n\n💡 Hint: Every component must have a unique bom-ref or SPDXID")]
    DuplicateIdentifier { identifier: String },

    #[error("Malformed {encoding} document\nDetails: {details}\n\n💡 Hint: Please verify that the file is complete and correctly encoded")]
    MalformedDocument { encoding: String, details: String },

    #[error("Relationship references unknown component: '{identifier}' (declared by '{referenced_by}')\n\n💡 Hint: Every dependency must point at a component listed in the document")]
    DanglingReference {
        identifier: String,
        referenced_by: String,
    },

    #[error("Dependency graph is empty: no components and no roots to render")]
    EmptyGraph,

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },

    /// Validation error for builder patterns and configuration
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Advisory lookup failed for '{identifier}': {details}")]
    AdvisoryLookup { identifier: String, details: String },
}

impl SbomError {
    /// Returns the category printed at the CLI boundary
    pub fn category(&self) -> ErrorCategory {
        match self {
            SbomError::UnsupportedFormat { .. } | SbomError::UnknownEncoding { .. } => {
                ErrorCategory::Format
            }
            SbomError::SchemaViolation { .. } | SbomError::DuplicateIdentifier { .. } => {
                ErrorCategory::Schema
            }
            SbomError::MalformedDocument { .. } => ErrorCategory::Parse,
            SbomError::DanglingReference { .. } => ErrorCategory::DanglingReference,
            SbomError::EmptyGraph => ErrorCategory::EmptyGraph,
            SbomError::FileReadError { .. }
            | SbomError::FileWriteError { .. }
            | SbomError::SecurityError { .. } => ErrorCategory::Io,
            SbomError::Validation { .. } => ErrorCategory::Config,
            SbomError::AdvisoryLookup { .. } => ErrorCategory::AdvisoryLookup,
        }
    }
}

/// Finds the category of the first `SbomError` in an error chain.
pub fn category_of(error: &anyhow::Error) -> Option<ErrorCategory> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<SbomError>())
        .map(SbomError::category)
}
