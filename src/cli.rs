use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use sbom_visor::application::dto::ReportFormat;
use sbom_visor::sbom_analysis::domain::DocumentEncoding;
use std::path::PathBuf;

/// Encoding selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingChoice {
    #[default]
    Auto,
    Fixed(DocumentEncoding),
}

impl EncodingChoice {
    /// `None` means detect from extension and content
    pub fn forced(self) -> Option<DocumentEncoding> {
        match self {
            EncodingChoice::Auto => None,
            EncodingChoice::Fixed(encoding) => Some(encoding),
        }
    }
}

impl std::str::FromStr for EncodingChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(EncodingChoice::Auto);
        }
        s.parse::<DocumentEncoding>()
            .map(EncodingChoice::Fixed)
            .map_err(|_| {
                format!(
                    "Invalid encoding: {}. Please specify 'auto', 'json' or 'xml'",
                    s
                )
            })
    }
}

/// Inspect CycloneDX and SPDX SBOM documents
#[derive(Parser, Debug)]
#[command(name = "sbom-visor")]
#[command(version)]
#[command(
    about = "Flatten SBOM documents to CSV, render dependency trees and summarize known vulnerabilities",
    long_about = None
)]
#[command(after_help = "EXIT CODES:
    0  Every output stage completed
    1  At least one output stage failed
    2  Invalid command-line arguments
    3  The document could not be loaded (format, schema, parse, dangling reference, I/O, config)")]
pub struct Args {
    /// Enable debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load an SBOM document and write the CSV, DOT and report artifacts
    Run(RunArgs),
}

/// Arguments for the `run` subcommand
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Path to the SBOM document
    pub file: PathBuf,

    /// SBOM standard of the document: cyclonedx or spdx
    pub format: String,

    /// Document encoding: auto, json or xml
    #[arg(long, default_value = "auto")]
    pub encoding: EncodingChoice,

    /// Directory the artifacts are written to (created if missing)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// File name of the component table ('-' for stdout)
    #[arg(long, value_name = "NAME")]
    pub csv_file: Option<String>,

    /// File name of the Graphviz dependency tree ('-' for stdout)
    #[arg(long, value_name = "NAME")]
    pub graph_file: Option<String>,

    /// File name of the vulnerability report ('-' for stdout)
    #[arg(long, value_name = "NAME")]
    pub report_file: Option<String>,

    /// Vulnerability report format: text, csv or json
    #[arg(long)]
    pub report_format: Option<ReportFormat>,

    /// Skip the advisory lookup and the vulnerability report
    #[arg(long)]
    pub no_vuln_check: bool,

    /// Base URL of the OSV API
    #[arg(long, value_name = "URL")]
    pub osv_url: Option<String>,

    /// Maximum number of advisory requests in flight
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_concurrent: Option<usize>,

    /// Timeout for each advisory request, in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Custom JSON Schema used instead of the embedded one
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Path to a config file (default: sbom-visor.config.yml next to the document)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
