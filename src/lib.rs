//! sbom-visor - SBOM inspection tool
//!
//! This library loads CycloneDX and SPDX documents (JSON or XML), builds
//! their dependency graph and produces three artifacts: a flat CSV
//! inventory, a Graphviz rendering of the dependency trees and a
//! vulnerability report backed by OSV. It follows hexagonal architecture
//! and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`sbom_analysis`): Inventory model, dependency graph and tree unfolding
//! - **Application Layer** (`application`): Use cases, DTOs and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Parsers, formatters, file system, console and OSV client
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use sbom_visor::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let request = RunRequest::builder("bom.cdx.json", SbomFormat::CycloneDx)
//!     .check_vulnerabilities(false)
//!     .build()?;
//!
//! let pipeline = RunPipelineUseCase::new(
//!     FileSystemReader::new(),
//!     StderrProgressReporter::new(),
//!     None::<CheckVulnerabilitiesUseCase<OsvClient>>,
//! );
//! let summary = pipeline.execute(&request).await?;
//! println!("exit code: {}", summary.exit_code());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod ports;
pub mod sbom_analysis;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{
        CsvComponentExporter, CsvReportFormatter, GraphvizTreeRenderer, JsonReportFormatter,
        TextReportFormatter,
    };
    pub use crate::adapters::outbound::network::OsvClient;
    pub use crate::adapters::outbound::parsers::{CycloneDxParser, SchemaValidator, SpdxParser};
    pub use crate::application::dto::{
        AnalysisResponse, ReportFormat, RunRequest, RunSummary, Stage, StageOutcome,
    };
    pub use crate::application::use_cases::{
        AnalyzeSbomUseCase, CheckVulnerabilitiesUseCase, RunPipelineUseCase,
    };
    pub use crate::ports::outbound::{
        AdvisoryRepository, ComponentExporter, OutputPresenter, ProgressReporter, ReportFormatter,
        SbomParser, SbomReader, TreeRenderer,
    };
    pub use crate::sbom_analysis::domain::{
        Component, ComponentId, DependencyGraph, DocumentEncoding, GraphAnalysis, SbomFormat,
        VulnerabilityReport,
    };
    pub use crate::sbom_analysis::services::DependencyAnalyzer;
    pub use crate::shared::Result;
}
