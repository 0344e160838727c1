/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (file system, advisory source, console).
pub mod advisory_repository;
pub mod formatter;
pub mod output_presenter;
pub mod progress_reporter;
pub mod sbom_parser;
pub mod sbom_reader;

pub use advisory_repository::AdvisoryRepository;
pub use formatter::{ComponentExporter, ReportFormatter, TreeRenderer};
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use sbom_parser::SbomParser;
pub use sbom_reader::SbomReader;
