/// Mock implementations for testing
mod mock_advisory_repository;
mod mock_progress_reporter;
mod mock_sbom_reader;

pub use mock_advisory_repository::MockAdvisoryRepository;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_sbom_reader::MockSbomReader;
