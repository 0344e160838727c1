/// Data Transfer Objects for the application layer
mod analysis_response;
mod report_format;
mod run_request;
mod stage_outcome;

pub use analysis_response::{AnalysisResponse, DocumentSummary};
pub use report_format::ReportFormat;
pub use run_request::{
    LookupSettings, OutputPaths, RunRequest, RunRequestBuilder, DEFAULT_CSV_FILE,
    DEFAULT_GRAPH_FILE, DEFAULT_LOOKUP_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENT_LOOKUPS,
    DEFAULT_OSV_API_URL, STDOUT_FILE_NAME,
};
pub use stage_outcome::{RunSummary, Stage, StageOutcome, StageResult};
