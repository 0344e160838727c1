/// Use cases module containing application business logic orchestration
mod analyze_sbom;
mod check_vulnerabilities;
mod run_pipeline;

pub use analyze_sbom::AnalyzeSbomUseCase;
pub use check_vulnerabilities::CheckVulnerabilitiesUseCase;
pub use run_pipeline::RunPipelineUseCase;
