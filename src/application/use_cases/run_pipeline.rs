use crate::application::dto::{
    AnalysisResponse, RunRequest, RunSummary, Stage, StageOutcome, StageResult,
};
use crate::application::factories::{
    FormatterFactory, ParserFactory, PresenterFactory, PresenterType,
};
use crate::application::use_cases::{AnalyzeSbomUseCase, CheckVulnerabilitiesUseCase};
use crate::ports::outbound::{AdvisoryRepository, ProgressReporter, SbomReader};
use crate::sbom_analysis::domain::{Component, VulnerabilityReport};
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;

/// RunPipelineUseCase - One complete inspection run
///
/// Load → {CSV export, tree render, vulnerability report}. A load failure
/// is returned as an error; an output stage failure is recorded in the
/// summary and the remaining stages still run.
///
/// # Type Parameters
/// * `R` - SbomReader implementation
/// * `P` - ProgressReporter implementation
/// * `A` - AdvisoryRepository implementation behind the vulnerability check
pub struct RunPipelineUseCase<R, P, A: AdvisoryRepository> {
    sbom_reader: R,
    progress_reporter: P,
    vulnerability_checker: Option<CheckVulnerabilitiesUseCase<A>>,
}

impl<R, P, A> RunPipelineUseCase<R, P, A>
where
    R: SbomReader,
    P: ProgressReporter,
    A: AdvisoryRepository,
{
    /// Creates the pipeline; `None` for the checker disables the report stage
    pub fn new(
        sbom_reader: R,
        progress_reporter: P,
        vulnerability_checker: Option<CheckVulnerabilitiesUseCase<A>>,
    ) -> Self {
        Self {
            sbom_reader,
            progress_reporter,
            vulnerability_checker,
        }
    }

    /// Executes the run described by `request`
    ///
    /// # Errors
    /// Returns an error only when the document cannot be loaded (read,
    /// format, schema, parse or dangling-reference failures)
    pub async fn execute(&self, request: &RunRequest) -> Result<RunSummary> {
        let parser = ParserFactory::create(request.format, request.schema_path.as_deref())?;
        let loader = AnalyzeSbomUseCase::new(&self.sbom_reader, &self.progress_reporter);
        let response = loader.execute(&request.sbom_path, request.encoding, parser.as_ref())?;

        self.prepare_output_dir(&request.outputs.output_dir);

        let mut stages = Vec::with_capacity(3);
        stages.push(self.export_components(request, &response));
        stages.push(self.render_tree(request, &response));

        let report = match &self.vulnerability_checker {
            Some(checker) => {
                let components: Vec<&Component> = response.graph.components().collect();
                let report = checker.execute(&components, &self.progress_reporter).await;
                stages.push(self.write_report(request, &report));
                Some(report)
            }
            None => {
                stages.push(StageResult {
                    stage: Stage::VulnerabilityReport,
                    outcome: StageOutcome::Disabled,
                });
                None
            }
        };

        Ok(RunSummary {
            cycles_detected: response.analysis.cycles.len(),
            document: response.document,
            stages,
            report,
        })
    }

    fn export_components(&self, request: &RunRequest, response: &AnalysisResponse) -> StageResult {
        self.progress_reporter.report("📝 Generating CSV export...");
        self.write_stage(
            Stage::CsvExport,
            PresenterType::for_file(&request.outputs.output_dir, &request.outputs.csv_file),
            || {
                let components: Vec<&Component> = response.graph.components().collect();
                FormatterFactory::component_exporter().export(&components)
            },
        )
    }

    fn render_tree(&self, request: &RunRequest, response: &AnalysisResponse) -> StageResult {
        self.progress_reporter
            .report("📝 Rendering dependency tree (Graphviz DOT)...");
        self.write_stage(
            Stage::TreeRender,
            PresenterType::for_file(&request.outputs.output_dir, &request.outputs.graph_file),
            || FormatterFactory::tree_renderer().render(&response.graph, &response.analysis),
        )
    }

    fn write_report(&self, request: &RunRequest, report: &VulnerabilityReport) -> StageResult {
        let format = request.report_format;
        self.progress_reporter
            .report(FormatterFactory::progress_message(format));
        self.write_stage(
            Stage::VulnerabilityReport,
            PresenterType::for_file(&request.outputs.output_dir, &request.outputs.report_file),
            || FormatterFactory::create(format).format(report),
        )
    }

    /// Formats an artifact and hands it to its presenter; failures stay local
    fn write_stage(
        &self,
        stage: Stage,
        presenter_type: PresenterType,
        produce: impl FnOnce() -> Result<String>,
    ) -> StageResult {
        let presenter = PresenterFactory::create(presenter_type);
        let destination = presenter.destination();
        let written = produce()
            .and_then(|content| presenter.present(&content))
            .with_context(|| format!("{} stage failed", stage));

        let outcome = match written {
            Ok(()) => {
                self.progress_reporter.report_completion(&format!(
                    "✅ {} written to: {}",
                    stage, destination
                ));
                StageOutcome::Written { destination }
            }
            Err(error) => {
                tracing::warn!(%stage, error = %format!("{:#}", error), "output stage failed");
                self.progress_reporter
                    .report_error(&format!("❌ {}: {:#}", stage, error));
                StageOutcome::Failed { error }
            }
        };
        StageResult { stage, outcome }
    }

    /// Creates the output directory when missing
    ///
    /// A failure here is left to the writers, which then fail their stages.
    fn prepare_output_dir(&self, output_dir: &Path) {
        if output_dir.as_os_str().is_empty() || output_dir.is_dir() {
            return;
        }
        match std::fs::create_dir_all(output_dir) {
            Ok(()) => tracing::debug!(dir = %output_dir.display(), "created output directory"),
            Err(e) => tracing::warn!(
                dir = %output_dir.display(),
                error = %e,
                "failed to create output directory"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbom_analysis::domain::{Advisory, Severity};
    use crate::shared::error::{category_of, ErrorCategory, ExitCode};
    use async_trait::async_trait;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    struct DiskReader;

    impl SbomReader for DiskReader {
        fn read_sbom(&self, path: &Path) -> Result<String> {
            Ok(fs::read_to_string(path)?)
        }
    }

    struct QuietReporter;

    impl ProgressReporter for QuietReporter {
        fn report(&self, _message: &str) {}
        fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}
        fn report_error(&self, _message: &str) {}
        fn report_completion(&self, _message: &str) {}
    }

    struct OneAdvisory;

    #[async_trait]
    impl AdvisoryRepository for OneAdvisory {
        async fn fetch_advisories(&self, purl: &str) -> Result<Vec<Advisory>> {
            if purl.contains("requests") {
                return Ok(vec![Advisory {
                    id: "PYSEC-2023-74".to_string(),
                    severity: Severity::Medium,
                    cvss_score: None,
                    summary: Some("Proxy-Authorization header leak".to_string()),
                    fixed_version: Some("2.31.0".to_string()),
                }]);
            }
            Ok(vec![])
        }
    }

    const SPDX_DOCUMENT: &str = r#"{
        "SPDXID": "SPDXRef-DOCUMENT",
        "spdxVersion": "SPDX-2.3",
        "name": "service",
        "dataLicense": "CC0-1.0",
        "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]},
        "packages": [
            {
                "SPDXID": "SPDXRef-service",
                "name": "service",
                "versionInfo": "0.1.0",
                "downloadLocation": "NOASSERTION"
            },
            {
                "SPDXID": "SPDXRef-requests",
                "name": "requests",
                "versionInfo": "2.30.0",
                "downloadLocation": "NOASSERTION",
                "externalRefs": [{
                    "referenceCategory": "PACKAGE-MANAGER",
                    "referenceType": "purl",
                    "referenceLocator": "pkg:pypi/requests@2.30.0"
                }]
            }
        ],
        "relationships": [
            {
                "spdxElementId": "SPDXRef-service",
                "relationshipType": "DEPENDS_ON",
                "relatedSpdxElement": "SPDXRef-requests"
            }
        ]
    }"#;

    fn write_document(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("sbom.spdx.json");
        fs::write(&path, content).unwrap();
        path
    }

    fn request(path: PathBuf, output_dir: PathBuf, check: bool) -> RunRequest {
        RunRequest::builder(path, crate::sbom_analysis::domain::SbomFormat::Spdx)
            .output_dir(Some(output_dir))
            .check_vulnerabilities(check)
            .build()
            .unwrap()
    }

    fn pipeline(check: bool) -> RunPipelineUseCase<DiskReader, QuietReporter, OneAdvisory> {
        let checker =
            check.then(|| CheckVulnerabilitiesUseCase::new(OneAdvisory, 2, Duration::from_secs(5)));
        RunPipelineUseCase::new(DiskReader, QuietReporter, checker)
    }

    #[tokio::test]
    async fn test_execute_writes_all_artifacts() {
        let dir = TempDir::new().unwrap();
        let input = write_document(&dir, SPDX_DOCUMENT);
        let out = dir.path().join("out");

        let summary = pipeline(true)
            .execute(&request(input, out.clone(), true))
            .await
            .unwrap();

        assert_eq!(summary.exit_code(), ExitCode::Success);
        assert_eq!(summary.document.component_count, 2);

        let csv = fs::read_to_string(out.join("sbom_data.csv")).unwrap();
        assert_eq!(csv.lines().count(), 3);
        let dot = fs::read_to_string(out.join("dependency_tree.gv")).unwrap();
        assert!(dot.starts_with("digraph DependencyGraph {"));
        let text = fs::read_to_string(out.join("vulnerability_report.txt")).unwrap();
        assert!(text.contains("PYSEC-2023-74"));

        let report = summary.report.unwrap();
        assert_eq!(report.components.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].component_id.as_str(), "SPDXRef-service");
    }

    #[tokio::test]
    async fn test_execute_without_vulnerability_check() {
        let dir = TempDir::new().unwrap();
        let input = write_document(&dir, SPDX_DOCUMENT);
        let out = dir.path().to_path_buf();

        let summary = pipeline(false)
            .execute(&request(input, out.clone(), false))
            .await
            .unwrap();

        assert_eq!(summary.exit_code(), ExitCode::Success);
        assert!(summary.report.is_none());
        assert!(matches!(summary.stages[2].outcome, StageOutcome::Disabled));
        assert!(!out.join("vulnerability_report.txt").exists());
    }

    #[tokio::test]
    async fn test_stage_failure_does_not_stop_other_stages() {
        let dir = TempDir::new().unwrap();
        let input = write_document(&dir, SPDX_DOCUMENT);
        // A directory where the graph file should go makes only that stage fail
        fs::create_dir(dir.path().join("dependency_tree.gv")).unwrap();

        let summary = pipeline(false)
            .execute(&request(input, dir.path().to_path_buf(), false))
            .await
            .unwrap();

        assert_eq!(summary.exit_code(), ExitCode::StageFailed);
        let failed: Vec<Stage> = summary.failures().map(|result| result.stage).collect();
        assert_eq!(failed, vec![Stage::TreeRender]);
        assert!(dir.path().join("sbom_data.csv").exists());
    }

    #[tokio::test]
    async fn test_load_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let input = write_document(&dir, "{ not json");

        let error = pipeline(false)
            .execute(&request(input, dir.path().to_path_buf(), false))
            .await
            .unwrap_err();

        assert_eq!(category_of(&error), Some(ErrorCategory::Parse));
        assert!(!dir.path().join("sbom_data.csv").exists());
    }

    #[tokio::test]
    async fn test_empty_document_fails_only_the_tree_stage() {
        let dir = TempDir::new().unwrap();
        let input = write_document(
            &dir,
            r#"{
                "SPDXID": "SPDXRef-DOCUMENT",
                "spdxVersion": "SPDX-2.3",
                "name": "empty",
                "dataLicense": "CC0-1.0",
                "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: test"]}
            }"#,
        );

        let summary = pipeline(false)
            .execute(&request(input, dir.path().to_path_buf(), false))
            .await
            .unwrap();

        let failure = summary.failures().next().unwrap();
        assert_eq!(failure.stage, Stage::TreeRender);
        let StageOutcome::Failed { error } = &failure.outcome else {
            panic!("expected a failed stage");
        };
        assert_eq!(category_of(error), Some(ErrorCategory::EmptyGraph));
        let csv = fs::read_to_string(dir.path().join("sbom_data.csv")).unwrap();
        assert_eq!(csv, "identifier,name,version,license,type,supplier\n");
    }
}
