use crate::application::dto::{AnalysisResponse, DocumentSummary};
use crate::ports::outbound::{ProgressReporter, SbomParser, SbomReader};
use crate::sbom_analysis::domain::{DependencyGraph, DocumentEncoding, GraphAnalysis};
use crate::sbom_analysis::services::DependencyAnalyzer;
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;

/// AnalyzeSbomUseCase - Load stage of a run
///
/// Reads the document, parses it with the parser for its standard, builds
/// the dependency graph and unfolds it. Every error here is fatal for the
/// run; the output stages only start once a graph exists.
///
/// # Type Parameters
/// * `R` - SbomReader implementation
/// * `P` - ProgressReporter implementation
pub struct AnalyzeSbomUseCase<R, P> {
    sbom_reader: R,
    progress_reporter: P,
}

impl<R, P> AnalyzeSbomUseCase<R, P>
where
    R: SbomReader,
    P: ProgressReporter,
{
    pub fn new(sbom_reader: R, progress_reporter: P) -> Self {
        Self {
            sbom_reader,
            progress_reporter,
        }
    }

    /// Loads and analyzes one document
    ///
    /// # Arguments
    /// * `path` - Location of the SBOM document
    /// * `encoding` - Forced encoding; `None` detects it
    /// * `parser` - Parser for the standard the document claims to follow
    ///
    /// # Errors
    /// Returns the read, encoding, parse, schema or dangling-reference error
    /// that stopped the load
    pub fn execute(
        &self,
        path: &Path,
        encoding: Option<DocumentEncoding>,
        parser: &dyn SbomParser,
    ) -> Result<AnalysisResponse> {
        self.progress_reporter.report(&format!(
            "📖 Loading {} document from: {}",
            parser.format().display_name(),
            path.display()
        ));

        let content = self.sbom_reader.read_sbom(path)?;
        let encoding = match encoding {
            Some(encoding) => encoding,
            None => DocumentEncoding::detect(path, &content)?,
        };
        tracing::debug!(path = %path.display(), %encoding, bytes = content.len(), "document loaded");

        let parsed = parser
            .parse(&content, encoding)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let document = DocumentSummary {
            format: parsed.format,
            encoding: parsed.encoding,
            spec_version: parsed.spec_version,
            document_name: parsed.document_name,
            component_count: parsed.components.len(),
            relationship_count: parsed.relationships.len(),
        };
        self.progress_reporter.report(&format!(
            "✅ Detected {} component(s) and {} relationship(s) ({} {})",
            document.component_count,
            document.relationship_count,
            document.format.display_name(),
            document.encoding
        ));

        let graph = DependencyGraph::new(parsed.components, &parsed.relationships)
            .with_context(|| format!("Failed to build dependency graph for {}", path.display()))?;
        let analysis = DependencyAnalyzer::analyze(&graph);
        self.report_analysis(&analysis);

        Ok(AnalysisResponse::new(document, graph, analysis))
    }

    fn report_analysis(&self, analysis: &GraphAnalysis) {
        self.progress_reporter.report(&format!(
            "🌳 Found {} root(s), {} tree node(s)",
            analysis.roots.len() + analysis.fallback_roots.len(),
            analysis.total_visits()
        ));

        if !analysis.fallback_roots.is_empty() {
            let starts: Vec<&str> = analysis
                .fallback_roots
                .iter()
                .map(|id| id.as_str())
                .collect();
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Some components are unreachable from any root; unfolding from: {}",
                starts.join(", ")
            ));
        }

        for cycle in &analysis.cycles {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Dependency cycle detected: {}",
                cycle
            ));
        }

        for tree in analysis.trees.iter().filter(|tree| tree.is_truncated()) {
            if let Some(root) = tree.root() {
                self.progress_reporter.report_error(&format!(
                    "⚠️  Warning: Dependency tree of '{}' was truncated after {} nodes",
                    root,
                    tree.len()
                ));
            }
        }
    }
}
