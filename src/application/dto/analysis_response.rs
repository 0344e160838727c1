use crate::sbom_analysis::domain::{DependencyGraph, DocumentEncoding, GraphAnalysis, SbomFormat};

/// Identification data of the loaded document, used in progress output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub format: SbomFormat,
    pub encoding: DocumentEncoding,
    pub spec_version: Option<String>,
    pub document_name: Option<String>,
    pub component_count: usize,
    pub relationship_count: usize,
}

/// AnalysisResponse - Output of the load stage
///
/// Carries the read-only graph that the export, render and report stages
/// consume, together with its unfolded trees.
#[derive(Debug, Clone)]
pub struct AnalysisResponse {
    pub document: DocumentSummary,
    pub graph: DependencyGraph,
    pub analysis: GraphAnalysis,
}

impl AnalysisResponse {
    pub fn new(document: DocumentSummary, graph: DependencyGraph, analysis: GraphAnalysis) -> Self {
        Self {
            document,
            graph,
            analysis,
        }
    }
}
