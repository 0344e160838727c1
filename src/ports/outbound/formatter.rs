use crate::sbom_analysis::domain::{Component, DependencyGraph, GraphAnalysis, VulnerabilityReport};
use crate::shared::Result;

/// ComponentExporter port for the tabular component export
pub trait ComponentExporter {
    /// Formats the component inventory, one row per component
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn export(&self, components: &[&Component]) -> Result<String>;
}

/// TreeRenderer port for the dependency tree visualization
pub trait TreeRenderer {
    /// Renders every unfolded tree of `analysis`
    ///
    /// # Arguments
    /// * `graph` - Supplies component labels
    /// * `analysis` - Roots, trees and back-edges to draw
    ///
    /// # Errors
    /// Returns `EmptyGraphError` when there is nothing to draw
    fn render(&self, graph: &DependencyGraph, analysis: &GraphAnalysis) -> Result<String>;
}

/// ReportFormatter port for vulnerability report output (text, CSV, JSON)
pub trait ReportFormatter {
    /// Formats an aggregated vulnerability report
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, report: &VulnerabilityReport) -> Result<String>;
}
