use crate::adapters::outbound::formatters::{
    CsvComponentExporter, CsvReportFormatter, GraphvizTreeRenderer, JsonReportFormatter,
    TextReportFormatter,
};
use crate::application::dto::ReportFormat;
use crate::ports::outbound::{ComponentExporter, ReportFormatter, TreeRenderer};

/// Factory for creating the artifact formatters
///
/// This factory encapsulates the creation logic for different formatter implementations,
/// following the Factory Pattern. It belongs in the application layer as it orchestrates
/// the selection of infrastructure adapters based on application needs.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter instance for the specified report format
    ///
    /// # Examples
    /// ```
    /// use sbom_visor::application::dto::ReportFormat;
    /// use sbom_visor::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(ReportFormat::Json);
    /// ```
    pub fn create(format: ReportFormat) -> Box<dyn ReportFormatter> {
        match format {
            ReportFormat::Text => Box::new(TextReportFormatter::new()),
            ReportFormat::Csv => Box::new(CsvReportFormatter::new()),
            ReportFormat::Json => Box::new(JsonReportFormatter::new()),
        }
    }

    /// Creates the exporter for the component table
    pub fn component_exporter() -> Box<dyn ComponentExporter> {
        Box::new(CsvComponentExporter::new())
    }

    /// Creates the renderer for the dependency tree
    pub fn tree_renderer() -> Box<dyn TreeRenderer> {
        Box::new(GraphvizTreeRenderer::new())
    }

    /// Returns the progress message for the specified report format
    ///
    /// # Examples
    /// ```
    /// use sbom_visor::application::dto::ReportFormat;
    /// use sbom_visor::application::factories::FormatterFactory;
    ///
    /// let message = FormatterFactory::progress_message(ReportFormat::Csv);
    /// assert_eq!(message, "📝 Generating CSV vulnerability report...");
    /// ```
    pub fn progress_message(format: ReportFormat) -> &'static str {
        match format {
            ReportFormat::Text => "📝 Generating text vulnerability report...",
            ReportFormat::Csv => "📝 Generating CSV vulnerability report...",
            ReportFormat::Json => "📝 Generating JSON vulnerability report...",
        }
    }
}
