/// Formatter adapters for the CSV export, the DOT tree and the vulnerability report
mod csv_exporter;
mod csv_report_formatter;
mod dot_renderer;
mod json_report_formatter;
mod text_report_formatter;

pub use csv_exporter::CsvComponentExporter;
pub use csv_report_formatter::CsvReportFormatter;
pub use dot_renderer::GraphvizTreeRenderer;
pub use json_report_formatter::JsonReportFormatter;
pub use text_report_formatter::TextReportFormatter;
