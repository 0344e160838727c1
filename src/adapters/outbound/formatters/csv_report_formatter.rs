use super::csv_exporter::push_csv_row;
use crate::ports::outbound::ReportFormatter;
use crate::sbom_analysis::domain::VulnerabilityReport;
use crate::shared::Result;

const REPORT_HEADER: [&str; 9] = [
    "component_id",
    "name",
    "version",
    "lookup_status",
    "advisory_id",
    "severity",
    "cvss_score",
    "fixed_version",
    "description",
];

/// CsvReportFormatter adapter for the tabular vulnerability report
///
/// One row per (component, advisory). A checked component without
/// advisories still gets a row with empty advisory columns, and each
/// skipped component gets a `skipped` row carrying the reason.
pub struct CsvReportFormatter;

impl CsvReportFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for CsvReportFormatter {
    fn format(&self, report: &VulnerabilityReport) -> Result<String> {
        let mut output = String::new();
        push_csv_row(&mut output, REPORT_HEADER);

        for entry in &report.components {
            let version = entry.version.as_deref().unwrap_or("");
            if entry.records.is_empty() {
                push_csv_row(
                    &mut output,
                    [
                        entry.component_id.as_str(),
                        entry.name.as_str(),
                        version,
                        "checked",
                        "",
                        "",
                        "",
                        "",
                        "",
                    ],
                );
                continue;
            }
            for record in &entry.records {
                let score = record
                    .cvss_score
                    .map(|score| format!("{:.1}", score.value()))
                    .unwrap_or_default();
                push_csv_row(
                    &mut output,
                    [
                        entry.component_id.as_str(),
                        entry.name.as_str(),
                        version,
                        "checked",
                        record.advisory_id.as_str(),
                        record.severity.as_str(),
                        score.as_str(),
                        record.fixed_version.as_deref().unwrap_or(""),
                        record.description.as_deref().unwrap_or(""),
                    ],
                );
            }
        }

        for skipped in &report.skipped {
            push_csv_row(
                &mut output,
                [
                    skipped.component_id.as_str(),
                    "",
                    "",
                    "skipped",
                    "",
                    "",
                    "",
                    "",
                    skipped.reason.as_str(),
                ],
            );
        }

        Ok(output)
    }
}
