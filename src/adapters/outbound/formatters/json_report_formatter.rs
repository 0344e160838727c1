use crate::ports::outbound::ReportFormatter;
use crate::sbom_analysis::domain::{
    ComponentVulnerabilities, SeverityBreakdown, SkippedLookup, VulnerabilityReport,
};
use crate::shared::Result;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    components_checked: usize,
    affected_components: usize,
    total_vulnerabilities: usize,
    totals: &'a SeverityBreakdown,
    components: &'a [ComponentVulnerabilities],
    skipped: &'a [SkippedLookup],
}

/// JsonReportFormatter adapter for the machine-readable vulnerability report
pub struct JsonReportFormatter {
    generated_at: DateTime<Utc>,
}

impl JsonReportFormatter {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
        }
    }

    pub fn with_timestamp(generated_at: DateTime<Utc>) -> Self {
        Self { generated_at }
    }
}

impl Default for JsonReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonReportFormatter {
    fn format(&self, report: &VulnerabilityReport) -> Result<String> {
        let document = JsonReport {
            generated_at: self
                .generated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            components_checked: report.components.len(),
            affected_components: report.affected_components(),
            total_vulnerabilities: report.total_vulnerabilities(),
            totals: &report.totals,
            components: &report.components,
            skipped: &report.skipped,
        };
        let mut json = serde_json::to_string_pretty(&document)
            .context("Failed to serialize vulnerability report")?;
        json.push('\n');
        Ok(json)
    }
}
