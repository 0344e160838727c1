use crate::ports::outbound::ReportFormatter;
use crate::sbom_analysis::domain::{ComponentVulnerabilities, SeverityBreakdown, VulnerabilityReport};
use crate::shared::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

const RULE: &str = "================================================================\n";

fn breakdown_line(breakdown: &SeverityBreakdown) -> String {
    format!(
        "critical: {}, high: {}, medium: {}, low: {}, none: {}",
        breakdown.critical, breakdown.high, breakdown.medium, breakdown.low, breakdown.none
    )
}

/// TextReportFormatter adapter for the human-readable vulnerability report
pub struct TextReportFormatter {
    generated_at: DateTime<Utc>,
}

impl TextReportFormatter {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
        }
    }

    /// Formatter with a fixed generation time
    pub fn with_timestamp(generated_at: DateTime<Utc>) -> Self {
        Self { generated_at }
    }

    fn render_component(
        output: &mut String,
        entry: &ComponentVulnerabilities,
    ) -> std::fmt::Result {
        let version = entry.version.as_deref().unwrap_or("-");
        let noun = if entry.count() == 1 {
            "vulnerability"
        } else {
            "vulnerabilities"
        };
        writeln!(
            output,
            "{} {} ({}): {} {}",
            entry.name,
            version,
            entry.component_id,
            entry.count(),
            noun
        )?;
        if entry.count() == 0 {
            return Ok(());
        }
        writeln!(output, "  [{}]", breakdown_line(&entry.breakdown))?;

        for record in &entry.records {
            write!(output, "  - {} {}", record.advisory_id, record.severity)?;
            if let Some(score) = record.cvss_score {
                write!(output, " (CVSS {:.1})", score.value())?;
            }
            if let Some(fixed) = &record.fixed_version {
                write!(output, ", fixed in {}", fixed)?;
            }
            writeln!(output)?;
            if let Some(description) = &record.description {
                writeln!(output, "      {}", description.replace('\n', " "))?;
            }
        }
        Ok(())
    }

    fn render(&self, output: &mut String, report: &VulnerabilityReport) -> std::fmt::Result {
        output.push_str(RULE);
        writeln!(output, "Vulnerability Report")?;
        writeln!(
            output,
            "Generated: {}",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        output.push_str(RULE);
        writeln!(output)?;

        for entry in &report.components {
            Self::render_component(output, entry)?;
        }

        writeln!(output)?;
        writeln!(output, "Totals")?;
        writeln!(output, "  Components checked: {}", report.components.len())?;
        writeln!(
            output,
            "  Affected components: {}",
            report.affected_components()
        )?;
        writeln!(
            output,
            "  Vulnerabilities: {} ({})",
            report.total_vulnerabilities(),
            breakdown_line(&report.totals)
        )?;

        writeln!(output)?;
        writeln!(output, "Skipped ({})", report.skipped.len())?;
        for skipped in &report.skipped {
            writeln!(output, "  - {}: {}", skipped.component_id, skipped.reason)?;
        }
        Ok(())
    }
}

impl Default for TextReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for TextReportFormatter {
    fn format(&self, report: &VulnerabilityReport) -> Result<String> {
        let mut output = String::new();
        self.render(&mut output, report)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbom_analysis::domain::{
        Advisory, ComponentId, CvssScore, Severity, SkippedLookup, VulnerabilityRecord,
    };
    use chrono::TimeZone;

    fn sample_report() -> VulnerabilityReport {
        let vulnerable = ComponentId::new("pkg:pypi/requests@2.0.0").unwrap();
        let records = vec![
            VulnerabilityRecord::from_advisory(
                vulnerable.clone(),
                Advisory {
                    id: "GHSA-aaaa".to_string(),
                    severity: Severity::Medium,
                    cvss_score: None,
                    summary: Some("Header leak".to_string()),
                    fixed_version: None,
                },
            ),
            VulnerabilityRecord::from_advisory(
                vulnerable.clone(),
                Advisory {
                    id: "GHSA-bbbb".to_string(),
                    severity: Severity::Critical,
                    cvss_score: Some(CvssScore::new(9.8).unwrap()),
                    summary: None,
                    fixed_version: Some("2.31.0".to_string()),
                },
            ),
        ];
        VulnerabilityReport::new(
            vec![
                ComponentVulnerabilities::new(
                    vulnerable,
                    "requests".to_string(),
                    Some("2.0.0".to_string()),
                    records,
                ),
                ComponentVulnerabilities::new(
                    ComponentId::new("pkg:pypi/idna@3.6").unwrap(),
                    "idna".to_string(),
                    Some("3.6".to_string()),
                    vec![],
                ),
            ],
            vec![SkippedLookup {
                component_id: ComponentId::new("local-lib").unwrap(),
                reason: "no package URL".to_string(),
            }],
        )
    }

    fn formatter() -> TextReportFormatter {
        TextReportFormatter::with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_format_header_has_timestamp() {
        let text = formatter().format(&sample_report()).unwrap();
        assert!(text.contains("Vulnerability Report"));
        assert!(text.contains("Generated: 2024-05-01T12:00:00Z"));
    }

    #[test]
    fn test_format_lists_zero_count_components() {
        let text = formatter().format(&sample_report()).unwrap();
        assert!(text.contains("idna 3.6 (pkg:pypi/idna@3.6): 0 vulnerabilities"));
        assert!(text.contains("requests 2.0.0 (pkg:pypi/requests@2.0.0): 2 vulnerabilities"));
    }

    #[test]
    fn test_format_records_most_severe_first() {
        let text = formatter().format(&sample_report()).unwrap();
        let critical = text.find("GHSA-bbbb CRITICAL (CVSS 9.8), fixed in 2.31.0").unwrap();
        let medium = text.find("GHSA-aaaa MEDIUM").unwrap();
        assert!(critical < medium);
        assert!(text.contains("      Header leak"));
    }

    #[test]
    fn test_format_totals_and_skipped() {
        let text = formatter().format(&sample_report()).unwrap();
        assert!(text.contains("Components checked: 2"));
        assert!(text.contains("Affected components: 1"));
        assert!(text.contains(
            "Vulnerabilities: 2 (critical: 1, high: 0, medium: 1, low: 0, none: 0)"
        ));
        assert!(text.contains("Skipped (1)"));
        assert!(text.contains("  - local-lib: no package URL"));
    }

    #[test]
    fn test_format_empty_report() {
        let text = formatter().format(&VulnerabilityReport::default()).unwrap();
        assert!(text.contains("Components checked: 0"));
        assert!(text.contains("Skipped (0)"));
    }
}
