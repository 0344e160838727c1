use super::ComponentId;
use crate::shared::Result;
use serde::Serialize;
use std::fmt;

/// CVSS base score, 0.0 to 10.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct CvssScore(f32);

impl CvssScore {
    pub fn new(score: f32) -> Result<Self> {
        if !(0.0..=10.0).contains(&score) || score.is_nan() {
            anyhow::bail!("CVSS score must be between 0.0 and 10.0, got {}", score);
        }
        Ok(Self(score))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

/// Qualitative severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// CVSS v3 qualitative rating bands
    pub fn from_cvss_score(score: CvssScore) -> Self {
        match score.value() {
            s if s >= 9.0 => Severity::Critical,
            s if s >= 7.0 => Severity::High,
            s if s >= 4.0 => Severity::Medium,
            s if s > 0.0 => Severity::Low,
            _ => Severity::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::None => "NONE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One advisory as returned by an advisory source, before it is tied to a component
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    pub id: String,
    pub severity: Severity,
    pub cvss_score: Option<CvssScore>,
    pub summary: Option<String>,
    pub fixed_version: Option<String>,
}

/// An advisory attached to a component of the SBOM
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VulnerabilityRecord {
    pub component_id: ComponentId,
    pub advisory_id: String,
    pub severity: Severity,
    pub description: Option<String>,
    pub cvss_score: Option<CvssScore>,
    pub fixed_version: Option<String>,
}

impl VulnerabilityRecord {
    pub fn from_advisory(component_id: ComponentId, advisory: Advisory) -> Self {
        Self {
            component_id,
            advisory_id: advisory.id,
            severity: advisory.severity,
            description: advisory.summary,
            cvss_score: advisory.cvss_score,
            fixed_version: advisory.fixed_version,
        }
    }
}

/// Count of records per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

impl SeverityBreakdown {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::None => self.none += 1,
        }
    }

    pub fn merge(&mut self, other: &SeverityBreakdown) {
        self.critical += other.critical;
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
        self.none += other.none;
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.none
    }
}

/// Lookup outcome for one component that the advisory source answered for
#[derive(Debug, Clone, Serialize)]
pub struct ComponentVulnerabilities {
    pub component_id: ComponentId,
    pub name: String,
    pub version: Option<String>,
    pub records: Vec<VulnerabilityRecord>,
    pub breakdown: SeverityBreakdown,
}

impl ComponentVulnerabilities {
    pub fn new(
        component_id: ComponentId,
        name: String,
        version: Option<String>,
        mut records: Vec<VulnerabilityRecord>,
    ) -> Self {
        // Most severe first, then by advisory id for stable output
        records.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.advisory_id.cmp(&b.advisory_id))
        });
        let mut breakdown = SeverityBreakdown::default();
        for record in &records {
            breakdown.record(record.severity);
        }
        Self {
            component_id,
            name,
            version,
            records,
            breakdown,
        }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// A component the advisory lookup could not answer for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLookup {
    pub component_id: ComponentId,
    pub reason: String,
}

/// Aggregated vulnerability findings for a whole document
#[derive(Debug, Clone, Default, Serialize)]
pub struct VulnerabilityReport {
    /// Sorted by component identifier
    pub components: Vec<ComponentVulnerabilities>,
    /// Sorted by component identifier
    pub skipped: Vec<SkippedLookup>,
    pub totals: SeverityBreakdown,
}

impl VulnerabilityReport {
    pub fn new(
        mut components: Vec<ComponentVulnerabilities>,
        mut skipped: Vec<SkippedLookup>,
    ) -> Self {
        components.sort_by(|a, b| a.component_id.cmp(&b.component_id));
        skipped.sort_by(|a, b| a.component_id.cmp(&b.component_id));
        let mut totals = SeverityBreakdown::default();
        for entry in &components {
            totals.merge(&entry.breakdown);
        }
        Self {
            components,
            skipped,
            totals,
        }
    }

    pub fn total_vulnerabilities(&self) -> usize {
        self.totals.total()
    }

    /// Components with at least one record
    pub fn affected_components(&self) -> usize {
        self.components.iter().filter(|c| c.count() > 0).count()
    }
}
