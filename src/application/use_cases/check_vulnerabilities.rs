use crate::ports::outbound::{AdvisoryRepository, ProgressReporter};
use crate::shared::Result;
use crate::sbom_analysis::domain::{
    Advisory, Component, ComponentId, ComponentVulnerabilities, SkippedLookup, VulnerabilityRecord,
    VulnerabilityReport,
};
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use packageurl::PackageUrl;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum LookupOutcome {
    Found(Vec<Advisory>),
    Skipped(String),
}

/// CheckVulnerabilitiesUseCase - Use case for the vulnerability report
///
/// Groups components by package URL, splits the unique URLs into batches
/// the advisory source accepts and runs the batches with bounded
/// concurrency. A failed lookup only skips the components of that package.
///
/// # Type Parameters
/// * `A` - AdvisoryRepository implementation
pub struct CheckVulnerabilitiesUseCase<A: AdvisoryRepository> {
    advisory_repository: A,
    max_concurrent: usize,
    lookup_timeout: Duration,
}

impl<A: AdvisoryRepository> CheckVulnerabilitiesUseCase<A> {
    /// Creates a new CheckVulnerabilitiesUseCase with injected repository
    ///
    /// # Arguments
    /// * `advisory_repository` - Source of advisories
    /// * `max_concurrent` - Batches in flight at once (at least 1)
    /// * `lookup_timeout` - Deadline for a batch, then for each package retried alone
    pub fn new(advisory_repository: A, max_concurrent: usize, lookup_timeout: Duration) -> Self {
        Self {
            advisory_repository,
            max_concurrent: max_concurrent.max(1),
            lookup_timeout,
        }
    }

    /// Looks up every component and aggregates the findings
    ///
    /// Never fails as a whole: components that cannot be looked up end up
    /// in the skipped list with their reason.
    pub async fn execute<P: ProgressReporter>(
        &self,
        components: &[&Component],
        progress_reporter: &P,
    ) -> VulnerabilityReport {
        progress_reporter.report("🔐 Checking for vulnerabilities...");

        let mut skipped = Vec::new();
        let mut targets: BTreeMap<String, Vec<&Component>> = BTreeMap::new();
        for &component in components {
            match lookup_key(component) {
                Ok(purl) => targets.entry(purl).or_default().push(component),
                Err(reason) => skipped.push(SkippedLookup {
                    component_id: component.id().clone(),
                    reason,
                }),
            }
        }

        let purls: Vec<String> = targets.keys().cloned().collect();
        let outcomes: DashMap<ComponentId, LookupOutcome> = DashMap::new();
        let completed = AtomicUsize::new(0);
        let total = purls.len();
        let batch_size = self.advisory_repository.max_batch_size().max(1);

        tracing::debug!(
            unique_purls = total,
            batch_size,
            max_concurrent = self.max_concurrent,
            "starting advisory lookups"
        );

        stream::iter(purls.chunks(batch_size))
            .for_each_concurrent(self.max_concurrent, |batch| {
                let targets = &targets;
                let outcomes = &outcomes;
                let completed = &completed;
                async move {
                    let results = self.lookup_batch(batch).await;
                    for (purl, outcome) in batch.iter().zip(results) {
                        for component in targets.get(purl).into_iter().flatten() {
                            outcomes.insert(component.id().clone(), outcome.clone());
                        }
                    }
                    let done = completed.fetch_add(batch.len(), Ordering::SeqCst) + batch.len();
                    progress_reporter.report_progress(
                        done,
                        total,
                        Some("Querying advisory database..."),
                    );
                }
            })
            .await;

        let mut checked = Vec::new();
        for component in targets.values().flatten() {
            match outcomes.remove(component.id()).map(|(_, outcome)| outcome) {
                Some(LookupOutcome::Found(advisories)) => {
                    checked.push(Self::component_entry(component, advisories))
                }
                Some(LookupOutcome::Skipped(reason)) => skipped.push(SkippedLookup {
                    component_id: component.id().clone(),
                    reason,
                }),
                None => skipped.push(SkippedLookup {
                    component_id: component.id().clone(),
                    reason: "advisory lookup did not complete".to_string(),
                }),
            }
        }

        let report = VulnerabilityReport::new(checked, skipped);
        progress_reporter.report_completion(&format!(
            "✅ Vulnerability check complete: {} vulnerability(ies) in {} of {} component(s), {} skipped",
            report.total_vulnerabilities(),
            report.affected_components(),
            report.components.len(),
            report.skipped.len()
        ));
        report
    }

    /// One outcome per purl of `batch`, in order
    ///
    /// A batch that misses the deadline is retried one purl at a time, each
    /// with its own deadline, so a single stalled package only skips itself.
    async fn lookup_batch(&self, batch: &[String]) -> Vec<LookupOutcome> {
        let lookup = self.advisory_repository.fetch_advisories_batch(batch);
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(results) => {
                let mut results = results.into_iter();
                batch
                    .iter()
                    .map(|purl| match results.next() {
                        Some(result) => Self::outcome(purl, result),
                        None => LookupOutcome::Skipped(
                            "advisory source returned no result".to_string(),
                        ),
                    })
                    .collect()
            }
            Err(_) if batch.len() == 1 => vec![self.timed_out(&batch[0])],
            Err(_) => {
                tracing::warn!(
                    purls = batch.len(),
                    timeout = ?self.lookup_timeout,
                    "batch lookup timed out; retrying packages one at a time"
                );
                stream::iter(batch)
                    .map(|purl| self.lookup_single(purl))
                    .buffered(self.max_concurrent)
                    .collect()
                    .await
            }
        }
    }

    async fn lookup_single(&self, purl: &str) -> LookupOutcome {
        let lookup = self.advisory_repository.fetch_advisories(purl);
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => Self::outcome(purl, result),
            Err(_) => self.timed_out(purl),
        }
    }

    fn timed_out(&self, purl: &str) -> LookupOutcome {
        tracing::warn!(purl = %purl, timeout = ?self.lookup_timeout, "advisory lookup timed out");
        LookupOutcome::Skipped(format!(
            "advisory lookup timed out after {:?}",
            self.lookup_timeout
        ))
    }

    fn outcome(purl: &str, result: Result<Vec<Advisory>>) -> LookupOutcome {
        match result {
            Ok(advisories) => LookupOutcome::Found(advisories),
            Err(e) => {
                tracing::warn!(purl = %purl, error = %e, "advisory lookup failed");
                LookupOutcome::Skipped(format!("advisory lookup failed: {:#}", e))
            }
        }
    }

    fn component_entry(component: &Component, advisories: Vec<Advisory>) -> ComponentVulnerabilities {
        let records = advisories
            .into_iter()
            .map(|advisory| VulnerabilityRecord::from_advisory(component.id().clone(), advisory))
            .collect();
        ComponentVulnerabilities::new(
            component.id().clone(),
            component.name().to_string(),
            component.version().map(str::to_string),
            records,
        )
    }
}

/// Package URL to query for a component, or the reason it cannot be looked up
fn lookup_key(component: &Component) -> std::result::Result<String, String> {
    let purl = component
        .purl()
        .map(str::trim)
        .filter(|purl| !purl.is_empty())
        .ok_or_else(|| "no package URL".to_string())?;
    let parsed =
        PackageUrl::from_str(purl).map_err(|e| format!("invalid package URL '{}': {}", purl, e))?;
    if parsed.version().is_none() {
        return Err(format!("package URL '{}' has no version", purl));
    }
    Ok(purl.to_string())
}
