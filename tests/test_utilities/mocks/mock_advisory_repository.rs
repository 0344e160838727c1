use async_trait::async_trait;
use sbom_visor::prelude::*;
use sbom_visor::sbom_analysis::domain::{Advisory, Severity};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock AdvisoryRepository for testing
///
/// Known advisories are keyed by package URL. A package can also be made to
/// fail or to stall, which lets tests drive the skipped list. A stalled
/// package holds up every batch it is part of.
#[derive(Default, Clone)]
pub struct MockAdvisoryRepository {
    advisories: HashMap<String, Vec<Advisory>>,
    failing: Vec<String>,
    stalling: Vec<String>,
    stall_for: Duration,
    batch_size: usize,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    batches: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockAdvisoryRepository {
    pub fn new() -> Self {
        Self {
            batch_size: 1,
            ..Self::default()
        }
    }

    pub fn with_advisory(mut self, purl: &str, id: &str, severity: Severity) -> Self {
        self.advisories
            .entry(purl.to_string())
            .or_default()
            .push(Advisory {
                id: id.to_string(),
                severity,
                cvss_score: None,
                summary: Some(format!("{} affects {}", id, purl)),
                fixed_version: None,
            });
        self
    }

    pub fn with_failure(mut self, purl: &str) -> Self {
        self.failing.push(purl.to_string());
        self
    }

    pub fn with_stall(mut self, purl: &str, duration: Duration) -> Self {
        self.stalling.push(purl.to_string());
        self.stall_for = duration;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Highest number of lookups that were running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    fn stalls(&self, purl: &str) -> bool {
        self.stalling.iter().any(|stalling| stalling == purl)
    }

    fn answer(&self, purl: &str) -> Result<Vec<Advisory>> {
        if self.failing.iter().any(|failing| failing == purl) {
            anyhow::bail!("advisory source unavailable for {}", purl);
        }
        Ok(self.advisories.get(purl).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl AdvisoryRepository for MockAdvisoryRepository {
    async fn fetch_advisories(&self, purl: &str) -> Result<Vec<Advisory>> {
        if self.stalls(purl) {
            tokio::time::sleep(self.stall_for).await;
        }
        self.answer(purl)
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    async fn fetch_advisories_batch(&self, purls: &[String]) -> Vec<Result<Vec<Advisory>>> {
        self.batches.lock().unwrap().push(purls.to_vec());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = if purls.iter().any(|purl| self.stalls(purl)) {
            self.stall_for
        } else {
            Duration::from_millis(20)
        };
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        purls.iter().map(|purl| self.answer(purl)).collect()
    }
}
