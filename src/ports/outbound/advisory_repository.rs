use crate::sbom_analysis::domain::Advisory;
use crate::shared::Result;
use async_trait::async_trait;

/// AdvisoryRepository port for looking up known vulnerabilities
///
/// This port abstracts the advisory source (OSV, a mirror, a test double).
/// Lookups are keyed by package URL.
#[async_trait]
pub trait AdvisoryRepository: Send + Sync {
    /// Looks up advisories affecting one package
    ///
    /// # Arguments
    /// * `purl` - Package URL of the component, including its version
    ///
    /// # Returns
    /// Every advisory the source knows for the package; empty when none
    ///
    /// # Errors
    /// Returns an error if the source cannot be reached or answers with an error
    async fn fetch_advisories(&self, purl: &str) -> Result<Vec<Advisory>>;

    /// Largest number of package URLs one batched request may carry
    fn max_batch_size(&self) -> usize {
        1
    }

    /// Looks up several packages at once
    ///
    /// Results line up with `purls`; a failure for one entry does not fail
    /// the others. The default issues one lookup per package.
    async fn fetch_advisories_batch(&self, purls: &[String]) -> Vec<Result<Vec<Advisory>>> {
        let mut results = Vec::with_capacity(purls.len());
        for purl in purls {
            results.push(self.fetch_advisories(purl).await);
        }
        results
    }
}
