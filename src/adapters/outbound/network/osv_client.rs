use crate::ports::outbound::AdvisoryRepository;
use crate::sbom_analysis::domain::{Advisory, CvssScore, Severity};
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tokio::sync::Semaphore;

/// OSV API client for fetching advisories by package URL
///
/// Uses the OSV.dev batch query API, then fetches each advisory's details
/// because batch responses only carry identifiers.
///
/// # Security
/// - Every request has its own timeout
/// - Advisory identifiers are URL-encoded before being put in a path
/// - Failed requests are not retried
///
/// A stalled request only fails the package URLs that depend on it. When the
/// batch query itself fails, every package URL is queried on its own.
pub struct OsvClient {
    client: Client,
    api_url: String,
    timeout: Duration,
    max_concurrent: usize,
    permits: Semaphore,
}

impl OsvClient {
    const MAX_BATCH_SIZE: usize = 100; // OSV API limit
    const DEFAULT_MAX_CONCURRENT: usize = 4;

    /// Creates a client for the given OSV base URL
    ///
    /// `timeout` applies to each HTTP request separately.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("sbom-visor/{}", version);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            timeout,
            max_concurrent: Self::DEFAULT_MAX_CONCURRENT,
            permits: Semaphore::new(Self::DEFAULT_MAX_CONCURRENT),
        })
    }

    /// Caps the number of requests in flight, across every batch
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self.permits = Semaphore::new(self.max_concurrent);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_url, path)
    }

    /// Sends one request once a permit is free and decodes the JSON answer
    ///
    /// The timeout starts when the request is sent, not while it waits for a permit.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, subject: &str) -> Result<T> {
        let _permit = self
            .permits
            .acquire()
            .await
            .context("OSV request limiter is closed")?;

        let response = request
            .send()
            .await
            .map_err(|e| self.request_error(e, subject))?;
        if !response.status().is_success() {
            anyhow::bail!(
                "OSV API returned status code {} for {}",
                response.status(),
                subject
            );
        }
        response.json().await.map_err(|e| self.request_error(e, subject))
    }

    fn request_error(&self, error: reqwest::Error, subject: &str) -> anyhow::Error {
        if error.is_timeout() {
            anyhow::anyhow!(
                "OSV request for {} timed out after {:?}",
                subject,
                self.timeout
            )
        } else {
            anyhow::Error::new(error).context(format!("OSV request for {} failed", subject))
        }
    }

    /// Advisory identifiers per purl, in request order
    async fn query_batch(&self, purls: &[String]) -> Result<Vec<Vec<String>>> {
        let batch_query = OsvBatchQuery {
            queries: purls
                .iter()
                .map(|purl| OsvQuery {
                    package: OsvPackage { purl: purl.clone() },
                })
                .collect(),
        };

        let request = self.client.post(self.endpoint("querybatch")).json(&batch_query);
        let batch_response: OsvBatchResponse = self.send_json(request, "batch query").await?;
        if batch_response.results.len() != purls.len() {
            anyhow::bail!(
                "OSV API returned {} results for {} queries",
                batch_response.results.len(),
                purls.len()
            );
        }

        Ok(batch_response
            .results
            .into_iter()
            .map(|result| result.vulns.into_iter().map(|v| v.id).collect())
            .collect())
    }

    /// Fetches detailed advisory information by ID
    async fn fetch_vulnerability_details(&self, vuln_id: &str) -> Result<OsvVulnerability> {
        let url = self.endpoint(&format!("vulns/{}", urlencoding::encode(vuln_id)));
        self.send_json(self.client.get(&url), &format!("advisory {}", vuln_id))
            .await
    }

    /// Fetches every distinct identifier once, concurrently
    async fn fetch_details<'a>(
        &self,
        ids: BTreeSet<&'a str>,
    ) -> HashMap<&'a str, std::result::Result<Advisory, String>> {
        let fetches: Vec<_> = ids
            .into_iter()
            .map(|id| async move {
                let advisory = self
                    .fetch_vulnerability_details(id)
                    .await
                    .map(convert_to_advisory)
                    .map_err(|e| format!("{:#}", e));
                (id, advisory)
            })
            .collect();
        stream::iter(fetches)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await
    }
}

/// Advisories of one purl; fails when any of them could not be fetched
fn resolve(
    ids: &[String],
    details: &HashMap<&str, std::result::Result<Advisory, String>>,
) -> Result<Vec<Advisory>> {
    ids.iter()
        .map(|id| match details.get(id.as_str()) {
            Some(Ok(advisory)) => Ok(advisory.clone()),
            Some(Err(reason)) => Err(anyhow::anyhow!("{}", reason)),
            None => Err(anyhow::anyhow!("advisory {} was not fetched", id)),
        })
        .collect()
}

#[async_trait]
impl AdvisoryRepository for OsvClient {
    async fn fetch_advisories(&self, purl: &str) -> Result<Vec<Advisory>> {
        let query = OsvQuery {
            package: OsvPackage {
                purl: purl.to_string(),
            },
        };
        let request = self.client.post(self.endpoint("query")).json(&query);

        // Single queries return full advisories, no detail round-trip needed
        let result: OsvResult = self.send_json(request, purl).await?;
        Ok(result.vulns.into_iter().map(convert_to_advisory).collect())
    }

    fn max_batch_size(&self) -> usize {
        Self::MAX_BATCH_SIZE
    }

    async fn fetch_advisories_batch(&self, purls: &[String]) -> Vec<Result<Vec<Advisory>>> {
        let ids_per_purl = match self.query_batch(purls).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    purls = purls.len(),
                    "batch query failed; falling back to single queries"
                );
                let fetches: Vec<_> = purls
                    .iter()
                    .map(|purl| self.fetch_advisories(purl))
                    .collect();
                return stream::iter(fetches)
                    .buffered(self.max_concurrent)
                    .collect()
                    .await;
            }
        };

        let unique_ids: BTreeSet<&str> = ids_per_purl
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        tracing::debug!(
            purls = purls.len(),
            advisories = unique_ids.len(),
            "fetching advisory details"
        );
        let details = self.fetch_details(unique_ids).await;

        ids_per_purl
            .iter()
            .map(|ids| resolve(ids, &details))
            .collect()
    }
}

/// Converts an OSV advisory to the domain model
///
/// Severity comes from the CVSS v3 vector (then v4), then from
/// `database_specific.severity`, and is `None` otherwise.
fn convert_to_advisory(osv_vuln: OsvVulnerability) -> Advisory {
    let cvss_score = osv_vuln
        .severity
        .as_ref()
        .and_then(|severities| {
            severities
                .iter()
                .find(|s| s.severity_type == "CVSS_V3")
                .or_else(|| severities.iter().find(|s| s.severity_type == "CVSS_V4"))
        })
        .and_then(|s| parse_cvss_score(&s.score));

    let severity = match cvss_score {
        Some(score) => Severity::from_cvss_score(score),
        None => osv_vuln
            .database_specific
            .as_ref()
            .and_then(|db| db.severity.as_deref())
            .map(parse_severity_string)
            .unwrap_or(Severity::None),
    };

    let fixed_version = osv_vuln.affected.as_ref().and_then(|affected| {
        affected.iter().find_map(|a| {
            a.ranges
                .as_ref()?
                .iter()
                .find_map(|r| r.events.iter().find_map(|e| e.fixed.clone()))
        })
    });

    Advisory {
        id: osv_vuln.id,
        severity,
        cvss_score,
        summary: osv_vuln.summary.or(osv_vuln.details),
        fixed_version,
    }
}

// OSV API request/response structures

#[derive(Debug, Serialize)]
struct OsvBatchQuery {
    queries: Vec<OsvQuery>,
}

#[derive(Debug, Serialize)]
struct OsvQuery {
    package: OsvPackage,
}

#[derive(Debug, Serialize)]
struct OsvPackage {
    purl: String,
}

#[derive(Debug, Deserialize)]
struct OsvBatchResponse {
    #[serde(default)]
    results: Vec<OsvResult>,
}

#[derive(Debug, Deserialize)]
struct OsvResult {
    #[serde(default)]
    vulns: Vec<OsvVulnerability>,
}

#[derive(Debug, Deserialize)]
struct OsvVulnerability {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    severity: Option<Vec<OsvSeverity>>,
    #[serde(default)]
    database_specific: Option<DatabaseSpecific>,
    #[serde(default)]
    affected: Option<Vec<OsvAffected>>,
}

#[derive(Debug, Deserialize)]
struct OsvSeverity {
    #[serde(rename = "type")]
    severity_type: String, // "CVSS_V3"
    score: String, // e.g., "CVSS:3.1/AV:N/AC:L/..."
}

#[derive(Debug, Deserialize)]
struct DatabaseSpecific {
    #[serde(default)]
    severity: Option<String>, // "CRITICAL", "HIGH", "MODERATE", "MEDIUM", "LOW"
}

#[derive(Debug, Deserialize)]
struct OsvAffected {
    #[serde(default)]
    ranges: Option<Vec<OsvRange>>,
}

#[derive(Debug, Deserialize)]
struct OsvRange {
    #[serde(default)]
    events: Vec<OsvEvent>,
}

#[derive(Debug, Deserialize)]
struct OsvEvent {
    #[serde(default)]
    fixed: Option<String>,
}

/// Computes the CVSS v3.x base score from a vector string
///
/// Example: "CVSS:3.1/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H" -> Some(9.8)
fn parse_cvss_score(cvss_vector: &str) -> Option<CvssScore> {
    let metrics: HashMap<&str, &str> = cvss_vector
        .split('/')
        .skip(1) // "CVSS:3.1" or "CVSS:3.0"
        .filter_map(|part| {
            let mut split = part.split(':');
            Some((split.next()?, split.next()?))
        })
        .collect();

    let av = metrics.get("AV")?;
    let ac = metrics.get("AC")?;
    let pr = metrics.get("PR")?;
    let ui = metrics.get("UI")?;
    let s = metrics.get("S")?;
    let c = metrics.get("C")?;
    let i = metrics.get("I")?;
    let a = metrics.get("A")?;

    let av_score = match *av {
        "N" => 0.85,
        "A" => 0.62,
        "L" => 0.55,
        "P" => 0.2,
        _ => return None,
    };

    let ac_score = match *ac {
        "L" => 0.77,
        "H" => 0.44,
        _ => return None,
    };

    let pr_score = match (*pr, *s) {
        ("N", _) => 0.85,
        ("L", "U") => 0.62,
        ("L", "C") => 0.68,
        ("H", "U") => 0.27,
        ("H", "C") => 0.5,
        _ => return None,
    };

    let ui_score = match *ui {
        "N" => 0.85,
        "R" => 0.62,
        _ => return None,
    };

    let impact_value = |metric: &str| match metric {
        "N" => Some(0.0),
        "L" => Some(0.22),
        "H" => Some(0.56),
        _ => None,
    };
    let c_score: f64 = impact_value(*c)?;
    let i_score: f64 = impact_value(*i)?;
    let a_score: f64 = impact_value(*a)?;

    // Impact sub-score
    let iss = 1.0_f64 - ((1.0 - c_score) * (1.0 - i_score) * (1.0 - a_score));

    let impact = if *s == "U" {
        6.42 * iss
    } else {
        7.52 * (iss - 0.029) - 3.25 * (iss - 0.02_f64).powi(15)
    };

    let exploitability = 8.22 * av_score * ac_score * pr_score * ui_score;

    let base_score = if impact <= 0.0 {
        0.0
    } else if *s == "U" {
        f64::min(impact + exploitability, 10.0)
    } else {
        f64::min(1.08 * (impact + exploitability), 10.0)
    };

    // Round up to one decimal place
    let rounded_score = (base_score * 10.0).ceil() / 10.0;

    CvssScore::new(rounded_score as f32).ok()
}

/// Maps an OSV `database_specific.severity` string; unknown values are `None`
fn parse_severity_string(severity: &str) -> Severity {
    match severity.to_uppercase().as_str() {
        "CRITICAL" => Severity::Critical,
        "HIGH" => Severity::High,
        "MODERATE" | "MEDIUM" => Severity::Medium,
        "LOW" => Severity::Low,
        _ => Severity::None,
    }
}
