//! Sequential crawl orchestration
//!
//! Drives the full pipeline for a list of seed sites, one site at a time:
//! fetch the root page, classify its outbound links into social accounts,
//! optionally discover pricing pages, and aggregate everything into per-site
//! results. Failures are contained per site so one dead seed never aborts
//! the run, and a cancellation flag is honored between seeds.

use crate::classify::{AccountRecord, LinkClassifier};
use crate::config::Config;
use crate::crawler::{FetchOutcome, Fetcher};
use crate::limiter::RateLimiter;
use crate::pricing::{PricingPageSelector, PricingReport};
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Timestamp format used in result records
const FOUND_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Terminal state of one site's crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    /// Root page fetched and analyzed
    Success,
    /// Root page could not be fetched
    Failed,
    /// An analysis step failed after the fetch
    Error,
}

/// Aggregated findings for one seed site
#[derive(Debug, Clone, Serialize)]
pub struct SiteResult {
    pub url: String,
    pub status: SiteStatus,
    pub message: String,
    pub found_at: String,
    pub accounts: BTreeMap<String, Vec<AccountRecord>>,
    pub pricing: PricingReport,
}

impl SiteResult {
    fn new(url: &str, status: SiteStatus, message: String) -> Self {
        Self {
            url: url.to_string(),
            status,
            message,
            found_at: chrono::Local::now().format(FOUND_AT_FORMAT).to_string(),
            accounts: BTreeMap::new(),
            pricing: PricingReport::default(),
        }
    }

    /// Total accounts found across all platforms
    pub fn account_count(&self) -> usize {
        self.accounts.values().map(Vec::len).sum()
    }
}

/// Runs the crawl pipeline over seed sites, strictly sequentially
pub struct Orchestrator {
    fetcher: Arc<Fetcher>,
    classifier: LinkClassifier,
    pricing: Option<PricingPageSelector>,
    config: Config,
    cancel: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Wires up the pipeline from a validated configuration
    ///
    /// # Arguments
    /// * `config` - Validated configuration
    /// * `find_pricing` - Whether to run pricing discovery per site
    pub fn new(config: Config, find_pricing: bool) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit)?);
        let fetcher = Arc::new(Fetcher::new(&config.http, limiter)?);
        let classifier = LinkClassifier::new(&config.platforms)?;
        let pricing = find_pricing
            .then(|| PricingPageSelector::new(Arc::clone(&fetcher), &config.pricing));

        Ok(Self {
            fetcher,
            classifier,
            pricing,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that stops the run between seeds when set
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Processes every seed in order, pausing between distinct sites
    ///
    /// # Returns
    /// One result per processed seed. When cancellation is requested the
    /// vector holds only the seeds finished before the flag was seen.
    pub async fn run(&self, seeds: &[String]) -> Vec<SiteResult> {
        let mut results = Vec::with_capacity(seeds.len());

        for (index, seed) in seeds.iter().enumerate() {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::warn!(
                    "Cancellation requested, stopping after {} of {} sites",
                    results.len(),
                    seeds.len()
                );
                break;
            }

            tracing::info!("Processing site {}/{}: {}", index + 1, seeds.len(), seed);
            let result = self.process_site(seed).await;
            tracing::info!(
                "Site {}/{} done: {:?}, {} accounts, {} pricing pages",
                index + 1,
                seeds.len(),
                result.status,
                result.account_count(),
                result.pricing.pages.len()
            );
            results.push(result);

            let is_last = index + 1 == seeds.len();
            if !is_last && !self.cancel.load(Ordering::SeqCst) {
                let gap = self.config.http.domain_gap();
                tracing::debug!("Waiting {:?} before next site", gap);
                tokio::time::sleep(gap).await;
            }
        }

        results
    }

    /// Runs the full pipeline for one seed; never propagates an error
    async fn process_site(&self, seed: &str) -> SiteResult {
        let page = match self.fetcher.fetch(seed, None).await {
            FetchOutcome::Success(page) => page,
            FetchOutcome::Unavailable { reason, detail } => {
                tracing::warn!("Site {} unavailable ({}): {}", seed, reason, detail);
                return SiteResult::new(
                    seed,
                    SiteStatus::Failed,
                    format!("{}: {}", reason, detail),
                );
            }
        };

        let accounts = self.classifier.classify(&page.text, &page.url);

        let mut result = SiteResult::new(seed, SiteStatus::Success, String::new());
        result.accounts = accounts;

        if let Some(selector) = &self.pricing {
            match selector.select(&page.url).await {
                Ok(report) => result.pricing = report,
                Err(err) => {
                    tracing::error!("Pricing discovery failed for {}: {}", page.url, err);
                    result.status = SiteStatus::Error;
                    result.message = format!("pricing discovery failed: {}", err);
                    return result;
                }
            }
        }

        result.message = format!(
            "{} accounts, {} pricing pages",
            result.account_count(),
            result.pricing.pages.len()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Config::default(), false).unwrap()
    }

    #[tokio::test]
    async fn test_empty_seed_list_yields_no_results() {
        let results = orchestrator().run(&[]).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_pre_set_cancellation_stops_immediately() {
        let orchestrator = orchestrator();
        orchestrator.cancel_handle().store(true, Ordering::SeqCst);

        let seeds = vec!["https://example.com".to_string()];
        let results = orchestrator.run(&seeds).await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_site_result_timestamp_format() {
        let result = SiteResult::new("https://example.com", SiteStatus::Success, String::new());
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(result.found_at.len(), 19);
        assert_eq!(&result.found_at[4..5], "-");
        assert_eq!(&result.found_at[10..11], " ");
        assert_eq!(&result.found_at[13..14], ":");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SiteStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_account_count_sums_platforms() {
        let mut result =
            SiteResult::new("https://example.com", SiteStatus::Success, String::new());
        result.accounts.insert(
            "instagram".to_string(),
            vec![AccountRecord {
                username: "a".to_string(),
                profile_url: "https://instagram.com/a".to_string(),
            }],
        );
        result.accounts.insert(
            "facebook".to_string(),
            vec![
                AccountRecord {
                    username: "b".to_string(),
                    profile_url: "https://facebook.com/b".to_string(),
                },
                AccountRecord {
                    username: "c".to_string(),
                    profile_url: "https://facebook.com/c".to_string(),
                },
            ],
        );
        assert_eq!(result.account_count(), 3);
    }
}
