//! Result serialization and run summaries

use crate::pipeline::{SiteResult, SiteStatus};
use crate::Result;
use std::path::Path;

/// Rolled-up counts for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errored: usize,
    pub accounts: usize,
    pub pricing_pages: usize,
}

/// Tallies per-site results into a run summary
pub fn summarize(results: &[SiteResult]) -> RunSummary {
    let mut summary = RunSummary {
        total: results.len(),
        ..RunSummary::default()
    };

    for result in results {
        match result.status {
            SiteStatus::Success => summary.succeeded += 1,
            SiteStatus::Failed => summary.failed += 1,
            SiteStatus::Error => summary.errored += 1,
        }
        summary.accounts += result.account_count();
        summary.pricing_pages += result.pricing.pages.len();
    }

    summary
}

/// Writes results as pretty-printed JSON
///
/// # Arguments
/// * `results` - Per-site results, in processing order
/// * `path` - Output file; overwritten if present
pub fn write_results(results: &[SiteResult], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    tracing::info!("Wrote {} results to {}", results.len(), path.display());
    Ok(())
}

/// Prints the end-of-run tally
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("Run complete");
    println!("  Sites processed:  {}", summary.total);
    println!("  Succeeded:        {}", summary.succeeded);
    println!("  Failed:           {}", summary.failed);
    println!("  Errored:          {}", summary.errored);
    println!("  Accounts found:   {}", summary.accounts);
    println!("  Pricing pages:    {}", summary.pricing_pages);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::AccountRecord;
    use crate::pricing::{Confidence, PricingPage};
    use std::collections::BTreeMap;

    fn result(url: &str, status: SiteStatus) -> SiteResult {
        SiteResult {
            url: url.to_string(),
            status,
            message: String::new(),
            found_at: "2026-08-24 12:00:00".to_string(),
            accounts: BTreeMap::new(),
            pricing: Default::default(),
        }
    }

    #[test]
    fn test_summarize_counts_statuses() {
        let results = vec![
            result("https://a.example", SiteStatus::Success),
            result("https://b.example", SiteStatus::Failed),
            result("https://c.example", SiteStatus::Success),
            result("https://d.example", SiteStatus::Error),
        ];

        let summary = summarize(&results);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errored, 1);
    }

    #[test]
    fn test_summarize_counts_findings() {
        let mut with_findings = result("https://a.example", SiteStatus::Success);
        with_findings.accounts.insert(
            "instagram".to_string(),
            vec![AccountRecord {
                username: "acme".to_string(),
                profile_url: "https://instagram.com/acme".to_string(),
            }],
        );
        with_findings.pricing.pages.push(PricingPage {
            url: "https://a.example/pricing".to_string(),
            title: "Pricing".to_string(),
            confidence: Confidence::High,
            matched_keywords: vec!["pricing".to_string()],
            reason: "confirmed".to_string(),
        });

        let summary = summarize(&[with_findings]);
        assert_eq!(summary.accounts, 1);
        assert_eq!(summary.pricing_pages, 1);
    }

    #[test]
    fn test_write_results_produces_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        let results = vec![result("https://a.example", SiteStatus::Success)];
        write_results(&results, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0]["url"], "https://a.example");
        assert_eq!(parsed[0]["status"], "success");
    }

    #[test]
    fn test_write_results_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");

        write_results(&[], &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim(), "[]");
    }
}
