use crate::config::PricingConfig;
use crate::crawler::{FetchOutcome, Fetcher};
use crate::pricing::content::{extract_page_text, has_price_content};
use crate::url::same_domain;
use crate::{Result, ScoutError};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Keywords that make a link a pricing/promotion candidate
const PROMO_KEYWORDS: &[&str] = &[
    "pricing",
    "prices",
    "price",
    "cost",
    "costs",
    "fee",
    "fees",
    "rate",
    "rates",
    "service",
    "services",
    "treatment",
    "treatments",
    "menu",
    "promo",
    "promotion",
    "promotions",
    "special",
    "specials",
    "offer",
    "offers",
    "deal",
    "deals",
    "discount",
    "discounts",
    "sale",
    "sales",
    "coupon",
    "coupons",
    "savings",
    "package",
    "packages",
    "bundle",
    "bundles",
    "membership",
    "memberships",
    "shop",
    "store",
    "buy",
    "booking",
    "book-now",
    "appointment",
];

/// URL fragments that disqualify a link outright
const EXCLUDE_KEYWORDS: &[&str] = &[
    "login",
    "signin",
    "signup",
    "register",
    "cart",
    "checkout",
    "account",
    "profile",
    "logout",
    "search",
    "contact-form",
    "privacy",
    "terms",
    "policy",
    "cookie",
    "legal",
    "careers",
    "job",
    "jobs",
    "blog",
    "news",
    "about-us",
    "team",
    "staff",
    "gallery",
    "testimonial",
    "review",
    "faq",
    "help",
    "support",
];

/// Score at or above which a confirmed candidate counts as high confidence
const HIGH_CONFIDENCE_SCORE: u32 = 3;

/// How strongly a confirmed pricing page was indicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// An in-domain link that looks price-related, before confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingCandidate {
    pub url: String,
    pub link_text: String,
    pub score: u32,
    pub matched_keywords: Vec<String>,
}

/// A confirmed pricing page
#[derive(Debug, Clone, Serialize)]
pub struct PricingPage {
    pub url: String,
    pub title: String,
    pub confidence: Confidence,
    pub matched_keywords: Vec<String>,
    pub reason: String,
}

/// Outcome of pricing discovery for one site
#[derive(Debug, Clone, Default, Serialize)]
pub struct PricingReport {
    pub pages: Vec<PricingPage>,
    pub candidates_found: usize,
    pub pages_visited: usize,
}

/// Finds a site's pricing pages
///
/// Ranks the root page's in-domain links by keyword relevance, visits a
/// bounded number of the best candidates, and keeps only those whose
/// fetched content shows price-pattern evidence. When nothing confirms, the
/// root page itself is tested and reported at low confidence.
pub struct PricingPageSelector {
    fetcher: Arc<Fetcher>,
    max_pages_per_site: usize,
}

impl PricingPageSelector {
    pub fn new(fetcher: Arc<Fetcher>, config: &PricingConfig) -> Self {
        Self {
            fetcher,
            max_pages_per_site: config.max_pages_per_site,
        }
    }

    /// Discovers confirmed pricing pages for a site
    ///
    /// # Arguments
    /// * `base_url` - Site root; candidates are limited to its domain
    ///
    /// # Returns
    /// A report of confirmed pages, or an error when the root page itself
    /// cannot be fetched. Candidate pages that fail to fetch are skipped,
    /// not fatal.
    pub async fn select(&self, base_url: &str) -> Result<PricingReport> {
        let root = match self.fetcher.fetch(base_url, None).await {
            FetchOutcome::Success(page) => page,
            FetchOutcome::Unavailable { reason, detail } => {
                tracing::warn!("Root page unavailable ({}): {}", reason, detail);
                return Err(ScoutError::SiteUnreachable {
                    url: base_url.to_string(),
                });
            }
        };

        let root_text = extract_page_text(&root.text);
        let candidates = extract_candidates(&root.text, &root.url);
        tracing::info!(
            "Found {} pricing candidates on {}",
            candidates.len(),
            root.url
        );

        let mut report = PricingReport {
            candidates_found: candidates.len(),
            ..PricingReport::default()
        };

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(clean_candidate_url(&root.url));

        for candidate in &candidates {
            if report.pages_visited >= self.max_pages_per_site {
                break;
            }
            if !visited.insert(candidate.url.clone()) {
                continue;
            }
            report.pages_visited += 1;

            tracing::debug!("Checking pricing candidate: {}", candidate.url);
            let page = match self.fetcher.fetch(&candidate.url, None).await {
                FetchOutcome::Success(page) => page,
                FetchOutcome::Unavailable { reason, detail } => {
                    tracing::debug!(
                        "Candidate {} unavailable ({}): {}",
                        candidate.url,
                        reason,
                        detail
                    );
                    continue;
                }
            };

            let page_text = extract_page_text(&page.text);
            if has_price_content(&page_text.content) {
                let confidence = if candidate.score >= HIGH_CONFIDENCE_SCORE {
                    Confidence::High
                } else {
                    Confidence::Medium
                };
                tracing::info!("Confirmed pricing page: {}", candidate.url);
                report.pages.push(PricingPage {
                    url: candidate.url.clone(),
                    title: page_text.title,
                    confidence,
                    matched_keywords: candidate.matched_keywords.clone(),
                    reason: "link keywords and page content both indicate pricing".to_string(),
                });
            }
        }

        // Fallback: nothing confirmed, but the root page itself may carry
        // the price list.
        if report.pages.is_empty() && has_price_content(&root_text.content) {
            report.pages.push(PricingPage {
                url: root.url.clone(),
                title: root_text.title,
                confidence: Confidence::Low,
                matched_keywords: Vec::new(),
                reason: "root page content contains price information".to_string(),
            });
        }

        Ok(report)
    }
}

/// Extracts and ranks in-domain pricing candidates from a page
///
/// Scoring: each keyword found in the URL adds 2, in the anchor text adds
/// 1. Links carrying an exclusion keyword in their URL are dropped.
/// Candidates are sorted descending by score; ties keep document order.
pub fn extract_candidates(html: &str, base_url: &str) -> Vec<PricingCandidate> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let anchor = Selector::parse("a[href]").unwrap();

    let mut candidates = Vec::new();
    let mut seen = HashSet::new();

    for element in document.select(&anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(mut target) = base.join(href.trim()) else {
            continue;
        };
        target.set_fragment(None);
        target.set_query(None);

        if !same_domain(&target, &base) {
            continue;
        }

        let url = target.to_string();
        if seen.contains(&url) {
            continue;
        }

        let url_lower = url.to_lowercase();
        if EXCLUDE_KEYWORDS.iter().any(|kw| url_lower.contains(kw)) {
            continue;
        }

        let link_text = element.text().collect::<String>().trim().to_string();
        let text_lower = link_text.to_lowercase();

        let mut score = 0;
        let mut matched_keywords = Vec::new();
        for keyword in PROMO_KEYWORDS {
            if url_lower.contains(keyword) {
                score += 2;
                matched_keywords.push(keyword.to_string());
            }
            if text_lower.contains(keyword) {
                score += 1;
                if !matched_keywords.iter().any(|k| k == keyword) {
                    matched_keywords.push(keyword.to_string());
                }
            }
        }

        if score > 0 {
            seen.insert(url.clone());
            candidates.push(PricingCandidate {
                url,
                link_text,
                score,
                matched_keywords,
            });
        }
    }

    // Stable sort keeps document order among equal scores
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

fn clean_candidate_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
