use crate::classify::platforms::PlatformSpec;
use crate::{Result, ScoutError};
use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Identifiers that look like account names but are site navigation
const NOISE_IDENTIFIERS: &[&str] = &[
    "login",
    "signup",
    "explore",
    "search",
    "home",
    "about",
    "contact",
    "privacy",
    "terms",
    "help",
    "settings",
    "profile",
    "notifications",
    "messages",
];

/// One extracted social account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRecord {
    pub username: String,
    pub profile_url: String,
}

/// A platform with its extraction patterns compiled
#[derive(Debug)]
struct CompiledPlatform {
    name: String,
    domains: Vec<String>,
    patterns: Vec<Regex>,
    id_param: Option<String>,
}

/// Classifies outbound links in a page into social platforms
///
/// Candidate links come from three sources, in document order: anchor
/// `href` attributes, `data-url` attributes, and regex matches over the
/// page's visible text (for mentions not wrapped in anchors). Each link is
/// assigned to a platform by host substring, reduced to an account
/// identifier by the platform's ordered patterns, filtered against a noise
/// list, and deduplicated case-insensitively within the platform.
#[derive(Debug)]
pub struct LinkClassifier {
    platforms: Vec<CompiledPlatform>,
}

impl LinkClassifier {
    /// Compiles the enabled platform specs into a classifier
    ///
    /// # Arguments
    /// * `specs` - Platform definitions; disabled entries are skipped
    ///
    /// # Returns
    /// The classifier, or a pattern error naming the offending regex
    pub fn new(specs: &[PlatformSpec]) -> Result<Self> {
        let mut platforms = Vec::new();

        for spec in specs.iter().filter(|s| s.enabled) {
            let mut patterns = Vec::new();
            for pattern in &spec.patterns {
                let compiled = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ScoutError::Pattern {
                        pattern: pattern.clone(),
                        source,
                    })?;
                patterns.push(compiled);
            }

            platforms.push(CompiledPlatform {
                name: spec.name.clone(),
                domains: spec.domains.clone(),
                patterns,
                id_param: spec.id_param.clone(),
            });
        }

        Ok(Self { platforms })
    }

    /// Extracts and classifies social accounts from a decoded page
    ///
    /// # Arguments
    /// * `html` - Decoded page markup
    /// * `base_url` - Page URL, used to absolutize relative links
    ///
    /// # Returns
    /// Accounts keyed by platform name; platforms with no hits are omitted.
    /// Within a platform, records appear in document order with the first
    /// occurrence of each (case-insensitive) identifier winning.
    pub fn classify(&self, html: &str, base_url: &str) -> BTreeMap<String, Vec<AccountRecord>> {
        let document = Html::parse_document(html);
        let mut links = self.harvest_links(&document, base_url);
        links.extend(self.synthesize_text_links(&document));

        let mut results: BTreeMap<String, Vec<AccountRecord>> = BTreeMap::new();
        let mut seen: BTreeMap<&str, HashSet<String>> = BTreeMap::new();

        for link in &links {
            let Some(platform) = self.identify_platform(link) else {
                continue;
            };
            let Some(record) = Self::parse_link(link, platform) else {
                continue;
            };

            let seen_here = seen.entry(platform.name.as_str()).or_default();
            if seen_here.insert(record.username.to_lowercase()) {
                results
                    .entry(platform.name.clone())
                    .or_default()
                    .push(record);
            }
        }

        let total: usize = results.values().map(Vec::len).sum();
        tracing::debug!(
            "Classified {} links into {} accounts across {} platforms",
            links.len(),
            total,
            results.len()
        );

        results
    }

    /// Collects candidate links from anchors and data-url attributes, in
    /// document order, each absolutized against the base URL
    fn harvest_links(&self, document: &Html, base_url: &str) -> Vec<String> {
        let base = Url::parse(base_url).ok();
        let mut links = Vec::new();
        let mut seen = HashSet::new();

        let anchor = Selector::parse("a[href]").unwrap();
        let data_url = Selector::parse("[data-url]").unwrap();

        let mut push = |raw: &str| {
            let raw = raw.trim();
            if raw.is_empty() {
                return;
            }
            let absolute = match &base {
                Some(base) => base.join(raw).ok(),
                None => Url::parse(raw).ok(),
            };
            if let Some(url) = absolute {
                let url = url.to_string();
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
        };

        for element in document.select(&anchor) {
            if let Some(href) = element.value().attr("href") {
                push(href);
            }
        }
        for element in document.select(&data_url) {
            if let Some(raw) = element.value().attr("data-url") {
                push(raw);
            }
        }

        links
    }

    /// Synthesizes links from pattern matches over the page's visible text,
    /// catching profile mentions that are not wrapped in anchors
    fn synthesize_text_links(&self, document: &Html) -> Vec<String> {
        let text: String = document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ");

        let mut links = Vec::new();
        for platform in &self.platforms {
            for pattern in &platform.patterns {
                for found in pattern.find_iter(&text) {
                    let matched = found.as_str();
                    if matched.contains("://") {
                        links.push(matched.to_string());
                    } else {
                        links.push(format!("https://{}", matched));
                    }
                }
            }
        }

        links
    }

    /// Assigns a link to a platform by host substring, if any
    fn identify_platform(&self, link: &str) -> Option<&CompiledPlatform> {
        let parsed = Url::parse(link).ok()?;
        let host = parsed.host_str()?.to_lowercase();

        self.platforms
            .iter()
            .find(|p| p.domains.iter().any(|d| host.contains(d.as_str())))
    }

    /// Extracts the account identifier from a platform link
    fn parse_link(link: &str, platform: &CompiledPlatform) -> Option<AccountRecord> {
        for pattern in &platform.patterns {
            let Some(captures) = pattern.captures(link) else {
                continue;
            };
            let Some(identifier) = captures.get(1) else {
                continue;
            };

            let username = clean_identifier(identifier.as_str());
            if !is_valid_identifier(&username) {
                return None;
            }

            return Some(AccountRecord {
                username,
                profile_url: normalize_profile_url(link, platform.id_param.as_deref()),
            });
        }

        None
    }
}

/// Strips a trailing slash and truncates at the first `?` or `#`
fn clean_identifier(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    let trimmed = trimmed.split('?').next().unwrap_or(trimmed);
    let trimmed = trimmed.split('#').next().unwrap_or(trimmed);
    trimmed.to_string()
}

fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty() && !NOISE_IDENTIFIERS.contains(&identifier.to_lowercase().as_str())
}

/// Drops query parameters and fragments from a profile URL
///
/// When the platform declares an identity-bearing query parameter and the
/// link carries it, the query survives up to the first `&` instead.
fn normalize_profile_url(link: &str, id_param: Option<&str>) -> String {
    if let Some(param) = id_param {
        let carries_param = link.contains(&format!("?{}=", param))
            || link.contains(&format!("&{}=", param));
        if carries_param {
            let kept = link.split('&').next().unwrap_or(link);
            return kept.split('#').next().unwrap_or(kept).to_string();
        }
    }

    let kept = link.split('?').next().unwrap_or(link);
    kept.split('#').next().unwrap_or(kept).to_string()
}
