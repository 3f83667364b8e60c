//! Pricing page discovery
//!
//! Ranks a site's in-domain links by price/promotion keyword relevance,
//! visits a bounded subset through the polite fetcher, and confirms each by
//! scanning its extracted text for price-pattern evidence.

mod content;
mod selector;

pub use content::{extract_page_text, has_price_content, PageText};
pub use selector::{
    extract_candidates, Confidence, PricingCandidate, PricingPage, PricingPageSelector,
    PricingReport,
};
