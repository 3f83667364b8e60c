//! Polite HTTP fetching and response decoding
//!
//! The fetcher coordinates rate limiting, pacing, selective retries, and the
//! decode fallback chain; callers receive either decoded page text or a
//! tagged reason the page could not be produced.

mod decode;
mod fetcher;

pub use decode::{decode_body, is_plausibly_readable};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, RawPage, UnavailableReason};
