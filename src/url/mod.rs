//! URL validation and host helpers
//!
//! Seed URLs arrive from a human-curated list and frequently lack a scheme.
//! This module validates them before any network call and provides the host
//! comparisons the classifier and pricing selector rely on.

mod domain;
mod validate;

pub use domain::{extract_domain, same_domain};
pub use validate::normalize_seed;
