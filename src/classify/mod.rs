//! Link classification
//!
//! Maps decoded HTML into typed, deduplicated social account records. The
//! platform table drives everything: adding a platform is a table entry (in
//! code or in the config file), never a classifier change.

mod classifier;
mod platforms;

pub use classifier::{AccountRecord, LinkClassifier};
pub use platforms::{default_platforms, PlatformSpec};
