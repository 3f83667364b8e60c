//! Built-in social platform definitions
//!
//! Each platform is described by the host substrings that identify it and
//! the ordered extraction patterns that pull an account identifier out of a
//! profile URL. The same table shape is deserializable from `[[platform]]`
//! entries in the config file, so deployments can add or disable platforms
//! without a code change.

use serde::Deserialize;

/// One recognizable social platform
///
/// `domains` are matched as substrings of a candidate URL's host. `patterns`
/// are tried in order; the first whose capture group 1 matches supplies the
/// account identifier. `id_param` names a query parameter that is part of
/// the account identity (e.g. Facebook's `profile.php?id=...`) and must
/// survive profile URL normalization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformSpec {
    pub name: String,
    pub domains: Vec<String>,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub id_param: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn spec(name: &str, domains: &[&str], patterns: &[&str]) -> PlatformSpec {
    PlatformSpec {
        name: name.to_string(),
        domains: domains.iter().map(|d| d.to_string()).collect(),
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
        id_param: None,
        enabled: true,
    }
}

/// The stock platform table used when the config file does not override it
pub fn default_platforms() -> Vec<PlatformSpec> {
    vec![
        spec(
            "instagram",
            &["instagram.com", "www.instagram.com", "instagr.am"],
            &[
                r"(?:https?://)?(?:www\.)?instagram\.com/([a-zA-Z0-9._]+)",
                r"(?:https?://)?(?:www\.)?instagr\.am/([a-zA-Z0-9._]+)",
            ],
        ),
        PlatformSpec {
            id_param: Some("id".to_string()),
            ..spec(
                "facebook",
                &[
                    "facebook.com",
                    "www.facebook.com",
                    "fb.com",
                    "m.facebook.com",
                ],
                &[
                    // The numeric-profile form must come first so that
                    // profile.php is not swallowed as a page name.
                    r"(?:https?://)?(?:www\.|m\.)?facebook\.com/profile\.php\?id=(\d+)",
                    r"(?:https?://)?(?:www\.|m\.)?facebook\.com/([a-zA-Z0-9.]+)",
                    r"(?:https?://)?(?:www\.)?fb\.com/([a-zA-Z0-9.]+)",
                ],
            )
        },
        spec(
            "twitter",
            &["twitter.com", "www.twitter.com", "x.com", "www.x.com"],
            &[r"(?:https?://)?(?:www\.)?(?:twitter\.com|x\.com)/([a-zA-Z0-9_]+)"],
        ),
        spec(
            "linkedin",
            &["linkedin.com", "www.linkedin.com"],
            &[
                r"(?:https?://)?(?:www\.)?linkedin\.com/in/([a-zA-Z0-9-]+)",
                r"(?:https?://)?(?:www\.)?linkedin\.com/company/([a-zA-Z0-9-]+)",
            ],
        ),
        spec(
            "youtube",
            &["youtube.com", "www.youtube.com", "youtu.be"],
            &[
                r"(?:https?://)?(?:www\.)?youtube\.com/(?:c|channel|user|@)/?([a-zA-Z0-9_-]+)",
                r"(?:https?://)?(?:www\.)?youtu\.be/([a-zA-Z0-9_-]+)",
            ],
        ),
        spec(
            "tiktok",
            &["tiktok.com", "www.tiktok.com"],
            &[r"(?:https?://)?(?:www\.)?tiktok\.com/@([a-zA-Z0-9_.]+)"],
        ),
        spec(
            "pinterest",
            &["pinterest.com", "www.pinterest.com"],
            &[r"(?:https?://)?(?:www\.)?pinterest\.com/([a-zA-Z0-9_]+)"],
        ),
        spec(
            "snapchat",
            &["snapchat.com", "www.snapchat.com"],
            &[r"(?:https?://)?(?:www\.)?snapchat\.com/add/([a-zA-Z0-9_.]+)"],
        ),
        spec(
            "whatsapp",
            &["wa.me", "whatsapp.com", "www.whatsapp.com"],
            &[
                r"(?:https?://)?wa\.me/(\d+)",
                r"(?:https?://)?(?:www\.)?whatsapp\.com/send\?phone=(\d+)",
            ],
        ),
    ]
}
