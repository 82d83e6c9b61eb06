use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::CoreError, referrer::DomainBlacklist};

/// A single accepted page view, normalized and ready for storage.
///
/// Optional text fields are either `Some(non-empty)` or `None`. `None` means
/// the value could not be determined; it is serialized as `null`, never
/// skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// NULL unless the embedder splits data between tenants.
    pub tenant_id: Option<i64>,
    pub fingerprint: String,
    /// First time this fingerprint was seen, when session tracking is enabled.
    pub session: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub url: Option<String>,
    pub language: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub browser: Option<String>,
    pub browser_version: Option<String>,
    pub desktop: bool,
    pub mobile: bool,
    pub time: DateTime<Utc>,
}

impl Hit {
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Per-call settings that shape the stored hit. Never modified by the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HitOptions {
    pub tenant_id: Option<i64>,

    /// Replaces the request path. The stored URL is re-derived with this path.
    pub path: Option<String>,

    /// Referrers from these hostnames are not stored, e.g. the site's own domain.
    pub referrer_domain_blacklist: Vec<String>,

    /// Match the blacklist against the last two labels of the referrer host, so
    /// that `example.com` also covers `blog.example.com`. Without it subdomains
    /// must be listed explicitly.
    pub referrer_domain_blacklist_includes_subdomains: bool,

    /// When this fingerprint was first seen. `None` disables session tracking.
    pub session: Option<DateTime<Utc>>,
}

impl HitOptions {
    /// The path override, if one is set and non-empty.
    pub fn path_override(&self) -> Option<&str> {
        self.path.as_deref().filter(|p| !p.is_empty())
    }

    pub fn domain_blacklist(&self) -> DomainBlacklist {
        DomainBlacklist::new(
            &self.referrer_domain_blacklist,
            self.referrer_domain_blacklist_includes_subdomains,
        )
    }
}
