//! Referrer extraction and sanitization.

use std::collections::HashSet;

use http::header;
use url::{Host, Url};

use crate::request::HitRequest;

/// Query parameters checked, in order, when the `Referer` header is absent.
pub const REFERRER_QUERY_PARAMS: [&str; 3] = ["ref", "referer", "referrer"];

/// Hostnames whose referrers are dropped, e.g. the site's own domain.
///
/// Matching is exact against the (optionally folded) hostname. Entries are
/// lower-cased on construction because parsed hostnames always are.
#[derive(Debug, Clone, Default)]
pub struct DomainBlacklist {
    domains: HashSet<String>,
    include_subdomains: bool,
}

impl DomainBlacklist {
    pub fn new<I, S>(domains: I, include_subdomains: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            include_subdomains,
        }
    }

    /// `true` if referrers from `hostname` must be dropped.
    ///
    /// With subdomain folding enabled `blog.example.com` is checked as
    /// `example.com`. Folding keeps the last two labels, which is wrong for
    /// multi-part public suffixes: `shop.example.co.uk` folds to `co.uk`.
    pub fn contains(&self, hostname: &str) -> bool {
        let hostname = if self.include_subdomains {
            fold_subdomain(hostname)
        } else {
            hostname
        };
        self.domains.contains(hostname)
    }
}

/// Reduce a hostname to its last two dot-separated labels.
pub fn fold_subdomain(hostname: &str) -> &str {
    match hostname.rmatch_indices('.').nth(1) {
        Some((idx, _)) => &hostname[idx + 1..],
        None => hostname,
    }
}

/// Referrer candidate: the `Referer` header, else the first non-empty query
/// parameter from [`REFERRER_QUERY_PARAMS`].
pub fn raw_referrer(request: &HitRequest<'_>) -> Option<String> {
    if let Some(referrer) = request.header(header::REFERER).filter(|r| !r.is_empty()) {
        return Some(referrer.into_owned());
    }

    REFERRER_QUERY_PARAMS
        .iter()
        .filter_map(|param| request.query_param(param))
        .find(|value| !value.is_empty())
}

/// Sanitized referrer for `request`, or `None` if there is none worth storing.
///
/// The candidate must parse as an absolute URL with a hostname. Blacklisted
/// hosts are dropped; otherwise the URL is returned without query string and
/// fragment.
pub fn referrer_from_request(
    request: &HitRequest<'_>,
    blacklist: &DomainBlacklist,
) -> Option<String> {
    let candidate = raw_referrer(request)?;
    sanitize(&candidate, blacklist)
}

pub fn sanitize(referrer: &str, blacklist: &DomainBlacklist) -> Option<String> {
    let mut url = match Url::parse(referrer) {
        Ok(url) => url,
        Err(e) => {
            tracing::trace!(error = %e, "Unparseable referrer dropped");
            return None;
        }
    };

    let blocked = match url.host()? {
        Host::Domain(domain) => blacklist.contains(domain),
        // Addresses are matched as written, folding them would be meaningless.
        Host::Ipv4(addr) => blacklist.domains.contains(&addr.to_string()),
        Host::Ipv6(addr) => blacklist.domains.contains(&addr.to_string()),
    };
    if blocked {
        tracing::trace!("Blacklisted referrer dropped");
        return None;
    }

    url.set_query(None);
    url.set_fragment(None);
    Some(url.into())
}
