use chrono::Utc;
use http::header;

use crate::{
    event::{Hit, HitOptions},
    normalize::{self, bounded},
    referrer::referrer_from_request,
    request::HitRequest,
    user_agent::{ClientClassifier, WootheeClassifier},
    visitor::fingerprint,
};

/// Build the hit for an accepted request.
///
/// `salt` must stay the same across calls to recognise returning visitors.
/// Run [`crate::bot::BotFilter::should_ignore`] first, this function records
/// whatever it is given.
pub fn build_hit(
    request: &HitRequest<'_>,
    salt: &str,
    options: &HitOptions,
    classifier: &dyn ClientClassifier,
) -> Hit {
    // Captured first to stay as close as possible to the time of receipt.
    let time = Utc::now();

    let (path, url) = match options.path_override() {
        Some(path) => {
            let url = request.url_with_path(path).unwrap_or_else(|| {
                tracing::trace!(path, "Path override not applicable, keeping request URL");
                request.url()
            });
            (path, url)
        }
        None => (request.path(), request.url()),
    };

    let user_agent = request.user_agent();
    let client = classifier.classify(&user_agent);
    let language = request
        .header(header::ACCEPT_LANGUAGE)
        .and_then(|value| normalize::language(&value))
        .and_then(|lang| bounded(&lang, normalize::MAX_LANGUAGE_BYTES));
    let referrer = referrer_from_request(request, &options.domain_blacklist())
        .and_then(|r| bounded(&r, normalize::MAX_REFERRER_BYTES));

    Hit {
        tenant_id: options.tenant_id,
        fingerprint: fingerprint(request, salt),
        session: options.session,
        path: bounded(path, normalize::MAX_PATH_BYTES),
        url: bounded(&url, normalize::MAX_URL_BYTES),
        language,
        user_agent: bounded(&user_agent, normalize::MAX_USER_AGENT_BYTES),
        referrer,
        os: bounded(&client.os, normalize::MAX_CLIENT_FIELD_BYTES),
        os_version: bounded(&client.os_version, normalize::MAX_CLIENT_FIELD_BYTES),
        browser: bounded(&client.browser, normalize::MAX_CLIENT_FIELD_BYTES),
        browser_version: bounded(&client.browser_version, normalize::MAX_CLIENT_FIELD_BYTES),
        desktop: client.desktop,
        mobile: client.mobile,
        time,
    }
}

impl Hit {
    /// [`build_hit`] with the `woothee` classifier.
    pub fn from_request(request: &HitRequest<'_>, salt: &str, options: &HitOptions) -> Self {
        build_hit(request, salt, options, &WootheeClassifier)
    }
}
