use std::{borrow::Cow, sync::Arc};

use http::HeaderMap;

use crate::request::header_text;

/// `User-Agent` substrings (lower-case) of crawlers, monitors and scripted
/// clients that never represent a human page view.
const BUILTIN_BOT_TOKENS: &[&str] = &[
    "bot",
    "spider",
    "crawler",
    "crawling",
    "googlebot",
    "bingbot",
    "duckduckbot",
    "yandexbot",
    "baiduspider",
    "ahrefsbot",
    "semrushbot",
    "mj12bot",
    "facebookexternalhit",
    "slurp",
    "archive.org",
    "headlesschrome",
    "phantomjs",
    "lighthouse",
    "pingdom",
    "uptimerobot",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "curl/",
    "wget/",
    "go-http-client",
    "okhttp",
    "java/",
    "libwww-perl",
    "urllib",
    "httpclient",
    "node-fetch",
    "axios/",
    "postmanruntime",
    "insomnia",
];

/// Immutable list of lower-case bot tokens matched as `User-Agent` substrings.
///
/// Cloning is cheap, the list is shared.
#[derive(Debug, Clone)]
pub struct BotTokens {
    tokens: Arc<[String]>,
}

impl BotTokens {
    /// Matches nothing.
    pub fn empty() -> Self {
        Self::new(std::iter::empty::<&str>())
    }

    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref().trim().to_lowercase();
            if !token.is_empty() && !list.contains(&token) {
                list.push(token);
            }
        }
        Self { tokens: list.into() }
    }

    /// The built-in list extended by `extra`.
    pub fn builtin_with<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let builtin = BUILTIN_BOT_TOKENS.iter().map(|t| t.to_string());
        let extra = extra.into_iter().map(|t| t.as_ref().to_string());
        Self::new(builtin.chain(extra))
    }

    /// First token contained in `user_agent`, which must already be lower-case.
    fn find_in(&self, user_agent: &str) -> Option<&str> {
        self.tokens
            .iter()
            .map(String::as_str)
            .find(|token| user_agent.contains(token))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for BotTokens {
    fn default() -> Self {
        Self::new(BUILTIN_BOT_TOKENS)
    }
}

/// Gate evaluated before a hit is built. Rejects requests that do not look
/// like a human page view.
#[derive(Debug, Clone, Default)]
pub struct BotFilter {
    tokens: BotTokens,
}

impl BotFilter {
    pub fn new(tokens: BotTokens) -> Self {
        Self { tokens }
    }

    /// `true` if no hit should be recorded for a request with these headers.
    ///
    /// Rules, first match wins:
    /// 1. empty `User-Agent`;
    /// 2. prefetch or preview signalled by `X-Moz`, `X-Purpose` or `Purpose`;
    /// 3. `User-Agent` containing a bot token (case-insensitive).
    pub fn should_ignore(&self, headers: &HeaderMap) -> bool {
        let header = |name: &str| header_str(headers, name);

        let user_agent = header("user-agent").trim().to_lowercase();
        if user_agent.is_empty() {
            tracing::trace!(reason = "empty_user_agent", "Request ignored");
            return true;
        }

        let x_purpose = header("x-purpose");
        let purpose = header("purpose");
        if header("x-moz") == "prefetch"
            || matches!(x_purpose.as_ref(), "prefetch" | "preview")
            || matches!(purpose.as_ref(), "prefetch" | "preview")
        {
            tracing::trace!(reason = "prefetch", "Request ignored");
            return true;
        }

        if let Some(token) = self.tokens.find_in(&user_agent) {
            tracing::trace!(reason = "bot_token", token, "Request ignored");
            return true;
        }

        false
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Cow<'a, str> {
    header_text(headers, name).unwrap_or_default()
}
