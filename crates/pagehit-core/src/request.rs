use std::{borrow::Cow, net::IpAddr};

use http::{header, uri::PathAndQuery, HeaderMap, Uri};

/// Headers consulted for the client address, in order of preference.
/// Each value must parse as an IP address to be used.
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "true-client-ip",
    "x-forwarded-for",
    "x-real-ip",
];

/// Borrowed, method-agnostic view over the parts of an inbound request the
/// pipeline reads.
///
/// `uri` is the request target as received (usually origin-form, e.g.
/// `/blog?page=2`). `remote_addr` is the peer socket address, used when no
/// proxy header names the client.
#[derive(Debug, Clone, Copy)]
pub struct HitRequest<'a> {
    headers: &'a HeaderMap,
    uri: &'a Uri,
    remote_addr: Option<IpAddr>,
}

impl<'a> HitRequest<'a> {
    pub fn new(headers: &'a HeaderMap, uri: &'a Uri) -> Self {
        Self {
            headers,
            uri,
            remote_addr: None,
        }
    }

    pub fn from_request<B>(request: &'a http::Request<B>) -> Self {
        Self::new(request.headers(), request.uri())
    }

    pub fn with_remote_addr(mut self, remote_addr: IpAddr) -> Self {
        self.remote_addr = Some(remote_addr);
        self
    }

    pub fn headers(&self) -> &'a HeaderMap {
        self.headers
    }

    pub fn uri(&self) -> &'a Uri {
        self.uri
    }

    /// Header value as text, `None` when missing.
    pub fn header(&self, name: impl header::AsHeaderName) -> Option<Cow<'a, str>> {
        header_text(self.headers, name)
    }

    /// Raw `User-Agent`, empty when missing.
    pub fn user_agent(&self) -> Cow<'a, str> {
        self.header(header::USER_AGENT).unwrap_or_default()
    }

    /// First decoded value of the query parameter `name`, if any.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    pub fn path(&self) -> &'a str {
        self.uri.path()
    }

    /// The request target re-serialized.
    pub fn url(&self) -> String {
        self.uri.to_string()
    }

    /// The request target with its path replaced by `path`.
    ///
    /// Scheme, authority and query are kept, `?` and `#` in `path` are
    /// percent-encoded. Returns `None` when the result is not a valid URI,
    /// e.g. because `path` contains spaces.
    pub fn url_with_path(&self, path: &str) -> Option<String> {
        // `?` and `#` would end the path early.
        let path = path.replace('?', "%3F").replace('#', "%23");
        let path_and_query = match self.uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path,
        };
        let mut parts = self.uri.clone().into_parts();
        parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
        Uri::from_parts(parts).ok().map(|uri| uri.to_string())
    }

    /// Best guess at the client address.
    ///
    /// Proxy headers win over the socket address: `CF-Connecting-IP`,
    /// `True-Client-IP`, the first `X-Forwarded-For` hop, `X-Real-IP`, then the
    /// `for=` directive of `Forwarded`. Returns an empty string when nothing
    /// is known.
    pub fn client_ip(&self) -> String {
        CLIENT_IP_HEADERS
            .iter()
            .filter_map(|name| self.header(*name))
            .filter_map(|value| parse_ip(value.split(',').next().unwrap_or_default()))
            .chain(self.header(header::FORWARDED).and_then(|v| forwarded_for(&v)))
            .chain(self.remote_addr)
            .next()
            .map(|ip| ip.to_string())
            .unwrap_or_default()
    }
}

/// Header value as text. Bytes outside UTF-8, e.g. Latin-1 sent by old
/// clients, are replaced rather than discarding the whole value.
pub(crate) fn header_text<'a>(
    headers: &'a HeaderMap,
    name: impl header::AsHeaderName,
) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
}

fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}

/// Client address from the first `for=` directive of an RFC 7239 `Forwarded`
/// header. IPv6 addresses arrive quoted and bracketed, possibly with a port.
fn forwarded_for(value: &str) -> Option<IpAddr> {
    let node = value
        .split([',', ';'])
        .map(str::trim)
        .find_map(|pair| {
            let (key, node) = pair.split_once('=')?;
            key.trim().eq_ignore_ascii_case("for").then_some(node)
        })?
        .trim_matches('"');

    if let Some(bracketed) = node.strip_prefix('[') {
        return parse_ip(bracketed.split(']').next().unwrap_or_default());
    }
    parse_ip(node).or_else(|| parse_ip(node.rsplit_once(':').map(|(ip, _)| ip)?))
}
