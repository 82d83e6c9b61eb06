//! Field normalization applied to every hit before it is stored.

pub const MAX_PATH_BYTES: usize = 2000;
pub const MAX_URL_BYTES: usize = 2000;
pub const MAX_USER_AGENT_BYTES: usize = 200;
pub const MAX_REFERRER_BYTES: usize = 200;
pub const MAX_LANGUAGE_BYTES: usize = 10;
/// Applies to OS and browser names and versions alike.
pub const MAX_CLIENT_FIELD_BYTES: usize = 20;

/// Shorten `value` to at most `max_bytes` bytes.
///
/// The limit is a byte count, not a character count. When the cut would land
/// inside a multi-byte character the prefix is shortened to the previous
/// character boundary, so the result may be a few bytes under the limit but is
/// always valid UTF-8.
pub fn shorten(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }

    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Shorten `value` and map an empty result to `None`.
///
/// Presence is decided after truncation so a stored field is never `Some("")`.
pub fn bounded(value: &str, max_bytes: usize) -> Option<String> {
    let value = shorten(value, max_bytes);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Extract the primary language tag from an `Accept-Language` header value.
///
/// Only the first listed tag is used, whatever its quality value.
/// `"en-US,en;q=0.9"` becomes `"en-us"`.
pub fn language(accept_language: &str) -> Option<String> {
    let group = accept_language.split(';').next().unwrap_or_default();
    let tag = group.split(',').next().unwrap_or_default().trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_keeps_short_values() {
        assert_eq!(shorten("hello", 5), "hello");
        assert_eq!(shorten("hello", 200), "hello");
        assert_eq!(shorten("", 0), "");
    }

    #[test]
    fn shorten_cuts_at_byte_limit() {
        assert_eq!(shorten("hello world", 5), "hello");
        assert_eq!(shorten("hello", 0), "");
    }

    #[test]
    fn shorten_never_exceeds_limit() {
        let samples = ["", "a", "abc", "grüße", "日本語テキスト", "emoji 🎉🎉🎉"];
        for value in samples {
            for limit in 0..=value.len() + 2 {
                let short = shorten(value, limit);
                assert!(short.len() <= limit, "{value:?} cut to {limit} was {short:?}");
                assert!(value.starts_with(short));
                if value.len() <= limit {
                    assert_eq!(short, value);
                }
            }
        }
    }

    #[test]
    fn shorten_backs_off_to_char_boundary() {
        // 'ü' is two bytes starting at index 2.
        assert_eq!(shorten("grüße", 3), "gr");
        assert_eq!(shorten("grüße", 4), "grü");
    }

    #[test]
    fn bounded_maps_empty_to_none() {
        assert_eq!(bounded("", 20), None);
        assert_eq!(bounded("Firefox", 0), None);
        // A single three-byte character cannot fit into two bytes.
        assert_eq!(bounded("日", 2), None);
        assert_eq!(bounded("Firefox", 20).as_deref(), Some("Firefox"));
        assert_eq!(bounded("Firefox", 4).as_deref(), Some("Fire"));
    }

    #[test]
    fn language_takes_first_tag() {
        assert_eq!(language("en-US,en;q=0.9").as_deref(), Some("en-us"));
        assert_eq!(language("de-DE;q=0.8,en;q=0.5").as_deref(), Some("de-de"));
        assert_eq!(language("FR").as_deref(), Some("fr"));
        assert_eq!(language(" pt-BR , en").as_deref(), Some("pt-br"));
    }

    #[test]
    fn language_empty_is_absent() {
        assert_eq!(language(""), None);
        assert_eq!(language(";q=0.9"), None);
        assert_eq!(language(",en"), None);
    }
}
