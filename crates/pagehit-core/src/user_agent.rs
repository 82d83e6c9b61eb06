/// Facts derived from a `User-Agent` string. Empty strings mean "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub os: String,
    pub os_version: String,
    pub browser: String,
    pub browser_version: String,
    pub desktop: bool,
    pub mobile: bool,
}

/// Turns a raw client identification string into OS, browser and device facts.
pub trait ClientClassifier: Send + Sync {
    fn classify(&self, user_agent: &str) -> UserAgentInfo;
}

/// [`ClientClassifier`] backed by the `woothee` parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct WootheeClassifier;

impl WootheeClassifier {
    pub fn new() -> Self {
        Self
    }
}

// woothee reports unknown values as this literal.
const UNKNOWN: &str = "UNKNOWN";

fn known(value: &str) -> String {
    if value == UNKNOWN {
        String::new()
    } else {
        value.to_string()
    }
}

impl ClientClassifier for WootheeClassifier {
    fn classify(&self, user_agent: &str) -> UserAgentInfo {
        if user_agent.is_empty() {
            return UserAgentInfo::default();
        }

        let Some(result) = woothee::parser::Parser::new().parse(user_agent) else {
            return UserAgentInfo::default();
        };

        // woothee `category`:
        //   "pc"                        -> desktop
        //   "smartphone" | "mobilephone" -> mobile
        //   everything else             -> neither
        let (desktop, mobile) = match result.category {
            "pc" => (true, false),
            "smartphone" | "mobilephone" => (false, true),
            _ => (false, false),
        };

        UserAgentInfo {
            os: known(result.os),
            os_version: known(&result.os_version),
            browser: known(result.name),
            browser_version: known(result.version),
            desktop,
            mobile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) \
        AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    #[test]
    fn desktop_browser() {
        let info = WootheeClassifier::new().classify(CHROME_WINDOWS);
        assert_eq!(info.browser, "Chrome");
        assert!(info.browser_version.starts_with("120"));
        assert!(info.os.starts_with("Windows"));
        assert!(info.desktop);
        assert!(!info.mobile);
    }

    #[test]
    fn linux_firefox() {
        let info = WootheeClassifier::new().classify(FIREFOX_LINUX);
        assert_eq!(info.browser, "Firefox");
        assert_eq!(info.os, "Linux");
        assert!(info.desktop);
    }

    #[test]
    fn mobile_browser() {
        let info = WootheeClassifier::new().classify(SAFARI_IPHONE);
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "iPhone");
        assert!(info.mobile);
        assert!(!info.desktop);
    }

    #[test]
    fn unknown_agent_yields_empty_facts() {
        let classifier = WootheeClassifier::new();
        assert_eq!(classifier.classify(""), UserAgentInfo::default());

        let info = classifier.classify("totally-made-up-client");
        assert!(!info.desktop);
        assert!(!info.mobile);
        assert_ne!(info.browser, UNKNOWN);
        assert_ne!(info.os, UNKNOWN);
    }
}
