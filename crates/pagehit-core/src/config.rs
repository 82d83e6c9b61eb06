use std::time::Duration;

use crate::{bot::BotTokens, error::CoreError, event::HitOptions};

#[derive(Debug, Clone)]
pub struct Config {
    /// Fingerprint salt. Must stay stable to recognise returning visitors.
    pub salt: String,
    pub tenant_id: Option<i64>,
    /// Added to the built-in bot token list.
    pub bot_tokens: Vec<String>,
    pub referrer_domain_blacklist: Vec<String>,
    pub referrer_domain_blacklist_includes_subdomains: bool,
    pub buffer_max_size: usize,
    pub flush_interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source, e.g. a map in tests.
    pub fn from_vars<F>(var: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let list = |name: &str| -> Vec<String> {
            var(name)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        Ok(Self {
            salt: var("PAGEHIT_SALT")
                .filter(|s| !s.is_empty())
                .ok_or(CoreError::MissingSetting("PAGEHIT_SALT"))?,
            tenant_id: var("PAGEHIT_TENANT_ID")
                .filter(|s| !s.is_empty())
                .map(|v| {
                    v.parse::<i64>().map_err(|e| CoreError::InvalidSetting {
                        name: "PAGEHIT_TENANT_ID",
                        reason: format!("{e}"),
                    })
                })
                .transpose()?,
            bot_tokens: list("PAGEHIT_BOT_TOKENS"),
            referrer_domain_blacklist: list("PAGEHIT_REFERRER_BLACKLIST"),
            referrer_domain_blacklist_includes_subdomains: var(
                "PAGEHIT_REFERRER_BLACKLIST_SUBDOMAINS",
            )
            .map(|v| v == "true")
            .unwrap_or(false),
            buffer_max_size: var("PAGEHIT_BUFFER_MAX_SIZE")
                .unwrap_or_else(|| "100".to_string())
                .parse::<usize>()
                .map_err(|e| CoreError::InvalidSetting {
                    name: "PAGEHIT_BUFFER_MAX_SIZE",
                    reason: format!("{e}"),
                })?,
            flush_interval_ms: var("PAGEHIT_FLUSH_INTERVAL_MS")
                .unwrap_or_else(|| "10000".to_string())
                .parse::<u64>()
                .map_err(|e| format!("{e}"))
                .and_then(|ms| match ms {
                    0 => Err("must be greater than zero".to_string()),
                    ms => Ok(ms),
                })
                .map_err(|reason| CoreError::InvalidSetting {
                    name: "PAGEHIT_FLUSH_INTERVAL_MS",
                    reason,
                })?,
        })
    }

    /// Never zero, a hand-built `Config` with `flush_interval_ms: 0` gets 1 ms.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.max(1))
    }

    pub fn bot_tokens(&self) -> BotTokens {
        BotTokens::builtin_with(&self.bot_tokens)
    }

    /// Options used for hits that are not given their own.
    pub fn hit_options(&self) -> HitOptions {
        HitOptions {
            tenant_id: self.tenant_id,
            referrer_domain_blacklist: self.referrer_domain_blacklist.clone(),
            referrer_domain_blacklist_includes_subdomains: self
                .referrer_domain_blacklist_includes_subdomains,
            ..Default::default()
        }
    }
}
