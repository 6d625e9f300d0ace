//! Upstream credential resolution.
//!
//! # Responsibilities
//! - Restore the leading sentinel on keys stored without it
//! - Pick the key by priority: raw config, plain config, request header
//! - Redact keys before they reach a log line
//!
//! # Design Decisions
//! - Server-side keys are resolved once at startup
//! - A key that is empty or only the sentinel counts as missing

use crate::config::CredentialConfig;
use crate::http::response::ProxyError;

/// Where the resolved key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Raw,
    Plain,
    Header,
}

/// Credentials resolved from configuration at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    configured: Option<(String, KeySource)>,
    sentinel: char,
    /// Per-request key header, when the server accepts one.
    header: Option<String>,
}

impl Credentials {
    pub fn from_config(config: &CredentialConfig) -> Self {
        let raw = config
            .api_key_raw
            .as_deref()
            .map(|raw| restore_sentinel(raw, config.sentinel))
            .filter(|key| is_usable(key, config.sentinel))
            .map(|key| (key, KeySource::Raw));

        let plain = || {
            config
                .api_key
                .as_deref()
                .map(|key| key.trim().to_string())
                .filter(|key| is_usable(key, config.sentinel))
                .map(|key| (key, KeySource::Plain))
        };

        Self {
            configured: raw.or_else(plain),
            sentinel: config.sentinel,
            header: config
                .allow_header_fallback
                .then(|| config.header.clone()),
        }
    }

    /// The server-side key source, if any.
    pub fn configured_source(&self) -> Option<KeySource> {
        self.configured.as_ref().map(|(_, source)| *source)
    }

    /// Resolve the key for one request.
    ///
    /// `header` is the value of the per-request credential header.
    pub fn resolve(&self, header: Option<&str>) -> Result<(String, KeySource), ProxyError> {
        if let Some(configured) = &self.configured {
            return Ok(configured.clone());
        }

        if self.header.is_some() {
            if let Some(key) = header.map(str::trim).filter(|k| is_usable(k, self.sentinel)) {
                return Ok((key.to_string(), KeySource::Header));
            }
        }

        Err(ProxyError::MissingCredential {
            header: self.header.clone(),
        })
    }
}

/// Prepend `sentinel` unless `stored` already starts with it, then trim.
///
/// Surrounding whitespace is trimmed before the check so a stray leading
/// space cannot hide an existing sentinel. Empty input stays empty.
pub fn restore_sentinel(stored: &str, sentinel: char) -> String {
    let stored = stored.trim();
    if stored.is_empty() || stored.starts_with(sentinel) {
        return stored.to_string();
    }
    format!("{}{}", sentinel, stored).trim().to_string()
}

fn is_usable(key: &str, sentinel: char) -> bool {
    let key = key.trim();
    !key.is_empty() && key.strip_prefix(sentinel) != Some("")
}

/// Redact a key for logging: first 12 and last 4 characters survive.
///
/// Keys of 20 characters or fewer only show their first 4.
pub fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 20 {
        let head: String = chars.iter().take(4).collect();
        return format!("{}...", head);
    }
    let head: String = chars[..12].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
