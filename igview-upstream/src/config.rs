//! Upstream client configuration.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use url::Url;

use igview_core::constants::{
    DEFAULT_BASE_URL, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_MIN_INTERVAL_MS, DEFAULT_TIMEOUT_SECS,
};
use igview_core::{IgviewError, Operation, Result};

/// Which operations treat a missing envelope `status` field as a failure.
///
/// For every other operation a payload without `status` is returned to the
/// caller but never cached, since cache writes require an explicit `"ok"`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvelopePolicy {
    strict: BTreeSet<Operation>,
}

impl EnvelopePolicy {
    /// Policy where no operation requires the `status` field.
    pub fn lenient() -> Self {
        Self::default()
    }

    /// Policy where every operation requires the `status` field.
    pub fn strict() -> Self {
        Self::require(Operation::ALL)
    }

    /// Policy requiring the `status` field for the given operations.
    pub fn require(ops: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            strict: ops.into_iter().collect(),
        }
    }

    /// Parses a comma-separated list of operation names (`"*"` means all).
    pub fn parse(list: &str) -> Result<Self> {
        let names: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if names == ["*"] {
            return Ok(Self::strict());
        }
        let ops = names
            .into_iter()
            .map(str::parse::<Operation>)
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self { strict: ops })
    }

    /// Returns true if `op` must carry a `status` field.
    pub fn require_status_field(&self, op: Operation) -> bool {
        self.strict.contains(&op)
    }
}

/// IMAI client configuration.
#[derive(Clone)]
pub struct ImaiConfig {
    /// Static API key sent in the `authkey` header
    pub api_key: String,
    /// Base URL; always ends with `/` so operation paths resolve beneath it
    pub base_url: Url,
    /// Minimum spacing between two upstream dispatches
    pub min_interval: Duration,
    /// Per-request HTTP timeout
    pub timeout: Duration,
    /// Capacity of each per-operation cache
    pub cache_max_entries: usize,
    /// Missing-`status` handling per operation
    pub envelope: EnvelopePolicy,
}

impl fmt::Debug for ImaiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImaiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("min_interval", &self.min_interval)
            .field("timeout", &self.timeout)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("envelope", &self.envelope)
            .finish()
    }
}

impl ImaiConfig {
    /// Creates a config with defaults for everything but the credentials.
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(IgviewError::ConfigError("IMAI_API_KEY must not be empty".into()));
        }
        Ok(Self {
            api_key,
            base_url: parse_base_url(base_url)?,
            min_interval: Duration::from_millis(DEFAULT_MIN_INTERVAL_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            envelope: EnvelopePolicy::lenient(),
        })
    }

    /// Loads `.env`, then reads the `IMAI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("IMAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| IgviewError::ConfigError("IMAI_API_KEY is required".into()))?;
        let base_url = lookup("IMAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());

        let mut config = Self::new(api_key, &base_url)?;
        if let Some(ms) = parse_var::<u64>(&lookup, "IMAI_MIN_INTERVAL_MS")? {
            config.min_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "IMAI_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var::<usize>(&lookup, "IMAI_CACHE_MAX_ENTRIES")? {
            config.cache_max_entries = max;
        }
        if let Some(list) = lookup("IMAI_STRICT_ENVELOPE") {
            config.envelope = EnvelopePolicy::parse(&list)?;
        }
        Ok(config)
    }

    /// Sets the dispatch pacing interval.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the per-cache capacity.
    pub fn with_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.cache_max_entries = max_entries;
        self
    }

    /// Sets the envelope policy.
    pub fn with_envelope_policy(mut self, policy: EnvelopePolicy) -> Self {
        self.envelope = policy;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| IgviewError::ConfigError(format!("{} is not a valid number: '{}'", name, raw))),
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let url = Url::parse(&raw)
        .map_err(|e| IgviewError::ConfigError(format!("invalid IMAI_BASE_URL '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(IgviewError::ConfigError(format!(
            "IMAI_BASE_URL must be http(s), got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_api_key_required() {
        let err = ImaiConfig::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, IgviewError::ConfigError(_)));

        let err = ImaiConfig::from_lookup(env(&[("IMAI_API_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("IMAI_API_KEY"));
    }

    #[test]
    fn test_defaults() {
        let config = ImaiConfig::from_lookup(env(&[("IMAI_API_KEY", "k")])).unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.min_interval, Duration::from_millis(200));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.cache_max_entries, 1000);
        assert!(!config.envelope.require_status_field(Operation::UserInfo));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ImaiConfig::from_lookup(env(&[
            ("IMAI_API_KEY", "k"),
            ("IMAI_BASE_URL", "http://localhost:9000/api"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:9000/api/");
        assert_eq!(
            config.base_url.join(Operation::UserInfo.path()).unwrap().as_str(),
            "http://localhost:9000/api/raw/ig/user/info/"
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ImaiConfig::from_lookup(env(&[("IMAI_API_KEY", "k"), ("IMAI_BASE_URL", "ftp://x/")])).is_err());
        assert!(ImaiConfig::from_lookup(env(&[("IMAI_API_KEY", "k"), ("IMAI_MIN_INTERVAL_MS", "fast")])).is_err());
        assert!(ImaiConfig::from_lookup(env(&[("IMAI_API_KEY", "k"), ("IMAI_STRICT_ENVELOPE", "bogus")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = ImaiConfig::from_lookup(env(&[
            ("IMAI_API_KEY", "k"),
            ("IMAI_MIN_INTERVAL_MS", "50"),
            ("IMAI_TIMEOUT_SECS", "5"),
            ("IMAI_CACHE_MAX_ENTRIES", "10"),
            ("IMAI_STRICT_ENVELOPE", "user_info, media_info"),
        ]))
        .unwrap();
        assert_eq!(config.min_interval, Duration::from_millis(50));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.cache_max_entries, 10);
        assert!(config.envelope.require_status_field(Operation::UserInfo));
        assert!(config.envelope.require_status_field(Operation::MediaInfo));
        assert!(!config.envelope.require_status_field(Operation::UserFeed));
    }

    #[test]
    fn test_strict_wildcard() {
        let policy = EnvelopePolicy::parse("*").unwrap();
        assert!(Operation::ALL.iter().all(|op| policy.require_status_field(*op)));
        assert_eq!(EnvelopePolicy::parse("").unwrap(), EnvelopePolicy::lenient());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ImaiConfig::new("super-secret-key", DEFAULT_BASE_URL).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("<redacted>"));
    }
}
