use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

pub const BACKEND_URL_ENV: &str = "REELNOTES_BACKEND_URL";
pub const MAX_ATTEMPTS_ENV: &str = "REELNOTES_READINESS_MAX_ATTEMPTS";
pub const REQUEST_TIMEOUT_ENV: &str = "REELNOTES_REQUEST_TIMEOUT_SECS";

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct Config {
    pub backend_url: Url,
    /// Period of the playhead poll while the video plays.
    pub playback_interval: Duration,
    /// Period of the poll waiting for segment images.
    pub readiness_interval: Duration,
    /// Minimum gap between refreshes triggered by a segment without image.
    pub refresh_throttle: Duration,
    /// Readiness polls before giving up, `0` polls forever.
    pub readiness_max_attempts: u32,
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend url is valid"),
            playback_interval: Duration::from_secs(1),
            readiness_interval: Duration::from_secs(4),
            refresh_throttle: Duration::from_secs(4),
            readiness_max_attempts: 225,
            request_timeout: None,
        }
    }
}

impl Config {
    /// Defaults overlaid with the `REELNOTES_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(BACKEND_URL_ENV) {
            config.backend_url = Url::parse(url.trim()).map_err(|e| Error::Config {
                key: BACKEND_URL_ENV,
                reason: e.to_string(),
            })?;
        }

        if let Some(attempts) = lookup(MAX_ATTEMPTS_ENV) {
            config.readiness_max_attempts =
                attempts.trim().parse().map_err(|_| Error::Config {
                    key: MAX_ATTEMPTS_ENV,
                    reason: format!("expected a non-negative integer, got {attempts:?}"),
                })?;
        }

        if let Some(secs) = lookup(REQUEST_TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| Error::Config {
                key: REQUEST_TIMEOUT_ENV,
                reason: format!("expected whole seconds, got {secs:?}"),
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_backend_url(mut self, url: &str) -> Result<Self> {
        self.backend_url = Url::parse(url)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.backend_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config.playback_interval, Duration::from_secs(1));
        assert_eq!(config.readiness_interval, Duration::from_secs(4));
        assert_eq!(config.readiness_max_attempts, 225);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn env_overrides_defaults() {
        let config = from_pairs(&[
            (BACKEND_URL_ENV, "https://notes.example.com/app/"),
            (MAX_ATTEMPTS_ENV, "0"),
            (REQUEST_TIMEOUT_ENV, "30"),
        ])
        .unwrap();

        assert_eq!(config.backend_url.as_str(), "https://notes.example.com/app/");
        assert_eq!(config.readiness_max_attempts, 0);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn invalid_env_values_are_reported() {
        let err = from_pairs(&[(MAX_ATTEMPTS_ENV, "many")]).unwrap_err();
        assert!(matches!(err, Error::Config { key: MAX_ATTEMPTS_ENV, .. }));

        let err = from_pairs(&[(BACKEND_URL_ENV, "not a url")]).unwrap_err();
        assert!(matches!(err, Error::Config { key: BACKEND_URL_ENV, .. }));
    }
}
