//! Lookup of the postal shipments in the external tracking services

mod endpoint;
mod form;
mod model;
mod normalize;
mod probe;
mod query;

use serde::Deserialize;
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use std::time::Duration;

pub(crate) use endpoint::*;
pub(crate) use model::*;
pub(crate) use normalize::normalize;
pub(crate) use probe::*;
pub(crate) use query::*;

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Config {
    /// Total time limit of a single HTTP request to a tracking service.
    /// The worst case latency of the lookup is this value multiplied by
    /// the number of the endpoints.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "timeout_secs", default = "default_timeout")]
    pub(crate) timeout: Duration,

    /// Pause before moving on to the next endpoint after a network failure
    /// or an error status
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "miss_delay_ms", default = "default_miss_delay")]
    pub(crate) miss_delay: Duration,

    /// Ordered list of the endpoints to try, encoded as JSON
    #[serde_as(as = "serde_with::json::JsonString")]
    #[serde(default = "endpoint::default_endpoints")]
    pub(crate) endpoints: Vec<Endpoint>,
}

fn default_timeout() -> Duration {
    Duration::from_secs(40)
}

fn default_miss_delay() -> Duration {
    Duration::from_millis(250)
}

impl Config {
    /// Upper bound of the time a single lookup may take when every endpoint
    /// runs up to its timeout
    pub(crate) fn max_wait(&self) -> Duration {
        let endpoints = u32::try_from(self.endpoints.len().max(1)).unwrap_or(u32::MAX);
        self.timeout.saturating_mul(endpoints)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            miss_delay: default_miss_delay(),
            endpoints: endpoint::default_endpoints(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_env_vars() {
        let vars = [
            ("TRACKING_TIMEOUT_SECS", "15"),
            ("TRACKING_MISS_DELAY_MS", "300"),
            (
                "TRACKING_ENDPOINTS",
                r#"[{"kind": "get", "url": "https://example.com/track/{}"}]"#,
            ),
        ]
        .map(|(key, value)| (key.to_owned(), value.to_owned()));

        let config: Config = envy::prefixed("TRACKING_").from_iter(vars).unwrap();

        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.miss_delay, Duration::from_millis(300));
        assert_eq!(
            config.endpoints,
            [Endpoint::get("https://example.com/track/{}").unwrap()]
        );
    }

    #[test]
    fn config_defaults() {
        let config: Config = envy::prefixed("TRACKING_")
            .from_iter(std::iter::empty::<(String, String)>())
            .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(40));
        assert_eq!(config.miss_delay, Duration::from_millis(250));
        assert_eq!(config.endpoints, endpoint::default_endpoints());
    }

    #[test]
    fn max_wait_covers_every_endpoint() {
        let config = Config::default();
        assert_eq!(config.max_wait(), Duration::from_secs(40 * 6));

        let config = Config {
            endpoints: vec![],
            ..Config::default()
        };
        assert_eq!(config.max_wait(), Duration::from_secs(40));
    }

    #[test]
    fn config_rejects_invalid_endpoints() {
        let vars = [(
            "TRACKING_ENDPOINTS".to_owned(),
            r#"[{"kind": "get", "url": "https://example.com/track"}]"#.to_owned(),
        )];

        let result = envy::prefixed("TRACKING_").from_iter::<_, Config>(vars);
        assert!(result.is_err());
    }
}
