use super::GLOBAL_LABELS;
use crate::config::from_env_or_panic;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use serde::Deserialize;

/// Histogram buckets to measure the distribution of request durations in seconds.
/// External tracking mirrors are slow, so the upper buckets go up to the
/// default request timeout.
pub(crate) const DEFAULT_DURATION_BUCKETS: &[f64] = &[
    0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0,
];

#[derive(Deserialize)]
struct MetricsConfig {
    #[serde(default = "default_port")]
    port: u16,
}

fn default_port() -> u16 {
    2000
}

pub fn init_metrics() {
    let config: MetricsConfig = from_env_or_panic("METRICS_");

    let mut builder = PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.port))
        .set_buckets_for_metric(
            Matcher::Suffix("_duration_seconds".to_owned()),
            DEFAULT_DURATION_BUCKETS,
        )
        .expect("BUG: duration buckets must not be empty");

    for (key, value) in GLOBAL_LABELS {
        builder = builder.add_global_label(*key, *value);
    }

    builder
        .install()
        .expect("BUG: failed to initialize the metrics listener");
}
