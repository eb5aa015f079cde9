use crate::config::from_env_or_panic;
use crate::observability::GLOBAL_LABELS;
use crate::prelude::*;
use serde::Deserialize;
use serde_with::serde_as;
use std::collections::HashMap;
use std::ops::Deref;
use std::time::Instant;
use tracing_subscriber::prelude::*;

/// Handle to the background task that ships logs to Loki.
/// It is a no-op if Loki isn't configured.
pub struct LoggingTask {
    loki: Option<LokiTask>,
}

struct LokiTask {
    task: tokio::task::JoinHandle<()>,
    controller: tracing_loki::BackgroundTaskController,
}

impl LoggingTask {
    pub async fn shutdown(self) {
        let Some(LokiTask { task, controller }) = self.loki else {
            return;
        };

        info!("Waiting for the logging task to finish nicely...");

        let start = Instant::now();
        controller.shutdown().await;

        eprintln!(
            "Stopped logging task in {:.2?}: {:?}",
            start.elapsed(),
            task.await
        );
    }
}

pub fn init_logging() -> LoggingTask {
    LoggingConfig::load_or_panic().init_logging()
}

#[serde_as]
#[derive(Deserialize)]
struct LoggingConfig {
    /// Logs are shipped to Grafana Loki only if this is set
    loki_url: Option<url::Url>,

    #[serde_as(as = "serde_with::json::JsonString")]
    #[serde(default)]
    tg_bot_log_labels: HashMap<String, String>,
}

impl LoggingConfig {
    fn load_or_panic() -> LoggingConfig {
        from_env_or_panic("")
    }

    fn init_logging(self) -> LoggingTask {
        let env_filter = tracing_subscriber::EnvFilter::from_env("TG_BOT_LOG");

        let fmt = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(std::env::var("COLORS").as_deref() != Ok("0"))
            .pretty();

        let (loki, loki_task) = match self.loki_url {
            Some(loki_url) => {
                let (layer, task) = init_loki(loki_url, self.tg_bot_log_labels);
                (Some(layer), Some(task))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(fmt)
            .with(loki)
            .with(env_filter)
            .with(tracing_error::ErrorLayer::default())
            .init();

        init_panic_hook();

        if loki_task.is_none() {
            info!("LOKI_URL is not set, logs will be written only to stderr");
        }

        LoggingTask { loki: loki_task }
    }
}

fn init_loki(
    loki_url: url::Url,
    mut labels: HashMap<String, String>,
) -> (tracing_loki::Layer, LokiTask) {
    let additional_labels = GLOBAL_LABELS.iter().chain(&[("source", "speedpost-tg")]);

    labels.extend(additional_labels.map(|(k, v)| ((*k).to_owned(), (*v).to_owned())));

    let (layer, controller, task) = labels
        .into_iter()
        .fold(tracing_loki::builder(), |builder, (key, value)| {
            builder
                .label(key, value)
                .unwrap_or_else(|err| panic!("BUG: invalid Loki label: {err:#?}"))
        })
        .build_controller_url(loki_url)
        .unwrap_or_else(|err| panic!("BUG: failed to initialize Loki logging: {err:#?}"));

    let task = tokio::spawn(task);

    (layer, LokiTask { task, controller })
}

fn init_panic_hook() {
    let current_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        // The default hook must run first, because the panic may happen
        // inside of the `tracing` logging system itself.
        current_hook(panic_info);

        let backtrace = std::backtrace::Backtrace::capture();
        let location = panic_info.location().map(|location| {
            format!(
                "{}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            )
        });

        // If the panic message was formatted using interpolated values,
        // it will be a `String`. Otherwise, it will be a `&str`.
        let payload = panic_info.payload();
        let message = payload
            .downcast_ref::<String>()
            .map(<_>::deref)
            .or_else(|| payload.downcast_ref::<&str>().map(<_>::deref))
            .unwrap_or("<unknown>");

        let span_trace = tracing_error::SpanTrace::capture();

        error!(
            target: "panic",
            thread = std::thread::current().name(),
            location,
            span_trace = %span_trace,
            backtrace = format_args!("\n{backtrace}"),
            "{message}"
        );
    }));
}
