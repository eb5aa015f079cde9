mod basic_ext;

use crate::prelude::*;
use crate::Result;
use async_trait::async_trait;
use reqwest_middleware::RequestBuilder;
use std::time::{Duration, Instant};
use task_local_extensions::Extensions;

pub(crate) use basic_ext::Page;

pub(crate) mod prelude {
    pub(crate) use super::basic_ext::RequestBuilderBasicExt as _;
}

/// Duration of a single real http request
const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Same as [`HTTP_REQUEST_DURATION_SECONDS`], but covers the time spent in
/// all the middleware layers too
const HTTP_REQUEST_EFFECTIVE_DURATION_SECONDS: &str = "http_request_effective_duration_seconds";

// Some tracking mirrors respond with an empty page to unknown user agents
const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; SpeedpostTelegramBot/",
    env!("CARGO_PKG_VERSION"),
    ")",
);

pub type Client = reqwest_middleware::ClientWithMiddleware;

/// Creates the client used for talking to the external tracking services.
///
/// There are intentionally no retries here. If an endpoint fails, the next one
/// in the list is tried instead.
pub(crate) fn create_client(timeout: Duration) -> Result<Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::default())
        .cookie_store(true)
        .build()
        .fatal_ctx(|| "Failed to build the HTTP client")?;

    let client = reqwest_middleware::ClientBuilder::new(client)
        .with(OutermostObservingMiddleware)
        .with(InnermostObservingMiddleware)
        .with_init(|request_builder: RequestBuilder| {
            request_builder.header(reqwest::header::USER_AGENT, USER_AGENT)
        })
        .build();

    Ok(client)
}

struct OutermostObservingMiddleware;

#[async_trait]
impl reqwest_middleware::Middleware for OutermostObservingMiddleware {
    async fn handle(
        &self,
        request: reqwest::Request,
        extensions: &mut Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let span = info_span!(
            "request",
            version = ?request.version(),
            method = %request.method(),
            url = %request.url(),
        );
        measure_request(
            HTTP_REQUEST_EFFECTIVE_DURATION_SECONDS,
            request,
            extensions,
            next,
        )
        .instrument(span)
        .await
    }
}

struct InnermostObservingMiddleware;

#[async_trait]
impl reqwest_middleware::Middleware for InnermostObservingMiddleware {
    async fn handle(
        &self,
        request: reqwest::Request,
        extensions: &mut Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let (result, duration) =
            measure_request(HTTP_REQUEST_DURATION_SECONDS, request, extensions, next)
                .with_duration()
                .await;

        let duration = tracing_duration(duration);

        let response = match &result {
            Ok(response) => response,
            Err(err) => {
                warn!(duration, err = tracing_err(err), "Network request failed");
                return result;
            }
        };

        let status = response.status();

        if status.is_success() {
            info!(duration, %status, "Network request succeeded");
        } else {
            warn!(duration, %status, "Network request failed (error status)");
        }

        result
    }
}

async fn measure_request(
    histogram: &'static str,
    request: reqwest::Request,
    extensions: &mut Extensions,
    next: reqwest_middleware::Next<'_>,
) -> reqwest_middleware::Result<reqwest::Response> {
    let mut labels = request_labels(&request);

    let start = Instant::now();
    let result = next.run(request, extensions).await;
    let elapsed = start.elapsed();

    let status = match &result {
        Ok(response) => response.status().as_u16().to_string(),
        Err(_) => "{fatal}".to_owned(),
    };

    labels.push(metrics::Label::new("status", status));

    metrics::register_histogram!(histogram, labels).record(elapsed);

    result
}

fn request_labels(request: &reqwest::Request) -> Vec<metrics::Label> {
    let host = request.url().host_str().unwrap_or("{unknown}").to_owned();

    vec![
        metrics::Label::new("version", format!("{:?}", request.version())),
        metrics::Label::new("method", request.method().to_string()),
        metrics::Label::new("host", host),
    ]
}

/// Errors at the layer of the HTTP API
#[derive(Debug, thiserror::Error)]
pub(crate) enum HttpClientError {
    #[error("HTTP request failed")]
    Request { source: reqwest_middleware::Error },

    #[error("Failed to read HTTP response")]
    ReadPayload { source: reqwest_middleware::Error },
}
