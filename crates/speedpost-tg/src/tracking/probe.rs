use crate::http::{self, Page};
use crate::prelude::*;
use crate::tracking::{form, normalize, Config, Endpoint, TrackingQuery, TrackingResult};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// Number of requests to every endpoint by their outcome
const TRACKING_ENDPOINT_ATTEMPTS_TOTAL: &str = "tracking_endpoint_attempts_total";

/// Number of lookups by their final outcome
const TRACKING_PROBES_TOTAL: &str = "tracking_probes_total";

/// Walks the configured endpoints one by one until one of them returns
/// something that looks like tracking data. The endpoints are never queried
/// concurrently.
pub(crate) struct Prober {
    http: http::Client,
    endpoints: Vec<Endpoint>,
    miss_delay: Duration,
}

#[derive(Debug)]
enum Attempt {
    Found(TrackingResult),
    Miss(Miss),
}

#[derive(Debug, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum Miss {
    /// Network failure or timeout
    Transport(crate::Error),

    /// Response with any status other than `200 OK`
    Status(StatusCode),

    /// The response is fine, but there is nothing useful in it
    NoData,
}

impl Attempt {
    fn outcome(&self) -> &'static str {
        match self {
            Attempt::Found(_) => "found",
            Attempt::Miss(miss) => miss.into(),
        }
    }
}

impl Miss {
    /// The service is misbehaving, so it's given a break before the next request
    fn is_failure(&self) -> bool {
        !matches!(self, Miss::NoData)
    }
}

impl Prober {
    pub(crate) fn new(cfg: Config, http: http::Client) -> Self {
        Self {
            http,
            endpoints: cfg.endpoints,
            miss_delay: cfg.miss_delay,
        }
    }

    /// Returns [`None`] only after every endpoint was tried exactly once
    pub(crate) async fn probe(&self, query: &TrackingQuery) -> Option<TrackingResult> {
        let span = info_span!("probe", %query, endpoints = self.endpoints.len());

        async {
            let result = self.probe_endpoints(query).await;

            let outcome = if result.is_some() {
                "found"
            } else {
                info!("None of the endpoints have the tracking data");
                "not_found"
            };

            metrics::register_counter!(TRACKING_PROBES_TOTAL, "outcome" => outcome).increment(1);

            result
        }
        .instrument(span)
        .await
    }

    async fn probe_endpoints(&self, query: &TrackingQuery) -> Option<TrackingResult> {
        let mut endpoints = self.endpoints.iter().enumerate().peekable();

        while let Some((index, endpoint)) = endpoints.next() {
            let span = info_span!("attempt", index, %endpoint);

            let attempt = self.attempt(endpoint, query).instrument(span.clone()).await;

            metrics::register_counter!(
                TRACKING_ENDPOINT_ATTEMPTS_TOTAL,
                "host" => endpoint.host(),
                "outcome" => attempt.outcome()
            )
            .increment(1);

            let miss = match attempt {
                Attempt::Found(result) => {
                    info!(parent: &span, "Found the tracking data");
                    return Some(result);
                }
                Attempt::Miss(miss) => miss,
            };

            match &miss {
                Miss::Transport(err) => {
                    warn!(parent: &span, err = tracing_err(err), "Endpoint is unreachable");
                }
                Miss::Status(status) => {
                    warn!(parent: &span, %status, "Endpoint responded with an error status");
                }
                Miss::NoData => {
                    info!(parent: &span, "No tracking data in the response");
                }
            }

            if miss.is_failure() && endpoints.peek().is_some() {
                tokio::time::sleep(self.miss_delay).await;
            }
        }

        None
    }

    async fn attempt(&self, endpoint: &Endpoint, query: &TrackingQuery) -> Attempt {
        let page = match self.fetch(endpoint, query).await {
            Ok(page) => page,
            Err(miss) => return Attempt::Miss(miss),
        };

        match normalize(&page.body, &page.content_type) {
            Some(result) => Attempt::Found(result),
            None => {
                debug!(
                    url = %page.url,
                    content_type = %page.content_type,
                    body_len = page.body.len(),
                    "Failed to extract the tracking data from the response"
                );
                Attempt::Miss(Miss::NoData)
            }
        }
    }

    async fn fetch(&self, endpoint: &Endpoint, query: &TrackingQuery) -> Result<Page, Miss> {
        match endpoint {
            Endpoint::Get { url } => {
                let url = url
                    .render(query)
                    .fatal_ctx(|| format!("Failed to put {query} into the URL template {url}"))
                    .map_err(Miss::Transport)?;

                self.get(url).await
            }
            Endpoint::AspNetForm {
                url,
                tracking_field,
                extra_fields,
            } => {
                let form_page = self.get(url.clone()).await?;

                let mut fields = form::hidden_fields(&form_page.text());

                debug!(hidden_fields = fields.len(), "Submitting the tracking form");

                fields.extend(
                    extra_fields
                        .iter()
                        .map(|(name, value)| (name.clone(), value.clone())),
                );
                fields.push((tracking_field.clone(), query.to_string()));

                let page = self
                    .http
                    .post(url.clone())
                    .form(&fields)
                    .read_page()
                    .await
                    .map_err(Miss::Transport)?;

                expect_ok(page)
            }
        }
    }

    async fn get(&self, url: Url) -> Result<Page, Miss> {
        let page = self
            .http
            .get(url)
            .read_page()
            .await
            .map_err(Miss::Transport)?;

        expect_ok(page)
    }
}

fn expect_ok(page: Page) -> Result<Page, Miss> {
    if page.status != StatusCode::OK {
        return Err(Miss::Status(page.status));
    }
    Ok(page)
}
