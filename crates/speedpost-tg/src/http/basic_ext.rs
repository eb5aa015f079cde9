use super::HttpClientError;
use crate::prelude::*;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use easy_ext::ext;
use reqwest::StatusCode;
use reqwest_middleware::RequestBuilder;

/// Fully-read HTTP response. The status code isn't validated, so it's up to
/// the caller to decide what to do with non-successful responses.
#[derive(Debug, Clone)]
pub(crate) struct Page {
    /// The final URL after following all the redirects
    pub(crate) url: url::Url,
    pub(crate) status: StatusCode,

    /// Raw value of the `Content-Type` header, or an empty string if the
    /// server didn't send it
    pub(crate) content_type: String,
    pub(crate) body: Bytes,
}

impl Page {
    pub(crate) fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[ext(RequestBuilderBasicExt)]
#[async_trait]
pub(crate) impl RequestBuilder {
    /// Sends the request and reads the whole response body into memory.
    /// Only the transport-level failures are reported as errors.
    async fn read_page(self) -> Result<Page> {
        let response = self
            .send()
            .await
            .map_err(err_ctx!(HttpClientError::Request))?;

        let url = response.url().clone();
        let status = response.status();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        let body = response
            .bytes()
            .await
            .map_err(err_ctx!(HttpClientError::ReadPayload))?;

        Ok(Page {
            url,
            status,
            content_type,
            body,
        })
    }
}
