//! The HTTP engine the facade delegates to.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::multipart::Form;

use super::request::{HttpRequest, RequestBody};
use super::response::RawResponse;

/// Performs a single HTTP exchange.
///
/// Implementations only move bytes; status handling and decoding happen in
/// [`materialize`](super::materialize).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse>;
}

/// [`Transport`] backed by a `reqwest` client and its connection pool.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Sends requests through `client`, sharing its connection pool and client-wide settings.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// The client requests go out on.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Builds the wire request. The request ends up with exactly one
    /// `Content-Type`: the caller's own for text bodies, the generated
    /// multipart one (it carries the boundary) for forms.
    fn build(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder> {
        let mut headers = request.headers;

        let body = match request.body {
            None => None,
            Some(RequestBody::Text {
                content,
                content_type,
            }) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    let value = HeaderValue::from_str(&content_type)
                        .with_context(|| format!("Invalid content type: {}", content_type))?;
                    headers.insert(CONTENT_TYPE, value);
                }
                Some(WireBody::Text(content))
            }
            Some(RequestBody::Form(form)) => {
                headers.remove(CONTENT_TYPE);
                Some(WireBody::Form(form.to_multipart()?))
            }
        };

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(headers);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match body {
            None => builder,
            Some(WireBody::Text(content)) => builder.body(content),
            Some(WireBody::Form(form)) => builder.multipart(form),
        };

        Ok(builder)
    }
}

enum WireBody {
    Text(String),
    Form(Form),
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(
        skip(self, request),
        fields(method = %request.method, url = %request.url)
    )]
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        let url = request.url.clone();
        let response = self
            .build(request)?
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        debug!("{} responded with {}", url, response.status());
        Ok(RawResponse::from_reqwest(response))
    }
}
