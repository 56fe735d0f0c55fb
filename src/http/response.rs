//! Response materialization: status check, single body read, typed decode.

use anyhow::{Context, Result};
use log::debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

use crate::error::HttpLightError;

/// A response returned by a [`Transport`](super::Transport).
///
/// The body can only be read through [`RawResponse::text`], which consumes the
/// response, so it is read at most once.
#[derive(Debug)]
pub struct RawResponse {
    status: StatusCode,
    body: Body,
}

#[derive(Debug)]
enum Body {
    Buffered(String),
    Live(reqwest::Response),
}

impl RawResponse {
    /// Creates a response whose body is already in memory.
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Body::Buffered(body.into()),
        }
    }

    /// Wraps a live `reqwest` response; the body is streamed on [`RawResponse::text`].
    pub fn from_reqwest(response: reqwest::Response) -> Self {
        Self {
            status: response.status(),
            body: Body::Live(response),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Reads the whole body as text.
    pub async fn text(self) -> Result<String> {
        match self.body {
            Body::Buffered(text) => Ok(text),
            Body::Live(response) => response
                .text()
                .await
                .context("Failed to read response body"),
        }
    }
}

/// How a successful response body is turned into the caller's value.
///
/// The format is picked by the caller as a type parameter, e.g.
/// `client.get::<Json<User>>(..)` or `client.get::<Text>(..)`.
pub trait ResponseFormat {
    type Output;

    fn decode(body: String) -> Result<Self::Output, HttpLightError>;
}

/// Parse the body as JSON into `T`.
pub struct Json<T>(PhantomData<T>);

impl<T: DeserializeOwned> ResponseFormat for Json<T> {
    type Output = T;

    fn decode(body: String) -> Result<T, HttpLightError> {
        serde_json::from_str(&body).map_err(|source| HttpLightError::DeserializeFailed {
            type_name: std::any::type_name::<T>(),
            source,
        })
    }
}

/// Return the body text unchanged.
pub struct Text;

impl ResponseFormat for Text {
    type Output = String;

    fn decode(body: String) -> Result<String, HttpLightError> {
        Ok(body)
    }
}

/// Converts a raw response into the value selected by `F`.
///
/// The body is read before the status is inspected so that failed requests
/// carry the server's error payload.
pub async fn materialize<F: ResponseFormat>(
    response: RawResponse,
) -> Result<F::Output, HttpLightError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        debug!("Request failed with status {}", status);
        return Err(HttpLightError::RequestFailed { status, body });
    }

    F::decode(body)
}
