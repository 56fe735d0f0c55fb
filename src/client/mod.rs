//! The [`HttpLight`] facade.
//!
//! # Structure
//!
//! - `verbs` - async GET/POST/PUT/PATCH/DELETE/SEND entry points
//! - `blocking` - the same entry points for synchronous callers

mod blocking;
mod verbs;

use log::debug;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::config::{HttpLightConfig, mask_token};
use crate::error::HttpLightError;
use crate::http::{HttpRequest, ReqwestTransport, ResponseFormat, Transport, materialize};
use crate::retry::{RetryPolicy, with_retry};

/// Configuration applied to every request sent through a facade.
#[derive(Debug, Clone, Default)]
struct Settings {
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    bearer_token: Option<HeaderValue>,
}

impl Settings {
    /// Fills in what the request did not set itself.
    fn apply(&self, mut request: HttpRequest) -> HttpRequest {
        if let Some(token) = &self.bearer_token {
            if !request.headers.contains_key(AUTHORIZATION) {
                request.headers.insert(AUTHORIZATION, token.clone());
            }
        }

        for name in self.default_headers.keys() {
            if request.headers.contains_key(name) {
                continue;
            }
            for value in self.default_headers.get_all(name) {
                request.headers.append(name.clone(), value.clone());
            }
        }

        if request.timeout.is_none() {
            request.timeout = self.timeout;
        }

        request
    }
}

fn bearer_value(token: &str) -> Result<HeaderValue, HttpLightError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    value.set_sensitive(true);
    Ok(value)
}

/// HTTP client facade with typed responses and optional fixed-delay retries.
///
/// Owns its transport (and with it the connection pool) plus a private runtime
/// used by the `*_blocking` methods. Both are released by [`HttpLight::shutdown`]
/// or when the facade is dropped.
///
/// Header, timeout and token settings are plain state changed through `&mut self`;
/// callers sharing one facade between tasks must serialize changes themselves.
pub struct HttpLight<T: Transport = ReqwestTransport> {
    transport: T,
    settings: Settings,
    retry: RetryPolicy,
    runtime: OnceLock<Runtime>,
}

impl HttpLight<ReqwestTransport> {
    /// Creates a facade with the default configuration.
    pub fn new() -> Result<Self, HttpLightError> {
        Self::from_config(HttpLightConfig::default())
    }

    /// Creates a facade with `HTTPLIGHT_*` environment overrides applied.
    pub fn from_env() -> Result<Self, HttpLightError> {
        Self::from_config(HttpLightConfig::from_env()?)
    }

    pub fn from_config(config: HttpLightConfig) -> Result<Self, HttpLightError> {
        let transport = ReqwestTransport::new(config.build_client()?);
        Self::with_transport_and_config(transport, config)
    }
}

impl<T: Transport> HttpLight<T> {
    /// Creates a facade over a custom transport with default settings.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            settings: Settings::default(),
            retry: RetryPolicy::default(),
            runtime: OnceLock::new(),
        }
    }

    pub fn with_transport_and_config(
        transport: T,
        config: HttpLightConfig,
    ) -> Result<Self, HttpLightError> {
        let bearer_token = match &config.bearer_token {
            Some(token) => Some(bearer_value(token)?),
            None => None,
        };

        Ok(Self {
            transport,
            settings: Settings {
                default_headers: config.default_headers,
                timeout: config.timeout,
                bearer_token,
            },
            retry: config.retry,
            runtime: OnceLock::new(),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The configured retry policy, for passing to `*_with_retry` calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn set_retry_policy(&mut self, policy: RetryPolicy) {
        self.retry = policy;
    }

    /// Replaces the headers sent with every request.
    pub fn set_default_headers(&mut self, headers: HeaderMap) {
        self.settings.default_headers = headers;
    }

    /// Adds or replaces one default header.
    pub fn set_default_header(&mut self, name: &str, value: &str) -> Result<(), HttpLightError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.settings.default_headers.insert(name, value);
        Ok(())
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.settings.default_headers
    }

    pub fn clear_default_headers(&mut self) {
        self.settings.default_headers.clear();
    }

    /// Sets the timeout applied to requests that do not carry their own.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.settings.timeout = Some(timeout);
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.settings.timeout
    }

    pub fn clear_timeout(&mut self) {
        self.settings.timeout = None;
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn set_bearer_token(&mut self, token: &str) -> Result<(), HttpLightError> {
        self.settings.bearer_token = Some(bearer_value(token)?);
        debug!("Bearer token set: {}", mask_token(token));
        Ok(())
    }

    pub fn clear_bearer_token(&mut self) {
        self.settings.bearer_token = None;
    }

    /// Releases the transport and the blocking runtime.
    pub fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            debug!("Shutting down blocking runtime");
            runtime.shutdown_background();
        }
    }

    /// One attempt: apply settings, send, materialize. Cancellation aborts either await.
    async fn execute<F: ResponseFormat>(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        if cancel.is_cancelled() {
            return Err(HttpLightError::Cancelled);
        }
        let request = self.settings.apply(request);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(HttpLightError::Cancelled),
            response = self.transport.send(request) => response?,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(HttpLightError::Cancelled),
            value = materialize::<F>(response) => value,
        }
    }

    async fn execute_with_retry<F: ResponseFormat>(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let operation_name = format!("{} {}", request.method, request.url);
        with_retry(&operation_name, &policy, cancel, || {
            self.execute::<F>(request.clone(), cancel)
        })
        .await
    }

    /// Drives `future` to completion on the facade's private runtime.
    ///
    /// Returns [`HttpLightError::BlockingInAsyncContext`] without running
    /// `future` when the current thread is already inside a tokio runtime.
    fn block_on<R>(
        &self,
        future: impl Future<Output = Result<R, HttpLightError>>,
    ) -> Result<R, HttpLightError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(HttpLightError::BlockingInAsyncContext);
        }

        let runtime = match self.runtime.get() {
            Some(runtime) => runtime,
            None => {
                let built = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .thread_name("httplight-blocking")
                    .enable_all()
                    .build()
                    .map_err(HttpLightError::Runtime)?;
                self.runtime.get_or_init(|| built)
            }
        };
        runtime.block_on(future)
    }
}

impl<T: Transport> Drop for HttpLight<T> {
    fn drop(&mut self) {
        self.release();
    }
}
