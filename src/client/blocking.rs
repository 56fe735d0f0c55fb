//! Blocking verb entry points.
//!
//! Each method drives its async counterpart on the facade's private runtime,
//! so attempt counts, delays and errors are the same as in async code. The
//! calling thread blocks while waiting for the transport and between retries.
//!
//! Called from a thread that is already inside a tokio runtime, these methods
//! return [`HttpLightError::BlockingInAsyncContext`] without sending anything;
//! use the async methods there.

use tokio_util::sync::CancellationToken;

use super::HttpLight;
use crate::error::HttpLightError;
use crate::http::{FormData, HttpRequest, RequestBody, ResponseFormat, Transport};
use crate::retry::RetryPolicy;

impl<T: Transport> HttpLight<T> {
    pub fn get_blocking<F: ResponseFormat>(&self, url: &str) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.get::<F>(url, &cancel))
    }

    pub fn get_with_retry_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        policy: RetryPolicy,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.get_with_retry::<F>(url, policy, &cancel))
    }

    pub fn delete_blocking<F: ResponseFormat>(
        &self,
        url: &str,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.delete::<F>(url, &cancel))
    }

    pub fn delete_with_retry_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        policy: RetryPolicy,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.delete_with_retry::<F>(url, policy, &cancel))
    }

    pub fn post_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.post::<F>(url, body, &cancel))
    }

    pub fn post_form_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        form: FormData,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.post_form::<F>(url, form, &cancel))
    }

    pub fn post_with_retry_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        policy: RetryPolicy,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.post_with_retry::<F>(url, body, policy, &cancel))
    }

    pub fn put_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.put::<F>(url, body, &cancel))
    }

    pub fn put_form_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        form: FormData,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.put_form::<F>(url, form, &cancel))
    }

    pub fn put_with_retry_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        policy: RetryPolicy,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.put_with_retry::<F>(url, body, policy, &cancel))
    }

    pub fn patch_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.patch::<F>(url, body, &cancel))
    }

    pub fn patch_form_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        form: FormData,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.patch_form::<F>(url, form, &cancel))
    }

    pub fn patch_with_retry_blocking<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        policy: RetryPolicy,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.patch_with_retry::<F>(url, body, policy, &cancel))
    }

    pub fn send_blocking<F: ResponseFormat>(
        &self,
        request: HttpRequest,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.send::<F>(request, &cancel))
    }

    pub fn send_with_retry_blocking<F: ResponseFormat>(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<F::Output, HttpLightError> {
        let cancel = CancellationToken::new();
        self.block_on(self.send_with_retry::<F>(request, policy, &cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Json, MockTransport, RawResponse, Text};
    use reqwest::StatusCode;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Shape {
        x: i32,
    }

    /// A transport that fails `failures` times with a 503 and then answers `{"x":1}`.
    fn flaky_transport(failures: usize) -> (MockTransport, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut transport = MockTransport::new();
        transport.expect_send().returning(move |_| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            if call < failures {
                Ok(RawResponse::new(StatusCode::SERVICE_UNAVAILABLE, "busy"))
            } else {
                Ok(RawResponse::new(StatusCode::OK, r#"{"x":1}"#))
            }
        });
        (transport, calls)
    }

    fn describe(result: &Result<Shape, HttpLightError>) -> String {
        match result {
            Ok(shape) => format!("ok {}", shape.x),
            Err(HttpLightError::RetryExhausted { attempts, .. }) => {
                format!("exhausted {}", attempts)
            }
            Err(e) => format!("error {}", e),
        }
    }

    #[test]
    fn test_get_blocking_json() {
        let (transport, calls) = flaky_transport(0);
        let client = HttpLight::with_transport(transport);

        let shape = client.get_blocking::<Json<Shape>>("http://api").unwrap();

        assert_eq!(shape, Shape { x: 1 });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blocking_verbs_with_text() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(8)
            .returning(|request| Ok(RawResponse::new(StatusCode::OK, request.method.to_string())));
        let client = HttpLight::with_transport(transport);
        let url = "http://api/items";

        assert_eq!(client.delete_blocking::<Text>(url).unwrap(), "DELETE");
        assert_eq!(client.post_blocking::<Text>(url, "b").unwrap(), "POST");
        assert_eq!(client.put_blocking::<Text>(url, "b").unwrap(), "PUT");
        assert_eq!(client.patch_blocking::<Text>(url, "b").unwrap(), "PATCH");
        assert_eq!(
            client.post_form_blocking::<Text>(url, FormData::new().text("a", "1")).unwrap(),
            "POST"
        );
        assert_eq!(
            client.put_form_blocking::<Text>(url, FormData::new()).unwrap(),
            "PUT"
        );
        assert_eq!(
            client.patch_form_blocking::<Text>(url, FormData::new()).unwrap(),
            "PATCH"
        );
        assert_eq!(
            client.send_blocking::<Text>(HttpRequest::get(url)).unwrap(),
            "GET"
        );
    }

    #[test]
    fn test_blocking_retry_variants_recover() {
        let policy = RetryPolicy::from_millis(3, 1);
        let url = "http://api/items";

        let calls_per_variant: Vec<usize> = (0..6)
            .map(|variant| {
                let (transport, calls) = flaky_transport(1);
                let client = HttpLight::with_transport(transport);
                let result = match variant {
                    0 => client.get_with_retry_blocking::<Json<Shape>>(url, policy),
                    1 => client.delete_with_retry_blocking::<Json<Shape>>(url, policy),
                    2 => client.post_with_retry_blocking::<Json<Shape>>(url, "b", policy),
                    3 => client.put_with_retry_blocking::<Json<Shape>>(url, "b", policy),
                    4 => client.patch_with_retry_blocking::<Json<Shape>>(url, "b", policy),
                    _ => {
                        let request = HttpRequest::get(url);
                        client.send_with_retry_blocking::<Json<Shape>>(request, policy)
                    }
                };
                assert_eq!(result.unwrap(), Shape { x: 1 });
                calls.load(Ordering::SeqCst)
            })
            .collect();

        assert_eq!(calls_per_variant, vec![2; 6]);
    }

    #[test]
    fn test_blocking_retry_waits_between_attempts() {
        let (transport, calls) = flaky_transport(usize::MAX);
        let client = HttpLight::with_transport(transport);
        let delay = Duration::from_millis(50);

        let start = Instant::now();
        let policy = RetryPolicy::new(3, delay);
        let result = client.get_with_retry_blocking::<Json<Shape>>("http://api", policy);

        assert!(matches!(result, Err(HttpLightError::RetryExhausted { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= delay * 2);
    }

    #[test]
    fn test_blocking_matches_async_outcomes() {
        let policy = RetryPolicy::from_millis(3, 1);

        for failures in [0, 1, 2, 3, 5] {
            let (transport, blocking_calls) = flaky_transport(failures);
            let client = HttpLight::with_transport(transport);
            let blocking = client.get_with_retry_blocking::<Json<Shape>>("http://api", policy);

            let (transport, async_calls) = flaky_transport(failures);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let async_result = runtime.block_on(async {
                let client = HttpLight::with_transport(transport);
                client
                    .get_with_retry::<Json<Shape>>("http://api", policy, &CancellationToken::new())
                    .await
            });

            assert_eq!(describe(&blocking), describe(&async_result));
            assert_eq!(
                blocking_calls.load(Ordering::SeqCst),
                async_calls.load(Ordering::SeqCst)
            );
        }
    }

    #[test]
    fn test_blocking_plain_call_surfaces_request_failed() {
        let (transport, calls) = flaky_transport(1);
        let client = HttpLight::with_transport(transport);

        let err = client.get_blocking::<Json<Shape>>("http://api").unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blocking_call_inside_runtime_returns_error() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);
        let client = HttpLight::with_transport(transport);

        let err = client.get_blocking::<Text>("http://api").unwrap_err();
        assert!(matches!(err, HttpLightError::BlockingInAsyncContext));

        let err = client
            .post_with_retry_blocking::<Text>("http://api", "b", RetryPolicy::from_millis(3, 1))
            .unwrap_err();
        assert!(matches!(err, HttpLightError::BlockingInAsyncContext));
    }
}
