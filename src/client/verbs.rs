//! Async verb entry points.
//!
//! Every method picks its response format through the `F` type parameter:
//! `client.get::<Json<User>>(..)` parses JSON, `client.get::<Text>(..)` returns
//! the body as-is.

use tokio_util::sync::CancellationToken;

use super::HttpLight;
use crate::error::HttpLightError;
use crate::http::{FormData, HttpRequest, RequestBody, ResponseFormat, Transport};
use crate::retry::RetryPolicy;

impl<T: Transport> HttpLight<T> {
    // GET

    /// Sends a GET request and decodes the response as `F`.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get<F: ResponseFormat>(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        self.execute::<F>(HttpRequest::get(url), cancel).await
    }

    /// GET with up to `policy.max_attempts()` attempts.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn get_with_retry<F: ResponseFormat>(
        &self,
        url: &str,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::get(url);
        self.execute_with_retry::<F>(request, policy, cancel).await
    }

    // DELETE

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete<F: ResponseFormat>(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        self.execute::<F>(HttpRequest::delete(url), cancel).await
    }

    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete_with_retry<F: ResponseFormat>(
        &self,
        url: &str,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::delete(url);
        self.execute_with_retry::<F>(request, policy, cancel).await
    }

    // POST

    /// Sends `body` with a POST request. Strings go out as `text/plain`;
    /// use [`RequestBody::json`] or [`RequestBody::with_content_type`] for others.
    #[tracing::instrument(skip(self, body, cancel))]
    pub async fn post<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::post(url).body(body);
        self.execute::<F>(request, cancel).await
    }

    /// Sends a multi-part form with a POST request.
    #[tracing::instrument(skip(self, form, cancel))]
    pub async fn post_form<F: ResponseFormat>(
        &self,
        url: &str,
        form: FormData,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::post(url).body(form);
        self.execute::<F>(request, cancel).await
    }

    #[tracing::instrument(skip(self, body, cancel))]
    pub async fn post_with_retry<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::post(url).body(body);
        self.execute_with_retry::<F>(request, policy, cancel).await
    }

    // PUT

    #[tracing::instrument(skip(self, body, cancel))]
    pub async fn put<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::put(url).body(body);
        self.execute::<F>(request, cancel).await
    }

    #[tracing::instrument(skip(self, form, cancel))]
    pub async fn put_form<F: ResponseFormat>(
        &self,
        url: &str,
        form: FormData,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::put(url).body(form);
        self.execute::<F>(request, cancel).await
    }

    #[tracing::instrument(skip(self, body, cancel))]
    pub async fn put_with_retry<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::put(url).body(body);
        self.execute_with_retry::<F>(request, policy, cancel).await
    }

    // PATCH

    #[tracing::instrument(skip(self, body, cancel))]
    pub async fn patch<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::patch(url).body(body);
        self.execute::<F>(request, cancel).await
    }

    #[tracing::instrument(skip(self, form, cancel))]
    pub async fn patch_form<F: ResponseFormat>(
        &self,
        url: &str,
        form: FormData,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::patch(url).body(form);
        self.execute::<F>(request, cancel).await
    }

    #[tracing::instrument(skip(self, body, cancel))]
    pub async fn patch_with_retry<F: ResponseFormat>(
        &self,
        url: &str,
        body: impl Into<RequestBody>,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        let request = HttpRequest::patch(url).body(body);
        self.execute_with_retry::<F>(request, policy, cancel).await
    }

    // SEND

    /// Sends a fully custom request. Headers set on `request` take precedence
    /// over the facade's default headers and bearer token.
    #[tracing::instrument(
        skip(self, request, cancel),
        fields(method = %request.method, url = %request.url)
    )]
    pub async fn send<F: ResponseFormat>(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        self.execute::<F>(request, cancel).await
    }

    #[tracing::instrument(
        skip(self, request, cancel),
        fields(method = %request.method, url = %request.url)
    )]
    pub async fn send_with_retry<F: ResponseFormat>(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<F::Output, HttpLightError> {
        self.execute_with_retry::<F>(request, policy, cancel).await
    }
}
