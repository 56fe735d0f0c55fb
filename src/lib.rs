//! Lightweight HTTP client facade.
//!
//! [`HttpLight`] wraps a [`Transport`] (by default `reqwest`) with one method per
//! HTTP verb. Each method comes in an async and a `_blocking` form, an optional
//! `_with_retry` form that retries any failure a fixed number of times with a
//! fixed delay, and decodes the response into the format chosen by the caller.
//!
//! ```no_run
//! use httplight::{HttpLight, Json, RetryPolicy, Text};
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(serde::Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! # async fn run() -> Result<(), httplight::HttpLightError> {
//! let mut client = HttpLight::new()?;
//! client.set_bearer_token("secret")?;
//!
//! let cancel = CancellationToken::new();
//! let policy = RetryPolicy::default();
//! let user = client
//!     .get_with_retry::<Json<User>>("https://example.com/users/1", policy, &cancel)
//!     .await?;
//! let page = client.get::<Text>("https://example.com/", &cancel).await?;
//! # let _ = (user.name, page);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod retry;

pub use client::HttpLight;
pub use config::HttpLightConfig;
pub use error::HttpLightError;
pub use http::{
    FormData, HttpRequest, Json, RawResponse, ReqwestTransport, RequestBody, ResponseFormat, Text,
    Transport,
};
pub use retry::{RetryPolicy, with_retry};
