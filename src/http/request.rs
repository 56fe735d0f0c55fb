//! Request descriptors handed to a [`Transport`](super::Transport).

use anyhow::{Context, Result};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use std::time::Duration;

/// Content type used for plain string bodies.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Content type used for bodies built with [`RequestBody::json`].
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A transport-independent HTTP request.
///
/// Requests are cheap to clone so a retried call can rebuild the wire request
/// for every attempt.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    /// Overrides the facade timeout for this request only.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// Adds a header, replacing any previous value with the same name.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name: {}", name))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// String content sent with the given content type.
    Text {
        content: String,
        content_type: String,
    },
    /// Multi-part form data.
    Form(FormData),
}

impl RequestBody {
    pub fn text(content: impl Into<String>) -> Self {
        RequestBody::Text {
            content: content.into(),
            content_type: TEXT_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_content_type(content: impl Into<String>, content_type: impl Into<String>) -> Self {
        RequestBody::Text {
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// Serializes `value` to JSON and marks the body as `application/json`.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let content = serde_json::to_string(value).context("Failed to serialize JSON body")?;
        Ok(Self::with_content_type(content, JSON_CONTENT_TYPE))
    }
}

impl From<String> for RequestBody {
    fn from(content: String) -> Self {
        RequestBody::text(content)
    }
}

impl From<&str> for RequestBody {
    fn from(content: &str) -> Self {
        RequestBody::text(content)
    }
}

impl From<FormData> for RequestBody {
    fn from(form: FormData) -> Self {
        RequestBody::Form(form)
    }
}

/// An ordered set of multi-part form fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

/// A single named field of a multi-part form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub content: FormContent,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            content: FormContent::Text(value.into()),
            file_name: None,
            mime_type: None,
        });
        self
    }

    /// Adds a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        mime_type: Option<&str>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            content: FormContent::Bytes(bytes.into()),
            file_name: Some(file_name.into()),
            mime_type: mime_type.map(str::to_string),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Builds the `reqwest` form for one send attempt.
    pub fn to_multipart(&self) -> Result<Form> {
        let mut form = Form::new();
        for part in &self.parts {
            let mut wire = match &part.content {
                FormContent::Text(text) => Part::text(text.clone()),
                FormContent::Bytes(bytes) => Part::bytes(bytes.clone()),
            };
            if let Some(file_name) = &part.file_name {
                wire = wire.file_name(file_name.clone());
            }
            if let Some(mime) = &part.mime_type {
                wire = wire
                    .mime_str(mime)
                    .with_context(|| format!("Invalid MIME type for form field {}", part.name))?;
            }
            form = form.part(part.name.clone(), wire);
        }
        Ok(form)
    }
}
