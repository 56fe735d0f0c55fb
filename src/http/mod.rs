//! HTTP plumbing: request descriptors, the transport seam and response materialization.

mod request;
mod response;
mod transport;

pub use request::{
    FormContent, FormData, FormPart, HttpRequest, JSON_CONTENT_TYPE, RequestBody,
    TEXT_CONTENT_TYPE,
};
pub use response::{Json, RawResponse, ResponseFormat, Text, materialize};
pub use transport::{ReqwestTransport, Transport};

#[cfg(test)]
pub use transport::MockTransport;
