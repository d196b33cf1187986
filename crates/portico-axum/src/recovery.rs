//! Panic recovery for request handlers.
//!
//! Installed on the engine when the route table is sealed, so a panicking
//! handler never crashes the process or the accept loop. A recovered panic
//! is indistinguishable from a reported handler failure on the wire (the
//! same 500 JSON envelope) but is logged with `recovered = true` so the
//! two failure kinds stay separable in observability.

use std::any::Any;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;

/// Translates a recovered panic payload into the uniform error envelope.
pub(crate) fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> http::Response<Full<Bytes>> {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("opaque panic payload");
    tracing::error!(recovered = true, panic = %detail, "handler panicked");

    let body = serde_json::json!({ "error": "internal server error" }).to_string();
    http::Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| http::Response::new(Full::new(Bytes::new())))
}
