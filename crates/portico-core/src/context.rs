//! Per-request context.
//!
//! A [`Context`] wraps one in-flight request/response exchange behind an
//! engine-independent surface. The binding constructs a fresh `Context` for
//! every inbound request and discards it when the handler returns; it is
//! never shared across requests or retained beyond the handler invocation.
//!
//! The request side is immutable (`http::request::Parts`, the collected body
//! bytes, and the extracted path parameters). The response side is built up
//! through the side-effecting writers ([`Context::status`],
//! [`Context::set_header`], [`Context::json`], [`Context::string`],
//! [`Context::writer`]) and collected by the binding once the handler
//! completes. Writing a response twice is not guarded against: the last
//! write wins, and avoiding double writes is caller responsibility.
//!
//! # Example
//!
//! ```rust
//! use http::StatusCode;
//! use portico_core::Context;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Greeting {
//!     message: String,
//! }
//!
//! # fn demo(ctx: &Context) -> Result<(), portico_core::HandlerError> {
//! let name = ctx.query_default("name", "world");
//! let body = Greeting { message: format!("hello, {name}") };
//! ctx.json(StatusCode::OK, &body)?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::{BindError, HandlerError};

/// Immutable request-side state, shared by all clones of a [`Context`].
#[derive(Debug)]
struct RequestState {
    parts: Parts,
    body: Bytes,
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
    cancel: CancellationToken,
}

/// The response under construction.
#[derive(Debug, Default)]
struct ResponseState {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

/// Per-request wrapper exposing a neutral request/response contract.
///
/// `Context` is a cheap `Clone` handle: the request side sits behind an
/// `Arc`, the response side behind an `Arc<Mutex<_>>`, so a handler can move
/// a clone into spawned work. All clones observe the same response state.
#[derive(Debug, Clone)]
pub struct Context {
    request: Arc<RequestState>,
    response: Arc<Mutex<ResponseState>>,
}

impl Context {
    /// Creates a context around one request.
    ///
    /// Called by the engine binding with the request head, the extracted
    /// path parameters, and the fully collected body. The query string is
    /// parsed once here; a malformed query yields no parameters rather than
    /// an error.
    #[must_use]
    pub fn new(parts: Parts, params: HashMap<String, String>, body: Bytes) -> Self {
        let query = parts
            .uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .unwrap_or_default();

        Self {
            request: Arc::new(RequestState {
                parts,
                body,
                params,
                query,
                cancel: CancellationToken::new(),
            }),
            response: Arc::new(Mutex::new(ResponseState::default())),
        }
    }

    /// Returns an immutable view of the request head.
    ///
    /// Method, URI, headers, and protocol version: everything except the
    /// body, which is reached through the binding operations.
    #[must_use]
    pub fn request(&self) -> &Parts {
        &self.request.parts
    }

    /// Returns the raw request body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.request.body
    }

    /// Returns the request's cancellation token.
    ///
    /// The token is cancelled when the client disconnects or the request
    /// completes. Handlers performing downstream calls must propagate it so
    /// that work spawned outside the handler future is cancelled too; work
    /// awaited inside the handler is dropped with the request by the
    /// runtime.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.request.cancel
    }

    /// Retrieves a URL path parameter by name.
    ///
    /// Returns the empty string when the parameter is absent.
    #[must_use]
    pub fn param(&self, name: &str) -> &str {
        self.request
            .params
            .get(name)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Retrieves a URL query parameter by name.
    ///
    /// When the key appears multiple times the first occurrence wins.
    /// Returns the empty string when the key is absent.
    #[must_use]
    pub fn query(&self, name: &str) -> &str {
        self.request
            .query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Retrieves a URL query parameter, falling back to `default` when the
    /// key is absent.
    #[must_use]
    pub fn query_default<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.request
            .query
            .iter()
            .find(|(key, _)| key == name)
            .map_or(default, |(_, value)| value.as_str())
    }

    /// Retrieves a request header by name.
    ///
    /// Returns the empty string when the header is absent or its value is
    /// not valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> &str {
        self.request
            .parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
    }

    /// Sets a response header.
    ///
    /// Invalid header names or values are dropped rather than surfaced; the
    /// neutral contract keeps header writes infallible.
    pub fn set_header(&self, name: &str, value: &str) {
        let Ok(name) = HeaderName::try_from(name) else {
            tracing::debug!(header = name, "dropping invalid response header name");
            return;
        };
        let Ok(value) = HeaderValue::try_from(value) else {
            tracing::debug!(header = %name, "dropping invalid response header value");
            return;
        };
        self.response.lock().headers.insert(name, value);
    }

    /// Sets the response status code without touching the body.
    pub fn status(&self, code: StatusCode) {
        self.response.lock().status = code;
    }

    /// Deserializes the request body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Json`] when the body is malformed or does not
    /// match `T`. The target is returned by value, so a failed bind leaves
    /// no partially-mutated state behind.
    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        Ok(serde_json::from_slice(&self.request.body)?)
    }

    /// Deserializes the request body into `T` according to its content type.
    ///
    /// `application/json` binds as JSON, `application/x-www-form-urlencoded`
    /// as form data.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::UnsupportedContentType`] for any other content
    /// type, and the format-specific variants for malformed payloads.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        let content_type = self.header(CONTENT_TYPE.as_str());
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "application/json" => self.bind_json(),
            "application/x-www-form-urlencoded" => {
                Ok(serde_urlencoded::from_bytes(&self.request.body)?)
            }
            _ => Err(BindError::UnsupportedContentType(content_type.to_string())),
        }
    }

    /// Writes a complete JSON response: status, `Content-Type`, and the
    /// serialized body.
    ///
    /// # Errors
    ///
    /// Returns a [`HandlerError`] when `body` fails to serialize; nothing is
    /// written in that case.
    pub fn json<T: Serialize>(&self, code: StatusCode, body: &T) -> Result<(), HandlerError> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| HandlerError::msg(format!("failed to serialize response: {e}")))?;
        let mut response = self.response.lock();
        response.status = code;
        response.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response.body = BytesMut::from(&payload[..]);
        Ok(())
    }

    /// Writes a complete plain-text response: status, `Content-Type`, and
    /// the given text.
    pub fn string(&self, code: StatusCode, text: &str) {
        let mut response = self.response.lock();
        response.status = code;
        response.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response.body = BytesMut::from(text.as_bytes());
    }

    /// Returns a raw writer appending to the response body.
    ///
    /// Escape hatch for handlers needing direct byte-stream control. The
    /// writer holds the response lock, so it must be dropped before any
    /// other response operation (the guard is not `Send`, which keeps it
    /// from being held across `.await` points in spawned handlers).
    #[must_use]
    pub fn writer(&self) -> BodyWriter<'_> {
        BodyWriter {
            guard: self.response.lock(),
        }
    }

    /// Consumes the accumulated response state into an `http` response.
    ///
    /// Called by the binding after the handler returns. A handler that
    /// wrote nothing yields `200 OK` with an empty body.
    #[must_use]
    pub fn take_response(&self) -> http::Response<Bytes> {
        let state = std::mem::take(&mut *self.response.lock());
        let mut response = http::Response::new(state.body.freeze());
        *response.status_mut() = state.status;
        *response.headers_mut() = state.headers;
        response
    }
}

/// Raw byte-stream writer over the response body.
///
/// Created by [`Context::writer`].
pub struct BodyWriter<'a> {
    guard: MutexGuard<'a, ResponseState>,
}

impl io::Write for BodyWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
