//! Error taxonomy for the server contract.
//!
//! Three failure families cross the neutral boundary:
//!
//! - [`ServerError`]: lifecycle failures a caller can act on
//!   programmatically (bind failure, double start, shutdown timeout).
//! - [`HandlerError`]: a handler reporting failure; the binding translates
//!   it into a uniform 500 JSON response, never into a transport-level
//!   failure.
//! - [`BindError`]: request-body binding failures, convertible into
//!   [`HandlerError`] so `ctx.bind_json()?` propagates naturally.

use std::time::Duration;

use thiserror::Error;

/// Lifecycle errors surfaced by a [`Server`](crate::Server) implementation.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be bound to the configured address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address the bind was attempted on.
        addr: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// `start` was called more than once, or the route table was accessed
    /// after `start` consumed it.
    #[error("server already started")]
    AlreadyStarted,

    /// Graceful shutdown could not drain in-flight requests within the
    /// grace period; remaining connections were force-closed.
    #[error("graceful shutdown timed out after {0:?}")]
    ShutdownTimeout(Duration),
}

/// A failure reported by an application handler.
///
/// The binding converts any `HandlerError` into a `500` response with body
/// `{"error": "<message>"}` where `<message>` is this error's `Display`
/// output. Handlers that want a different status write the response
/// themselves and return `Ok(())`.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A plain failure message.
    #[error("{0}")]
    Message(String),

    /// The request body could not be bound.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Any other failure, carried as an [`anyhow::Error`] source.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Creates a handler error from a plain message.
    ///
    /// # Example
    ///
    /// ```rust
    /// use portico_core::HandlerError;
    ///
    /// let err = HandlerError::msg("boom");
    /// assert_eq!(err.to_string(), "boom");
    /// ```
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// A request-body binding failure.
///
/// Produced by [`Context::bind_json`](crate::Context::bind_json) and
/// [`Context::bind`](crate::Context::bind) on malformed or type-mismatched
/// payloads.
#[derive(Debug, Error)]
pub enum BindError {
    /// The body was not valid JSON, or did not match the target type.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The body was not a valid URL-encoded form, or did not match the
    /// target type.
    #[error("invalid form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// The request carried a content type no binder understands.
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
}
