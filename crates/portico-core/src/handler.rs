//! Handler types and the aggregation collection.
//!
//! Two levels of "handler" exist in the contract:
//!
//! - [`HandlerFn`]: one neutral request handler, invoked with a fresh
//!   [`Context`] per request.
//! - [`Handler`]: the capability a component implements to contribute
//!   routes: "register my routes against a [`Router`]". Any number of
//!   independently-constructed components produce `Handler` values, which
//!   are collected into one ordered [`HandlerSet`] and resolved exactly
//!   once at composition time, strictly before the server starts.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use http::StatusCode;
//! use portico_core::{handler_fn, Context, Handler, HandlerSet, Router};
//!
//! struct Ping;
//!
//! impl Handler for Ping {
//!     fn register_routes(&self, router: &mut dyn Router) {
//!         router.get(
//!             "/ping",
//!             handler_fn(|ctx: Context| async move {
//!                 ctx.string(StatusCode::OK, "pong");
//!                 Ok(())
//!             }),
//!         );
//!     }
//! }
//!
//! let set = HandlerSet::new().with(Arc::new(Ping));
//! assert_eq!(set.len(), 1);
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::HandlerError;
use crate::router::Router;

/// The future returned by a neutral handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send>>;

/// A neutral request handler.
///
/// Receives a fresh [`Context`] per request. Returning `Err` triggers the
/// binding's uniform error translation: a `500` response with body
/// `{"error": "<message>"}`.
pub type HandlerFn = Arc<dyn Fn(Context) -> HandlerFuture + Send + Sync>;

/// Wraps an async closure into a [`HandlerFn`].
///
/// This is the ergonomic entry point for route registration; it erases the
/// closure's concrete future type.
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// The route-contribution capability.
///
/// A `Handler` is a unit of application logic exposing exactly one
/// operation: registering its routes against a [`Router`]. Implementations
/// are collected into a [`HandlerSet`] and invoked once each, in
/// contribution order, before the server starts listening.
pub trait Handler: Send + Sync {
    /// Registers this component's routes against `router`.
    fn register_routes(&self, router: &mut dyn Router);
}

/// An ordered collection of contributed [`Handler`]s.
///
/// Registration order is the contribution order and is deterministic for a
/// given startup sequence; engines that resolve conflicting routes by
/// registration position therefore behave reproducibly.
#[derive(Default)]
pub struct HandlerSet {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerSet {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler, preserving contribution order.
    #[must_use]
    pub fn with(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Appends a handler in place.
    pub fn add(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of contributed handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handlers have been contributed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Appends another collection's handlers after this one's, preserving
    /// both contribution orders.
    #[must_use]
    pub fn merge(mut self, other: HandlerSet) -> Self {
        self.handlers.extend(other.handlers);
        self
    }

    /// Invokes every handler's registration capability, in contribution
    /// order.
    ///
    /// This performs no routing logic of its own; it only guarantees that
    /// all contributed handlers are registered before the caller opens the
    /// listener.
    pub fn register_all(&self, router: &mut dyn Router) {
        for handler in &self.handlers {
            handler.register_routes(router);
        }
    }
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSet")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use http::StatusCode;

    /// A router that records registrations instead of wiring an engine.
    #[derive(Default)]
    struct RecordingRouter {
        prefix: String,
        log: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl Router for RecordingRouter {
        fn get(&mut self, path: &str, _handler: HandlerFn) {
            self.log
                .borrow_mut()
                .push(format!("GET {}{}", self.prefix, path));
        }

        fn post(&mut self, path: &str, _handler: HandlerFn) {
            self.log
                .borrow_mut()
                .push(format!("POST {}{}", self.prefix, path));
        }

        fn put(&mut self, path: &str, _handler: HandlerFn) {
            self.log
                .borrow_mut()
                .push(format!("PUT {}{}", self.prefix, path));
        }

        fn delete(&mut self, path: &str, _handler: HandlerFn) {
            self.log
                .borrow_mut()
                .push(format!("DELETE {}{}", self.prefix, path));
        }

        fn patch(&mut self, path: &str, _handler: HandlerFn) {
            self.log
                .borrow_mut()
                .push(format!("PATCH {}{}", self.prefix, path));
        }

        fn group<'a>(&'a mut self, prefix: &str) -> Box<dyn Router + 'a> {
            Box::new(Self {
                prefix: format!("{}{}", self.prefix, prefix),
                log: std::rc::Rc::clone(&self.log),
            })
        }
    }

    struct NamedHandler {
        path: &'static str,
    }

    impl Handler for NamedHandler {
        fn register_routes(&self, router: &mut dyn Router) {
            router.get(self.path, noop());
        }
    }

    fn noop() -> HandlerFn {
        handler_fn(|_ctx| async { Ok(()) })
    }

    #[tokio::test]
    async fn test_handler_fn_invocation() {
        let handler = handler_fn(|ctx: Context| async move {
            ctx.string(StatusCode::OK, "done");
            Ok(())
        });

        let (parts, ()) = http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = Context::new(parts, std::collections::HashMap::new(), bytes::Bytes::new());

        handler(ctx.clone()).await.expect("handler succeeds");
        assert_eq!(ctx.take_response().body(), "done");
    }

    #[tokio::test]
    async fn test_handler_fn_propagates_error() {
        let handler = handler_fn(|_ctx: Context| async { Err(HandlerError::msg("boom")) });

        let (parts, ()) = http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();
        let ctx = Context::new(parts, std::collections::HashMap::new(), bytes::Bytes::new());

        let err = handler(ctx).await.expect_err("handler fails");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_handler_set_empty() {
        let set = HandlerSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_handler_set_preserves_contribution_order() {
        let set = HandlerSet::new()
            .with(Arc::new(NamedHandler { path: "/first" }))
            .with(Arc::new(NamedHandler { path: "/second" }))
            .with(Arc::new(NamedHandler { path: "/third" }));

        let mut router = RecordingRouter::default();
        set.register_all(&mut router);

        assert_eq!(
            *router.log.borrow(),
            vec!["GET /first", "GET /second", "GET /third"]
        );
    }

    #[test]
    fn test_handler_set_add_in_place() {
        let mut set = HandlerSet::new();
        set.add(Arc::new(NamedHandler { path: "/a" }));
        set.add(Arc::new(NamedHandler { path: "/b" }));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_group_prefixes_registrations() {
        struct Grouped;

        impl Handler for Grouped {
            fn register_routes(&self, router: &mut dyn Router) {
                let mut api = router.group("/api");
                api.get("/users", noop());
                let mut admin = api.group("/admin");
                admin.post("/reset", noop());
            }
        }

        let mut router = RecordingRouter::default();
        HandlerSet::new()
            .with(Arc::new(Grouped))
            .register_all(&mut router);

        assert_eq!(
            *router.log.borrow(),
            vec!["GET /api/users", "POST /api/admin/reset"]
        );
    }

    #[test]
    fn test_handler_set_merge_keeps_order() {
        let first = HandlerSet::new()
            .with(Arc::new(NamedHandler { path: "/one" }))
            .with(Arc::new(NamedHandler { path: "/two" }));
        let second = HandlerSet::new().with(Arc::new(NamedHandler { path: "/three" }));

        let merged = first.merge(second);
        let mut router = RecordingRouter::default();
        merged.register_all(&mut router);

        assert_eq!(
            *router.log.borrow(),
            vec!["GET /one", "GET /two", "GET /three"]
        );
    }

    #[test]
    fn test_handler_set_debug() {
        let set = HandlerSet::new().with(Arc::new(NamedHandler { path: "/x" }));
        assert!(format!("{set:?}").contains("HandlerSet"));
    }
}
