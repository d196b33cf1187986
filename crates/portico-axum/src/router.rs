//! Router adapter and the handler bridge into the engine.
//!
//! [`EngineRouter`] implements the neutral
//! [`Router`](portico_core::Router) trait over a scope of the server-owned
//! engine route table. Every registration wraps the neutral handler in an
//! adapter closure that:
//!
//! 1. collects the request body and builds a fresh
//!    [`Context`](portico_core::Context) around the native request,
//! 2. invokes the neutral handler, and
//! 3. on failure writes the uniform error envelope (status `500`, body
//!    `{"error": "<message>"}`) and ends engine-side processing of that
//!    request. Handlers never write their own 500s for unexpected
//!    failures.
//!
//! # Engine routing rules
//!
//! Paths use the engine's `:name` parameter syntax and must start with
//! `/`. The engine resolves route conflicts at registration time: adding a
//! second handler for an already-registered method + path pair panics, so
//! the first registration wins and a conflicting later one fails fast
//! during composition, never at request time.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{RawPathParams, Request};
use axum::response::Response;
use axum::routing::{self, MethodFilter};
use bytes::Bytes;
use http::StatusCode;

use portico_core::{Context, HandlerFn, Router};

/// Largest request body the adapter will collect, matching the engine's
/// default extractor limit.
pub(crate) const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Router adapter over a scope of the engine's route table.
///
/// The root adapter covers the whole table; [`Router::group`] derives
/// prefixed sub-scopes. All scopes write into the single table owned by
/// [`AxumServer`](crate::AxumServer); the borrow on the table ties every
/// adapter to the registration pass that created it.
pub struct EngineRouter<'a> {
    table: &'a mut Option<axum::Router>,
    prefix: String,
}

impl<'a> EngineRouter<'a> {
    /// Creates the root adapter over an open route table.
    pub(crate) fn root(table: &'a mut Option<axum::Router>) -> Self {
        Self {
            table,
            prefix: String::new(),
        }
    }

    fn register(&mut self, filter: MethodFilter, path: &str, handler: HandlerFn) {
        let path = join_paths(&self.prefix, path);
        let table = self
            .table
            .take()
            .expect("route table is open until the server starts");
        *self.table = Some(table.route(&path, routing::on(filter, adapt(handler))));
    }
}

impl Router for EngineRouter<'_> {
    fn get(&mut self, path: &str, handler: HandlerFn) {
        self.register(MethodFilter::GET, path, handler);
    }

    fn post(&mut self, path: &str, handler: HandlerFn) {
        self.register(MethodFilter::POST, path, handler);
    }

    fn put(&mut self, path: &str, handler: HandlerFn) {
        self.register(MethodFilter::PUT, path, handler);
    }

    fn delete(&mut self, path: &str, handler: HandlerFn) {
        self.register(MethodFilter::DELETE, path, handler);
    }

    fn patch(&mut self, path: &str, handler: HandlerFn) {
        self.register(MethodFilter::PATCH, path, handler);
    }

    fn group<'s>(&'s mut self, prefix: &str) -> Box<dyn Router + 's> {
        Box::new(EngineRouter {
            table: &mut *self.table,
            prefix: join_paths(&self.prefix, prefix),
        })
    }
}

/// Joins a scope prefix and a path, inserting a `/` when the path lacks
/// one.
fn join_paths(prefix: &str, path: &str) -> String {
    let mut joined = String::with_capacity(prefix.len() + path.len() + 1);
    joined.push_str(prefix);
    if !path.is_empty() && !path.starts_with('/') {
        joined.push('/');
    }
    joined.push_str(path);
    joined
}

/// Wraps a neutral handler into an engine-native handler.
fn adapt(handler: HandlerFn) -> impl Fn(RawPathParams, Request) -> DispatchFuture + Clone {
    move |params, request| {
        let handler = Arc::clone(&handler);
        Box::pin(dispatch(handler, params, request))
    }
}

type DispatchFuture = std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>;

/// Drives one request through a neutral handler.
async fn dispatch(handler: HandlerFn, params: RawPathParams, request: Request) -> Response {
    let params: HashMap<String, String> = params
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(error = %error, "failed to read request body");
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("failed to read request body: {error}"),
            );
        }
    };

    let ctx = Context::new(parts, params, body);
    // Cancels the request token when this future is dropped, whether by
    // client disconnect or by completion.
    let _cancel_on_drop = ctx.cancellation().clone().drop_guard();

    match handler(ctx.clone()).await {
        Ok(()) => into_engine_response(ctx.take_response()),
        Err(error) => {
            tracing::error!(error = %error, "handler reported failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
        }
    }
}

/// Converts the neutral response into an engine response.
fn into_engine_response(response: http::Response<Bytes>) -> Response {
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::from(body))
}

/// Builds the uniform JSON error envelope.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use http::Method;
    use portico_core::{handler_fn, HandlerError};
    use portico_config::Mode;
    use serde::Deserialize;
    use tower::ServiceExt;

    fn build(register: impl FnOnce(&mut dyn Router)) -> axum::Router {
        let mut table = Some(axum::Router::new());
        let mut root = EngineRouter::root(&mut table);
        register(&mut root);
        crate::server::seal(table.take().expect("table open"), Mode::Test)
    }

    async fn send(
        app: axum::Router,
        method: Method,
        uri: &str,
        body: &str,
    ) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");

        let response = app.oneshot(request).await.expect("infallible service");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("body");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_reported_failure_becomes_uniform_500() {
        let app = build(|router| {
            router.get(
                "/fail",
                handler_fn(|_ctx| async { Err(HandlerError::msg("boom")) }),
            );
        });

        let (status, body) = send(app, Method::GET, "/fail", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"boom"}"#);
    }

    #[tokio::test]
    async fn test_panic_is_recovered_and_server_keeps_serving() {
        let app = build(|router| {
            router.get(
                "/panic",
                handler_fn(|_ctx: Context| async move { panic!("kaboom") }),
            );
            router.get(
                "/ok",
                handler_fn(|ctx: Context| async move {
                    ctx.string(StatusCode::OK, "still alive");
                    Ok(())
                }),
            );
        });

        let (status, body) = send(app.clone(), Method::GET, "/panic", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let envelope: serde_json::Value = serde_json::from_str(&body).expect("json envelope");
        assert!(envelope.get("error").is_some());

        let (status, body) = send(app, Method::GET, "/ok", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "still alive");
    }

    #[tokio::test]
    async fn test_group_prefixes_routes() {
        let app = build(|router| {
            let mut api = router.group("/api");
            api.get(
                "/users",
                handler_fn(|ctx: Context| async move {
                    ctx.string(StatusCode::OK, "users");
                    Ok(())
                }),
            );
            let mut v2 = api.group("/v2");
            v2.get(
                "/users",
                handler_fn(|ctx: Context| async move {
                    ctx.string(StatusCode::OK, "users v2");
                    Ok(())
                }),
            );
        });

        let (status, body) = send(app.clone(), Method::GET, "/api/users", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "users");

        let (status, body) = send(app.clone(), Method::GET, "/api/v2/users", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "users v2");

        let (status, _) = send(app, Method::GET, "/users", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_params_and_query_reach_the_handler() {
        let app = build(|router| {
            router.get(
                "/users/:id",
                handler_fn(|ctx: Context| async move {
                    let reply = format!(
                        "{}/{}",
                        ctx.param("id"),
                        ctx.query_default("verbose", "no")
                    );
                    ctx.string(StatusCode::OK, &reply);
                    Ok(())
                }),
            );
        });

        let (status, body) = send(app.clone(), Method::GET, "/users/42?verbose=yes", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "42/yes");

        let (_, body) = send(app, Method::GET, "/users/42", "").await;
        assert_eq!(body, "42/no");
    }

    #[tokio::test]
    async fn test_body_binding_through_the_adapter() {
        #[derive(Deserialize, serde::Serialize)]
        struct Echo {
            message: String,
        }

        let app = build(|router| {
            router.post(
                "/echo",
                handler_fn(|ctx: Context| async move {
                    let payload: Echo = ctx.bind_json()?;
                    ctx.json(StatusCode::OK, &payload)?;
                    Ok(())
                }),
            );
        });

        let (status, body) =
            send(app.clone(), Method::POST, "/echo", r#"{"message":"hi"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"message":"hi"}"#);

        // Malformed body propagates through `?` into the uniform envelope.
        let (status, body) = send(app, Method::POST, "/echo", "not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("invalid JSON body"));
    }

    #[tokio::test]
    async fn test_all_verbs_register() {
        let app = build(|router| {
            let ok = || {
                handler_fn(|ctx: Context| async move {
                    ctx.status(StatusCode::NO_CONTENT);
                    Ok(())
                })
            };
            router.post("/r", ok());
            router.put("/r", ok());
            router.delete("/r", ok());
            router.patch("/r", ok());
        });

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let (status, _) = send(app.clone(), method, "/r", "").await;
            assert_eq!(status, StatusCode::NO_CONTENT);
        }

        // Unregistered verb on a known path is rejected by the engine.
        let (status, _) = send(app, Method::GET, "/r", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_silent_handler_yields_empty_ok() {
        let app = build(|router| {
            router.get("/quiet", handler_fn(|_ctx| async { Ok(()) }));
        });

        let (status, body) = send(app, Method::GET, "/quiet", "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
    }

    #[test]
    #[should_panic(expected = "Overlapping method route")]
    fn test_duplicate_route_fails_fast_at_registration() {
        let _ = build(|router| {
            router.get("/x", handler_fn(|_ctx| async { Ok(()) }));
            router.get("/x", handler_fn(|_ctx| async { Ok(()) }));
        });
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("", "/users"), "/users");
        assert_eq!(join_paths("/api", "/users"), "/api/users");
        assert_eq!(join_paths("/api", "users"), "/api/users");
        assert_eq!(join_paths("", "/"), "/");
    }
}
