//! Socket-level tests for the axum binding: the full composition path from
//! config through handler registration, lifecycle hooks, live requests,
//! and graceful shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::StatusCode;
use portico_axum::HttpModule;
use portico_config::{HttpConfig, Mode};
use portico_core::{handler_fn, Context, Handler, HandlerError, Lifecycle, Router};

struct DemoApi;

impl Handler for DemoApi {
    fn register_routes(&self, router: &mut dyn Router) {
        router.get(
            "/greet/:name",
            handler_fn(|ctx: Context| async move {
                let name = ctx.param("name").to_owned();
                let punctuation = ctx.query_default("punctuation", "!").to_owned();
                ctx.json(
                    StatusCode::OK,
                    &serde_json::json!({ "greeting": format!("hello, {name}{punctuation}") }),
                )?;
                Ok(())
            }),
        );

        router.get(
            "/fail",
            handler_fn(|_ctx| async { Err(HandlerError::msg("boom")) }),
        );

        router.get(
            "/panic",
            handler_fn(|_ctx: Context| async move { panic!("kaboom") }),
        );

        let mut api = router.group("/api");
        api.get(
            "/slow",
            handler_fn(|ctx: Context| async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                ctx.string(StatusCode::OK, "done");
                Ok(())
            }),
        );
    }
}

fn loopback_config() -> HttpConfig {
    HttpConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        mode: Mode::Test,
    }
}

#[tokio::test]
async fn test_module_lifecycle_and_routes() {
    let (server, lifecycle) = HttpModule::new(loopback_config())
        .with_handler(Arc::new(DemoApi))
        .install(Lifecycle::new())
        .expect("install");

    lifecycle.run_startup().await.expect("startup");
    let addr = server.local_addr().expect("listening");
    let base = format!("http://{addr}");
    let client = reqwest::Client::new();

    // Built-in health route always succeeds while listening.
    let response = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("health request");
    assert_eq!(response.status(), 200);

    // Path params and query values flow through the context adapter.
    let response = client
        .get(format!("{base}/greet/ada?punctuation=%3F"))
        .send()
        .await
        .expect("greet request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["greeting"], "hello, ada?");

    // A reported failure becomes the uniform 500 envelope.
    let response = client
        .get(format!("{base}/fail"))
        .send()
        .await
        .expect("fail request");
    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["error"], "boom");

    // A recovered panic produces the same envelope shape, and the server
    // keeps serving afterwards.
    let response = client
        .get(format!("{base}/panic"))
        .send()
        .await
        .expect("panic request");
    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert!(body.get("error").is_some());

    let response = client
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("post-panic request");
    assert_eq!(response.status(), 200);

    lifecycle.run_shutdown().await.expect("shutdown");
    assert!(server.local_addr().is_none());
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_inflight_request_completes_during_stop() {
    let (server, lifecycle) = HttpModule::new(loopback_config())
        .with_handler(Arc::new(DemoApi))
        .install(Lifecycle::new())
        .expect("install");
    lifecycle.run_startup().await.expect("startup");
    let addr = server.local_addr().expect("listening");

    // Put a request in flight, then stop while it is still executing.
    let request = tokio::spawn(async move {
        reqwest::get(format!("http://{addr}/api/slow")).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    server.stop().await.expect("graceful stop");
    assert!(started.elapsed() < Duration::from_secs(5));

    let response = request
        .await
        .expect("client task")
        .expect("in-flight request completes within the grace period");
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.expect("body"), "done");

    // Stopping again remains a no-op.
    assert!(server.stop().await.is_ok());
}

#[tokio::test]
async fn test_stop_before_start_then_full_cycle() {
    let (server, lifecycle) = HttpModule::new(loopback_config())
        .with_handler(Arc::new(DemoApi))
        .install(Lifecycle::new())
        .expect("install");

    // Stop on the unstarted path is a success with no side effect.
    server.stop().await.expect("noop stop");
    assert!(!server.is_listening());

    lifecycle.run_startup().await.expect("startup");
    assert!(server.is_listening());
    lifecycle.run_shutdown().await.expect("shutdown");
    assert!(!server.is_listening());
}
