//! The built-in health route.
//!
//! `GET /health` is registered at server construction, before any
//! application routes, and succeeds whenever the server is listening. The
//! body carries the crate name and version for probe debugging; callers
//! should rely only on the status code.

use axum::Json;
use serde::Serialize;

/// Payload returned by `GET /health`.
#[derive(Debug, Serialize)]
pub(crate) struct HealthStatus {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Handles `GET /health`.
pub(crate) async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_payload() {
        let Json(status) = health().await;
        assert_eq!(status.status, "ok");
        assert_eq!(status.service, env!("CARGO_PKG_NAME"));
    }
}
