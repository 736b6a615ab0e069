//! 健康检查

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/v1/health", get(health))
}

/// GET /api/v1/health - 存活探针, 无需认证
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "admin-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
