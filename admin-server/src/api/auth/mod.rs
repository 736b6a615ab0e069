//! 认证接口
//!
//! login/refresh 是公共路由, require_auth 按路径放行。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v1/auth/login", post(handler::login))
        .route("/api/v1/auth/refresh", post(handler::refresh))
}
