//! 用户管理接口
//!
//! 读路由只要求登录; 写路由按操作叠加权限码中间件。

mod handler;

use axum::routing::{delete, get, patch, post};
use axum::{Router, middleware};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read = Router::new().nest(
        "/api/v1/users",
        Router::new()
            .route("/", get(handler::list))
            .route("/info", get(handler::info))
            .route("/{id}", get(handler::get_by_id))
            .route("/{id}/password", patch(handler::update_password)),
    );

    let create = Router::new()
        .nest("/api/v1/users", Router::new().route("/", post(handler::create)))
        .layer(middleware::from_fn(require_permission("user:create")));

    let update = Router::new()
        .nest("/api/v1/users", Router::new().route("/{id}", patch(handler::update)))
        .layer(middleware::from_fn(require_permission("user:update")));

    let remove = Router::new()
        .nest("/api/v1/users", Router::new().route("/{id}", delete(handler::remove)))
        .layer(middleware::from_fn(require_permission("user:delete")));

    read.merge(create).merge(update).merge(remove)
}
