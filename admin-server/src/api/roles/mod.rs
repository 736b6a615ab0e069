//! 角色管理接口
//!
//! 授权替换 (grant) 与角色编辑是不同的权限码, 路由分组挂各自中间件。

mod handler;

use axum::routing::{delete, get, patch, post};
use axum::{Router, middleware};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read = Router::new().nest(
        "/api/v1/roles",
        Router::new()
            .route("/", get(handler::list))
            .route("/{id}", get(handler::get_by_id))
            .route("/{id}/permissions", get(handler::get_permissions)),
    );

    let create = Router::new()
        .nest("/api/v1/roles", Router::new().route("/", post(handler::create)))
        .layer(middleware::from_fn(require_permission("role:create")));

    let update = Router::new()
        .nest("/api/v1/roles", Router::new().route("/{id}", patch(handler::update)))
        .layer(middleware::from_fn(require_permission("role:update")));

    let grant = Router::new()
        .nest(
            "/api/v1/roles",
            Router::new().route("/{id}/permissions", patch(handler::update_permissions)),
        )
        .layer(middleware::from_fn(require_permission("role:grant")));

    let remove = Router::new()
        .nest("/api/v1/roles", Router::new().route("/{id}", delete(handler::remove)))
        .layer(middleware::from_fn(require_permission("role:delete")));

    read.merge(create).merge(update).merge(grant).merge(remove)
}
