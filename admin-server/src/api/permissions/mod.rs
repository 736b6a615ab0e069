//! 权限管理接口

mod handler;

use axum::routing::{delete, get, patch, post};
use axum::{Router, middleware};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read = Router::new().nest(
        "/api/v1/permissions",
        Router::new().route("/", get(handler::list)),
    );

    let create = Router::new()
        .nest(
            "/api/v1/permissions",
            Router::new().route("/", post(handler::create)),
        )
        .layer(middleware::from_fn(require_permission("perm:create")));

    let update = Router::new()
        .nest(
            "/api/v1/permissions",
            Router::new().route("/{id}", patch(handler::update)),
        )
        .layer(middleware::from_fn(require_permission("perm:update")));

    let remove = Router::new()
        .nest(
            "/api/v1/permissions",
            Router::new().route("/{id}", delete(handler::remove)),
        )
        .layer(middleware::from_fn(require_permission("perm:delete")));

    read.merge(create).merge(update).merge(remove)
}
