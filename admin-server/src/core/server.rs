//! HTTP 服务器
//!
//! 路由装配、中间件栈和启动/优雅关闭。

use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};
use crate::utils::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 每个请求一个 uuid, 响应头 x-request-id 回传
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// HTTP 访问日志
async fn log_request(
    request: axum::extract::Request,
    next: middleware::Next,
) -> axum::response::Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    tracing::info!(target: "http_access", latency_ms, "{} {} {}", method, uri, status);

    response
}

/// 业务路由 (未挂状态)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::users::router())
        .merge(crate::api::roles::router())
        .merge(crate::api::permissions::router())
}

/// 完整应用: 业务路由 + 认证 + 通用中间件栈
pub fn build_app(state: &ServerState) -> Router {
    build_router()
        // 认证中间件, 内部放行公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    XRequestId,
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID_HEADER,
                )))
                .layer(CorsLayer::permissive())
                // Cors 要求内层响应体实现 Default, 先盒装为 axum Body
                .map_response(|response: http::Response<_>| response.map(axum::body::Body::new))
                .layer(CompressionLayer::new())
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(log_request)),
        )
}

/// HTTP 服务器
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// 用现成的状态构造 (状态初始化与启动分离)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// 启动并阻塞到关闭
    pub async fn run(&self) -> AppResult<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let app = build_app(&state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("Admin server listening on {}", addr);

        let handle = axum_server::Handle::new();
        tokio::spawn(shutdown_signal(handle.clone()));

        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// ctrl-c 后给在途请求 10s 收尾
async fn shutdown_signal(handle: axum_server::Handle<SocketAddr>) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
    handle.graceful_shutdown(Some(Duration::from_secs(10)));
}
