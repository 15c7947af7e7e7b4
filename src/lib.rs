//! # products CRUD 服务
//!
//! 单一 JSON 接口 `/api/products`，按 HTTP 方法执行列表、新增、修改、删除，
//! 背后是进程级连接池（MySQL，或用于本地与测试的 SQLite）。
//! - `infrastructure`：配置、日志、数据访问
//! - `core`：错误、响应信封、中间件
//! - `app`：路由、处理器、业务服务、浏览器页面

pub mod app;
pub mod core;
pub mod infrastructure;

use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::core::middleware::request_logging_middleware;
use crate::infrastructure::database::Database;

/// 组装完整应用（路由 + 中间件 + 状态）
pub fn build_app(db: Database) -> Router {
    app::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(middleware::from_fn(request_logging_middleware)),
        )
        .with_state(AppState::new(db))
}
