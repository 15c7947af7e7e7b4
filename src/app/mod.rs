//! 应用层：路由与共享状态

pub mod health;
pub mod products;
pub mod view;

use axum::{routing::get, Router};

use crate::infrastructure::database::Database;
use products::{handler, service::ProductService};

/// 请求间共享的状态，只含连接池句柄
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub product_service: ProductService,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            product_service: ProductService::new(db.clone()),
            db,
        }
    }
}

/// 创建路由
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(view::index))
        .route("/health", get(health::health_check))
        .route(
            "/api/products",
            get(handler::list_products)
                .post(handler::create_product)
                .put(handler::update_product)
                .delete(handler::delete_product),
        )
        .fallback(view::not_found)
}
