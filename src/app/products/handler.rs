//! 产品处理器：`/api/products` 按 HTTP 方法分派

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use super::model::{
    CreateProductRequest, DeleteProductRequest, DeleteResponse, ProductList, ProductResponse,
    UpdateProductRequest,
};
use crate::app::AppState;
use crate::core::error::CoreError;
use crate::core::response::Envelope;

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ProductList>, CoreError> {
    let products = state.product_service.list_products().await?;
    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<Json<Envelope<ProductResponse>>, CoreError> {
    let Json(request) = payload?;
    let response = state.product_service.create_product(request).await?;
    Ok(Json(response))
}

pub async fn update_product(
    State(state): State<AppState>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<Json<Envelope<ProductResponse>>, CoreError> {
    let Json(request) = payload?;
    let response = state.product_service.update_product(request).await?;
    Ok(Json(response))
}

pub async fn delete_product(
    State(state): State<AppState>,
    payload: Result<Json<DeleteProductRequest>, JsonRejection>,
) -> Result<Json<Envelope<DeleteResponse>>, CoreError> {
    let Json(request) = payload?;
    let response = state.product_service.delete_product(request).await?;
    Ok(Json(response))
}
