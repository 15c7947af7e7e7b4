//! 健康检查

use axum::{extract::State, response::Json};

use crate::app::AppState;
use crate::core::error::CoreError;

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, CoreError> {
    state.db.ping().await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "database": "connected",
        "backend": state.db.backend(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
