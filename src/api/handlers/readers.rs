use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::state::AppState,
    error::{AppError, Result},
};

#[derive(Debug, Deserialize)]
pub struct RegisterReaderDto {
    pub registration_code: Option<String>,
}

pub async fn register_reader(
    State(state): State<AppState>,
    Json(dto): Json<RegisterReaderDto>,
) -> Result<Json<serde_json::Value>> {
    let code = dto
        .registration_code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Registration code is required".to_string()))?;

    let reader = state.gateway.register_reader(&code).await?;

    Ok(Json(json!({ "reader": reader })))
}

pub async fn discover_readers(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let readers = state.gateway.list_readers().await?;

    tracing::info!("Found {} readers", readers.len());

    Ok(Json(json!({ "readers": readers })))
}
