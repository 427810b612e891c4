use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::account::errors::AccountError;
use crate::account::models::Username;
use crate::inbound::http::router::AppState;

pub async fn delete_user(
    State(state): State<AppState>,
    Json(body): Json<DeleteUserRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let username = Username::new(body.username).map_err(AccountError::from)?;

    state
        .account_service
        .delete_account(&username)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("User deleted successfully")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteUserRequest {
    username: String,
}
