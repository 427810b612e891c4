use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::access::models::Caller;
use crate::account::errors::AccountError;
use crate::account::models::Username;
use crate::inbound::http::router::AppState;

/// Changes the caller's own password, or any account's when the caller is
/// an admin and names it explicitly.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let username = match body.username {
        Some(name) => Username::new(name).map_err(AccountError::from)?,
        None => caller.username.clone(),
    };

    state
        .account_service
        .change_password(&caller, &username, &body.new_password)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageData::new("Password changed successfully"),
            )
        })
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    username: Option<String>,
    new_password: String,
}
