use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::errors::AccountError;
use crate::account::models::AccountView;
use crate::account::models::Role;
use crate::account::models::Username;
use crate::inbound::http::router::AppState;

pub async fn change_role(
    State(state): State<AppState>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<ApiSuccess<AccountView>, ApiError> {
    let username = Username::new(body.username).map_err(AccountError::from)?;
    let role = body.new_role.parse::<Role>().map_err(AccountError::from)?;

    state
        .account_service
        .change_role(&username, role)
        .await
        .map_err(ApiError::from)
        .map(|view| ApiSuccess::new(StatusCode::OK, view))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRoleRequest {
    username: String,
    new_role: String,
}
