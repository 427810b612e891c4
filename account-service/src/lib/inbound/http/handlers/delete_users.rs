use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::account::models::Username;
use crate::inbound::http::router::AppState;

pub async fn delete_users(
    State(state): State<AppState>,
    Json(body): Json<DeleteUsersRequest>,
) -> Result<ApiSuccess<DeleteUsersResponseData>, ApiError> {
    // A name that fails validation cannot belong to a stored account, so it
    // simply ends up not deleted.
    let usernames: Vec<Username> = body
        .usernames
        .into_iter()
        .filter_map(|name| Username::new(name).ok())
        .collect();

    state
        .account_service
        .delete_accounts(&usernames)
        .await
        .map_err(ApiError::from)
        .map(|deleted| {
            ApiSuccess::new(
                StatusCode::OK,
                DeleteUsersResponseData {
                    message: "Users deleted successfully".to_string(),
                    deleted_users: deleted.iter().map(|u| u.as_str().to_string()).collect(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteUsersRequest {
    usernames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUsersResponseData {
    pub message: String,
    pub deleted_users: Vec<String>,
}
