//! Citizen registration, login and profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use domains::User;
use services::{Registration, UserSession};

use crate::http::error::ApiResult;
use crate::http::extract::{Authenticated, Body};
use crate::http::response::ApiResponse;
use crate::http::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Body(form): Body<Registration>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserSession>>)> {
    let session = state.auth.register(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(session).with_message("User registered successfully")),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Body(creds): Body<Credentials>,
) -> ApiResult<Json<ApiResponse<UserSession>>> {
    let session = state.auth.login(&creds.email, &creds.password).await?;
    Ok(Json(ApiResponse::ok(session).with_message("Login successful")))
}

pub async fn profile(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.auth.profile(&caller).await?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Body(update): Body<ProfileUpdate>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .auth
        .update_profile(&caller, update.name, update.email)
        .await?;
    Ok(Json(
        ApiResponse::ok(user).with_message("Profile updated successfully"),
    ))
}
