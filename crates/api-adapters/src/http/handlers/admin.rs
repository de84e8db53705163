//! Admin login and the department directory.

use axum::extract::{Path, State};
use axum::Json;

use domains::{Admin, DepartmentInfo};
use services::AdminSession;

use crate::http::error::ApiResult;
use crate::http::extract::{Authenticated, Body};
use crate::http::handlers::auth::Credentials;
use crate::http::response::ApiResponse;
use crate::http::AppState;

pub async fn login(
    State(state): State<AppState>,
    Body(creds): Body<Credentials>,
) -> ApiResult<Json<ApiResponse<AdminSession>>> {
    let session = state
        .auth
        .admin_login(&creds.email, &creds.password)
        .await?;
    Ok(Json(ApiResponse::ok(session).with_message("Login successful")))
}

pub async fn profile(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<ApiResponse<Admin>>> {
    let admin = state.auth.admin_profile(&caller).await?;
    Ok(Json(ApiResponse::ok(admin)))
}

pub async fn departments(State(state): State<AppState>) -> Json<ApiResponse<Vec<DepartmentInfo>>> {
    Json(ApiResponse::ok(state.directory.departments()))
}

pub async fn department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<DepartmentInfo>>> {
    Ok(Json(ApiResponse::ok(state.directory.department(&id)?)))
}

pub async fn department_admins(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<Admin>>>> {
    let admins = state.directory.admins_of(&id).await?;
    Ok(Json(ApiResponse::ok(admins)))
}
