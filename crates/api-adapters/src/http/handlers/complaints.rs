//! Complaint endpoints. Query strings are parsed here so that a bad enum
//! value or page size surfaces as a 400 with a readable message.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{
    Complaint, ComplaintDraft, ComplaintFilter, ComplaintPatch, ComplaintStatus, Department,
    DomainError, Priority, Result, MAX_PAGE_SIZE,
};
use services::ComplaintStats;

use crate::http::error::ApiResult;
use crate::http::extract::{Authenticated, Body, Params};
use crate::http::response::ApiResponse;
use crate::http::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub sentiment: Option<String>,
    pub department: Option<String>,
    pub search: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<ComplaintFilter> {
        let limit = match present(self.limit) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| {
                DomainError::validation(format!(
                    "limit must be a number between 1 and {MAX_PAGE_SIZE}"
                ))
            })?),
            None => None,
        };
        let offset = match present(self.offset) {
            Some(raw) => Some(
                raw.parse::<u32>()
                    .map_err(|_| DomainError::validation("offset must be a non-negative number"))?,
            ),
            None => None,
        };
        Ok(ComplaintFilter {
            user_id: None,
            department: parse_opt::<Department>(self.department)?,
            status: parse_opt::<ComplaintStatus>(self.status)?,
            sentiment: parse_opt::<Priority>(self.sentiment)?,
            search: present(self.search),
            limit,
            offset,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub department: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
    pub status: Option<String>,
    pub priority: Option<String>,
    /// `null` unassigns; an absent field leaves the assignee alone.
    #[serde(default, deserialize_with = "domains::nullable")]
    pub assigned_to: Option<Option<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClassifyBody {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ComplaintList {
    pub complaints: Vec<Complaint>,
    pub count: usize,
}

impl From<Vec<Complaint>> for ComplaintList {
    fn from(complaints: Vec<Complaint>) -> Self {
        Self {
            count: complaints.len(),
            complaints,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub department: Department,
    pub department_email: &'static str,
    pub sentiment: Priority,
}

/// Blank values and `all` mean "no filter".
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn parse_opt<T>(value: Option<String>) -> Result<Option<T>>
where
    T: FromStr<Err = DomainError>,
{
    present(value).map(|v| v.parse::<T>()).transpose()
}

fn complaint_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| DomainError::validation("invalid complaint id"))
}

pub async fn list(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Params(query): Params<ListQuery>,
) -> ApiResult<Json<ApiResponse<ComplaintList>>> {
    let complaints = state
        .complaints
        .list(&caller, query.into_filter()?)
        .await?;
    Ok(Json(ApiResponse::ok(complaints.into())))
}

pub async fn mine(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Params(query): Params<ListQuery>,
) -> ApiResult<Json<ApiResponse<ComplaintList>>> {
    let complaints = state
        .complaints
        .list_mine(&caller, query.into_filter()?)
        .await?;
    Ok(Json(ApiResponse::ok(complaints.into())))
}

pub async fn department(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Params(query): Params<ListQuery>,
) -> ApiResult<Json<ApiResponse<ComplaintList>>> {
    let complaints = state
        .complaints
        .list_department(&caller, query.into_filter()?)
        .await?;
    Ok(Json(ApiResponse::ok(complaints.into())))
}

pub async fn stats(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Params(query): Params<StatsQuery>,
) -> ApiResult<Json<ApiResponse<ComplaintStats>>> {
    let department = parse_opt::<Department>(query.department)?;
    let stats = state.complaints.stats(&caller, department).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

pub async fn get(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Complaint>>> {
    let complaint = state.complaints.get(&caller, complaint_id(&id)?).await?;
    Ok(Json(ApiResponse::ok(complaint)))
}

pub async fn create(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Body(draft): Body<ComplaintDraft>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Complaint>>)> {
    let complaint = state.complaints.submit(&caller, draft).await?;
    state.metrics.complaint_submitted();
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(complaint).with_message("Complaint submitted successfully")),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    Body(body): Body<UpdateBody>,
) -> ApiResult<Json<ApiResponse<Complaint>>> {
    let patch = ComplaintPatch {
        status: parse_opt(body.status)?,
        priority: parse_opt(body.priority)?,
        assigned_to: body.assigned_to,
    };
    let status_changed = patch.status.is_some();
    let complaint = state
        .complaints
        .update(&caller, complaint_id(&id)?, patch)
        .await?;
    if status_changed {
        state.metrics.status_updated(complaint.status);
    }
    Ok(Json(
        ApiResponse::ok(complaint).with_message("Complaint updated successfully"),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.complaints.delete(&caller, complaint_id(&id)?).await?;
    Ok(Json(ApiResponse::message("Complaint deleted successfully")))
}

pub async fn classify(
    State(state): State<AppState>,
    Body(body): Body<ClassifyBody>,
) -> ApiResult<Json<ApiResponse<Suggestion>>> {
    if body.text.trim().is_empty() {
        return Err(DomainError::validation("text is required").into());
    }
    let department = state.complaints.suggest_department(&body.text);
    Ok(Json(ApiResponse::ok(Suggestion {
        department,
        department_email: department.email(),
        sentiment: services::classifier::predict_sentiment(&body.text),
    })))
}
