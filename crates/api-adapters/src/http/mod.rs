//! # HTTP (axum)
//!
//! Router assembly and shared state. Routes live under `/api`; `/metrics`
//! serves the Prometheus registry.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;

use services::{AuthService, ComplaintService, DirectoryService};

use crate::metrics::Metrics;

use handlers::{admin, auth, complaints, system};

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub complaints: Arc<ComplaintService>,
    pub auth: Arc<AuthService>,
    pub directory: Arc<DirectoryService>,
    pub metrics: Arc<Metrics>,
    pub started_at: Instant,
    /// Name of the storage backend, reported by `/api/health`.
    pub storage: &'static str,
}

impl AppState {
    pub fn new(
        complaints: ComplaintService,
        auth: AuthService,
        directory: DirectoryService,
        storage: &'static str,
    ) -> Self {
        Self {
            complaints: Arc::new(complaints),
            auth: Arc::new(auth),
            directory: Arc::new(directory),
            metrics: Arc::new(Metrics::new()),
            started_at: Instant::now(),
            storage,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/ping", get(system::ping))
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile).put(auth::update_profile))
        .route("/admin/login", post(admin::login))
        .route("/admin/profile", get(admin::profile))
        .route("/admin/departments", get(admin::departments))
        .route("/admin/departments/{id}", get(admin::department))
        .route("/admin/departments/{id}/admins", get(admin::department_admins))
        .route("/complaints", get(complaints::list).post(complaints::create))
        .route("/complaints/stats", get(complaints::stats))
        .route("/complaints/my", get(complaints::mine))
        .route("/complaints/department", get(complaints::department))
        .route("/complaints/classify", post(complaints::classify))
        .route(
            "/complaints/{id}",
            get(complaints::get)
                .put(complaints::update)
                .delete(complaints::delete),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request| {
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        info_span!(
            "http",
            method = %req.method(),
            uri = %req.uri(),
            request_id,
        )
    });

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(system::metrics))
        .fallback(system::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), count_errors))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(trace)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

async fn count_errors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    state.metrics.http_error(response.status().as_u16());
    response
}
