//! Shared fixtures for the integration tests: a fully wired application
//! over the in-memory store, with every department admin provisioned.

use std::sync::Arc;

use auth_adapters::JwtTokenService;
use domains::{Caller, ComplaintDraft, Department, PasswordHasher, Result};
use services::bootstrap::seed_department_admins;
use services::{AuthService, ComplaintService, DirectoryService, Registration};
use storage_adapters::InMemoryStore;

pub const ADMIN_PASSWORD: &str = "admin123";
pub const CITIZEN_PASSWORD: &str = "password123";

/// Reversible stand-in for argon2; debug-build hashing is too slow for
/// a suite that provisions six admins per test.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        hash == format!("plain:{password}")
    }
}

/// A logged-in identity: the resolved claim plus its bearer token.
#[derive(Debug, Clone)]
pub struct Actor {
    pub caller: Caller,
    pub token: String,
}

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub complaints: Arc<ComplaintService>,
    pub auth: Arc<AuthService>,
    pub directory: Arc<DirectoryService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let hasher = Arc::new(PlainHasher);
        seed_department_admins(store.as_ref(), hasher.as_ref(), ADMIN_PASSWORD)
            .await
            .expect("seeding admins");

        let tokens = Arc::new(JwtTokenService::new(
            b"integration-test-secret",
            chrono::Duration::minutes(30),
        ));
        Self {
            complaints: Arc::new(ComplaintService::new(
                store.clone(),
                store.clone(),
                store.clone(),
            )),
            auth: Arc::new(AuthService::new(
                store.clone(),
                store.clone(),
                hasher,
                tokens,
            )),
            directory: Arc::new(DirectoryService::new(store.clone())),
            store,
        }
    }

    /// Registers a citizen and returns their session.
    pub async fn citizen(&self, name: &str, email: &str) -> Actor {
        let session = self
            .auth
            .register(Registration {
                name: name.into(),
                email: email.into(),
                password: CITIZEN_PASSWORD.into(),
                confirm_password: CITIZEN_PASSWORD.into(),
                phone: None,
                address: None,
            })
            .await
            .expect("registering citizen");
        self.actor(session.token)
    }

    /// Logs in as the provisioned admin of `department`.
    pub async fn admin_of(&self, department: Department) -> Actor {
        let session = self
            .auth
            .admin_login(department.email(), ADMIN_PASSWORD)
            .await
            .expect("admin login");
        self.actor(session.token)
    }

    fn actor(&self, token: String) -> Actor {
        let caller = self.auth.authenticate(&token).expect("fresh token verifies");
        Actor { caller, token }
    }

    #[cfg(feature = "web-axum")]
    pub fn router(&self) -> axum::Router {
        let state = api_adapters::AppState {
            complaints: self.complaints.clone(),
            auth: self.auth.clone(),
            directory: self.directory.clone(),
            metrics: Arc::new(api_adapters::Metrics::new()),
            started_at: std::time::Instant::now(),
            storage: "memory",
        };
        api_adapters::router(state)
    }
}

pub fn draft(department: Department, text: &str) -> ComplaintDraft {
    ComplaintDraft {
        text: Some(text.into()),
        category: Some(department.name().into()),
        department: Some(department.name().into()),
        department_email: Some(department.email().into()),
        ..Default::default()
    }
}

#[cfg(feature = "web-axum")]
pub mod http {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Sends one request and returns the status with the decoded JSON body
    /// (`Null` when the body is not JSON).
    pub async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = app.clone().oneshot(request).await.expect("infallible service");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
