use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use shared::{
    CreatePatientRequest, CreatePatientResponse, DatabaseStatus, HealthResponse, LoginRequest,
    LoginResponse, PatientListResponse,
};
use tracing::info;

use crate::auth::AuthUser;
use crate::config::AuthConfig;
use crate::db::DbConnection;
use crate::domain::{AuthService, PatientService};
use crate::error::ApiError;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub patient_service: PatientService,
    pub db: DbConnection,
    /// Needed by the token extractor, which runs before any service
    pub auth_config: AuthConfig,
}

impl AppState {
    pub fn new(db: DbConnection, auth_config: AuthConfig) -> Self {
        Self {
            auth_service: AuthService::new(auth_config.clone()),
            patient_service: PatientService::new(db.clone()),
            db,
            auth_config,
        }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/patients", post(create_patient).get(list_patients))
        .route("/health", get(health))
        .fallback(route_not_found)
        .with_state(state)
}

/// Handler for POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /login - username: {:?}", request.username);

    let (token, user) = state.auth_service.login(&request)?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            token,
            user,
        }),
    ))
}

/// Handler for POST /patients
pub async fn create_patient(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /patients - registered by {}", user.username);

    let patient = state.patient_service.create_patient(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePatientResponse {
            success: true,
            patient,
            message: "Patient registered successfully".to_string(),
        }),
    ))
}

/// Handler for GET /patients
pub async fn list_patients(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /patients - requested by {}", user.username);

    let patients = state.patient_service.list_patients().await?;
    let count = patients.len();

    Ok((
        StatusCode::OK,
        Json(PatientListResponse {
            success: true,
            patients,
            count,
        }),
    ))
}

/// Handler for GET /health. Unauthenticated, and always 200: a dead
/// store degrades the body, not the endpoint.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.status().await;
    let (status, message) = match database {
        DatabaseStatus::Connected => ("ok", "Patient registration service is running"),
        _ => ("error", "Patient record store is unreachable"),
    };

    Json(HealthResponse {
        status: status.to_string(),
        message: message.to_string(),
        database,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Fallback for unmatched routes
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
