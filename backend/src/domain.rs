use shared::{CreatePatientRequest, Gender, LoginRequest, Patient, UserInfo};
use tracing::{info, warn};

use crate::auth;
use crate::config::AuthConfig;
use crate::db::DbConnection;
use crate::error::{ApiError, ValidationError};

/// The session gate: checks the configured credential pair and issues
/// signed session tokens. Holds no mutable state.
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Validate a login attempt and issue a token on success.
    pub fn login(&self, request: &LoginRequest) -> Result<(String, UserInfo), ApiError> {
        if request.username.is_empty() || request.password.is_empty() {
            return Err(ApiError::MissingCredentials);
        }

        // Single comparison for both fields; the error never says which
        // one failed to match
        if request.username != self.config.username || request.password != self.config.password {
            warn!("rejected login attempt for username {:?}", request.username);
            return Err(ApiError::InvalidCredentials);
        }

        let token = auth::issue_token(&self.config, &request.username)?;
        info!("issued session token for {}", request.username);

        Ok((
            token,
            UserInfo {
                username: request.username.clone(),
                role: auth::ROLE.to_string(),
            },
        ))
    }
}

/// A patient that has passed validation and is ready to persist.
/// Text fields are already trimmed, age already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub gender: Gender,
    pub village: String,
    pub health_issue: String,
}

/// Service for registering and listing patient records.
#[derive(Clone)]
pub struct PatientService {
    db: DbConnection,
}

impl PatientService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Validate and persist a new patient record.
    pub async fn create_patient(&self, request: &CreatePatientRequest) -> Result<Patient, ApiError> {
        let input = validate_patient(request)?;

        let patient = self
            .db
            .insert_patient(&input)
            .await
            .map_err(ApiError::Store)?;

        info!(
            "registered patient {} ({}, {}) from {}",
            patient.id, patient.age, patient.gender, patient.village
        );

        Ok(patient)
    }

    /// List all patient records, most recent first.
    pub async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        let patients = self.db.list_patients().await.map_err(ApiError::Store)?;
        info!("listing {} patient records", patients.len());
        Ok(patients)
    }
}

/// Apply the five field checks in their fixed order. The first violated
/// rule wins; later fields are not inspected.
fn validate_patient(request: &CreatePatientRequest) -> Result<NewPatient, ValidationError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidName);
    }

    let age = parse_age(request.age.as_ref()).ok_or(ValidationError::InvalidAge)?;
    if !(1..=150).contains(&age) {
        return Err(ValidationError::InvalidAge);
    }

    let gender = request
        .gender
        .parse::<Gender>()
        .map_err(|_| ValidationError::InvalidGender)?;

    let village = request.village.trim();
    if village.is_empty() {
        return Err(ValidationError::InvalidVillage);
    }

    let health_issue = request.health_issue.trim();
    if health_issue.is_empty() {
        return Err(ValidationError::InvalidHealthIssue);
    }

    Ok(NewPatient {
        name: name.to_string(),
        age,
        gender,
        village: village.to_string(),
        health_issue: health_issue.to_string(),
    })
}

/// Age arrives as free-form client input: accept a JSON integer or a
/// numeric string, reject everything else (including fractions).
fn parse_age(value: Option<&serde_json::Value>) -> Option<i64> {
    match value? {
        serde_json::Value::Number(number) => number.as_i64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
