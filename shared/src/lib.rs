use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A persisted patient record as returned by the server.
///
/// All fields are assigned or normalized by the server: `id` and the two
/// timestamps come from the record store, text fields are stored trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    /// Age in whole years, 1-150 inclusive
    pub age: i64,
    pub gender: Gender,
    pub village: String,
    /// Presenting health issue as described at registration
    pub health_issue: String,
    /// Creation time (RFC 3339 UTC), assigned by the store
    pub created_at: DateTime<Utc>,
    /// Last-modified time; equals `created_at` since records are create-only
    pub updated_at: DateTime<Utc>,
}

/// Patient gender. Wire values are the exact variant names
/// ("Male", "Female", "Other") - no case folding is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(ParseGenderError),
        }
    }
}

/// Error returned when a string is not one of the recognized gender values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseGenderError;

impl fmt::Display for ParseGenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("gender must be one of Male, Female or Other")
    }
}

impl std::error::Error for ParseGenderError {}

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response carrying the session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

/// Identity echo returned alongside the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub role: String,
}

/// Body of `POST /patients`.
///
/// All fields default when absent so that field-level validation on the
/// server produces a specific error instead of a generic decode failure.
/// `age` accepts either a JSON number or a numeric string; the server
/// rejects anything that does not parse as a whole number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePatientRequest {
    pub name: String,
    pub age: Option<serde_json::Value>,
    pub gender: String,
    pub village: String,
    pub health_issue: String,
}

impl CreatePatientRequest {
    /// Convenience constructor for a well-formed request.
    pub fn new(name: &str, age: i64, gender: Gender, village: &str, health_issue: &str) -> Self {
        Self {
            name: name.to_string(),
            age: Some(serde_json::Value::from(age)),
            gender: gender.to_string(),
            village: village.to_string(),
            health_issue: health_issue.to_string(),
        }
    }
}

/// Successful creation response with the persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePatientResponse {
    pub success: bool,
    pub patient: Patient,
    pub message: String,
}

/// Response of `GET /patients`: every record, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientListResponse {
    pub success: bool,
    pub patients: Vec<Patient>,
    pub count: usize,
}

/// Reachability of the record store as reported by `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Connecting,
    Disconnecting,
    Disconnected,
}

impl fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DatabaseStatus::Connected => "connected",
            DatabaseStatus::Connecting => "connecting",
            DatabaseStatus::Disconnecting => "disconnecting",
            DatabaseStatus::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Response of `GET /health`. Always served with HTTP 200; an unreachable
/// store is reported in the body rather than by failing the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub database: DatabaseStatus,
    pub timestamp: String,
}

/// Failure envelope shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    /// Per-field validation messages, present only on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}
