// src/web/types.rs
use crate::analysis::{JobSearchClient, SkillAnalyzer};
use crate::models::{ApplicationProfile, ApplicationUser, UserType};
use crate::session::SessionIdentity;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

/// Optional third-party integrations; routes answer 503 when one is missing
pub struct ServiceState {
    pub analyzer: Option<SkillAnalyzer>,
    pub job_search: Option<JobSearchClient>,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
}

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

pub type ApiError = (Status, Json<StandardErrorResponse>);
pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;

impl<T> DataResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message: message.into(),
            data,
        }
    }
}

impl ActionResponse {
    pub fn success(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message: message.into(),
            action: action.into(),
        }
    }
}

impl StandardErrorResponse {
    pub fn new(error: impl Into<String>, error_code: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error: error.into(),
            error_code: error_code.into(),
            suggestions,
        }
    }
}

pub fn api_error(status: Status, error: impl Into<String>, error_code: &str, suggestions: &[&str]) -> ApiError {
    (
        status,
        Json(StandardErrorResponse::new(
            error,
            error_code,
            suggestions.iter().map(|s| s.to_string()).collect(),
        )),
    )
}

pub fn database_error(e: anyhow::Error) -> ApiError {
    tracing::error!("Database operation failed: {:#}", e);
    api_error(
        Status::InternalServerError,
        "Database error occurred",
        "DATABASE_ERROR",
        &["Try again in a few moments"],
    )
}

pub fn not_found(what: &str, id: &str) -> ApiError {
    api_error(
        Status::NotFound,
        format!("{} '{}' not found", what, id),
        "NOT_FOUND",
        &["Check the identifier and try again"],
    )
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct LoginData {
    pub user: ApplicationUser,
    pub profile: Option<ApplicationProfile>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CurrentIdentity {
    pub identity: SessionIdentity,
    pub user: Option<ApplicationUser>,
}
