use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

use crate::core::errors::SpendwiseError;

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateExpenseRequest {
    pub user_id: String,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`; defaults to now.
    pub date: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateBudgetRequest {
    pub user_id: String,
    pub category: String,
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateAlertSettingRequest {
    pub user_id: String,
    pub category: String,
    pub threshold_percentage: Option<u8>,
    pub email_enabled: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub member_ids: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupExpenseRequest {
    pub description: String,
    pub total_amount: Decimal,
    pub category: String,
    pub paid_by: String,
    /// `equal` (default) or `exact`.
    pub split_type: Option<String>,
    /// Member id to amount, required for `exact` splits.
    pub splits: Option<HashMap<String, Decimal>>,
    pub date: Option<String>,
}

// Query strings
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserSearchQuery {
    pub email: String,
}

#[derive(Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ExpenseQuery {
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BudgetQuery {
    pub user_id: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GroupQuery {
    pub user_id: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    pub user_id: String,
    pub month: u32,
    pub year: i32,
}

// Responses
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Reads an optional request date. Accepts a plain date (midnight), a naive
/// datetime or RFC 3339.
pub fn parse_request_date(field: &str, raw: Option<&str>) -> Result<NaiveDateTime, SpendwiseError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Utc::now().naive_utc());
    };
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.naive_utc());
    }
    Err(SpendwiseError::invalid(
        field,
        "Invalid Date",
        format!("{} is not a date (expected YYYY-MM-DD)", raw),
    ))
}

// Newtype wrapper for SpendwiseError to implement IntoResponse
pub struct ApiError(pub SpendwiseError);

impl From<SpendwiseError> for ApiError {
    fn from(err: SpendwiseError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self.0 {
            SpendwiseError::MissingEmail => (StatusCode::BAD_REQUEST, "Email is required".to_string()),
            SpendwiseError::InvalidEmail(email) => (StatusCode::BAD_REQUEST, format!("Invalid email: {}", email)),
            SpendwiseError::EmailAlreadyRegistered(email) => {
                (StatusCode::CONFLICT, format!("Email {} already registered", email))
            }
            SpendwiseError::InvalidInput(field, err) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid input for {}: {}", field, err.description),
            ),
            SpendwiseError::InvalidPeriod { month, year } => (
                StatusCode::BAD_REQUEST,
                format!("Invalid period: month {} of year {}", month, year),
            ),
            SpendwiseError::UserNotFound(id) => (StatusCode::NOT_FOUND, format!("User {} not found", id)),
            SpendwiseError::GroupNotFound(id) => (StatusCode::NOT_FOUND, format!("Group {} not found", id)),
            SpendwiseError::ExpenseNotFound(id) => (StatusCode::NOT_FOUND, format!("Expense {} not found", id)),
            SpendwiseError::BudgetNotFound(id) => (StatusCode::NOT_FOUND, format!("Budget {} not found", id)),
            SpendwiseError::InvalidSplit(reason) => (StatusCode::BAD_REQUEST, format!("Invalid split: {}", reason)),
            SpendwiseError::NotAMember(id) => (
                StatusCode::BAD_REQUEST,
                format!("User {} is not a member of this group", id),
            ),
            SpendwiseError::EmptyMembership => (
                StatusCode::BAD_REQUEST,
                "A group needs at least one member besides its creator".to_string(),
            ),
            SpendwiseError::StorageError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage error: {}", msg)),
            SpendwiseError::LoggingError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, format!("Logging error: {}", msg)),
            SpendwiseError::NotificationError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Notification error: {}", msg),
            ),
            SpendwiseError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal server error: {}", msg),
            ),
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
