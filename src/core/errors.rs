use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum SpendwiseError {
    #[error("Email is required")]
    MissingEmail,
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),
    #[error("Invalid period {month}/{year}")]
    InvalidPeriod { month: u32, year: i32 },
    #[error("User {0} not found")]
    UserNotFound(String),
    #[error("Group {0} not found")]
    GroupNotFound(String),
    #[error("Expense {0} not found")]
    ExpenseNotFound(String),
    #[error("Budget {0} not found")]
    BudgetNotFound(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("User {0} is not a group member")]
    NotAMember(String),
    #[error("A group needs at least one member besides its creator")]
    EmptyMembership,
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl SpendwiseError {
    /// Shorthand for a field-level validation failure.
    pub fn invalid(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        SpendwiseError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }
}
