mod budget_tests;
mod expense_tests;

use crate::config::LedgerSettings;
use crate::core::errors::SpendwiseError;
use crate::core::models::audit::AppLog;
use crate::core::models::user::User;
use crate::core::services::SpendwiseService;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::notify::in_memory::OutboxNotifier;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;

pub type TestService = SpendwiseService<InMemoryLogging, InMemoryStorage, OutboxNotifier>;

pub fn create_test_service() -> TestService {
    create_test_service_with_outbox().0
}

/// The returned outbox shares its queue with the service's notifier.
pub fn create_test_service_with_outbox() -> (TestService, OutboxNotifier) {
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let outbox = OutboxNotifier::new();
    let service = SpendwiseService::new(storage, logging, outbox.clone(), LedgerSettings::default());
    (service, outbox)
}

/// Audit sink that rejects every entry.
pub struct BrokenLogging;

#[async_trait]
impl LoggingService for BrokenLogging {
    async fn log_action(
        &self,
        _action: &str,
        _details: serde_json::Value,
        _user_id: Option<&str>,
    ) -> Result<(), SpendwiseError> {
        Err(SpendwiseError::LoggingError("audit sink unavailable".to_string()))
    }

    async fn get_logs(&self) -> Result<Vec<AppLog>, SpendwiseError> {
        Ok(Vec::new())
    }
}

pub fn create_service_with_broken_logging() -> SpendwiseService<BrokenLogging, InMemoryStorage, OutboxNotifier> {
    SpendwiseService::new(
        InMemoryStorage::new(),
        BrokenLogging,
        OutboxNotifier::new(),
        LedgerSettings::default(),
    )
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn day(year: i32, month: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, d).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

pub async fn register<L, S, N>(service: &SpendwiseService<L, S, N>, name: &str) -> User
where
    L: crate::infrastructure::logging::LoggingService,
    S: crate::infrastructure::storage::Storage,
    N: crate::infrastructure::notify::AlertNotifier,
{
    service
        .add_user(name.to_string(), format!("{}@example.com", name.to_lowercase()))
        .await
        .unwrap()
}
