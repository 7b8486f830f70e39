use super::{create_service_with_broken_logging, create_test_service, create_test_service_with_outbox, day, dec, register};
use crate::config::LedgerSettings;
use crate::constants::{BUDGET_ALERT_RAISED, EXPENSE_CREATED, EXPENSE_DELETED};
use crate::core::errors::SpendwiseError;
use crate::core::models::expense::ExpenseFilter;
use crate::core::services::{NewAlertSetting, NewBudget, NewExpense, SpendwiseService};
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::notify::{AlertNotification, AlertNotifier};
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

fn food(user_id: &str, amount: &str, date: NaiveDateTime) -> NewExpense {
    NewExpense {
        user_id: user_id.to_string(),
        category: "Food".to_string(),
        amount: dec(amount),
        description: Some("groceries".to_string()),
        date,
    }
}

fn food_budget(user_id: &str, amount: &str) -> NewBudget {
    NewBudget {
        user_id: user_id.to_string(),
        category: "Food".to_string(),
        month: 5,
        year: 2024,
        amount: dec(amount),
    }
}

fn email_alerts(user_id: &str, threshold: Option<u8>) -> NewAlertSetting {
    NewAlertSetting {
        user_id: user_id.to_string(),
        category: "Food".to_string(),
        threshold_percentage: threshold,
        email_enabled: Some(true),
    }
}

#[tokio::test]
async fn test_expense_without_budget_has_no_alert() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;

    let receipt = service.create_expense(food(&ana.id, "42.10", day(2024, 5, 2))).await.unwrap();
    assert!(receipt.alert.is_none());
    assert_eq!(receipt.expense.amount, dec("42.10"));
    assert_eq!(receipt.expense.description.as_deref(), Some("groceries"));

    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.last().unwrap().action, EXPENSE_CREATED);
}

#[tokio::test]
async fn test_threshold_reached_alert() {
    let (service, outbox) = create_test_service_with_outbox();
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "100")).await.unwrap();
    service.save_alert_setting(email_alerts(&ana.id, None)).await.unwrap();

    let first = service.create_expense(food(&ana.id, "50", day(2024, 5, 3))).await.unwrap();
    assert!(first.alert.is_none());

    let second = service.create_expense(food(&ana.id, "45", day(2024, 5, 9))).await.unwrap();
    let alert = second.alert.expect("95% of budget should alert");
    assert_eq!(alert.category, "Food");
    assert_eq!(alert.spent_amount, dec("95"));
    assert_eq!(alert.budget_amount, dec("100"));
    assert_eq!(alert.percentage_used, dec("95.00"));
    assert!(alert.threshold_reached);
    assert!(!alert.exceeded);

    let sent = outbox.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, ana.email);
    assert_eq!(sent[0].subject, "Budget Alert: Food");
    assert!(sent[0].body.contains("reached 90%"));

    let actions: Vec<String> = service
        .get_app_logs()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.action)
        .collect();
    assert!(actions.iter().any(|a| a == BUDGET_ALERT_RAISED));
}

#[tokio::test]
async fn test_exceeded_alert() {
    let (service, outbox) = create_test_service_with_outbox();
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "100")).await.unwrap();
    service.save_alert_setting(email_alerts(&ana.id, None)).await.unwrap();

    service.create_expense(food(&ana.id, "60", day(2024, 5, 1))).await.unwrap();
    let receipt = service.create_expense(food(&ana.id, "50", day(2024, 5, 31))).await.unwrap();
    let alert = receipt.alert.unwrap();
    assert!(alert.exceeded);
    assert!(!alert.threshold_reached);
    assert_eq!(alert.spent_amount, dec("110"));
    assert_eq!(alert.percentage_used, dec("110"));

    let sent = outbox.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("exceeded your budget"));
}

#[tokio::test]
async fn test_alert_without_setting_uses_default_threshold_and_sends_nothing() {
    let (service, outbox) = create_test_service_with_outbox();
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "200")).await.unwrap();

    let receipt = service.create_expense(food(&ana.id, "180", day(2024, 5, 15))).await.unwrap();
    let alert = receipt.alert.unwrap();
    assert_eq!(alert.threshold, 90);
    assert!(alert.threshold_reached);
    assert!(outbox.sent().await.is_empty());
}

#[tokio::test]
async fn test_custom_threshold_and_disabled_email() {
    let (service, outbox) = create_test_service_with_outbox();
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "100")).await.unwrap();
    service
        .save_alert_setting(NewAlertSetting {
            email_enabled: Some(false),
            ..email_alerts(&ana.id, Some(50))
        })
        .await
        .unwrap();

    let receipt = service.create_expense(food(&ana.id, "55", day(2024, 5, 4))).await.unwrap();
    let alert = receipt.alert.unwrap();
    assert_eq!(alert.threshold, 50);
    assert!(alert.threshold_reached);
    assert!(outbox.sent().await.is_empty());
}

#[tokio::test]
async fn test_spend_outside_the_budget_month_is_ignored() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "100")).await.unwrap();

    service.create_expense(food(&ana.id, "99", day(2024, 4, 30))).await.unwrap();
    service.create_expense(food(&ana.id, "99", day(2023, 5, 10))).await.unwrap();
    let receipt = service.create_expense(food(&ana.id, "10", day(2024, 5, 1))).await.unwrap();
    assert!(receipt.alert.is_none());
}

struct FailingNotifier;

#[async_trait]
impl AlertNotifier for FailingNotifier {
    async fn send(&self, _notification: AlertNotification) -> Result<(), SpendwiseError> {
        Err(SpendwiseError::NotificationError("smtp unreachable".to_string()))
    }
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_the_expense() {
    let service = SpendwiseService::new(
        InMemoryStorage::new(),
        InMemoryLogging::new(),
        FailingNotifier,
        LedgerSettings::default(),
    );
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "10")).await.unwrap();
    service.save_alert_setting(email_alerts(&ana.id, None)).await.unwrap();

    let receipt = service.create_expense(food(&ana.id, "25", day(2024, 5, 20))).await.unwrap();
    assert!(receipt.alert.unwrap().exceeded);
    let stored = service
        .list_expenses(ExpenseFilter {
            user_id: Some(ana.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_rejected_expenses_leave_no_trace() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;

    let bad_category = NewExpense {
        category: "Yachts".to_string(),
        ..food(&ana.id, "10", day(2024, 5, 1))
    };
    assert!(matches!(
        service.create_expense(bad_category).await,
        Err(SpendwiseError::InvalidInput(field, _)) if field == "category"
    ));
    assert!(matches!(
        service.create_expense(food(&ana.id, "-1", day(2024, 5, 1))).await,
        Err(SpendwiseError::InvalidInput(field, _)) if field == "amount"
    ));
    assert!(matches!(
        service.create_expense(food(&ana.id, "1.005", day(2024, 5, 1))).await,
        Err(SpendwiseError::InvalidInput(field, _)) if field == "amount"
    ));
    assert!(matches!(
        service.create_expense(food("ghost", "10", day(2024, 5, 1))).await,
        Err(SpendwiseError::UserNotFound(_))
    ));

    assert!(service.list_expenses(ExpenseFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_zero_amount_is_allowed() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    let receipt = service.create_expense(food(&ana.id, "0", day(2024, 5, 1))).await.unwrap();
    assert_eq!(receipt.expense.amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_list_expenses_filters_and_orders_newest_first() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    let bruno = register(&service, "Bruno").await;

    service.create_expense(food(&ana.id, "1", day(2024, 5, 1))).await.unwrap();
    service.create_expense(food(&ana.id, "2", day(2024, 5, 20))).await.unwrap();
    service.create_expense(food(&ana.id, "3", day(2024, 6, 2))).await.unwrap();
    service.create_expense(food(&bruno.id, "4", day(2024, 5, 5))).await.unwrap();

    let may = service
        .list_expenses(ExpenseFilter {
            user_id: Some(ana.id.clone()),
            category: Some("Food".to_string()),
            month: Some(5),
            year: Some(2024),
        })
        .await
        .unwrap();
    let amounts: Vec<Decimal> = may.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![dec("2"), dec("1")]);

    // A month without a year does not filter.
    let all_ana = service
        .list_expenses(ExpenseFilter {
            user_id: Some(ana.id.clone()),
            month: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all_ana.len(), 3);
}

#[tokio::test]
async fn test_delete_expense() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    let receipt = service.create_expense(food(&ana.id, "12", day(2024, 5, 1))).await.unwrap();

    let deleted = service.delete_expense(&receipt.expense.id).await.unwrap();
    assert_eq!(deleted.id, receipt.expense.id);
    assert!(service.list_expenses(ExpenseFilter::default()).await.unwrap().is_empty());
    assert!(matches!(
        service.delete_expense(&receipt.expense.id).await,
        Err(SpendwiseError::ExpenseNotFound(_))
    ));

    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.last().unwrap().action, EXPENSE_DELETED);
}

#[tokio::test]
async fn test_deleting_spend_lowers_the_next_evaluation() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "100")).await.unwrap();

    let big = service.create_expense(food(&ana.id, "95", day(2024, 5, 1))).await.unwrap();
    assert!(big.alert.is_some());
    service.delete_expense(&big.expense.id).await.unwrap();

    let small = service.create_expense(food(&ana.id, "5", day(2024, 5, 2))).await.unwrap();
    assert!(small.alert.is_none());
}

#[tokio::test]
async fn test_expense_is_stored_once_when_audit_fails() {
    let service = create_service_with_broken_logging();
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "100")).await.unwrap();
    service.save_alert_setting(email_alerts(&ana.id, None)).await.unwrap();

    let receipt = service.create_expense(food(&ana.id, "95", day(2024, 5, 6))).await.unwrap();
    assert!(receipt.alert.unwrap().threshold_reached);

    let stored = service.list_expenses(ExpenseFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, receipt.expense.id);
}

#[tokio::test]
async fn test_alert_counts_the_expense_being_recorded() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    service.save_budget(food_budget(&ana.id, "100")).await.unwrap();

    let receipt = service.create_expense(food(&ana.id, "120", day(2024, 5, 6))).await.unwrap();
    let alert = receipt.alert.unwrap();
    assert_eq!(alert.spent_amount, dec("120"));
    assert!(alert.exceeded);
}
