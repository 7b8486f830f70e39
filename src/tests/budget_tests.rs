use super::{create_test_service, dec, register};
use crate::constants::{ALERT_SETTING_SAVED, BUDGET_DELETED, BUDGET_SAVED};
use crate::core::errors::SpendwiseError;
use crate::core::services::{NewAlertSetting, NewBudget};
use std::sync::Arc;

fn budget(user_id: &str, category: &str, month: u32, amount: &str) -> NewBudget {
    NewBudget {
        user_id: user_id.to_string(),
        category: category.to_string(),
        month,
        year: 2024,
        amount: dec(amount),
    }
}

#[tokio::test]
async fn test_save_budget_upserts_the_slot() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;

    let (first, created) = service.save_budget(budget(&ana.id, "Food", 5, "300")).await.unwrap();
    assert!(created);
    let (second, created) = service.save_budget(budget(&ana.id, "Food", 5, "450.50")).await.unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.amount, dec("450.50"));

    let budgets = service.list_budgets(Some(ana.id.as_str()), Some(5), Some(2024)).await.unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(budgets[0].amount, dec("450.50"));

    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.iter().filter(|l| l.action == BUDGET_SAVED).count(), 2);
}

#[tokio::test]
async fn test_budgets_are_scoped_by_period_and_category() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    service.save_budget(budget(&ana.id, "Food", 5, "300")).await.unwrap();
    service.save_budget(budget(&ana.id, "Food", 6, "300")).await.unwrap();
    service.save_budget(budget(&ana.id, "Bills", 5, "120")).await.unwrap();

    assert_eq!(service.list_budgets(Some(ana.id.as_str()), None, None).await.unwrap().len(), 3);
    assert_eq!(service.list_budgets(None, Some(5), Some(2024)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_upserts_keep_one_budget() {
    let service = Arc::new(create_test_service());
    let ana = register(&*service, "Ana").await;

    let handles: Vec<_> = (1..=20)
        .map(|i| {
            let service = service.clone();
            let user_id = ana.id.clone();
            tokio::spawn(async move {
                service
                    .save_budget(budget(&user_id, "Food", 5, &format!("{}", i * 10)))
                    .await
                    .unwrap()
            })
        })
        .collect();
    let created: usize = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .filter(|(_, created)| *created)
        .count();

    assert_eq!(created, 1);
    assert_eq!(service.list_budgets(Some(ana.id.as_str()), None, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_budget_input() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;

    assert!(matches!(
        service.save_budget(budget(&ana.id, "Food", 13, "10")).await,
        Err(SpendwiseError::InvalidPeriod { month: 13, .. })
    ));
    assert!(matches!(
        service.save_budget(budget(&ana.id, "Food", 0, "10")).await,
        Err(SpendwiseError::InvalidPeriod { .. })
    ));
    assert!(matches!(
        service.save_budget(budget(&ana.id, "Food", 5, "-5")).await,
        Err(SpendwiseError::InvalidInput(field, _)) if field == "amount"
    ));
    assert!(matches!(
        service.save_budget(budget(&ana.id, "Pets", 5, "10")).await,
        Err(SpendwiseError::InvalidInput(field, _)) if field == "category"
    ));
    assert!(matches!(
        service.save_budget(budget("ghost", "Food", 5, "10")).await,
        Err(SpendwiseError::UserNotFound(_))
    ));
    assert!(service.list_budgets(None, None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_budget() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    let (saved, _) = service.save_budget(budget(&ana.id, "Food", 5, "300")).await.unwrap();

    service.delete_budget(&saved.id).await.unwrap();
    assert!(service.list_budgets(None, None, None).await.unwrap().is_empty());
    assert!(matches!(
        service.delete_budget(&saved.id).await,
        Err(SpendwiseError::BudgetNotFound(_))
    ));
    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.last().unwrap().action, BUDGET_DELETED);
}

#[tokio::test]
async fn test_alert_setting_defaults_and_upsert() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;

    let (setting, created) = service
        .save_alert_setting(NewAlertSetting {
            user_id: ana.id.clone(),
            category: "Food".to_string(),
            threshold_percentage: None,
            email_enabled: None,
        })
        .await
        .unwrap();
    assert!(created);
    assert_eq!(setting.threshold_percentage, 90);
    assert!(setting.email_enabled);

    let (updated, created) = service
        .save_alert_setting(NewAlertSetting {
            user_id: ana.id.clone(),
            category: "Food".to_string(),
            threshold_percentage: Some(75),
            email_enabled: Some(false),
        })
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(updated.id, setting.id);
    assert_eq!(updated.threshold_percentage, 75);
    assert!(!updated.email_enabled);

    let settings = service.list_alert_settings(&ana.id).await.unwrap();
    assert_eq!(settings, vec![updated]);

    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.last().unwrap().action, ALERT_SETTING_SAVED);
}

#[tokio::test]
async fn test_alert_threshold_bounds() {
    let service = create_test_service();
    let ana = register(&service, "Ana").await;
    for threshold in [0u8, 101] {
        let result = service
            .save_alert_setting(NewAlertSetting {
                user_id: ana.id.clone(),
                category: "Food".to_string(),
                threshold_percentage: Some(threshold),
                email_enabled: None,
            })
            .await;
        assert!(matches!(
            result,
            Err(SpendwiseError::InvalidInput(field, _)) if field == "threshold_percentage"
        ));
    }
    assert!(service.list_alert_settings(&ana.id).await.unwrap().is_empty());
    assert!(matches!(
        service.list_alert_settings("ghost").await,
        Err(SpendwiseError::UserNotFound(_))
    ));
}
