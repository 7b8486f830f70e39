use crate::core::errors::SpendwiseError;
use crate::core::models::{
    alert::AlertSetting,
    audit::GroupAudit,
    budget::{Budget, Period},
    expense::{Expense, ExpenseFilter},
    group::Group,
    group_expense::GroupExpense,
    user::User,
};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    users_by_email: Arc<RwLock<HashMap<String, String>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
    budgets: Arc<RwLock<HashMap<String, Budget>>>,
    alert_settings: Arc<RwLock<HashMap<String, AlertSetting>>>,
    groups: Arc<RwLock<HashMap<String, Group>>>,
    group_expenses: Arc<RwLock<HashMap<String, GroupExpense>>>,
    group_audits: Arc<RwLock<HashMap<String, Vec<GroupAudit>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn insert_user(&self, user: User) -> Result<User, SpendwiseError> {
        let mut users_by_email = self.users_by_email.write().await;
        let key = User::email_key(&user.email);
        if users_by_email.contains_key(&key) {
            return Err(SpendwiseError::EmailAlreadyRegistered(user.email));
        }
        users_by_email.insert(key, user.id.clone());
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, SpendwiseError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, SpendwiseError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn search_users_by_email(&self, query: &str, limit: usize) -> Result<Vec<User>, SpendwiseError> {
        let needle = query.trim().to_lowercase();
        let users = self.users.read().await;
        let mut found: Vec<User> = users
            .values()
            .filter(|u| u.email.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.email.cmp(&b.email));
        found.truncate(limit);
        Ok(found)
    }

    async fn save_expense(&self, expense: Expense) -> Result<(), SpendwiseError> {
        let mut expenses = self.expenses.write().await;
        expenses.insert(expense.id.clone(), expense);
        Ok(())
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, SpendwiseError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(expense_id).cloned())
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<Option<Expense>, SpendwiseError> {
        let mut expenses = self.expenses.write().await;
        Ok(expenses.remove(expense_id))
    }

    async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, SpendwiseError> {
        let expenses = self.expenses.read().await;
        let mut matched: Vec<Expense> = expenses.values().filter(|e| filter.matches(e)).cloned().collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(matched)
    }

    async fn upsert_budget(&self, budget: Budget) -> Result<(Budget, bool), SpendwiseError> {
        let mut budgets = self.budgets.write().await;
        let period = budget.period();
        if let Some(existing) = budgets
            .values_mut()
            .find(|b| b.is_slot(&budget.user_id, &budget.category, period))
        {
            existing.amount = budget.amount;
            return Ok((existing.clone(), false));
        }
        budgets.insert(budget.id.clone(), budget.clone());
        Ok((budget, true))
    }

    async fn get_budget(&self, budget_id: &str) -> Result<Option<Budget>, SpendwiseError> {
        let budgets = self.budgets.read().await;
        Ok(budgets.get(budget_id).cloned())
    }

    async fn find_budget(
        &self,
        user_id: &str,
        category: &str,
        period: Period,
    ) -> Result<Option<Budget>, SpendwiseError> {
        let budgets = self.budgets.read().await;
        Ok(budgets.values().find(|b| b.is_slot(user_id, category, period)).cloned())
    }

    async fn list_budgets(
        &self,
        user_id: Option<&str>,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<Budget>, SpendwiseError> {
        let budgets = self.budgets.read().await;
        let mut matched: Vec<Budget> = budgets
            .values()
            .filter(|b| user_id.is_none_or(|id| b.user_id == id))
            .filter(|b| month.is_none_or(|m| b.month == m))
            .filter(|b| year.is_none_or(|y| b.year == y))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            (a.year, a.month, &a.category, &a.user_id).cmp(&(b.year, b.month, &b.category, &b.user_id))
        });
        Ok(matched)
    }

    async fn delete_budget(&self, budget_id: &str) -> Result<Option<Budget>, SpendwiseError> {
        let mut budgets = self.budgets.write().await;
        Ok(budgets.remove(budget_id))
    }

    async fn upsert_alert_setting(&self, setting: AlertSetting) -> Result<(AlertSetting, bool), SpendwiseError> {
        let mut settings = self.alert_settings.write().await;
        if let Some(existing) = settings
            .values_mut()
            .find(|s| s.user_id == setting.user_id && s.category == setting.category)
        {
            existing.threshold_percentage = setting.threshold_percentage;
            existing.email_enabled = setting.email_enabled;
            return Ok((existing.clone(), false));
        }
        settings.insert(setting.id.clone(), setting.clone());
        Ok((setting, true))
    }

    async fn find_alert_setting(&self, user_id: &str, category: &str) -> Result<Option<AlertSetting>, SpendwiseError> {
        let settings = self.alert_settings.read().await;
        Ok(settings
            .values()
            .find(|s| s.user_id == user_id && s.category == category)
            .cloned())
    }

    async fn list_alert_settings(&self, user_id: &str) -> Result<Vec<AlertSetting>, SpendwiseError> {
        let settings = self.alert_settings.read().await;
        let mut matched: Vec<AlertSetting> = settings.values().filter(|s| s.user_id == user_id).cloned().collect();
        matched.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(matched)
    }

    async fn save_group(&self, group: Group) -> Result<(), SpendwiseError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, SpendwiseError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn list_groups(&self, member_id: Option<&str>) -> Result<Vec<Group>, SpendwiseError> {
        let groups = self.groups.read().await;
        let mut matched: Vec<Group> = groups
            .values()
            .filter(|g| member_id.is_none_or(|id| g.is_member(id)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matched)
    }

    async fn save_group_expense(&self, expense: GroupExpense) -> Result<(), SpendwiseError> {
        let mut group_expenses = self.group_expenses.write().await;
        group_expenses.insert(expense.id.clone(), expense);
        Ok(())
    }

    async fn list_group_expenses(&self, group_id: &str) -> Result<Vec<GroupExpense>, SpendwiseError> {
        let group_expenses = self.group_expenses.read().await;
        let mut matched: Vec<GroupExpense> = group_expenses
            .values()
            .filter(|e| e.group_id == group_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(matched)
    }

    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), SpendwiseError> {
        let mut group_audits = self.group_audits.write().await;
        group_audits
            .entry(audit.group_id.clone())
            .or_insert_with(Vec::new)
            .push(audit);
        Ok(())
    }

    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, SpendwiseError> {
        let group_audits = self.group_audits.read().await;
        Ok(group_audits.get(group_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn budget(id: &str, amount: i64) -> Budget {
        Budget {
            id: id.to_string(),
            user_id: "u1".to_string(),
            category: "Food".to_string(),
            month: 5,
            year: 2024,
            amount: Decimal::new(amount, 0),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_budget_upsert_keeps_one_row_per_slot() {
        let storage = InMemoryStorage::new();
        let (first, created) = storage.upsert_budget(budget("b1", 100)).await.unwrap();
        assert!(created);
        let (second, created) = storage.upsert_budget(budget("b2", 250)).await.unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.amount, Decimal::new(250, 0));

        let all = storage.list_budgets(Some("u1"), None, None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_email_uniqueness_ignores_case() {
        let storage = InMemoryStorage::new();
        let user = User {
            id: "u1".to_string(),
            name: "Ana".to_string(),
            email: "Ana@Example.com".to_string(),
            created_at: Utc::now(),
        };
        storage.insert_user(user.clone()).await.unwrap();
        let dup = User {
            id: "u2".to_string(),
            email: "ana@example.COM".to_string(),
            ..user
        };
        assert!(matches!(
            storage.insert_user(dup).await,
            Err(SpendwiseError::EmailAlreadyRegistered(_))
        ));
        assert!(storage.get_user("u2").await.unwrap().is_none());
    }
}
