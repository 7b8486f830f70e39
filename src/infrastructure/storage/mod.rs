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
use async_trait::async_trait;

/// Durable record of users, personal expenses, budgets, alert settings and
/// groups. Implementations enforce the unique keys: user email
/// (case-insensitive), budget (user, category, period) and alert setting
/// (user, category).
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fails with `EmailAlreadyRegistered` when the email is taken.
    async fn insert_user(&self, user: User) -> Result<User, SpendwiseError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, SpendwiseError>;
    async fn list_users(&self) -> Result<Vec<User>, SpendwiseError>;
    async fn search_users_by_email(&self, query: &str, limit: usize) -> Result<Vec<User>, SpendwiseError>;

    async fn save_expense(&self, expense: Expense) -> Result<(), SpendwiseError>;
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, SpendwiseError>;
    async fn delete_expense(&self, expense_id: &str) -> Result<Option<Expense>, SpendwiseError>;
    /// Newest first.
    async fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, SpendwiseError>;

    /// Inserts `budget`, or overwrites the amount of the row already holding
    /// its (user, category, period) slot. Returns the stored row and whether
    /// it was newly created.
    async fn upsert_budget(&self, budget: Budget) -> Result<(Budget, bool), SpendwiseError>;
    async fn get_budget(&self, budget_id: &str) -> Result<Option<Budget>, SpendwiseError>;
    async fn find_budget(
        &self,
        user_id: &str,
        category: &str,
        period: Period,
    ) -> Result<Option<Budget>, SpendwiseError>;
    async fn list_budgets(
        &self,
        user_id: Option<&str>,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<Budget>, SpendwiseError>;
    async fn delete_budget(&self, budget_id: &str) -> Result<Option<Budget>, SpendwiseError>;

    /// Same contract as [`Storage::upsert_budget`], keyed by (user, category).
    async fn upsert_alert_setting(&self, setting: AlertSetting) -> Result<(AlertSetting, bool), SpendwiseError>;
    async fn find_alert_setting(&self, user_id: &str, category: &str) -> Result<Option<AlertSetting>, SpendwiseError>;
    async fn list_alert_settings(&self, user_id: &str) -> Result<Vec<AlertSetting>, SpendwiseError>;

    async fn save_group(&self, group: Group) -> Result<(), SpendwiseError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, SpendwiseError>;
    async fn list_groups(&self, member_id: Option<&str>) -> Result<Vec<Group>, SpendwiseError>;

    async fn save_group_expense(&self, expense: GroupExpense) -> Result<(), SpendwiseError>;
    /// Newest first.
    async fn list_group_expenses(&self, group_id: &str) -> Result<Vec<GroupExpense>, SpendwiseError>;

    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), SpendwiseError>;
    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, SpendwiseError>;
}

pub mod in_memory;
