use crate::config::LedgerSettings;
use crate::constants::{
    ALERT_SETTING_SAVED, BUDGET_ALERT_RAISED, BUDGET_DELETED, BUDGET_SAVED, EXPENSE_CREATED, EXPENSE_DELETED,
    GROUP_CREATED, GROUP_EXPENSE_ADDED, MAX_AMOUNT, USER_CREATED, USER_SEARCH_LIMIT,
};
use crate::core::alerts::{category_spend, evaluate_budget_alert};
use crate::core::balance::{GroupBalance, aggregate_balances};
use crate::core::errors::SpendwiseError;
use crate::core::locks::{AggregateLocks, alert_setting_key, budget_key, group_key};
use crate::core::models::{
    alert::{AlertSetting, BudgetAlert},
    audit::{AppLog, GroupAudit},
    budget::{Budget, Period},
    expense::{Expense, ExpenseFilter},
    group::{Group, GroupMember},
    group_expense::{GroupExpense, SplitType},
    user::User,
};
use crate::core::split::split_expense;
use crate::core::summary::{MonthlySummary, summarize_month};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::notify::{AlertNotification, AlertNotifier};
use crate::infrastructure::storage::Storage;
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Result of recording a personal expense.
#[derive(Serialize, Deserialize, Debug, ToSchema, Clone)]
pub struct ExpenseReceipt {
    pub expense: Expense,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub alert: Option<BudgetAlert>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub user_id: String,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: String,
    pub category: String,
    pub month: u32,
    pub year: i32,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewAlertSetting {
    pub user_id: String,
    pub category: String,
    /// Falls back to the configured default when absent.
    pub threshold_percentage: Option<u8>,
    /// Defaults to `true`.
    pub email_enabled: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewGroupExpense {
    pub group_id: String,
    pub description: String,
    pub total_amount: Decimal,
    pub category: String,
    pub paid_by: String,
    pub split_type: String,
    /// Per-member amounts, only for the `exact` split type.
    pub splits: Option<HashMap<String, Decimal>>,
    pub date: NaiveDateTime,
}

pub struct SpendwiseService<L: LoggingService, S: Storage, N: AlertNotifier> {
    storage: S,
    logging: L,
    notifier: N,
    settings: LedgerSettings,
    locks: AggregateLocks,
}

impl<L: LoggingService, S: Storage, N: AlertNotifier> SpendwiseService<L, S, N> {
    pub fn new(storage: S, logging: L, notifier: N, settings: LedgerSettings) -> Self {
        info!("Initializing SpendwiseService with {} categories", settings.categories.len());
        SpendwiseService {
            storage,
            logging,
            notifier,
            settings,
            locks: AggregateLocks::new(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.settings.categories
    }

    async fn require_user(&self, user_id: &str) -> Result<User, SpendwiseError> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| SpendwiseError::UserNotFound(user_id.to_string()))
    }

    async fn require_group(&self, group_id: &str) -> Result<Group, SpendwiseError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| SpendwiseError::GroupNotFound(group_id.to_string()))
    }

    async fn log_and_audit(
        &self,
        group_id: Option<&str>,
        action: &str,
        log_details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), SpendwiseError> {
        self.logging.log_action(action, log_details.clone(), user_id).await?;
        if let Some(gid) = group_id {
            self.storage
                .save_group_audit(GroupAudit {
                    id: Uuid::new_v4().to_string(),
                    group_id: gid.to_string(),
                    action: action.to_string(),
                    user_id: user_id.map(String::from),
                    details: audit_details(log_details)?,
                    timestamp: Utc::now(),
                })
                .await?;
        }
        Ok(())
    }

    /// Audit entry for a write that is already committed. A failure here is
    /// logged and swallowed so the caller never sees an error for stored data.
    async fn audit_committed(
        &self,
        group_id: Option<&str>,
        action: &str,
        log_details: serde_json::Value,
        user_id: Option<&str>,
    ) {
        if let Err(e) = self.log_and_audit(group_id, action, log_details, user_id).await {
            warn!("Failed to record {} audit entry: {}", action, e);
        }
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), SpendwiseError> {
        if value.trim().is_empty() {
            return Err(SpendwiseError::invalid(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(SpendwiseError::invalid(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(SpendwiseError::invalid(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    /// Normalizes an optional free-text field: blank becomes `None`.
    fn validate_optional_text(
        &self,
        field: &str,
        value: Option<String>,
        max_length: usize,
    ) -> Result<Option<String>, SpendwiseError> {
        match value {
            Some(text) if !text.trim().is_empty() => {
                self.validate_string_input(field, &text, max_length)?;
                Ok(Some(text.trim().to_string()))
            }
            _ => Ok(None),
        }
    }

    fn validate_amount_input(&self, field: &str, amount: Decimal) -> Result<(), SpendwiseError> {
        if amount < Decimal::ZERO {
            return Err(SpendwiseError::invalid(field, "Invalid Amount", "Amount cannot be negative"));
        }
        if amount > Decimal::from(MAX_AMOUNT) {
            return Err(SpendwiseError::invalid(
                field,
                "Amount Too Large",
                format!("Amount cannot exceed {}", MAX_AMOUNT),
            ));
        }
        if amount.normalize().scale() > 2 {
            return Err(SpendwiseError::invalid(
                field,
                "Invalid Amount",
                "Amount cannot have more than 2 decimal places",
            ));
        }
        Ok(())
    }

    fn validate_category(&self, category: &str) -> Result<(), SpendwiseError> {
        if !self.settings.is_category(category) {
            return Err(SpendwiseError::invalid(
                "category",
                "Unknown Category",
                format!("{} is not one of: {}", category, self.settings.categories.join(", ")),
            ));
        }
        Ok(())
    }

    // USERS

    pub async fn add_user(&self, name: String, email: String) -> Result<User, SpendwiseError> {
        let email = email.trim().to_string();
        if email.is_empty() {
            return Err(SpendwiseError::MissingEmail);
        }
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(SpendwiseError::InvalidEmail(email));
        }
        self.validate_string_input("name", &name, 100)?;

        let user = self
            .storage
            .insert_user(User {
                id: Uuid::new_v4().to_string(),
                name: name.trim().to_string(),
                email,
                created_at: Utc::now(),
            })
            .await?;
        info!("Created user {}", user.id);

        self.audit_committed(
            None,
            USER_CREATED,
            json!({ "user_id": user.id, "name": user.name, "email": user.email }),
            Some(user.id.as_str()),
        )
        .await;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, SpendwiseError> {
        self.require_user(user_id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>, SpendwiseError> {
        self.storage.list_users().await
    }

    /// Case-insensitive substring match on email. Nobody is excluded here;
    /// callers filter out themselves and already-chosen members.
    pub async fn search_users_by_email(&self, query: &str) -> Result<Vec<User>, SpendwiseError> {
        if query.trim().is_empty() {
            return Err(SpendwiseError::invalid(
                "email",
                "Invalid email",
                "Email search term is required",
            ));
        }
        self.storage.search_users_by_email(query, USER_SEARCH_LIMIT).await
    }

    // PERSONAL EXPENSES

    pub async fn create_expense(&self, new_expense: NewExpense) -> Result<ExpenseReceipt, SpendwiseError> {
        let user = self.require_user(&new_expense.user_id).await?;
        self.validate_category(&new_expense.category)?;
        self.validate_amount_input("amount", new_expense.amount)?;
        let description = self.validate_optional_text("description", new_expense.description, 200)?;

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            category: new_expense.category,
            amount: new_expense.amount,
            description,
            date: new_expense.date,
            created_at: Utc::now(),
        };
        let period = expense.period();
        info!(
            "Recording expense of {} in {} for user {} ({})",
            expense.amount, expense.category, user.id, period
        );

        let _guard = self
            .locks
            .acquire(budget_key(&user.id, &expense.category, period))
            .await;

        let pending = self.evaluate_alert(&user, &expense).await?;
        self.storage.save_expense(expense.clone()).await?;
        let alert = match pending {
            Some((alert, email_enabled)) => {
                self.raise_alert(&user, &alert, email_enabled).await;
                Some(alert)
            }
            None => None,
        };

        self.audit_committed(
            None,
            EXPENSE_CREATED,
            json!({
                "expense_id": expense.id,
                "category": expense.category,
                "amount": expense.amount,
                "period": period.to_string()
            }),
            Some(user.id.as_str()),
        )
        .await;

        Ok(ExpenseReceipt { expense, alert })
    }

    /// Works out the alert `expense` would trigger once stored, counting it
    /// on top of the recorded spend. The flag says whether to e-mail it.
    /// Caller holds the budget lock.
    async fn evaluate_alert(
        &self,
        user: &User,
        expense: &Expense,
    ) -> Result<Option<(BudgetAlert, bool)>, SpendwiseError> {
        let category = expense.category.as_str();
        let period = expense.period();
        let budget = self.storage.find_budget(&user.id, category, period).await?;
        if budget.is_none() {
            debug!("No {} budget for user {} in {}", category, user.id, period);
            return Ok(None);
        }
        let setting = self.storage.find_alert_setting(&user.id, category).await?;
        let mut expenses = self
            .storage
            .list_expenses(&ExpenseFilter {
                user_id: Some(user.id.clone()),
                category: Some(category.to_string()),
                month: Some(period.month),
                year: Some(period.year),
            })
            .await?;
        expenses.push(expense.clone());
        let spent = category_spend(&expenses, &user.id, category, period);

        let alert = evaluate_budget_alert(
            category,
            spent,
            budget.as_ref(),
            setting.as_ref(),
            self.settings.default_alert_threshold,
        );
        Ok(alert.map(|alert| (alert, setting.is_some_and(|s| s.email_enabled))))
    }

    /// Records and dispatches an alert for an expense that is already stored.
    async fn raise_alert(&self, user: &User, alert: &BudgetAlert, email_enabled: bool) {
        info!(
            "Budget alert for user {} in {}: {}% used, exceeded={}",
            user.id, alert.category, alert.percentage_used, alert.exceeded
        );
        self.audit_committed(
            None,
            BUDGET_ALERT_RAISED,
            json!({
                "category": alert.category,
                "spent_amount": alert.spent_amount,
                "budget_amount": alert.budget_amount,
                "exceeded": alert.exceeded,
                "threshold_reached": alert.threshold_reached
            }),
            Some(user.id.as_str()),
        )
        .await;

        if email_enabled {
            if let Err(e) = self.notifier.send(AlertNotification::for_alert(user, alert)).await {
                warn!("Failed to send budget alert to {}: {}", user.email, e);
            }
        }
    }

    pub async fn list_expenses(&self, filter: ExpenseFilter) -> Result<Vec<Expense>, SpendwiseError> {
        self.storage.list_expenses(&filter).await
    }

    pub async fn delete_expense(&self, expense_id: &str) -> Result<Expense, SpendwiseError> {
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| SpendwiseError::ExpenseNotFound(expense_id.to_string()))?;
        let _guard = self
            .locks
            .acquire(budget_key(&expense.user_id, &expense.category, expense.period()))
            .await;

        let deleted = self
            .storage
            .delete_expense(expense_id)
            .await?
            .ok_or_else(|| SpendwiseError::ExpenseNotFound(expense_id.to_string()))?;
        info!("Deleted expense {}", deleted.id);

        self.audit_committed(
            None,
            EXPENSE_DELETED,
            json!({ "expense_id": deleted.id, "category": deleted.category, "amount": deleted.amount }),
            Some(deleted.user_id.as_str()),
        )
        .await;
        Ok(deleted)
    }

    // BUDGETS

    /// Creates the budget for (user, category, period) or overwrites its
    /// amount. The flag is `true` when a new row was created.
    pub async fn save_budget(&self, new_budget: NewBudget) -> Result<(Budget, bool), SpendwiseError> {
        let user = self.require_user(&new_budget.user_id).await?;
        self.validate_category(&new_budget.category)?;
        let period = Period::new(new_budget.month, new_budget.year)?;
        self.validate_amount_input("amount", new_budget.amount)?;

        let _guard = self
            .locks
            .acquire(budget_key(&user.id, &new_budget.category, period))
            .await;
        let (budget, created) = self
            .storage
            .upsert_budget(Budget {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                category: new_budget.category,
                month: period.month,
                year: period.year,
                amount: new_budget.amount,
                created_at: Utc::now(),
            })
            .await?;
        info!(
            "{} {} budget {} for user {} in {}",
            if created { "Created" } else { "Updated" },
            budget.category,
            budget.id,
            user.id,
            period
        );

        self.audit_committed(
            None,
            BUDGET_SAVED,
            json!({
                "budget_id": budget.id,
                "category": budget.category,
                "amount": budget.amount,
                "period": period.to_string(),
                "created": created
            }),
            Some(user.id.as_str()),
        )
        .await;
        Ok((budget, created))
    }

    pub async fn list_budgets(
        &self,
        user_id: Option<&str>,
        month: Option<u32>,
        year: Option<i32>,
    ) -> Result<Vec<Budget>, SpendwiseError> {
        self.storage.list_budgets(user_id, month, year).await
    }

    pub async fn delete_budget(&self, budget_id: &str) -> Result<Budget, SpendwiseError> {
        let budget = self
            .storage
            .get_budget(budget_id)
            .await?
            .ok_or_else(|| SpendwiseError::BudgetNotFound(budget_id.to_string()))?;
        let _guard = self
            .locks
            .acquire(budget_key(&budget.user_id, &budget.category, budget.period()))
            .await;

        let deleted = self
            .storage
            .delete_budget(budget_id)
            .await?
            .ok_or_else(|| SpendwiseError::BudgetNotFound(budget_id.to_string()))?;
        info!("Deleted budget {}", deleted.id);

        self.audit_committed(
            None,
            BUDGET_DELETED,
            json!({ "budget_id": deleted.id, "category": deleted.category }),
            Some(deleted.user_id.as_str()),
        )
        .await;
        Ok(deleted)
    }

    // ALERT SETTINGS

    pub async fn save_alert_setting(
        &self,
        new_setting: NewAlertSetting,
    ) -> Result<(AlertSetting, bool), SpendwiseError> {
        let user = self.require_user(&new_setting.user_id).await?;
        self.validate_category(&new_setting.category)?;
        let threshold = new_setting
            .threshold_percentage
            .unwrap_or(self.settings.default_alert_threshold);
        if !(1..=100).contains(&threshold) {
            return Err(SpendwiseError::invalid(
                "threshold_percentage",
                "Invalid Threshold",
                "Threshold must be between 1 and 100",
            ));
        }

        let _guard = self
            .locks
            .acquire(alert_setting_key(&user.id, &new_setting.category))
            .await;
        let (setting, created) = self
            .storage
            .upsert_alert_setting(AlertSetting {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                category: new_setting.category,
                threshold_percentage: threshold,
                email_enabled: new_setting.email_enabled.unwrap_or(true),
                created_at: Utc::now(),
            })
            .await?;
        debug!("Alert setting {} saved (created={})", setting.id, created);

        self.audit_committed(
            None,
            ALERT_SETTING_SAVED,
            json!({
                "setting_id": setting.id,
                "category": setting.category,
                "threshold_percentage": setting.threshold_percentage,
                "email_enabled": setting.email_enabled
            }),
            Some(user.id.as_str()),
        )
        .await;
        Ok((setting, created))
    }

    pub async fn list_alert_settings(&self, user_id: &str) -> Result<Vec<AlertSetting>, SpendwiseError> {
        let user = self.require_user(user_id).await?;
        self.storage.list_alert_settings(&user.id).await
    }

    // REPORTS

    pub async fn monthly_summary(&self, user_id: &str, month: u32, year: i32) -> Result<MonthlySummary, SpendwiseError> {
        let user = self.require_user(user_id).await?;
        let period = Period::new(month, year)?;
        let expenses = self
            .storage
            .list_expenses(&ExpenseFilter {
                user_id: Some(user.id.clone()),
                category: None,
                month: Some(period.month),
                year: Some(period.year),
            })
            .await?;
        let budgets = self
            .storage
            .list_budgets(Some(user.id.as_str()), Some(period.month), Some(period.year))
            .await?;
        debug!(
            "Summarizing {} expenses and {} budgets for user {} in {}",
            expenses.len(),
            budgets.len(),
            user.id,
            period
        );
        Ok(summarize_month(&user.id, period, &expenses, &budgets, &self.settings.categories))
    }

    // GROUPS

    pub async fn create_group(&self, new_group: NewGroup) -> Result<Group, SpendwiseError> {
        self.validate_string_input("name", &new_group.name, 100)?;
        let description = self
            .validate_optional_text("description", new_group.description, 200)?
            .unwrap_or_default();

        let mut other_ids: Vec<String> = Vec::new();
        for id in new_group.member_ids {
            if id != new_group.created_by && !other_ids.contains(&id) {
                other_ids.push(id);
            }
        }
        if other_ids.is_empty() {
            warn!("Group '{}' rejected: no members besides the creator", new_group.name);
            return Err(SpendwiseError::EmptyMembership);
        }

        let creator = self.require_user(&new_group.created_by).await?;
        let others = futures::future::try_join_all(other_ids.iter().map(|id| self.require_user(id))).await?;

        let now = Utc::now();
        let members = std::iter::once(creator.clone())
            .chain(others)
            .map(|user| GroupMember {
                user_id: user.id,
                user_name: user.name,
                joined_at: now,
            })
            .collect();

        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: new_group.name.trim().to_string(),
            description,
            created_by: creator.id.clone(),
            members,
            created_at: now,
        };
        self.storage.save_group(group.clone()).await?;
        info!("Created group {} with {} members", group.id, group.members.len());

        self.audit_committed(
            Some(&group.id),
            GROUP_CREATED,
            json!({
                "group_id": group.id,
                "name": group.name,
                "member_ids": group.member_ids()
            }),
            Some(creator.id.as_str()),
        )
        .await;
        Ok(group)
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group, SpendwiseError> {
        self.require_group(group_id).await
    }

    pub async fn list_groups(&self, member_id: Option<&str>) -> Result<Vec<Group>, SpendwiseError> {
        self.storage.list_groups(member_id).await
    }

    pub async fn create_group_expense(&self, new_expense: NewGroupExpense) -> Result<GroupExpense, SpendwiseError> {
        let _guard = self.locks.acquire(group_key(&new_expense.group_id)).await;
        let group = self.require_group(&new_expense.group_id).await?;

        self.validate_string_input("description", &new_expense.description, 200)?;
        self.validate_category(&new_expense.category)?;
        let split_type = SplitType::parse(&new_expense.split_type)?;

        let payer = group.member(&new_expense.paid_by).cloned().ok_or_else(|| {
            warn!("Payer {} is not in group {}", new_expense.paid_by, group.id);
            SpendwiseError::NotAMember(new_expense.paid_by.clone())
        })?;

        if new_expense.total_amount > Decimal::from(MAX_AMOUNT) {
            return Err(SpendwiseError::invalid(
                "total_amount",
                "Amount Too Large",
                format!("Amount cannot exceed {}", MAX_AMOUNT),
            ));
        }
        let shares = split_expense(
            new_expense.total_amount,
            &group.member_ids(),
            split_type,
            new_expense.splits.as_ref(),
        )?;

        let expense = GroupExpense {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            description: new_expense.description.trim().to_string(),
            total_amount: new_expense.total_amount,
            category: new_expense.category,
            paid_by: payer.user_id.clone(),
            payer_name: payer.user_name.clone(),
            split_type,
            date: new_expense.date,
            created_at: Utc::now(),
            shares,
        };
        self.storage.save_group_expense(expense.clone()).await?;
        info!(
            "Group {} expense {} of {} paid by {} ({} split)",
            group.id, expense.id, expense.total_amount, payer.user_id, split_type
        );

        self.audit_committed(
            Some(&group.id),
            GROUP_EXPENSE_ADDED,
            json!({
                "expense_id": expense.id,
                "description": expense.description,
                "total_amount": expense.total_amount,
                "paid_by": expense.paid_by,
                "split_type": split_type.to_string()
            }),
            Some(payer.user_id.as_str()),
        )
        .await;
        Ok(expense)
    }

    pub async fn list_group_expenses(&self, group_id: &str) -> Result<Vec<GroupExpense>, SpendwiseError> {
        let group = self.require_group(group_id).await?;
        self.storage.list_group_expenses(&group.id).await
    }

    pub async fn get_group_balance(&self, group_id: &str) -> Result<GroupBalance, SpendwiseError> {
        let group = self.require_group(group_id).await?;
        let expenses = self.storage.list_group_expenses(&group.id).await?;
        debug!("Aggregating {} expenses for group {}", expenses.len(), group.id);
        Ok(aggregate_balances(&group, &expenses))
    }

    // AUDIT

    pub async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, SpendwiseError> {
        let group = self.require_group(group_id).await?;
        self.storage.get_group_audits(&group.id).await
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, SpendwiseError> {
        self.logging.get_logs().await
    }
}

/// Flattens JSON audit details into the stored key/value map. Details must be
/// a JSON object.
fn audit_details(log_details: serde_json::Value) -> Result<HashMap<String, serde_json::Value>, SpendwiseError> {
    serde_json::from_value(log_details)
        .map_err(|e| SpendwiseError::LoggingError(format!("Failed to serialize audit details: {}", e)))
}
