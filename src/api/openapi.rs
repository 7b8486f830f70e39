use utoipa::OpenApi;

use crate::{
    api::models::{
        CreateAlertSettingRequest, CreateBudgetRequest, CreateExpenseRequest, CreateGroupExpenseRequest,
        CreateGroupRequest, CreateUserRequest, ErrorResponse, MessageResponse,
    },
    core::{
        balance::{BalanceStatus, GroupBalance, MemberBalance},
        models::{
            alert::{AlertSetting, BudgetAlert},
            audit::{AppLog, GroupAudit},
            budget::Budget,
            expense::Expense,
            group::{Group, GroupMember},
            group_expense::{GroupExpense, SplitType},
            user::User,
        },
        services::ExpenseReceipt,
        summary::{CategoryComparison, MonthlySummary},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::create_user,
        super::handlers::list_users,
        super::handlers::search_users,
        super::handlers::get_user,
        super::handlers::create_expense,
        super::handlers::list_expenses,
        super::handlers::delete_expense,
        super::handlers::create_budget,
        super::handlers::list_budgets,
        super::handlers::delete_budget,
        super::handlers::create_alert_setting,
        super::handlers::list_alert_settings,
        super::handlers::get_monthly_summary,
        super::handlers::create_group,
        super::handlers::list_groups,
        super::handlers::get_group,
        super::handlers::create_group_expense,
        super::handlers::list_group_expenses,
        super::handlers::get_group_balance,
        super::handlers::get_group_audits,
        super::handlers::list_categories,
        super::handlers::get_app_logs
    ),
    components(schemas(
        CreateUserRequest,
        CreateExpenseRequest,
        CreateBudgetRequest,
        CreateAlertSettingRequest,
        CreateGroupRequest,
        CreateGroupExpenseRequest,
        MessageResponse,
        ErrorResponse,
        User,
        Expense,
        ExpenseReceipt,
        Budget,
        AlertSetting,
        BudgetAlert,
        Group,
        GroupMember,
        GroupExpense,
        SplitType,
        GroupBalance,
        MemberBalance,
        BalanceStatus,
        MonthlySummary,
        CategoryComparison,
        AppLog,
        GroupAudit
    )),
    info(
        title = "Spendwise API",
        description = "API for personal expenses, monthly budgets with alerts, and shared group expenses",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
