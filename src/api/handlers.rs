use crate::{
    api::models::*,
    core::{
        balance::GroupBalance,
        models::{
            alert::AlertSetting,
            audit::{AppLog, GroupAudit},
            budget::Budget,
            expense::{Expense, ExpenseFilter},
            group::Group,
            group_expense::GroupExpense,
            user::User,
        },
        services::{
            ExpenseReceipt, NewAlertSetting, NewBudget, NewExpense, NewGroup, NewGroupExpense, SpendwiseService,
        },
        summary::MonthlySummary,
    },
    infrastructure::{
        logging::in_memory::InMemoryLogging, notify::in_memory::OutboxNotifier, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use std::sync::Arc;

pub type AppService = SpendwiseService<InMemoryLogging, InMemoryStorage, OutboxNotifier>;

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/search", get(search_users))
        .route("/users/{user_id}", get(get_user))
        .route("/expenses", post(create_expense).get(list_expenses))
        .route("/expenses/{expense_id}", delete(delete_expense))
        .route("/budgets", post(create_budget).get(list_budgets))
        .route("/budgets/{budget_id}", delete(delete_budget))
        .route("/alert-settings", post(create_alert_setting).get(list_alert_settings))
        .route("/reports/monthly-summary", get(get_monthly_summary))
        .route("/groups", post(create_group).get(list_groups))
        .route("/groups/{group_id}", get(get_group))
        .route(
            "/groups/{group_id}/expenses",
            post(create_group_expense).get(list_group_expenses),
        )
        .route("/groups/{group_id}/balance", get(get_group_balance))
        .route("/groups/{group_id}/audits", get(get_group_audits))
        .route("/categories", get(list_categories))
        .route("/logs", get(get_app_logs))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn create_user(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = service.add_user(req.name, req.email).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn list_users(State(service): State<Arc<AppService>>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(service.list_users().await?))
}

#[utoipa::path(
    get,
    path = "/api/users/search",
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Users whose email contains the term", body = Vec<User>),
        (status = 400, description = "Missing search term", body = ErrorResponse)
    )
)]
pub(crate) async fn search_users(
    State(service): State<Arc<AppService>>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(service.search_users_by_email(&query.email).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_user(
    State(service): State<Arc<AppService>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(service.get_user(&user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded, with a budget alert when one fired", body = ExpenseReceipt),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn create_expense(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseReceipt>), ApiError> {
    let date = parse_request_date("date", req.date.as_deref())?;
    let receipt = service
        .create_expense(NewExpense {
            user_id: req.user_id,
            category: req.category,
            amount: req.amount,
            description: req.description,
            date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    params(ExpenseQuery),
    responses((status = 200, description = "Matching expenses, newest first", body = Vec<Expense>))
)]
pub(crate) async fn list_expenses(
    State(service): State<Arc<AppService>>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = service
        .list_expenses(ExpenseFilter {
            user_id: query.user_id,
            category: query.category,
            month: query.month,
            year: query.year,
        })
        .await?;
    Ok(Json(expenses))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{expense_id}",
    params(("expense_id" = String, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense deleted", body = MessageResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_expense(
    State(service): State<Arc<AppService>>,
    Path(expense_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_expense(&expense_id).await?;
    Ok(Json(MessageResponse {
        message: "Expense deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/budgets",
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget created", body = Budget),
        (status = 200, description = "Existing budget updated", body = Budget),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn create_budget(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<Budget>), ApiError> {
    let (budget, created) = service
        .save_budget(NewBudget {
            user_id: req.user_id,
            category: req.category,
            month: req.month,
            year: req.year,
            amount: req.amount,
        })
        .await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(budget)))
}

#[utoipa::path(
    get,
    path = "/api/budgets",
    params(BudgetQuery),
    responses((status = 200, description = "Matching budgets", body = Vec<Budget>))
)]
pub(crate) async fn list_budgets(
    State(service): State<Arc<AppService>>,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<Vec<Budget>>, ApiError> {
    let budgets = service
        .list_budgets(query.user_id.as_deref(), query.month, query.year)
        .await?;
    Ok(Json(budgets))
}

#[utoipa::path(
    delete,
    path = "/api/budgets/{budget_id}",
    params(("budget_id" = String, Path, description = "Budget ID")),
    responses(
        (status = 200, description = "Budget deleted", body = MessageResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse)
    )
)]
pub(crate) async fn delete_budget(
    State(service): State<Arc<AppService>>,
    Path(budget_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_budget(&budget_id).await?;
    Ok(Json(MessageResponse {
        message: "Budget deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/alert-settings",
    request_body = CreateAlertSettingRequest,
    responses(
        (status = 201, description = "Alert setting created", body = AlertSetting),
        (status = 200, description = "Existing alert setting updated", body = AlertSetting),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn create_alert_setting(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateAlertSettingRequest>,
) -> Result<(StatusCode, Json<AlertSetting>), ApiError> {
    let (setting, created) = service
        .save_alert_setting(NewAlertSetting {
            user_id: req.user_id,
            category: req.category,
            threshold_percentage: req.threshold_percentage,
            email_enabled: req.email_enabled,
        })
        .await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(setting)))
}

#[utoipa::path(
    get,
    path = "/api/alert-settings",
    params(UserQuery),
    responses(
        (status = 200, description = "Alert settings of the user", body = Vec<AlertSetting>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn list_alert_settings(
    State(service): State<Arc<AppService>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<AlertSetting>>, ApiError> {
    Ok(Json(service.list_alert_settings(&query.user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/reports/monthly-summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Spend versus budget for the month", body = MonthlySummary),
        (status = 400, description = "Invalid month or year", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_monthly_summary(
    State(service): State<Arc<AppService>>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<MonthlySummary>, ApiError> {
    let summary = service
        .monthly_summary(&query.user_id, query.month, query.year)
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 400, description = "Bad request or no members", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    )
)]
pub(crate) async fn create_group(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let group = service
        .create_group(NewGroup {
            name: req.name,
            description: req.description,
            created_by: req.created_by,
            member_ids: req.member_ids,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    params(GroupQuery),
    responses((status = 200, description = "Groups, optionally only those a user belongs to", body = Vec<Group>))
)]
pub(crate) async fn list_groups(
    State(service): State<Arc<AppService>>,
    Query(query): Query<GroupQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(service.list_groups(query.user_id.as_deref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group found", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(service.get_group(&group_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/expenses",
    params(("group_id" = String, Path, description = "Group ID")),
    request_body = CreateGroupExpenseRequest,
    responses(
        (status = 201, description = "Group expense recorded", body = GroupExpense),
        (status = 400, description = "Invalid split or payer not in group", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn create_group_expense(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<CreateGroupExpenseRequest>,
) -> Result<(StatusCode, Json<GroupExpense>), ApiError> {
    let date = parse_request_date("date", req.date.as_deref())?;
    let expense = service
        .create_group_expense(NewGroupExpense {
            group_id,
            description: req.description,
            total_amount: req.total_amount,
            category: req.category,
            paid_by: req.paid_by,
            split_type: req.split_type.unwrap_or_else(|| "equal".to_string()),
            splits: req.splits,
            date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/expenses",
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group expenses, newest first", body = Vec<GroupExpense>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn list_group_expenses(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<GroupExpense>>, ApiError> {
    Ok(Json(service.list_group_expenses(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/balance",
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Net balance of every member", body = GroupBalance),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_group_balance(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupBalance>, ApiError> {
    Ok(Json(service.get_group_balance(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/audits",
    params(("group_id" = String, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group audit trail", body = Vec<GroupAudit>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub(crate) async fn get_group_audits(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<GroupAudit>>, ApiError> {
    Ok(Json(service.get_group_audits(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Accepted expense categories", body = Vec<String>))
)]
pub(crate) async fn list_categories(State(service): State<Arc<AppService>>) -> Json<Vec<String>> {
    Json(service.categories().to_vec())
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Application audit log", body = Vec<AppLog>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn get_app_logs(State(service): State<Arc<AppService>>) -> Result<Json<Vec<AppLog>>, ApiError> {
    Ok(Json(service.get_app_logs().await?))
}
