pub const USER_CREATED: &str = "USER_CREATED";
pub const EXPENSE_CREATED: &str = "EXPENSE_CREATED";
pub const EXPENSE_DELETED: &str = "EXPENSE_DELETED";
pub const BUDGET_SAVED: &str = "BUDGET_SAVED";
pub const BUDGET_DELETED: &str = "BUDGET_DELETED";
pub const ALERT_SETTING_SAVED: &str = "ALERT_SETTING_SAVED";
pub const BUDGET_ALERT_RAISED: &str = "BUDGET_ALERT_RAISED";
pub const GROUP_CREATED: &str = "GROUP_CREATED";
pub const GROUP_EXPENSE_ADDED: &str = "GROUP_EXPENSE_ADDED";

pub const DEFAULT_ALERT_THRESHOLD: u8 = 90;
pub const USER_SEARCH_LIMIT: usize = 10;
pub const MAX_AMOUNT: i64 = 1_000_000;
pub const OUTBOX_CAPACITY: usize = 500;

pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Food",
    "Transport",
    "Entertainment",
    "Shopping",
    "Bills",
    "Healthcare",
    "Education",
    "Other",
];
