pub mod alert;
pub mod audit;
pub mod budget;
pub mod expense;
pub mod group;
pub mod group_expense;
pub mod user;
