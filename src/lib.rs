pub mod api;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use api::handlers::{AppService, api_routes};
pub use config::{CONFIG, LedgerSettings};
pub use core::errors::SpendwiseError;
pub use core::services::SpendwiseService;

#[cfg(test)]
mod tests;
