pub mod alerts;
pub mod balance;
pub mod errors;
pub mod locks;
pub mod models;
pub mod services;
pub mod split;
pub mod summary;
