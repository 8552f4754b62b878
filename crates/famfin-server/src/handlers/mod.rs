//! HTTP request handlers organized by domain

pub mod health;
pub mod reports;
pub mod transactions;

// Re-export all handlers for use in router
pub use health::*;
pub use reports::*;
pub use transactions::*;
