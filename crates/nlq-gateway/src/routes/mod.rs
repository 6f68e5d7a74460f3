//! HTTP route handlers.

pub mod health;
pub mod query;
pub mod schema;
