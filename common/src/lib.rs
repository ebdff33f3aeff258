//! Shared modules for the report service workspace.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
