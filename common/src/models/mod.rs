//! Shared data models.

pub mod report;

// Re-export commonly used types
pub use report::{HealthResponse, ReportParams, ReportResponse, ReportRow};
