//! Report endpoint models.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// One result row: column name to JSON value, in SELECT-list order.
///
/// The row shape is defined entirely by the report query; the service
/// passes values through verbatim.
pub type ReportRow = serde_json::Map<String, serde_json::Value>;

/// Pagination parameters for the report endpoint.
///
/// Both values are bound as positional query parameters, never
/// interpolated into the SQL text. Non-numeric or negative input is
/// rejected during deserialization, before any SQL is touched.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Number of leading rows to skip.
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    5000
}

impl Default for ReportParams {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Response body for `GET /dados`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    /// Report rows in query order.
    #[schema(value_type = Vec<Object>)]
    pub dados: Vec<ReportRow>,
}

/// Response body for the liveness endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is up, regardless of pool state.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let params: ReportParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.limit, 5000);
        assert_eq!(params.offset, 0);
    }

    #[test]
    fn explicit_pagination_overrides_defaults() {
        let params: ReportParams = serde_json::from_str(r#"{"limit":100,"offset":200}"#).unwrap();
        assert_eq!(params.limit, 100);
        assert_eq!(params.offset, 200);
    }

    #[test]
    fn negative_pagination_is_rejected() {
        assert!(serde_json::from_str::<ReportParams>(r#"{"limit":-1}"#).is_err());
        assert!(serde_json::from_str::<ReportParams>(r#"{"offset":-5}"#).is_err());
    }

    #[test]
    fn report_response_wraps_rows_in_dados() {
        let mut row = ReportRow::new();
        row.insert("nm_unidade".to_string(), serde_json::json!("Campos"));
        let body = serde_json::to_string(&ReportResponse { dados: vec![row] }).unwrap();
        assert_eq!(body, r#"{"dados":[{"nm_unidade":"Campos"}]}"#);
    }
}
