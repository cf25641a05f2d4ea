//! Common types and utilities for the OCI REST API

use serde::Deserialize;

/// Continuation token header on list responses
pub const OPC_NEXT_PAGE: &str = "opc-next-page";
/// Service-assigned id of a request, quoted in support cases
pub const OPC_REQUEST_ID: &str = "opc-request-id";

/// Body returned with non-success statuses
#[derive(Debug, Deserialize)]
pub struct ServiceErrorBody {
    pub code: String,
    pub message: String,
}

/// Decoded body plus the response headers callers care about
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub next_page: Option<String>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

/// `YYYY-MM-DD HH:MM:SS[.fraction] +0000 UTC`, e.g. `2019-03-01 10:20:30.123 +0000 UTC`.
/// Trailing zeros of the fraction are trimmed; a whole second has no fraction.
pub fn format_oci_time(time: &chrono::DateTime<chrono::Utc>) -> String {
    let base = time.format("%Y-%m-%d %H:%M:%S").to_string();
    let nanos = time.timestamp_subsec_nanos();
    if nanos == 0 {
        format!("{} +0000 UTC", base)
    } else {
        let fraction = format!("{:09}", nanos);
        format!("{}.{} +0000 UTC", base, fraction.trim_end_matches('0'))
    }
}
