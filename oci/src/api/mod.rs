//! OCI REST API client
//!
//! Only the Database service calls needed by the data sources are modeled.

pub mod client;
pub mod common;
pub mod database;
pub mod error;
pub mod pagination;
pub mod pool;
pub mod retry;

#[cfg(test)]
pub mod test_helpers;

pub use client::{Client, ClientConfig};
pub use common::{ApiQueryParams, ApiResponse};
pub use database::{Database, DatabaseApi, DatabaseSummary, GetDatabaseRequest, ListDatabasesRequest};
pub use error::ApiError;
pub use pagination::{fetch_all, Page, PagedRequest};
pub use pool::{ConnectionPoolConfig, RequestStats};
pub use retry::RetryPolicy;
