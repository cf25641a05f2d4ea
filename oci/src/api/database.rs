//! Database service: models and the list/get operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::client::Client;
use super::common::ApiQueryParams;
use super::error::ApiError;
use super::pagination::{Page, PagedRequest};
use super::retry::RetryPolicy;
use tfplug::Context;

/// Path prefix of the Database service API version
pub const DATABASE_API_VERSION: &str = "/20160918";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnectionStrings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_connection_strings: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdb_default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdb_ip_default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDestinationDetails {
    #[serde(rename = "type")]
    pub destination_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbBackupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_backup_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_backup_window: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_destination_details: Option<Vec<BackupDestinationDetails>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_window_in_days: Option<i64>,
}

/// A database as returned by both `GET /databases` and `GET /databases/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub id: String,
    pub compartment_id: String,
    pub db_name: String,
    pub lifecycle_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncharacter_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_home_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdb_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_workload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_unique_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_backup_config: Option<DbBackupConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_strings: Option<DatabaseConnectionStrings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freeform_tags: Option<HashMap<String, String>>,
    /// namespace -> key -> value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_tags: Option<HashMap<String, HashMap<String, serde_json::Value>>>,
}

/// List entries carry the same fields as a full database
pub type DatabaseSummary = Database;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListDatabasesRequest {
    pub compartment_id: String,
    pub db_home_id: Option<String>,
    pub db_name: Option<String>,
    pub lifecycle_state: Option<String>,
    /// Continuation token from the previous page
    pub page: Option<String>,
    /// Falls back to the client default when unset
    pub retry_policy: Option<RetryPolicy>,
}

impl ListDatabasesRequest {
    pub fn new(compartment_id: impl Into<String>) -> Self {
        Self {
            compartment_id: compartment_id.into(),
            ..Self::default()
        }
    }

    pub fn to_query_params(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add("compartmentId", &self.compartment_id)
            .add_optional("dbHomeId", self.db_home_id.as_ref())
            .add_optional("dbName", self.db_name.as_ref())
            .add_optional("lifecycleState", self.lifecycle_state.as_ref())
            .add_optional("page", self.page.as_ref())
    }
}

impl PagedRequest for ListDatabasesRequest {
    fn set_page(&mut self, page: Option<String>) {
        self.page = page;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetDatabaseRequest {
    pub database_id: String,
    pub retry_policy: Option<RetryPolicy>,
}

impl GetDatabaseRequest {
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            retry_policy: None,
        }
    }
}

/// The Database service operations used by data sources
#[async_trait]
pub trait DatabaseApi: Send + Sync {
    /// One page of databases
    async fn list_databases(
        &self,
        ctx: &Context,
        request: &ListDatabasesRequest,
    ) -> Result<Page<DatabaseSummary>, ApiError>;

    async fn get_database(
        &self,
        ctx: &Context,
        request: &GetDatabaseRequest,
    ) -> Result<Database, ApiError>;
}

#[async_trait]
impl DatabaseApi for Client {
    async fn list_databases(
        &self,
        ctx: &Context,
        request: &ListDatabasesRequest,
    ) -> Result<Page<DatabaseSummary>, ApiError> {
        let path = format!("{}/databases", DATABASE_API_VERSION);
        let response = self
            .get::<Vec<DatabaseSummary>>(
                ctx,
                &path,
                &request.to_query_params(),
                request.retry_policy.as_ref(),
            )
            .await?;

        Ok(Page {
            items: response.data,
            next_page: response.next_page,
        })
    }

    async fn get_database(
        &self,
        ctx: &Context,
        request: &GetDatabaseRequest,
    ) -> Result<Database, ApiError> {
        let path = format!(
            "{}/databases/{}",
            DATABASE_API_VERSION,
            urlencoding::encode(&request.database_id)
        );
        let response = self
            .get::<Database>(ctx, &path, &ApiQueryParams::new(), request.retry_policy.as_ref())
            .await?;

        Ok(response.data)
    }
}
