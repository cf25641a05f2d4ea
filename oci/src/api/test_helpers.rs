//! Test helpers for the OCI API

use super::database::{Database, DatabaseApi, GetDatabaseRequest, ListDatabasesRequest};
use super::error::ApiError;
use super::pagination::Page;
use super::retry::RetryPolicy;
use super::{Client, ClientConfig};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tfplug::Context;

/// Retries quickly so throttling tests stay fast
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        max_elapsed: Duration::from_secs(5),
    }
}

pub fn create_test_client(url: &str) -> Client {
    Client::with_config(
        url,
        Some("Bearer test-token"),
        ClientConfig {
            insecure: true,
            default_retry: fast_retry(),
            ..ClientConfig::default()
        },
    )
    .unwrap()
}

/// Minimal database with the given name and lifecycle state
pub fn database(id: &str, db_name: &str, state: &str) -> Database {
    Database {
        id: id.to_string(),
        compartment_id: "ocid1.compartment.oc1..test".to_string(),
        db_name: db_name.to_string(),
        lifecycle_state: state.to_string(),
        character_set: None,
        ncharacter_set: None,
        db_home_id: Some("ocid1.dbhome.oc1..test".to_string()),
        pdb_name: None,
        db_workload: None,
        db_unique_name: None,
        lifecycle_details: None,
        time_created: None,
        db_backup_config: None,
        connection_strings: None,
        freeform_tags: None,
        defined_tags: None,
    }
}

/// In-memory Database service. Page `n` (0-based) is requested with token `T{n+1}`.
#[derive(Default)]
pub struct FakeDatabaseApi {
    pub pages: Vec<Vec<Database>>,
    pub fail_on_page: Option<usize>,
    pub list_requests: Mutex<Vec<ListDatabasesRequest>>,
}

impl FakeDatabaseApi {
    pub fn with_pages(pages: Vec<Vec<Database>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<ListDatabasesRequest> {
        self.list_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DatabaseApi for FakeDatabaseApi {
    async fn list_databases(
        &self,
        ctx: &Context,
        request: &ListDatabasesRequest,
    ) -> Result<Page<Database>, ApiError> {
        if ctx.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        self.list_requests.lock().unwrap().push(request.clone());

        let index = match &request.page {
            None => 0,
            Some(token) => token.trim_start_matches('T').parse::<usize>().unwrap() - 1,
        };
        if self.fail_on_page == Some(index) {
            return Err(ApiError::Service {
                status: 500,
                code: "InternalServerError".to_string(),
                message: "simulated failure".to_string(),
                request_id: Some("fake-request".to_string()),
            });
        }

        Ok(Page {
            items: self.pages.get(index).cloned().unwrap_or_default(),
            next_page: (index + 1 < self.pages.len()).then(|| format!("T{}", index + 2)),
        })
    }

    async fn get_database(
        &self,
        ctx: &Context,
        request: &GetDatabaseRequest,
    ) -> Result<Database, ApiError> {
        if ctx.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        self.pages
            .iter()
            .flatten()
            .find(|db| db.id == request.database_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("database {}", request.database_id)))
    }
}
