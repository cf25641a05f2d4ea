//! `oci_database_databases` data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::filter::{filter_block, Filter, FilterSet};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use super::collection::{read_collection, CollectionError, CollectionResult};
use super::database::{database_object_type, database_to_record};
use crate::api::database::ListDatabasesRequest;
use crate::OciProviderData;

pub const DATABASES_DATA_SOURCE: &str = "oci_database_databases";

#[derive(Default)]
pub struct DatabasesDataSource {
    provider_data: Option<OciProviderData>,
}

impl DatabasesDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn list(
        &self,
        ctx: &Context,
        provider_data: &OciProviderData,
        request: &ListDatabasesRequest,
        filters: &[Filter],
    ) -> Result<CollectionResult, CollectionError> {
        let api = provider_data.database.as_ref();
        read_collection(
            ctx,
            request,
            |page_request| async move { api.list_databases(ctx, &page_request).await },
            database_to_record,
            filters,
        )
        .await
    }
}

/// Build the list request from data source configuration
fn list_request(
    config: &DynamicValue,
    provider_data: &OciProviderData,
) -> Result<ListDatabasesRequest, Diagnostic> {
    let compartment_id = config
        .get_string(&AttributePath::new("compartment_id"))
        .map_err(|e| {
            Diagnostic::error("Missing compartment_id", e.to_string())
                .with_attribute(AttributePath::new("compartment_id"))
        })?;

    let optional = |name: &str| match config.get(&AttributePath::new(name)) {
        Some(Dynamic::String(value)) => Some(value.clone()),
        _ => None,
    };

    Ok(ListDatabasesRequest {
        compartment_id,
        db_home_id: optional("db_home_id"),
        db_name: optional("db_name"),
        lifecycle_state: optional("state"),
        retry_policy: Some(provider_data.retry_policy.clone()),
        ..ListDatabasesRequest::default()
    })
}

#[async_trait]
impl DataSource for DatabasesDataSource {
    fn type_name(&self) -> &str {
        DATABASES_DATA_SOURCE
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Lists the databases in a Database Home")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Identifier of this read")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("compartment_id", AttributeType::String)
                    .description("The OCID of the compartment")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("db_home_id", AttributeType::String)
                    .description("The OCID of the Database Home")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("db_name", AttributeType::String)
                    .description("Only return databases with this exact name")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("state", AttributeType::String)
                    .description("Only return databases in this lifecycle state")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("databases", AttributeType::list_of(database_object_type()))
                    .description("The matching databases")
                    .computed()
                    .build(),
            )
            .block(filter_block())
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        let mut diagnostics = vec![];

        for name in ["compartment_id", "db_home_id"] {
            if let Some(Dynamic::String(id)) = request.config.get(&AttributePath::new(name)) {
                if id.is_empty() {
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Invalid {}", name),
                            format!("{} must not be empty", name),
                        )
                        .with_attribute(AttributePath::new(name)),
                    );
                }
            }
        }

        match Filter::from_config(&request.config) {
            Ok(filters) => {
                if let Err(e) = FilterSet::compile(&filters) {
                    diagnostics.push(
                        Diagnostic::error("Invalid filter", e.to_string())
                            .with_attribute(AttributePath::new("filter")),
                    );
                }
            }
            Err(e) => diagnostics.push(
                Diagnostic::error("Invalid filter", e.to_string())
                    .with_attribute(AttributePath::new("filter")),
            ),
        }

        ValidateDataSourceConfigResponse { diagnostics }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                return ReadDataSourceResponse::cleared(vec![Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                )])
            }
        };

        let list_request = match list_request(&request.config, provider_data) {
            Ok(r) => r,
            Err(diag) => return ReadDataSourceResponse::cleared(vec![diag]),
        };

        let filters = match Filter::from_config(&request.config) {
            Ok(filters) => filters,
            Err(e) => {
                return ReadDataSourceResponse::cleared(vec![Diagnostic::error(
                    "Invalid filter",
                    e.to_string(),
                )])
            }
        };

        tracing::debug!(
            "Listing databases in compartment {} with {} filter(s)",
            list_request.compartment_id,
            filters.len()
        );

        let result = match self.list(&ctx, provider_data, &list_request, &filters).await {
            Ok(result) => result,
            Err(CollectionError::Api(e)) => {
                return ReadDataSourceResponse::cleared(vec![Diagnostic::error(
                    "Failed to list databases",
                    format!("API error: {}", e),
                )])
            }
            Err(CollectionError::Filter(e)) => {
                return ReadDataSourceResponse::cleared(vec![Diagnostic::error(
                    "Invalid filter",
                    e.to_string(),
                )
                .with_attribute(AttributePath::new("filter"))])
            }
        };

        // Inputs are echoed back; computed attributes are added on top
        let mut state = request.config.clone();
        let databases = result.records.into_iter().map(Dynamic::Map).collect();
        let written = state
            .set_string(&AttributePath::new("id"), result.id)
            .and_then(|_| state.set_list(&AttributePath::new("databases"), databases));

        match written {
            Ok(()) => ReadDataSourceResponse::with_state(state, vec![]),
            Err(e) => ReadDataSourceResponse::cleared(vec![Diagnostic::error(
                "Failed to set state",
                e.to_string(),
            )]),
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for DatabasesDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        match OciProviderData::from_configure_request(&request) {
            Ok(data) => {
                self.provider_data = Some(data);
                ConfigureDataSourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diag) => ConfigureDataSourceResponse {
                diagnostics: vec![diag],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_helpers::{database, FakeDatabaseApi};
    use crate::api::RetryPolicy;
    use std::sync::Arc;

    fn config(filters: Vec<Dynamic>) -> DynamicValue {
        DynamicValue::object([
            ("compartment_id", Dynamic::from("ocid1.compartment.oc1..test")),
            ("db_home_id", Dynamic::from("ocid1.dbhome.oc1..test")),
            ("state", Dynamic::Null),
            ("filter", Dynamic::List(filters)),
        ])
    }

    fn filter(name: &str, values: &[&str], regex: bool) -> Dynamic {
        Dynamic::Map(
            [
                ("name".to_string(), Dynamic::from(name)),
                (
                    "values".to_string(),
                    Dynamic::List(values.iter().map(|v| Dynamic::from(*v)).collect()),
                ),
                ("regex".to_string(), Dynamic::from(regex)),
            ]
            .into_iter()
            .collect(),
        )
    }

    async fn configured(api: Arc<FakeDatabaseApi>) -> DatabasesDataSource {
        let mut ds = DatabasesDataSource::new();
        let data = OciProviderData::new(api, RetryPolicy::no_retry());
        ds.configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(Arc::new(data)),
            },
        )
        .await;
        ds
    }

    fn listed_names(state: &DynamicValue) -> Vec<String> {
        state
            .get_list(&AttributePath::new("databases"))
            .unwrap()
            .iter()
            .map(|db| {
                db.as_map()
                    .and_then(|m| m.get("db_name"))
                    .and_then(Dynamic::as_string)
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }

    #[tokio::test]
    async fn read_pages_normalizes_and_filters() {
        let api = Arc::new(FakeDatabaseApi::with_pages(vec![
            vec![
                database("ocid1.database.oc1..a", "db1", "AVAILABLE"),
                database("ocid1.database.oc1..b", "mydb1", "AVAILABLE"),
            ],
            vec![database("ocid1.database.oc1..c", "db2", "FAILED")],
        ]));
        let ds = configured(api.clone()).await;

        let response = ds
            .read(
                Context::new(),
                ReadDataSourceRequest::new(
                    DATABASES_DATA_SOURCE,
                    config(vec![filter("db_name", &["^db.*"], true)]),
                ),
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(listed_names(&response.state), vec!["db1", "db2"]);
        assert!(!response
            .state
            .get_string(&AttributePath::new("id"))
            .unwrap()
            .is_empty());
        assert_eq!(
            response
                .state
                .get_string(&AttributePath::new("compartment_id"))
                .unwrap(),
            "ocid1.compartment.oc1..test"
        );
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn read_sends_optional_arguments_only_when_set() {
        let api = Arc::new(FakeDatabaseApi::with_pages(vec![vec![]]));
        let ds = configured(api.clone()).await;

        let mut cfg = config(vec![]);
        cfg.set_string(&AttributePath::new("db_name"), "db1".to_string())
            .unwrap();
        let response = ds
            .read(Context::new(), ReadDataSourceRequest::new(DATABASES_DATA_SOURCE, cfg))
            .await;

        assert!(response.diagnostics.is_empty());
        let sent = &api.requests()[0];
        assert_eq!(sent.db_name.as_deref(), Some("db1"));
        assert_eq!(sent.db_home_id.as_deref(), Some("ocid1.dbhome.oc1..test"));
        assert_eq!(sent.lifecycle_state, None);
        assert_eq!(sent.retry_policy, Some(RetryPolicy::no_retry()));
        assert!(listed_names(&response.state).is_empty());
    }

    #[tokio::test]
    async fn read_failure_returns_no_partial_collection() {
        let mut api = FakeDatabaseApi::with_pages(vec![
            vec![database("ocid1.database.oc1..a", "db1", "AVAILABLE")],
            vec![database("ocid1.database.oc1..b", "db2", "AVAILABLE")],
        ]);
        api.fail_on_page = Some(1);
        let ds = configured(Arc::new(api)).await;

        let response = ds
            .read(
                Context::new(),
                ReadDataSourceRequest::new(DATABASES_DATA_SOURCE, config(vec![])),
            )
            .await;

        assert!(response.state.is_null());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("InternalServerError"));
    }

    #[tokio::test]
    async fn read_with_bad_pattern_is_an_error() {
        let ds = configured(Arc::new(FakeDatabaseApi::default())).await;

        let response = ds
            .read(
                Context::new(),
                ReadDataSourceRequest::new(
                    DATABASES_DATA_SOURCE,
                    config(vec![filter("db_name", &["[a-"], true)]),
                ),
            )
            .await;

        assert!(response.state.is_null());
        assert_eq!(response.diagnostics[0].summary, "Invalid filter");
    }

    #[tokio::test]
    async fn validate_reports_bad_patterns() {
        let ds = DatabasesDataSource::new();

        let response = ds
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: DATABASES_DATA_SOURCE.to_string(),
                    config: config(vec![
                        filter("state", &["AVAILABLE"], false),
                        filter("db_name", &["(db"], true),
                    ]),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("db_name"));
    }

    #[tokio::test]
    async fn validate_rejects_empty_scope_ids() {
        let ds = DatabasesDataSource::new();
        let mut empty_home = config(vec![]);
        empty_home
            .set_string(&AttributePath::new("db_home_id"), String::new())
            .unwrap();

        let response = ds
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: DATABASES_DATA_SOURCE.to_string(),
                    config: empty_home,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Invalid db_home_id");
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("db_home_id"))
        );

        let response = ds
            .validate(
                Context::new(),
                ValidateDataSourceConfigRequest {
                    type_name: DATABASES_DATA_SOURCE.to_string(),
                    config: config(vec![]),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn schema_declares_filter_block_and_inputs() {
        let ds = DatabasesDataSource::new();
        let schema = ds
            .schema(Context::new(), DataSourceSchemaRequest)
            .await
            .schema;

        assert!(schema.attribute("compartment_id").unwrap().required);
        assert!(schema.attribute("db_home_id").unwrap().required);
        assert!(schema.attribute("db_name").unwrap().optional);
        assert!(schema.attribute("databases").unwrap().computed);
        assert!(schema.nested_block("filter").is_some());
    }
}
