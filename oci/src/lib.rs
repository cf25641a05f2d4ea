//! Terraform provider for Oracle Cloud Infrastructure database data sources

pub mod api;
pub mod config;
pub mod data_sources;
pub mod provider_data;

pub use config::ProviderConfig;
pub use provider_data::OciProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ValidateProviderConfigRequest, ValidateProviderConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::Diagnostic;
use tfplug::DataSourceWithConfigure;

use data_sources::database::DATABASE_DATA_SOURCE;
use data_sources::databases::DATABASES_DATA_SOURCE;

#[derive(Default)]
pub struct OciProvider {
    provider_data: Option<OciProviderData>,
}

impl OciProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider data produced by the last successful configure
    pub fn provider_data(&self) -> Option<tfplug::ProviderData> {
        self.provider_data
            .clone()
            .map(|data| Arc::new(data) as tfplug::ProviderData)
    }
}

#[async_trait]
impl Provider for OciProvider {
    fn type_name(&self) -> &str {
        "oci"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Oracle Cloud Infrastructure provider")
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("Database service endpoint. Can also be set with OCI_ENDPOINT.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("region", AttributeType::String)
                    .description("Region used to derive the endpoint. Can also be set with OCI_REGION.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_token", AttributeType::String)
                    .description("Authorization header value. Can also be set with OCI_API_TOKEN.")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS verification. Can also be set with OCI_INSECURE.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("disable_auto_retries", AttributeType::Bool)
                    .description("Issue every request once. Can also be set with OCI_DISABLE_AUTO_RETRIES.")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("retry_duration_seconds", AttributeType::Number)
                    .description("Upper bound on time spent retrying one request. Can also be set with OCI_RETRY_DURATION_SECONDS.")
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let settings = match ProviderConfig::from_config(&request.config) {
            Ok(settings) => settings,
            Err(e) => {
                return ConfigureProviderResponse {
                    diagnostics: vec![Diagnostic::error(e.to_string(), "")],
                    provider_data: None,
                }
            }
        };

        let retry_policy = settings.retry_policy();
        let client_config = api::ClientConfig {
            insecure: settings.insecure,
            default_retry: retry_policy.clone(),
            ..api::ClientConfig::default()
        };

        match api::Client::with_config(
            &settings.endpoint,
            settings.api_token.as_deref(),
            client_config,
        ) {
            Ok(client) => {
                tracing::debug!("Configured provider for endpoint {}", settings.endpoint);
                let data = OciProviderData::new(Arc::new(client), retry_policy);
                self.provider_data = Some(data.clone());
                ConfigureProviderResponse {
                    diagnostics: vec![],
                    provider_data: Some(Arc::new(data)),
                }
            }
            Err(e) => ConfigureProviderResponse {
                diagnostics: vec![Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                )],
                provider_data: None,
            },
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: vec![],
        }
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            DATABASE_DATA_SOURCE.to_string(),
            Box::new(|| {
                Box::new(data_sources::DatabaseDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories.insert(
            DATABASES_DATA_SOURCE.to_string(),
            Box::new(|| {
                Box::new(data_sources::DatabasesDataSource::new()) as Box<dyn DataSourceWithConfigure>
            }),
        );
        factories
    }
}
