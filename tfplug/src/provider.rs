//! Provider trait and related types
//!
//! A provider is configured once and hands the result (an API client, retry
//! settings, ...) to every data source it creates via `provider_data`.
//! Nothing is shared through globals.

use crate::context::Context;
use crate::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use crate::error::{Result, TfplugError};
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory producing a fresh, unconfigured data source
pub type DataSourceFactory = Box<dyn Fn() -> Box<dyn DataSourceWithConfigure> + Send + Sync>;

/// Opaque value produced by provider configuration
pub type ProviderData = Arc<dyn Any + Send + Sync>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider type name, the prefix of every data source name (e.g. "oci")
    fn type_name(&self) -> &str;

    async fn metadata(&self, ctx: Context, request: ProviderMetadataRequest)
        -> ProviderMetadataResponse;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once with the provider block. Returned provider_data is passed to
    /// every data source's configure.
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    async fn validate(
        &self,
        ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse;

    /// Data source factories keyed by type name
    fn data_sources(&self) -> HashMap<String, DataSourceFactory>;
}

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    pub provider_data: Option<ProviderData>,
}

pub struct ValidateProviderConfigRequest {
    pub config: DynamicValue,
}

pub struct ValidateProviderConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// Create the named data source and hand it the provider data
pub async fn configured_data_source(
    ctx: Context,
    provider: &dyn Provider,
    type_name: &str,
    provider_data: Option<ProviderData>,
) -> Result<Box<dyn DataSourceWithConfigure>> {
    let factories = provider.data_sources();
    let factory = factories
        .get(type_name)
        .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()))?;

    let provider_data = provider_data.ok_or(TfplugError::ProviderNotConfigured)?;

    let mut data_source = factory();
    let response = data_source
        .configure(
            ctx,
            ConfigureDataSourceRequest {
                provider_data: Some(provider_data),
            },
        )
        .await;

    if let Some(diag) = response.diagnostics.iter().find(|d| d.is_error()) {
        return Err(TfplugError::InvalidConfiguration(format!(
            "{}: {}",
            diag.summary, diag.detail
        )));
    }

    Ok(data_source)
}
