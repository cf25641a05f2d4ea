//! Provider data structure passed to data sources

use crate::api::{DatabaseApi, RetryPolicy};
use std::sync::Arc;
use tfplug::data_source::ConfigureDataSourceRequest;
use tfplug::Diagnostic;

#[derive(Clone)]
pub struct OciProviderData {
    pub database: Arc<dyn DatabaseApi>,
    /// Attached to every request a data source issues
    pub retry_policy: RetryPolicy,
}

impl OciProviderData {
    pub fn new(database: Arc<dyn DatabaseApi>, retry_policy: RetryPolicy) -> Self {
        Self {
            database,
            retry_policy,
        }
    }

    /// Extract the provider data handed to a data source's configure
    pub fn from_configure_request(
        request: &ConfigureDataSourceRequest,
    ) -> Result<Self, Diagnostic> {
        let data = match &request.provider_data {
            Some(data) => data,
            None => {
                tracing::warn!("No provider data provided to data source");
                return Err(Diagnostic::error(
                    "No provider data",
                    "No provider data was provided to the data source",
                ));
            }
        };

        match data.downcast_ref::<OciProviderData>() {
            Some(provider_data) => Ok(provider_data.clone()),
            None => {
                tracing::error!("Failed to downcast provider data to OciProviderData");
                Err(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract OciProviderData from provider data",
                ))
            }
        }
    }
}
