//! tfplug - Terraform Plugin Framework for Rust
//!
//! The provider-facing half of a Terraform plugin: dynamic values, schemas,
//! the provider and data source traits, and helpers shared by collection data
//! sources (declarative filters, synthetic read ids). The plugin wire protocol
//! is handled by the host and is not part of this crate.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;

// Helper modules
pub mod filter;
pub mod logging;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{generate_data_source_id, DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use filter::{Filter, FilterSet};
pub use logging::LogLevel;
pub use provider::{DataSourceFactory, Provider, ProviderData};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{Config, Diagnostic, Dynamic, DynamicValue, Record, State};
