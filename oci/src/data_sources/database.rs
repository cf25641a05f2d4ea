//! `oci_database_database` data source and the database record normalizer
//!
//! The normalizer is shared with the `oci_database_databases` collection:
//! optional attributes the service left out are omitted from the record,
//! nested blocks become a one element list (or an explicit null), and both
//! tag maps are always present.

use async_trait::async_trait;
use std::collections::HashMap;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue, Record};

use crate::api::common::format_oci_time;
use crate::api::database::{
    BackupDestinationDetails, Database, DatabaseConnectionStrings, DbBackupConfig,
    GetDatabaseRequest,
};
use crate::OciProviderData;

pub const DATABASE_DATA_SOURCE: &str = "oci_database_database";

/// Flatten one database into a record
pub fn database_to_record(db: &Database) -> Record {
    let mut record = Record::new();

    record.insert("id".to_string(), Dynamic::from(db.id.as_str()));
    record.insert(
        "compartment_id".to_string(),
        Dynamic::from(db.compartment_id.as_str()),
    );
    record.insert("db_name".to_string(), Dynamic::from(db.db_name.as_str()));
    record.insert(
        "state".to_string(),
        Dynamic::from(db.lifecycle_state.as_str()),
    );

    insert_optional(&mut record, "character_set", &db.character_set);
    insert_optional(&mut record, "ncharacter_set", &db.ncharacter_set);
    insert_optional(&mut record, "db_home_id", &db.db_home_id);
    insert_optional(&mut record, "pdb_name", &db.pdb_name);
    insert_optional(&mut record, "db_workload", &db.db_workload);
    insert_optional(&mut record, "db_unique_name", &db.db_unique_name);
    insert_optional(&mut record, "lifecycle_details", &db.lifecycle_details);

    if let Some(time_created) = &db.time_created {
        record.insert(
            "time_created".to_string(),
            Dynamic::String(format_oci_time(time_created)),
        );
    }

    record.insert(
        "connection_strings".to_string(),
        single_block(db.connection_strings.as_ref().map(connection_strings_to_map)),
    );
    record.insert(
        "db_backup_config".to_string(),
        single_block(db.db_backup_config.as_ref().map(db_backup_config_to_map)),
    );

    record.insert(
        "freeform_tags".to_string(),
        Dynamic::from(db.freeform_tags.clone().unwrap_or_default()),
    );
    record.insert(
        "defined_tags".to_string(),
        Dynamic::from(
            db.defined_tags
                .as_ref()
                .map(defined_tags_to_map)
                .unwrap_or_default(),
        ),
    );

    record
}

pub fn connection_strings_to_map(strings: &DatabaseConnectionStrings) -> Record {
    let mut result = Record::new();

    result.insert(
        "all_connection_strings".to_string(),
        Dynamic::from(strings.all_connection_strings.clone().unwrap_or_default()),
    );
    insert_optional(&mut result, "cdb_default", &strings.cdb_default);
    insert_optional(&mut result, "cdb_ip_default", &strings.cdb_ip_default);

    result
}

pub fn db_backup_config_to_map(config: &DbBackupConfig) -> Record {
    let mut result = Record::new();

    if let Some(enabled) = config.auto_backup_enabled {
        result.insert("auto_backup_enabled".to_string(), Dynamic::Bool(enabled));
    }
    insert_optional(&mut result, "auto_backup_window", &config.auto_backup_window);
    if let Some(details) = &config.backup_destination_details {
        result.insert(
            "backup_destination_details".to_string(),
            Dynamic::List(
                details
                    .iter()
                    .map(|d| Dynamic::Map(backup_destination_details_to_map(d)))
                    .collect(),
            ),
        );
    }
    if let Some(days) = config.recovery_window_in_days {
        result.insert(
            "recovery_window_in_days".to_string(),
            Dynamic::from(days),
        );
    }

    result
}

pub fn backup_destination_details_to_map(details: &BackupDestinationDetails) -> Record {
    let mut result = Record::new();
    insert_optional(&mut result, "id", &details.id);
    result.insert(
        "type".to_string(),
        Dynamic::from(details.destination_type.as_str()),
    );
    result
}

/// `{namespace: {key: value}}` becomes `{"namespace.key": value}`
pub fn defined_tags_to_map(
    tags: &HashMap<String, HashMap<String, serde_json::Value>>,
) -> HashMap<String, String> {
    let mut result = HashMap::new();
    for (namespace, keys) in tags {
        for (key, value) in keys {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            result.insert(format!("{}.{}", namespace, key), text);
        }
    }
    result
}

fn insert_optional(record: &mut Record, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        record.insert(name.to_string(), Dynamic::from(value.as_str()));
    }
}

fn single_block(block: Option<Record>) -> Dynamic {
    match block {
        Some(fields) => Dynamic::List(vec![Dynamic::Map(fields)]),
        None => Dynamic::Null,
    }
}

/// Object type of one database record
pub fn database_object_type() -> AttributeType {
    AttributeType::object(
        database_attributes()
            .into_iter()
            .map(|attr| (attr.name, attr.r#type)),
    )
}

/// Computed attributes describing a database
pub fn database_attributes() -> Vec<Attribute> {
    let string = |name: &str, description: &str| {
        AttributeBuilder::new(name, AttributeType::String)
            .description(description)
            .computed()
            .build()
    };

    let connection_strings = AttributeType::list_of(AttributeType::object([
        (
            "all_connection_strings",
            AttributeType::map_of(AttributeType::String),
        ),
        ("cdb_default", AttributeType::String),
        ("cdb_ip_default", AttributeType::String),
    ]));

    let backup_destination = AttributeType::object([
        ("id", AttributeType::String),
        ("type", AttributeType::String),
    ]);
    let db_backup_config = AttributeType::list_of(AttributeType::object([
        ("auto_backup_enabled", AttributeType::Bool),
        ("auto_backup_window", AttributeType::String),
        (
            "backup_destination_details",
            AttributeType::list_of(backup_destination),
        ),
        ("recovery_window_in_days", AttributeType::Number),
    ]));

    vec![
        string("id", "The OCID of the database"),
        string("character_set", "The character set for the database"),
        string("compartment_id", "The OCID of the compartment"),
        AttributeBuilder::new("connection_strings", connection_strings)
            .description("The connection strings used to connect to the Oracle Database")
            .computed()
            .build(),
        AttributeBuilder::new("db_backup_config", db_backup_config)
            .description("Automatic backup configuration")
            .computed()
            .build(),
        string("db_home_id", "The OCID of the Database Home"),
        string("db_name", "The database name"),
        string("db_unique_name", "A system-generated name for the database"),
        string("db_workload", "The database workload type"),
        AttributeBuilder::new("defined_tags", AttributeType::map_of(AttributeType::String))
            .description("Defined tags, keyed by namespace.key")
            .computed()
            .build(),
        AttributeBuilder::new("freeform_tags", AttributeType::map_of(AttributeType::String))
            .description("Free-form tags")
            .computed()
            .build(),
        string("lifecycle_details", "Additional information about the current lifecycle state"),
        string("ncharacter_set", "The national character set for the database"),
        string("pdb_name", "The name of the pluggable database"),
        string("state", "The current state of the database"),
        string("time_created", "The date and time the database was created"),
    ]
}

#[derive(Default)]
pub struct DatabaseDataSource {
    provider_data: Option<OciProviderData>,
}

impl DatabaseDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for DatabaseDataSource {
    fn type_name(&self) -> &str {
        DATABASE_DATA_SOURCE
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
            .description("Gets a single database")
            .attribute(
                AttributeBuilder::new("database_id", AttributeType::String)
                    .description("The OCID of the database")
                    .required()
                    .build(),
            )
            .attributes(database_attributes())
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

        if let Some(Dynamic::String(id)) = request.config.get(&AttributePath::new("database_id")) {
            if id.is_empty() {
                diagnostics.push(
                    Diagnostic::error("Invalid database_id", "database_id must not be empty")
                        .with_attribute(AttributePath::new("database_id")),
                );
            }
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

        let database_id = match request
            .config
            .get_string(&AttributePath::new("database_id"))
        {
            Ok(id) => id,
            Err(e) => {
                return ReadDataSourceResponse::cleared(vec![Diagnostic::error(
                    "Missing database_id",
                    e.to_string(),
                )
                .with_attribute(AttributePath::new("database_id"))])
            }
        };

        tracing::debug!("Reading database {}", database_id);

        let get_request = GetDatabaseRequest {
            database_id: database_id.clone(),
            retry_policy: Some(provider_data.retry_policy.clone()),
        };

        match provider_data.database.get_database(&ctx, &get_request).await {
            Ok(db) => {
                let mut record = database_to_record(&db);
                record.insert("database_id".to_string(), Dynamic::String(database_id));
                ReadDataSourceResponse::with_state(DynamicValue::new(Dynamic::Map(record)), vec![])
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("Database {} not found, clearing state", database_id);
                ReadDataSourceResponse::cleared(vec![Diagnostic::warning(
                    "Database not found",
                    format!("Database {} no longer exists: {}", database_id, e),
                )])
            }
            Err(e) => ReadDataSourceResponse::cleared(vec![Diagnostic::error(
                "Failed to read database",
                format!("API error: {}", e),
            )]),
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for DatabaseDataSource {
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
