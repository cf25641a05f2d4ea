//! End-to-end reads through the provider against a mock Database service

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use mockito::{Matcher, Server};
use oci::OciProvider;
use serial_test::serial;
use std::time::{Duration, Instant};
use tfplug::context::Context;
use tfplug::data_source::ReadDataSourceRequest;
use tfplug::provider::{configured_data_source, ConfigureProviderRequest};
use tfplug::types::{has_errors, AttributePath, Dynamic, DynamicValue};
use tfplug::{DataSource, LogLevel, Provider};

const COMPARTMENT: &str = "ocid1.compartment.oc1..aaaa";
const DB_HOME: &str = "ocid1.dbhome.oc1..hhhh";

fn summary(id: &str, name: &str, state: &str) -> String {
    format!(
        r#"{{"id":"{id}","compartmentId":"{COMPARTMENT}","dbHomeId":"{DB_HOME}","dbName":"{name}","lifecycleState":"{state}","timeCreated":"2019-03-01T10:20:30Z","freeformTags":{{"team":"dba"}}}}"#
    )
}

async fn configured_provider(endpoint: &str) -> OciProvider {
    provider_with_retries(endpoint, false).await
}

async fn provider_with_retries(endpoint: &str, retries: bool) -> OciProvider {
    tfplug::logging::init(LogLevel::from_env());

    let mut provider = OciProvider::new();
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config: DynamicValue::object([
                    ("endpoint", Dynamic::from(endpoint)),
                    ("api_token", Dynamic::from("Bearer integration")),
                    ("disable_auto_retries", Dynamic::Bool(!retries)),
                ]),
            },
        )
        .await;
    assert!(!has_errors(&response.diagnostics));
    provider
}

fn databases_config(filters: Vec<Dynamic>) -> DynamicValue {
    DynamicValue::object([
        ("compartment_id", Dynamic::from(COMPARTMENT)),
        ("db_home_id", Dynamic::from(DB_HOME)),
        ("filter", Dynamic::List(filters)),
    ])
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn databases_read_follows_pages_and_applies_filters() {
    let mut server = Server::new_async().await;

    let page_one = server
        .mock("GET", "/20160918/databases")
        .match_header("authorization", "Bearer integration")
        // first page: scope parameters only, no continuation token
        .match_query(Matcher::Regex(
            "^compartmentId=[^&]+&dbHomeId=[^&]+$".to_string(),
        ))
        .with_header("opc-next-page", "T2")
        .with_body(format!(
            "[{},{}]",
            summary("ocid1.database.oc1..a", "sales", "AVAILABLE"),
            summary("ocid1.database.oc1..b", "hr", "TERMINATED")
        ))
        .expect(1)
        .create_async()
        .await;

    let page_two = server
        .mock("GET", "/20160918/databases")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("compartmentId".into(), COMPARTMENT.into()),
            Matcher::UrlEncoded("page".into(), "T2".into()),
        ]))
        .with_body(format!(
            "[{}]",
            summary("ocid1.database.oc1..c", "finance", "AVAILABLE")
        ))
        .expect(1)
        .create_async()
        .await;

    let provider = configured_provider(&server.url()).await;
    let ds = configured_data_source(
        Context::new(),
        &provider,
        "oci_database_databases",
        provider.provider_data(),
    )
    .await
    .unwrap();

    let state_filter = Dynamic::Map(
        [
            ("name".to_string(), Dynamic::from("state")),
            (
                "values".to_string(),
                Dynamic::List(vec![Dynamic::from("AVAILABLE")]),
            ),
        ]
        .into_iter()
        .collect(),
    );
    let response = ds
        .read(
            Context::new(),
            ReadDataSourceRequest::new("oci_database_databases", databases_config(vec![state_filter])),
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let databases = response
        .state
        .get_list(&AttributePath::new("databases"))
        .unwrap();
    let names: Vec<_> = databases
        .iter()
        .map(|db| db.as_map().unwrap().get("db_name").cloned().unwrap())
        .collect();
    assert_eq!(names, vec![Dynamic::from("sales"), Dynamic::from("finance")]);

    let first = databases[0].as_map().unwrap();
    assert_eq!(
        first.get("time_created"),
        Some(&Dynamic::from("2019-03-01 10:20:30 +0000 UTC"))
    );
    assert_eq!(first.get("connection_strings"), Some(&Dynamic::Null));
    assert!(first.get("defined_tags").unwrap().as_map().unwrap().is_empty());

    page_one.assert_async().await;
    page_two.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn databases_read_surfaces_service_errors() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/20160918/databases")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("opc-request-id", "req-42")
        .with_body(r#"{"code":"InvalidParameter","message":"Invalid compartmentId"}"#)
        .create_async()
        .await;

    let provider = configured_provider(&server.url()).await;
    let ds = configured_data_source(
        Context::new(),
        &provider,
        "oci_database_databases",
        provider.provider_data(),
    )
    .await
    .unwrap();

    let response = ds
        .read(
            Context::new(),
            ReadDataSourceRequest::new("oci_database_databases", databases_config(vec![])),
        )
        .await;

    assert!(response.state.is_null());
    assert_eq!(response.diagnostics[0].summary, "Failed to list databases");
    assert!(response.diagnostics[0].detail.contains("InvalidParameter"));
    assert!(response.diagnostics[0].detail.contains("req-42"));
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn database_read_of_deleted_database_clears_state() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/20160918/databases/ocid1.database.oc1..gone")
        .with_status(404)
        .with_body(r#"{"code":"NotAuthorizedOrNotFound","message":"Authorization failed or requested resource not found."}"#)
        .create_async()
        .await;

    let provider = configured_provider(&server.url()).await;
    let ds = configured_data_source(
        Context::new(),
        &provider,
        "oci_database_database",
        provider.provider_data(),
    )
    .await
    .unwrap();

    let response = ds
        .read(
            Context::new(),
            ReadDataSourceRequest::new(
                "oci_database_database",
                DynamicValue::object([("database_id", Dynamic::from("ocid1.database.oc1..gone"))]),
            ),
        )
        .await;

    assert!(response.state.is_null());
    assert_eq!(response.diagnostics.len(), 1);
    assert!(!response.diagnostics[0].is_error());
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn database_read_returns_the_database() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/20160918/databases/ocid1.database.oc1..a")
        .with_body(summary("ocid1.database.oc1..a", "sales", "AVAILABLE"))
        .create_async()
        .await;

    let provider = configured_provider(&server.url()).await;
    let ds = configured_data_source(
        Context::new(),
        &provider,
        "oci_database_database",
        provider.provider_data(),
    )
    .await
    .unwrap();

    let response = ds
        .read(
            Context::new(),
            ReadDataSourceRequest::new(
                "oci_database_database",
                DynamicValue::object([("database_id", Dynamic::from("ocid1.database.oc1..a"))]),
            ),
        )
        .await;

    assert!(response.diagnostics.is_empty());
    assert_eq!(
        response.state.get_string(&AttributePath::new("db_name")).unwrap(),
        "sales"
    );
    assert_eq!(
        response
            .state
            .get_string(&AttributePath::new("freeform_tags").key("team"))
            .unwrap(),
        "dba"
    );
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn databases_read_stops_when_context_is_cancelled() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/20160918/databases")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    // default policy: backoff starts at 1s and retries for up to 10 minutes
    let provider = provider_with_retries(&server.url(), true).await;
    let ds = configured_data_source(
        Context::new(),
        &provider,
        "oci_database_databases",
        provider.provider_data(),
    )
    .await
    .unwrap();

    let ctx = Context::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let response = tokio::time::timeout(
        Duration::from_secs(5),
        ds.read(
            ctx,
            ReadDataSourceRequest::new("oci_database_databases", databases_config(vec![])),
        ),
    )
    .await
    .expect("read should end promptly after cancellation");

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(response.state.is_null());
    assert!(has_errors(&response.diagnostics));
    assert!(response.diagnostics[0].detail.contains("cancelled"));
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn database_read_stops_when_deadline_passes() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/20160918/databases/ocid1.database.oc1..slow")
        .with_status(500)
        .create_async()
        .await;

    let provider = provider_with_retries(&server.url(), true).await;
    let ds = configured_data_source(
        Context::new(),
        &provider,
        "oci_database_database",
        provider.provider_data(),
    )
    .await
    .unwrap();

    let started = Instant::now();
    let response = ds
        .read(
            Context::new().with_timeout(Duration::from_millis(100)),
            ReadDataSourceRequest::new(
                "oci_database_database",
                DynamicValue::object([("database_id", Dynamic::from("ocid1.database.oc1..slow"))]),
            ),
        )
        .await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(response.state.is_null());
    assert_eq!(response.diagnostics[0].summary, "Failed to read database");
    assert!(response.diagnostics[0].detail.contains("cancelled"));
}
