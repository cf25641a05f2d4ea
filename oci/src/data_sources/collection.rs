//! Collection reads: page through a list call, normalize, filter
//!
//! Each read is a single pass with its own accumulator. Filters are compiled
//! before any request is made, so a bad pattern fails fast. Nothing is
//! returned unless every step succeeds.

use std::future::Future;
use thiserror::Error;
use tfplug::filter::{Filter, FilterSet};
use tfplug::{generate_data_source_id, Context, Record, TfplugError};

use crate::api::pagination::{fetch_all, Page, PagedRequest};
use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Filter(#[from] TfplugError),
}

/// Records that survived filtering plus the id of this read
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResult {
    /// Fresh for every read; not a durable key
    pub id: String,
    pub records: Vec<Record>,
}

pub async fn read_collection<R, T, F, Fut, N>(
    ctx: &Context,
    request: &R,
    fetch: F,
    normalize: N,
    filters: &[Filter],
) -> Result<CollectionResult, CollectionError>
where
    R: PagedRequest,
    F: FnMut(R) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
    N: Fn(&T) -> Record,
{
    let filter_set = FilterSet::compile(filters)?;

    let items = fetch_all(ctx, request, fetch).await?;
    let fetched = items.len();

    let records = filter_set.apply(items.iter().map(normalize).collect());
    tracing::debug!(
        "Collection read kept {} of {} record(s) after {} filter(s)",
        records.len(),
        fetched,
        filters.len()
    );

    Ok(CollectionResult {
        id: generate_data_source_id(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::database::{DatabaseApi, ListDatabasesRequest};
    use crate::api::test_helpers::{database, FakeDatabaseApi};
    use crate::data_sources::database::database_to_record;
    use tfplug::Dynamic;

    fn three_databases_over_two_pages() -> FakeDatabaseApi {
        FakeDatabaseApi::with_pages(vec![
            vec![
                database("ocid1.database.oc1..a", "alpha", "AVAILABLE"),
                database("ocid1.database.oc1..b", "beta", "TERMINATED"),
            ],
            vec![database("ocid1.database.oc1..c", "gamma", "AVAILABLE")],
        ])
    }

    async fn read(
        api: &FakeDatabaseApi,
        filters: &[Filter],
    ) -> Result<CollectionResult, CollectionError> {
        read_with_context(&Context::new(), api, filters).await
    }

    async fn read_with_context(
        ctx: &Context,
        api: &FakeDatabaseApi,
        filters: &[Filter],
    ) -> Result<CollectionResult, CollectionError> {
        read_collection(
            ctx,
            &ListDatabasesRequest::new("ocid1.compartment.oc1..test"),
            |request| async move { api.list_databases(ctx, &request).await },
            database_to_record,
            filters,
        )
        .await
    }

    fn names(result: &CollectionResult) -> Vec<&str> {
        result
            .records
            .iter()
            .filter_map(|r| r.get("db_name").and_then(Dynamic::as_string))
            .map(String::as_str)
            .collect()
    }

    #[tokio::test]
    async fn filters_records_from_every_page_in_order() {
        let api = three_databases_over_two_pages();

        let result = read(&api, &[Filter::exact("state", ["AVAILABLE"])])
            .await
            .unwrap();

        assert_eq!(names(&result), vec!["alpha", "gamma"]);
        let pages: Vec<_> = api.requests().into_iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![None, Some("T2".to_string())]);
    }

    #[tokio::test]
    async fn without_filters_every_record_is_returned() {
        let api = three_databases_over_two_pages();

        let result = read(&api, &[]).await.unwrap();

        assert_eq!(names(&result), vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn each_read_gets_its_own_id() {
        let api = three_databases_over_two_pages();

        let first = read(&api, &[]).await.unwrap();
        let second = read(&api, &[]).await.unwrap();

        assert!(!first.id.is_empty());
        assert_ne!(first.id, second.id);
        assert_eq!(first.records, second.records);
    }

    #[tokio::test]
    async fn service_error_on_later_page_fails_the_read() {
        let mut api = FakeDatabaseApi::with_pages(vec![
            vec![database("ocid1.database.oc1..a", "alpha", "AVAILABLE")],
            vec![database("ocid1.database.oc1..b", "beta", "AVAILABLE")],
            vec![database("ocid1.database.oc1..c", "gamma", "AVAILABLE")],
        ]);
        api.fail_on_page = Some(1);

        let result = read(&api, &[]).await;

        match result {
            Err(CollectionError::Api(ApiError::Service { status, .. })) => assert_eq!(status, 500),
            other => panic!("Expected API error, got {:?}", other),
        }
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn bad_pattern_fails_before_listing() {
        let api = three_databases_over_two_pages();

        let result = read(&api, &[Filter::regex("db_name", ["(unclosed"])]).await;

        assert!(matches!(
            result,
            Err(CollectionError::Filter(TfplugError::InvalidFilterPattern { .. }))
        ));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn filter_on_absent_attribute_excludes_record() {
        let api = three_databases_over_two_pages();

        let result = read(&api, &[Filter::regex("pdb_name", [".*"])])
            .await
            .unwrap();

        assert!(result.records.is_empty());
    }

    #[tokio::test]
    async fn cancelled_read_lists_nothing() {
        let api = three_databases_over_two_pages();
        let ctx = Context::new();
        ctx.cancel();

        let result = read_with_context(&ctx, &api, &[]).await;

        assert!(matches!(result, Err(CollectionError::Api(ApiError::Cancelled))));
        assert!(api.requests().is_empty());
    }
}
