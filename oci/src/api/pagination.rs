//! Follow continuation tokens until a collection is exhausted
//!
//! Pages are fetched one after another since each request needs the token
//! returned by the previous one. Items are kept in the order the service
//! returned them and are never de-duplicated. Any error ends the walk and
//! whatever was gathered so far is dropped.

use std::future::Future;
use tfplug::Context;

use super::error::ApiError;

/// One batch of a listed collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` once the collection is complete
    pub next_page: Option<String>,
}

/// A list request that can be pointed at a continuation token
pub trait PagedRequest: Clone {
    fn set_page(&mut self, page: Option<String>);
}

/// Fetch every page starting from `request`.
///
/// `fetch` performs one call; retries are its business. Cancellation of
/// `ctx` is checked before each page.
pub async fn fetch_all<R, T, F, Fut>(
    ctx: &Context,
    request: &R,
    mut fetch: F,
) -> Result<Vec<T>, ApiError>
where
    R: PagedRequest,
    F: FnMut(R) -> Fut,
    Fut: Future<Output = Result<Page<T>, ApiError>>,
{
    let mut request = request.clone();
    let mut items = Vec::new();
    let mut pages = 0usize;

    loop {
        if ctx.is_cancelled() {
            tracing::debug!("Listing cancelled after {} page(s)", pages);
            return Err(ApiError::Cancelled);
        }

        let page = fetch(request.clone()).await?;
        pages += 1;
        tracing::debug!(
            "Fetched page {} with {} item(s), more: {}",
            pages,
            page.items.len(),
            page.next_page.is_some()
        );

        items.extend(page.items);

        match page.next_page {
            Some(token) => request.set_page(Some(token)),
            None => break,
        }
    }

    Ok(items)
}
