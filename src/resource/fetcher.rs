//! Resource Fetcher
//!
//! Cursor pagination over any list call.

use super::ListResult;
use std::future::Future;

/// Fetch one page, or every page when `fetch_all` is set.
///
/// `fetch_page` receives the cursor to request (`None` for the first page)
/// and its records are concatenated in server order. Without `fetch_all`
/// exactly one call is made. With it, fetching continues while the server
/// reports `hasNextPage`; there is no page cap.
///
/// The first error aborts the loop and is returned as is, discarding any
/// pages already fetched.
pub async fn paginate<T, E, F, Fut>(
    start: Option<String>,
    fetch_all: bool,
    mut fetch_page: F,
) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ListResult<T>, E>>,
{
    let mut records = Vec::new();
    let mut cursor = start.filter(|c| !c.is_empty());
    let mut page = 0usize;

    loop {
        let result = fetch_page(cursor.clone()).await?;
        page += 1;
        tracing::debug!(
            "page {}: {} records (total {})",
            page,
            result.data.len(),
            result.total_count
        );
        records.extend(result.data);

        if !fetch_all {
            break;
        }

        match result.page_info {
            Some(info) if info.has_next_page => match info.next_cursor() {
                Some(next) => cursor = Some(next.to_string()),
                None => {
                    tracing::warn!("page {} reports more results but no end cursor; stopping", page);
                    break;
                }
            },
            _ => break,
        }
    }

    Ok(records)
}
