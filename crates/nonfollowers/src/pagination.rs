use crate::prelude::*;
use indicatif::ProgressBar;
use nonfollowers_core::pagination::Page;
use std::future::Future;

/// Helper to set spinner message if spinner is present
pub fn set_spinner_msg(spinner: Option<&ProgressBar>, msg: impl Into<String>) {
    if let Some(s) = spinner {
        s.set_message(msg.into());
    }
}

/// Fetch all pages of a listing, handling pagination automatically
///
/// `fetch_page` is called with `None` for the first page and with the cursor
/// returned by the previous page afterwards. The first failing page aborts the
/// whole listing; nothing accumulated so far is returned. A page whose next
/// cursor equals the one it was fetched with is an error.
pub async fn collect_pages<T, F, Fut>(
    label: &str,
    spinner: Option<&ProgressBar>,
    mut fetch_page: F,
) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all_items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page = 1;

    loop {
        if page > 1 {
            set_spinner_msg(
                spinner,
                f!("Fetching {} (page {}, {} found)...", label, page, all_items.len()),
            );
        }

        let requested = cursor.take();
        let Page { items, next } = fetch_page(requested.clone()).await?;
        log::debug!("{}: page {} returned {} item(s)", label, page, items.len());
        all_items.extend(items);

        // Check for next page
        match next {
            Some(next_cursor) if requested.as_deref() == Some(next_cursor.as_str()) => {
                return Err(eyre!(
                    "{}: page {} pointed back to itself ({}), stopping",
                    label,
                    page,
                    next_cursor
                ));
            }
            Some(next_cursor) => cursor = Some(next_cursor),
            None => break,
        }
        page += 1;
    }

    log::debug!("{}: {} item(s) across {} page(s)", label, all_items.len(), page);
    Ok(all_items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_collect_pages_concatenates_in_order() {
        let pages = Arc::new(Mutex::new(VecDeque::from(vec![
            Page::new(vec![1, 2], Some("p2".to_string())),
            Page::new(vec![3], Some("p3".to_string())),
            Page::last(vec![4, 5]),
        ])));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let result = collect_pages("numbers", None, |cursor| {
            let pages = Arc::clone(&pages);
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().unwrap().push(cursor);
                Ok::<_, color_eyre::eyre::Report>(pages.lock().unwrap().pop_front().unwrap())
            }
        })
        .await
        .unwrap();

        assert_eq!(result, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_collect_pages_single_empty_page() {
        let result: Vec<u32> = collect_pages("empty", None, |_| async {
            Ok::<_, color_eyre::eyre::Report>(Page::last(vec![]))
        })
        .await
        .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_collect_pages_aborts_on_error() {
        let calls = Arc::new(Mutex::new(0));

        let result: Result<Vec<u32>> = collect_pages("failing", None, |cursor| {
            let calls = Arc::clone(&calls);
            async move {
                *calls.lock().unwrap() += 1;
                match cursor {
                    None => Ok::<_, color_eyre::eyre::Report>(Page::new(
                        vec![1],
                        Some("p2".to_string()),
                    )),
                    Some(_) => Err(Error::Http {
                        status: 500,
                        message: "HTTP 500 Internal Server Error".to_string(),
                    }
                    .into()),
                }
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>().and_then(Error::status),
            Some(500)
        );
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_collect_pages_stops_on_repeated_cursor() {
        let calls = Arc::new(Mutex::new(0));

        let result: Result<Vec<u32>> = collect_pages("stuck", None, |_| {
            let calls = Arc::clone(&calls);
            async move {
                *calls.lock().unwrap() += 1;
                Ok::<_, color_eyre::eyre::Report>(Page::new(vec![1], Some("same".to_string())))
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("pointed back to itself"));
        assert_eq!(*calls.lock().unwrap(), 2);
    }
}
