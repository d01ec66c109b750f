//! Cursor-driven listing across pages
//!
//! A listing starts with no cursor and follows the cursor each page returns
//! until a page comes back without one. An empty page that still carries a
//! cursor does not end the listing.

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, warn};

use bioterm_core::constants::DEFAULT_MAX_PAGES;
use bioterm_types::Cursor;

use crate::error::{Error, Result};

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Where the next page starts; `None` on the last page
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: Option<Cursor>) -> Self {
        Self { items, next }
    }

    /// Build the final page
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Boxed future resolving to one page
pub type PageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<Page<T>>> + Send + 'a>>;

/// Lazy page-by-page listing
///
/// Pages are fetched one at a time, only when asked for. A paginator can be
/// abandoned at any point; starting over means building a new one.
///
/// # Examples
///
/// ```
/// use bioterm::pagination::{Page, Paginator};
/// use bioterm::Cursor;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> bioterm::Result<()> {
/// let mut pages = Paginator::new(|cursor: Option<Cursor>| async move {
///     Ok::<_, bioterm::Error>(match cursor {
///         None => Page::new(vec![1, 2], Some(Cursor::Position(5))),
///         Some(_) => Page::last(vec![3]),
///     })
/// });
///
/// assert_eq!(pages.next_page().await?, Some(vec![1, 2]));
/// assert_eq!(pages.next_page().await?, Some(vec![3]));
/// assert_eq!(pages.next_page().await?, None);
/// # Ok(())
/// # }
/// ```
pub struct Paginator<F> {
    fetch: F,
    cursor: Option<Cursor>,
    pages: usize,
    max_pages: usize,
    done: bool,
}

impl<T, F, Fut> Paginator<F>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    /// Create a paginator over a page-fetching function
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            cursor: None,
            pages: 0,
            max_pages: DEFAULT_MAX_PAGES,
            done: false,
        }
    }

    /// Set the page budget
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Check if the listing has ended (last page seen or an error occurred)
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Fetch the next page
    ///
    /// Returns `Ok(None)` once the last page has been returned. After an
    /// error the paginator is finished and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Any error from the fetch function, or [`Error::PageLimitExceeded`]
    /// when the device keeps returning cursors past the page budget.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.done {
            return Ok(None);
        }

        if self.pages >= self.max_pages {
            self.done = true;
            warn!(limit = self.max_pages, "Listing exceeded page budget");
            return Err(Error::PageLimitExceeded {
                limit: self.max_pages,
            });
        }

        let page = match (self.fetch)(self.cursor.take()).await {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        self.pages += 1;
        debug!(page = self.pages, items = page.items.len(), next = ?page.next, "Fetched page");

        match page.next {
            Some(cursor) => self.cursor = Some(cursor),
            None => self.done = true,
        }

        Ok(Some(page.items))
    }

    /// Drain every remaining page into one list
    ///
    /// Nothing is returned on error, not even the pages already fetched.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }
}

/// Fetch every page of a listing and concatenate the items in order
pub async fn fetch_all<T, F, Fut>(fetch: F, max_pages: usize) -> Result<Vec<T>>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    Paginator::new(fetch).with_max_pages(max_pages).collect_all().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioterm_core::DeviceError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fetch_all_two_pages() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let items = fetch_all(
            move |cursor| {
                let call = seen.fetch_add(1, Ordering::SeqCst);
                async move {
                    match (call, cursor) {
                        (0, None) => Ok::<_, Error>(Page::new(vec![1, 2], Some(Cursor::Position(5)))),
                        (1, Some(Cursor::Position(5))) => Ok(Page::last(vec![3])),
                        other => panic!("unexpected fetch {other:?}"),
                    }
                }
            },
            DEFAULT_MAX_PAGES,
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_first_page_error_stops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let result: Result<Vec<i32>> = fetch_all(
            move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                async { Err::<Page<i32>, _>(Error::from(DeviceError::new("busy"))) }
            },
            DEFAULT_MAX_PAGES,
        )
        .await;

        assert_eq!(result.unwrap_err().device_code(), Some("busy"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_later_error_discards_partial() {
        let result: Result<Vec<i32>> = fetch_all(
            |cursor| async move {
                match cursor {
                    None => Ok::<_, Error>(Page::new(vec![1], Some(Cursor::Position(1)))),
                    Some(_) => Err(Error::Cancelled),
                }
            },
            DEFAULT_MAX_PAGES,
        )
        .await;

        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_empty_page_with_cursor_continues() {
        let items = fetch_all(
            |cursor| async move {
                Ok::<_, Error>(match cursor {
                    None => Page::new(vec![], Some(Cursor::Token("p2".into()))),
                    Some(Cursor::Token(t)) if t == "p2" => Page::last(vec!["a"]),
                    other => panic!("unexpected cursor {other:?}"),
                })
            },
            DEFAULT_MAX_PAGES,
        )
        .await
        .unwrap();

        assert_eq!(items, vec!["a"]);
    }

    #[tokio::test]
    async fn test_single_empty_page() {
        let items: Vec<u8> = fetch_all(|_| async { Ok::<_, Error>(Page::last(vec![])) }, DEFAULT_MAX_PAGES)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_page_limit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let result: Result<Vec<i64>> = fetch_all(
            move |_| {
                let n = seen.fetch_add(1, Ordering::SeqCst) as i64;
                async move { Ok::<_, Error>(Page::new(vec![n], Some(Cursor::Position(n + 1)))) }
            },
            3,
        )
        .await;

        assert!(matches!(result, Err(Error::PageLimitExceeded { limit: 3 })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_lazy_paging() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();

        let mut pages = Paginator::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Error>(Page::new(vec!['x'], Some(Cursor::Position(0)))) }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(pages.next_page().await.unwrap(), Some(vec!['x']));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pages.pages_fetched(), 1);
        assert!(!pages.is_done());
    }

    #[tokio::test]
    async fn test_done_after_error() {
        let mut pages = Paginator::new(|_| async { Err::<Page<u8>, _>(Error::Cancelled) });

        assert!(pages.next_page().await.is_err());
        assert!(pages.is_done());
        assert_eq!(pages.next_page().await.unwrap(), None);
    }
}
