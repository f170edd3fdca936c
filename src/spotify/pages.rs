use std::future::Future;

use tracing::{debug, warn};

use crate::error::Result;
use crate::spotify::models::Paginated;

/// Lazily walks an offset-paged query.
///
/// The first page is fetched at offset 0 and every following page at the
/// offset reported by the previous one. A failed fetch ends iteration early:
/// the error is logged, the pages seen so far stay valid and
/// [`is_truncated`](Self::is_truncated) turns true.
pub struct PagedResults<F> {
    fetch: F,
    next_offset: Option<u32>,
    pages_seen: usize,
    max_pages: Option<usize>,
    truncated: bool,
}

/// All pages a [`PagedResults`] produced before it stopped.
#[derive(Debug)]
pub struct Collected<P> {
    pub pages: Vec<P>,
    pub truncated: bool,
}

impl<F> PagedResults<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            next_offset: Some(0),
            pages_seen: 0,
            max_pages: None,
            truncated: false,
        }
    }

    /// Stop after `max_pages` pages even if the service reports more.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn pages_seen(&self) -> usize {
        self.pages_seen
    }

    pub async fn next_page<P, Fut>(&mut self) -> Option<P>
    where
        P: Paginated,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        if self.max_pages.is_some_and(|max| self.pages_seen >= max) {
            debug!("Page cap of {} reached", self.pages_seen);
            self.next_offset = None;
            return None;
        }

        let offset = self.next_offset.take()?;

        match (self.fetch)(offset).await {
            Ok(page) => {
                self.pages_seen += 1;
                self.next_offset = page.next_offset();
                Some(page)
            }
            Err(e) => {
                warn!(
                    "Paged query failed at offset {} after {} page(s), keeping partial results: {}",
                    offset, self.pages_seen, e
                );
                self.truncated = true;
                None
            }
        }
    }

    pub async fn collect_all<P, Fut>(mut self) -> Collected<P>
    where
        P: Paginated,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<P>>,
    {
        let mut pages = Vec::new();
        while let Some(page) = self.next_page().await {
            pages.push(page);
        }

        Collected {
            pages,
            truncated: self.truncated,
        }
    }
}
