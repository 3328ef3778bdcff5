use anyhow::Result;
use std::future::Future;
use tracing::debug;

/// Why a paginated walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The resource answered with an empty page.
    Exhausted,
    /// The stop predicate matched the last page returned.
    StoppedEarly,
}

/// The outcome of draining a [`Paginator`].
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Number of non-empty pages included in `items`.
    pub pages: u32,
    pub termination: Termination,
}

type StopPredicate<'a, T> = Box<dyn Fn(&[T]) -> bool + Send + Sync + 'a>;

/// Lazy page stream over a 1-based paged resource.
///
/// Pages are requested one at a time. The stream ends on the first empty
/// page, or right after a page for which the stop predicate holds; that
/// page is still yielded. Fetch errors are handed back as-is, nothing is
/// retried.
pub struct Paginator<'a, T, F> {
    fetch: F,
    stop_after: Option<StopPredicate<'a, T>>,
    next: u32,
    pages: u32,
    finished: Option<Termination>,
}

impl<'a, T, F, Fut> Paginator<'a, T, F>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            stop_after: None,
            next: 1,
            pages: 0,
            finished: None,
        }
    }

    /// Stop after the first page for which `predicate` returns true.
    pub fn stop_after(mut self, predicate: impl Fn(&[T]) -> bool + Send + Sync + 'a) -> Self {
        self.stop_after = Some(Box::new(predicate));
        self
    }

    pub fn termination(&self) -> Option<Termination> {
        self.finished
    }

    /// Fetch the next page, or `None` once the stream has ended.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if self.finished.is_some() {
            return Ok(None);
        }

        let page = self.next;
        let items = (self.fetch)(page).await?;
        if items.is_empty() {
            debug!("Page {} is empty, pagination exhausted", page);
            self.finished = Some(Termination::Exhausted);
            return Ok(None);
        }

        self.pages += 1;
        let stop = self
            .stop_after
            .as_ref()
            .is_some_and(|predicate| predicate(&items));
        if stop {
            debug!("Stop predicate matched on page {}", page);
            self.finished = Some(Termination::StoppedEarly);
        } else {
            self.next += 1;
        }

        Ok(Some(items))
    }

    /// Drain the stream, concatenating pages in order.
    pub async fn collect(mut self) -> Result<Paginated<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }

        Ok(Paginated {
            items,
            pages: self.pages,
            termination: self.termination().unwrap_or(Termination::Exhausted),
        })
    }
}
