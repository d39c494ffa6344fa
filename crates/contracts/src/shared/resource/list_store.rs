use crate::shared::api_error::ApiError;
use crate::shared::pagination::{Page, PageQuery};

/// Lifecycle of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Last load failed; the previous page is still shown
    Stale,
}

/// One issued list request.
///
/// Only the ticket with the latest generation may replace the page, so a
/// slow earlier response cannot overwrite a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub query: PageQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request was issued after this one
    Discarded,
    Failed(ApiError),
}

/// Current page of a resource list plus the query that produced it.
///
/// There is no cache: every page, per-page or filter change and every
/// post-mutation refresh issues a new ticket that the caller must fetch.
#[derive(Debug, Clone)]
pub struct ListStore<T> {
    query: PageQuery,
    page: Option<Page<T>>,
    state: LoadState,
    generation: u64,
}

impl<T> ListStore<T> {
    pub fn new(query: PageQuery) -> Self {
        Self {
            query,
            page: None,
            state: LoadState::Idle,
            generation: 0,
        }
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    pub fn page(&self) -> Option<&Page<T>> {
        self.page.as_ref()
    }

    pub fn items(&self) -> &[T] {
        self.page.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    /// Reload the current page with the current query
    pub fn refresh(&mut self) -> LoadTicket {
        self.begin_load()
    }

    pub fn set_page(&mut self, page: u64) -> LoadTicket {
        self.query.page = page.max(1);
        self.begin_load()
    }

    pub fn set_per_page(&mut self, per_page: u64) -> LoadTicket {
        self.query.per_page = per_page.max(1);
        self.query.page = 1;
        self.begin_load()
    }

    /// Set a filter (blank value removes it) and go back to the first page
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) -> LoadTicket {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.query.filters.remove(&key);
        } else {
            self.query.filters.insert(key, value);
        }
        self.query.page = 1;
        self.begin_load()
    }

    pub fn clear_filter(&mut self, key: &str) -> LoadTicket {
        self.set_filter(key, "")
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Feed the result of a ticket back into the store.
    ///
    /// On failure the previous page stays in place.
    pub fn complete(&mut self, ticket: &LoadTicket, result: Result<Page<T>, ApiError>) -> LoadOutcome {
        if !self.is_current(ticket) {
            return LoadOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                self.query.page = page.meta.current_page;
                self.query.per_page = page.meta.per_page;
                self.page = Some(page);
                self.state = LoadState::Loaded;
                LoadOutcome::Applied
            }
            Err(e) => {
                // the query goes back to the page still on screen
                self.state = match &self.page {
                    Some(shown) => {
                        self.query.page = shown.meta.current_page;
                        self.query.per_page = shown.meta.per_page;
                        LoadState::Stale
                    }
                    None => LoadState::Idle,
                };
                LoadOutcome::Failed(e)
            }
        }
    }
}

impl<T> Default for ListStore<T> {
    fn default() -> Self {
        Self::new(PageQuery::default())
    }
}
