//! The grid's state machine, free of any I/O.
//!
//! Every setter returns the [`Effect`] the driver has to perform: issue a
//! fetch for a [`FetchTicket`], or schedule a debounce timer for a search
//! change. Results are fed back through [`GridState::complete`], which
//! commits them only if they belong to the most recently issued request.
//!
//! Drivers: [`crate::controller::GridController`] on tokio, and the
//! `use_server_grid` hook in the web UI.

use payloads::ClientError;
use std::collections::BTreeMap;

use crate::config::GridOptions;
use crate::debounce::DebouncedValue;
use crate::mapper::PageQuery;
use crate::model::{Page, Pagination, SortModel, normalize_sort};
use crate::notify::failure_message;

/// Identifies one issued request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket<F> {
    pub epoch: u64,
    pub query: PageQuery<F>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect<F> {
    /// Cancel whatever is in flight and load this query.
    Fetch(FetchTicket<F>),
    /// Call [`GridState::settle_search`] with `generation` once the debounce
    /// window has elapsed without another search change.
    Debounce { generation: u64 },
}

impl<F> Effect<F> {
    pub fn into_fetch(self) -> Option<FetchTicket<F>> {
        match self {
            Self::Fetch(ticket) => Some(ticket),
            Self::Debounce { .. } => None,
        }
    }
}

/// What became of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed,
    /// Superseded, or the grid was torn down.
    Discarded,
    Cancelled,
    /// Left to the session-invalidation hook of the API client.
    Unauthorized,
    /// Validation failure, exposed as field errors.
    Invalid,
    /// Any other failure, with the message to show the user.
    Failed(String),
}

/// Read-only view of a grid, as handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot<T, F> {
    pub rows: Vec<T>,
    pub total: u64,
    pub loading: bool,
    pub pagination: Pagination,
    pub sort: SortModel,
    /// Trimmed search as typed, possibly not yet applied.
    pub search: Option<String>,
    pub filter: Option<F>,
    pub field_errors: BTreeMap<String, String>,
}

impl<T, F> GridSnapshot<T, F> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && !self.loading
    }
}

impl<T, F> Default for GridSnapshot<T, F> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            loading: false,
            pagination: Pagination::default(),
            sort: Vec::new(),
            search: None,
            filter: None,
            field_errors: BTreeMap::new(),
        }
    }
}

/// Trim a search input; blank input means no search.
pub fn normalize_search(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(str::to_owned)
}

#[derive(Debug, Clone)]
pub struct GridState<T, F> {
    pagination: Pagination,
    sort: SortModel,
    search: DebouncedValue<Option<String>>,
    filter: Option<F>,
    rows: Vec<T>,
    total: u64,
    loading: bool,
    field_errors: BTreeMap<String, String>,
    epoch: u64,
    last_issued: Option<PageQuery<F>>,
    torn_down: bool,
}

impl<T, F: Clone + PartialEq> GridState<T, F> {
    pub fn new(options: &GridOptions<F>) -> Self {
        Self {
            pagination: options.initial_pagination(),
            sort: options.initial_sort(),
            search: DebouncedValue::new(normalize_search(
                options.search.as_deref(),
            )),
            filter: options.filter.clone(),
            rows: Vec::new(),
            total: 0,
            loading: false,
            field_errors: BTreeMap::new(),
            epoch: 0,
            last_issued: None,
            torn_down: false,
        }
    }

    /// Initial load.
    pub fn mount(&mut self) -> Option<Effect<F>> {
        self.issue()
    }

    pub fn set_pagination(&mut self, pagination: Pagination) -> Option<Effect<F>> {
        let pagination = Pagination {
            page_size: pagination.page_size.max(1),
            ..pagination
        };
        if pagination == self.pagination {
            return None;
        }
        self.pagination = pagination;
        self.issue()
    }

    pub fn update_pagination(
        &mut self,
        update: impl FnOnce(Pagination) -> Pagination,
    ) -> Option<Effect<F>> {
        let next = update(self.pagination);
        self.set_pagination(next)
    }

    pub fn set_sort(&mut self, sort: SortModel) -> Option<Effect<F>> {
        let sort = normalize_sort(sort);
        if sort == self.sort {
            return None;
        }
        self.sort = sort;
        self.pagination = self.pagination.first_page();
        self.issue()
    }

    pub fn update_sort(
        &mut self,
        update: impl FnOnce(&SortModel) -> SortModel,
    ) -> Option<Effect<F>> {
        let next = update(&self.sort);
        self.set_sort(next)
    }

    /// Record a search input. The page resets right away; the fetch waits for
    /// the debounce.
    pub fn set_search(&mut self, input: Option<&str>) -> Option<Effect<F>> {
        let generation = self.search.set(normalize_search(input))?;
        self.pagination = self.pagination.first_page();
        if self.torn_down {
            return None;
        }
        Some(Effect::Debounce { generation })
    }

    /// Apply the search recorded under `generation`, if no later change
    /// superseded it.
    pub fn settle_search(&mut self, generation: u64) -> Option<Effect<F>> {
        if self.torn_down || generation != self.search.generation() {
            return None;
        }
        self.search.settle(generation);
        if self.last_issued.as_ref() == Some(&self.query()) {
            tracing::debug!("Search settled on the query already loaded");
            return None;
        }
        self.issue()
    }

    /// Replace the filter. An equal filter changes nothing.
    pub fn set_filter(&mut self, filter: Option<F>) -> Option<Effect<F>> {
        if filter == self.filter {
            return None;
        }
        self.filter = filter;
        self.pagination = self.pagination.first_page();
        self.issue()
    }

    pub fn update_filter(
        &mut self,
        update: impl FnOnce(Option<&F>) -> Option<F>,
    ) -> Option<Effect<F>> {
        let next = update(self.filter.as_ref());
        self.set_filter(next)
    }

    /// Load the current query again.
    pub fn refresh(&mut self) -> Option<Effect<F>> {
        self.issue()
    }

    /// Feed back the result of the request issued under `epoch`.
    pub fn complete(
        &mut self,
        epoch: u64,
        result: Result<Page<T>, ClientError>,
    ) -> Outcome {
        if self.torn_down {
            return Outcome::Discarded;
        }
        let current = epoch == self.epoch;
        if let Err(ClientError::Cancelled) = result {
            if current {
                self.loading = false;
            }
            return Outcome::Cancelled;
        }
        if !current {
            tracing::debug!(
                "Discarding response of request {epoch}, {} is current",
                self.epoch
            );
            return Outcome::Discarded;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.rows = page.rows;
                self.total = page.total;
                self.field_errors.clear();
                Outcome::Committed
            }
            Err(ClientError::Unauthorized) => Outcome::Unauthorized,
            Err(ClientError::Validation(_, body)) => {
                self.field_errors = body.errors;
                Outcome::Invalid
            }
            Err(e) => {
                tracing::warn!("Failed to load grid page: {e}");
                Outcome::Failed(failure_message(&e))
            }
        }
    }

    /// The query a fetch issued now would carry.
    pub fn query(&self) -> PageQuery<F> {
        PageQuery {
            pagination: self.pagination,
            sort: self.sort.clone(),
            search: self.search.settled().clone(),
            filter: self.filter.clone(),
        }
    }

    fn issue(&mut self) -> Option<Effect<F>> {
        if self.torn_down {
            return None;
        }
        self.epoch += 1;
        self.loading = true;
        let query = self.query();
        tracing::debug!(
            "Issuing grid request {} for page {} (size {})",
            self.epoch,
            query.pagination.page,
            query.pagination.page_size
        );
        self.last_issued = Some(query.clone());
        Some(Effect::Fetch(FetchTicket {
            epoch: self.epoch,
            query,
        }))
    }
}

impl<T, F> GridState<T, F> {
    /// Stop accepting results. Every later call is a no-op.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.loading = false;
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn sort(&self) -> &SortModel {
        &self.sort
    }

    pub fn search(&self) -> Option<&str> {
        self.search.pending().as_deref()
    }

    /// The search the last fetch used, or will use.
    pub fn applied_search(&self) -> Option<&str> {
        self.search.settled().as_deref()
    }

    pub fn filter(&self) -> Option<&F> {
        self.filter.as_ref()
    }

    pub fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl<T: Clone, F: Clone> GridState<T, F> {
    pub fn snapshot(&self) -> GridSnapshot<T, F> {
        GridSnapshot {
            rows: self.rows.clone(),
            total: self.total,
            loading: self.loading,
            pagination: self.pagination,
            sort: self.sort.clone(),
            search: self.search.pending().clone(),
            filter: self.filter.clone(),
            field_errors: self.field_errors.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SortItem;
    use payloads::ApiErrorBody;
    use reqwest::StatusCode;

    #[derive(Debug, Clone, PartialEq)]
    struct Filter {
        status: Option<&'static str>,
    }

    type State = GridState<i64, Filter>;

    fn mounted() -> (State, FetchTicket<Filter>) {
        let mut state = State::new(&GridOptions::default());
        let ticket = state.mount().and_then(Effect::into_fetch).unwrap();
        (state, ticket)
    }

    fn page(rows: &[i64], total: u64) -> Result<Page<i64>, ClientError> {
        Ok(Page {
            rows: rows.to_vec(),
            total,
        })
    }

    fn on_page(state: &mut State, page: u32) {
        let ticket = state
            .update_pagination(|p| p.with_page(page))
            .and_then(Effect::into_fetch)
            .unwrap();
        state.complete(ticket.epoch, Ok(Page::default()));
        assert_eq!(state.pagination().page, page);
    }

    #[test]
    fn mount_issues_first_page() {
        let (state, ticket) = mounted();
        assert_eq!(ticket.epoch, 1);
        assert_eq!(ticket.query.pagination, Pagination::new(10));
        assert!(ticket.query.search.is_none());
        assert!(state.loading());
    }

    #[test]
    fn committing_clears_loading() {
        let (mut state, ticket) = mounted();
        let outcome = state.complete(ticket.epoch, page(&[1, 2, 3], 30));
        assert_eq!(outcome, Outcome::Committed);
        assert_eq!(state.rows(), &[1, 2, 3]);
        assert_eq!(state.total(), 30);
        assert!(!state.loading());
    }

    #[test]
    fn pagination_change_keeps_other_state() {
        let (mut state, _) = mounted();
        state.set_sort(vec![SortItem::desc("date")]);
        state.set_filter(Some(Filter {
            status: Some("PENDING"),
        }));
        let ticket = state
            .update_pagination(|p| p.with_page(2))
            .and_then(Effect::into_fetch)
            .unwrap();
        assert_eq!(ticket.query.pagination.page, 2);
        assert_eq!(ticket.query.sort, vec![SortItem::desc("date")]);
        assert_eq!(
            ticket.query.filter,
            Some(Filter {
                status: Some("PENDING")
            })
        );
    }

    #[test]
    fn identical_pagination_is_a_no_op() {
        let (mut state, _) = mounted();
        assert_eq!(state.update_pagination(|p| p), None);
        assert_eq!(state.epoch(), 1);
    }

    #[test]
    fn changing_sort_filter_or_search_resets_page() {
        let (mut state, _) = mounted();

        on_page(&mut state, 3);
        let ticket = state
            .set_sort(vec![SortItem::asc("email")])
            .and_then(Effect::into_fetch)
            .unwrap();
        assert_eq!(ticket.query.pagination.page, 0);

        on_page(&mut state, 3);
        let ticket = state
            .set_filter(Some(Filter { status: None }))
            .and_then(Effect::into_fetch)
            .unwrap();
        assert_eq!(ticket.query.pagination.page, 0);

        on_page(&mut state, 3);
        let effect = state.set_search(Some("smith"));
        assert_eq!(effect, Some(Effect::Debounce { generation: 1 }));
        assert_eq!(state.pagination().page, 0);
    }

    #[test]
    fn equal_filter_neither_fetches_nor_resets_page() {
        let (mut state, _) = mounted();
        state.set_filter(Some(Filter {
            status: Some("COMPLETED"),
        }));
        on_page(&mut state, 2);
        let epoch = state.epoch();

        let effect = state.update_filter(|_| {
            Some(Filter {
                status: Some("COMPLETED"),
            })
        });
        assert_eq!(effect, None);
        assert_eq!(state.epoch(), epoch);
        assert_eq!(state.pagination().page, 2);
    }

    #[test]
    fn invalid_sort_entries_are_dropped() {
        let (mut state, _) = mounted();
        let effect = state.set_sort(vec![SortItem::asc(" ")]);
        assert_eq!(effect, None);
        assert!(state.sort().is_empty());
    }

    #[test]
    fn filter_updater_returning_none_clears_filter() {
        let mut state = State::new(&GridOptions::default().filter(Filter {
            status: Some("PENDING"),
        }));
        state.mount();
        let ticket = state
            .update_filter(|_| None)
            .and_then(Effect::into_fetch)
            .unwrap();
        assert_eq!(ticket.query.filter, None);
    }

    #[test]
    fn stale_response_is_discarded() {
        let (mut state, first) = mounted();
        let second = state.refresh().and_then(Effect::into_fetch).unwrap();

        assert_eq!(
            state.complete(second.epoch, page(&[2], 1)),
            Outcome::Committed
        );
        assert_eq!(
            state.complete(first.epoch, page(&[1], 1)),
            Outcome::Discarded
        );
        assert_eq!(state.rows(), &[2]);
    }

    #[test]
    fn superseded_cancellation_keeps_loading_of_newer_request() {
        let (mut state, first) = mounted();
        let _second = state.refresh().and_then(Effect::into_fetch).unwrap();
        let outcome = state.complete(first.epoch, Err(ClientError::Cancelled));
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(state.loading());
    }

    #[test]
    fn failure_keeps_previous_rows() {
        let (mut state, ticket) = mounted();
        state.complete(ticket.epoch, page(&[1, 2], 2));

        let ticket = state.refresh().and_then(Effect::into_fetch).unwrap();
        let outcome = state.complete(ticket.epoch, Err(ClientError::Timeout));
        assert_eq!(
            outcome,
            Outcome::Failed(crate::notify::LOAD_ERROR_MESSAGE.into())
        );
        assert_eq!(state.rows(), &[1, 2]);
        assert_eq!(state.total(), 2);
        assert!(!state.loading());
    }

    #[test]
    fn validation_errors_become_field_errors() {
        let (mut state, ticket) = mounted();
        let body = ApiErrorBody::from_text(
            r#"{"message": "Invalide", "errors": {"date": "Format attendu AAAA-MM-JJ"}}"#,
        );
        let outcome = state.complete(
            ticket.epoch,
            Err(ClientError::Validation(StatusCode::UNPROCESSABLE_ENTITY, body)),
        );
        assert_eq!(outcome, Outcome::Invalid);
        assert_eq!(
            state.field_errors().get("date").map(String::as_str),
            Some("Format attendu AAAA-MM-JJ")
        );

        let ticket = state.refresh().and_then(Effect::into_fetch).unwrap();
        state.complete(ticket.epoch, page(&[], 0));
        assert!(state.field_errors().is_empty());
    }

    #[test]
    fn unauthorized_is_left_to_the_client() {
        let (mut state, ticket) = mounted();
        let outcome = state.complete(ticket.epoch, Err(ClientError::Unauthorized));
        assert_eq!(outcome, Outcome::Unauthorized);
        assert!(!state.loading());
    }

    #[test]
    fn search_is_trimmed_and_deduplicated() {
        let (mut state, _) = mounted();
        let Some(Effect::Debounce { generation }) =
            state.set_search(Some("smith"))
        else {
            panic!("search change should be debounced");
        };
        assert_eq!(state.set_search(Some("smith ")), None);
        assert_eq!(state.search(), Some("smith"));

        let ticket = state
            .settle_search(generation)
            .and_then(Effect::into_fetch)
            .unwrap();
        assert_eq!(ticket.query.search.as_deref(), Some("smith"));
    }

    #[test]
    fn only_latest_search_generation_fetches() {
        let (mut state, _) = mounted();
        let generations: Vec<u64> = ["a", "ab", "abc"]
            .into_iter()
            .filter_map(|input| match state.set_search(Some(input)) {
                Some(Effect::Debounce { generation }) => Some(generation),
                _ => None,
            })
            .collect();
        assert_eq!(generations.len(), 3);

        assert_eq!(state.settle_search(generations[0]), None);
        assert_eq!(state.settle_search(generations[1]), None);
        let ticket = state
            .settle_search(generations[2])
            .and_then(Effect::into_fetch)
            .unwrap();
        assert_eq!(ticket.query.search.as_deref(), Some("abc"));
        assert_eq!(state.epoch(), 2);
    }

    #[test]
    fn blank_search_means_no_search() {
        let mut state = State::new(&GridOptions::default().search("smith"));
        state.mount();
        let Some(Effect::Debounce { generation }) = state.set_search(Some("   "))
        else {
            panic!("clearing the search should be debounced");
        };
        let ticket = state
            .settle_search(generation)
            .and_then(Effect::into_fetch)
            .unwrap();
        assert_eq!(ticket.query.search, None);
        assert_eq!(state.search(), None);
    }

    #[test]
    fn reverting_search_still_loads_the_reset_page() {
        let (mut state, _) = mounted();
        on_page(&mut state, 2);
        state.set_search(Some("x"));
        let Some(Effect::Debounce { generation }) = state.set_search(None) else {
            panic!("search change should be debounced");
        };
        let ticket = state
            .settle_search(generation)
            .and_then(Effect::into_fetch)
            .unwrap();
        assert_eq!(ticket.query.pagination.page, 0);
        assert_eq!(ticket.query.search, None);
    }

    #[test]
    fn reverting_search_on_first_page_does_not_refetch() {
        let (mut state, _) = mounted();
        state.set_search(Some("x"));
        let Some(Effect::Debounce { generation }) = state.set_search(Some(""))
        else {
            panic!("search change should be debounced");
        };
        assert_eq!(state.settle_search(generation), None);
        assert_eq!(state.epoch(), 1);
    }

    #[test]
    fn torn_down_state_ignores_everything() {
        let (mut state, ticket) = mounted();
        state.teardown();

        assert_eq!(state.complete(ticket.epoch, page(&[1], 1)), Outcome::Discarded);
        assert!(state.rows().is_empty());
        assert_eq!(state.refresh(), None);
        assert_eq!(state.update_pagination(|p| p.with_page(4)), None);
        assert_eq!(state.set_search(Some("late")), None);
        assert!(!state.loading());
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut state, ticket) = mounted();
        state.complete(ticket.epoch, page(&[7], 1));
        state.set_search(Some(" jo "));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.rows, vec![7]);
        assert_eq!(snapshot.search.as_deref(), Some("jo"));
        assert_eq!(state.applied_search(), None);
        assert!(!snapshot.is_empty());
    }
}
