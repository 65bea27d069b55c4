use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use payloads::{ClientError, RawPage};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cancel::RequestSlot;
use crate::config::GridOptions;
use crate::fetch::PageFetcher;
use crate::mapper::{DefaultParamMapper, ParamMapper};
use crate::model::{Pagination, SortModel};
use crate::normalize::{RowMapper, normalize};
use crate::notify::{NoopNotifier, Notifier};
use crate::state::{Effect, FetchTicket, GridSnapshot, GridState, Outcome};

/// Collaborators injected into a grid.
pub struct GridDeps<T, F> {
    pub fetcher: Arc<dyn PageFetcher>,
    pub mapper: Arc<dyn ParamMapper<F>>,
    pub map_row: RowMapper<T>,
    pub notifier: Arc<dyn Notifier + Send + Sync>,
}

impl<T, F: Serialize + 'static> GridDeps<T, F> {
    /// Default parameter mapping, failures not reported anywhere.
    pub fn new(fetcher: impl PageFetcher + 'static, map_row: RowMapper<T>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            mapper: Arc::new(DefaultParamMapper),
            map_row,
            notifier: Arc::new(NoopNotifier),
        }
    }
}

impl<T, F> GridDeps<T, F> {
    pub fn mapper(mut self, mapper: impl ParamMapper<F> + 'static) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier + Send + Sync>) -> Self {
        self.notifier = notifier;
        self
    }
}

struct Inner<T, F> {
    state: GridState<T, F>,
    request: RequestSlot,
    debounce_timer: Option<JoinHandle<()>>,
}

struct Shared<T, F> {
    inner: Mutex<Inner<T, F>>,
    deps: GridDeps<T, F>,
    debounce: Duration,
    snapshots: watch::Sender<GridSnapshot<T, F>>,
}

/// Drives one [`GridState`] on the tokio runtime.
///
/// Fetches run as spawned tasks; a newer fetch aborts the one in flight.
/// Snapshots are published on a watch channel after every change.
/// Dropping the controller unmounts the grid.
pub struct GridController<T, F> {
    shared: Arc<Shared<T, F>>,
}

impl<T, F> GridController<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create the grid and issue its first fetch. Must be called from within
    /// a tokio runtime.
    pub fn mount(deps: GridDeps<T, F>, options: GridOptions<F>) -> Self {
        let state = GridState::new(&options);
        let (snapshots, _) = watch::channel(state.snapshot());
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                state,
                request: RequestSlot::new(),
                debounce_timer: None,
            }),
            deps,
            debounce: options.debounce,
            snapshots,
        });
        shared.run(GridState::mount);
        Self { shared }
    }

    pub fn set_pagination(&self, pagination: Pagination) {
        self.shared.run(|state| state.set_pagination(pagination));
    }

    pub fn update_pagination(&self, update: impl FnOnce(Pagination) -> Pagination) {
        self.shared.run(|state| state.update_pagination(update));
    }

    pub fn set_sort(&self, sort: SortModel) {
        self.shared.run(|state| state.set_sort(sort));
    }

    pub fn update_sort(&self, update: impl FnOnce(&SortModel) -> SortModel) {
        self.shared.run(|state| state.update_sort(update));
    }

    pub fn set_search(&self, search: Option<&str>) {
        self.shared.run(|state| state.set_search(search));
    }

    pub fn set_filter(&self, filter: Option<F>) {
        self.shared.run(|state| state.set_filter(filter));
    }

    pub fn update_filter(&self, update: impl FnOnce(Option<&F>) -> Option<F>) {
        self.shared.run(|state| state.update_filter(update));
    }

    /// Reload the current query, e.g. after a mutation.
    pub fn refresh(&self) {
        self.shared.run(GridState::refresh);
    }

    pub fn snapshot(&self) -> GridSnapshot<T, F> {
        self.shared.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GridSnapshot<T, F>> {
        self.shared.snapshots.subscribe()
    }

    /// Abandon the request in flight and ignore every later result.
    pub fn unmount(&self) {
        self.shared.teardown();
    }
}

impl<T, F> Drop for GridController<T, F> {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

impl<T, F> Shared<T, F> {
    fn lock(&self) -> MutexGuard<'_, Inner<T, F>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn teardown(&self) {
        let mut inner = self.lock();
        if inner.state.is_torn_down() {
            return;
        }
        inner.state.teardown();
        inner.request.cancel();
        if let Some(timer) = inner.debounce_timer.take() {
            timer.abort();
        }
        tracing::debug!("Grid unmounted");
    }
}

impl<T, F> Shared<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Clone + PartialEq + Send + Sync + 'static,
{
    /// Apply one transition and carry out the effect it asks for.
    fn run(
        self: &Arc<Self>,
        transition: impl FnOnce(&mut GridState<T, F>) -> Option<Effect<F>>,
    ) {
        let mut inner = self.lock();
        let Some(effect) = transition(&mut inner.state) else {
            return;
        };
        match effect {
            Effect::Fetch(ticket) => self.start_fetch(&mut inner, ticket),
            Effect::Debounce { generation } => {
                self.schedule_settle(&mut inner, generation)
            }
        }
        self.snapshots.send_replace(inner.state.snapshot());
    }

    fn start_fetch(self: &Arc<Self>, inner: &mut Inner<T, F>, ticket: FetchTicket<F>) {
        let params = self.deps.mapper.map_params(&ticket.query);
        let fetcher = Arc::clone(&self.deps.fetcher);
        let request = inner
            .request
            .wrap(async move { fetcher.fetch_page(params).await });
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let result = request.await;
            shared.finish(ticket.epoch, result);
        });
    }

    fn schedule_settle(self: &Arc<Self>, inner: &mut Inner<T, F>, generation: u64) {
        if let Some(timer) = inner.debounce_timer.take() {
            timer.abort();
        }
        let shared = Arc::clone(self);
        let delay = self.debounce;
        inner.debounce_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.run(|state| state.settle_search(generation));
        }));
    }

    fn finish(&self, epoch: u64, result: Result<RawPage, ClientError>) {
        let page = result.map(|raw| normalize(raw, &self.deps.map_row));
        let outcome = {
            let mut inner = self.lock();
            let outcome = inner.state.complete(epoch, page);
            if outcome != Outcome::Discarded {
                self.snapshots.send_replace(inner.state.snapshot());
            }
            outcome
        };
        if let Outcome::Failed(message) = outcome {
            self.deps.notifier.show_error(&message);
        }
    }
}
