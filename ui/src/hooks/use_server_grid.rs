use gloo_timers::callback::Timeout;
use grid::cancel::RequestSlot;
use grid::{
    Effect, FetchTicket, GridOptions, GridSnapshot, GridState, Notifier,
    Outcome, Pagination, ParamMapper, RowMapper, SortModel, normalize,
};
use payloads::{ClientError, RawPage};
use std::cell::RefCell;
use std::rc::Rc;
use yew::prelude::*;

use crate::contexts::toast::{ToastHandle, use_toast};

/// What a screen needs to describe its grid.
pub struct ServerGridConfig<T, F> {
    /// Path under `/api/`, e.g. `admin/bookings`.
    pub endpoint: &'static str,
    pub options: GridOptions<F>,
    pub mapper: Rc<dyn ParamMapper<F>>,
    pub map_row: RowMapper<T>,
}

/// State and setters returned by [`use_server_grid`].
pub struct ServerGridHandle<T, F> {
    pub snapshot: GridSnapshot<T, F>,
    pub set_pagination: Callback<Pagination>,
    pub set_sort: Callback<SortModel>,
    pub set_search: Callback<String>,
    pub set_filter: Callback<Option<F>>,
    pub refresh: Callback<()>,
}

struct Driver<T, F> {
    state: GridState<T, F>,
    request: RequestSlot,
    debounce_timer: Option<Timeout>,
}

struct Runtime<T, F> {
    driver: Rc<RefCell<Driver<T, F>>>,
    endpoint: &'static str,
    debounce_ms: u32,
    mapper: Rc<dyn ParamMapper<F>>,
    map_row: RowMapper<T>,
    toasts: ToastHandle,
    snapshot: UseStateHandle<GridSnapshot<T, F>>,
}

impl<T, F> Clone for Runtime<T, F> {
    fn clone(&self) -> Self {
        Self {
            driver: Rc::clone(&self.driver),
            endpoint: self.endpoint,
            debounce_ms: self.debounce_ms,
            mapper: Rc::clone(&self.mapper),
            map_row: self.map_row.clone(),
            toasts: self.toasts.clone(),
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<T, F> Runtime<T, F>
where
    T: Clone + 'static,
    F: Clone + PartialEq + 'static,
{
    fn run(&self, transition: impl FnOnce(&mut GridState<T, F>) -> Option<Effect<F>>) {
        let effect = transition(&mut self.driver.borrow_mut().state);
        let Some(effect) = effect else {
            return;
        };
        match effect {
            Effect::Fetch(ticket) => self.start_fetch(ticket),
            Effect::Debounce { generation } => self.schedule_settle(generation),
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot.set(self.driver.borrow().state.snapshot());
    }

    fn start_fetch(&self, ticket: FetchTicket<F>) {
        let params = self.mapper.map_params(&ticket.query);
        let endpoint = self.endpoint;
        let request = self.driver.borrow_mut().request.wrap(async move {
            crate::get_api_client()
                .get_page(endpoint, params.as_slice())
                .await
        });
        let runtime = self.clone();
        yew::platform::spawn_local(async move {
            let result = request.await;
            runtime.finish(ticket.epoch, result);
        });
    }

    fn schedule_settle(&self, generation: u64) {
        let runtime = self.clone();
        let timer = Timeout::new(self.debounce_ms, move || {
            runtime.run(|state| state.settle_search(generation));
        });
        // replacing the previous timer cancels it
        self.driver.borrow_mut().debounce_timer = Some(timer);
    }

    fn finish(&self, epoch: u64, result: Result<RawPage, ClientError>) {
        let page = result.map(|raw| normalize(raw, &self.map_row));
        let outcome = self.driver.borrow_mut().state.complete(epoch, page);
        match outcome {
            Outcome::Discarded => {}
            Outcome::Failed(message) => {
                self.publish();
                self.toasts.show_error(&message);
            }
            _ => self.publish(),
        }
    }

    fn teardown(&self) {
        let mut driver = self.driver.borrow_mut();
        driver.state.teardown();
        driver.request.cancel();
        driver.debounce_timer = None;
    }
}

/// Server-driven grid bound to the lifetime of the calling component.
///
/// The first page is requested on mount. Unmounting abandons the request in
/// flight and any pending search.
#[hook]
pub fn use_server_grid<T, F>(
    config: ServerGridConfig<T, F>,
) -> ServerGridHandle<T, F>
where
    T: Clone + 'static,
    F: Clone + PartialEq + 'static,
{
    let ServerGridConfig {
        endpoint,
        options,
        mapper,
        map_row,
    } = config;
    let debounce_ms =
        u32::try_from(options.debounce.as_millis()).unwrap_or(u32::MAX);
    let driver = use_mut_ref(|| Driver {
        state: GridState::new(&options),
        request: RequestSlot::new(),
        debounce_timer: None,
    });
    let snapshot = {
        let driver = driver.clone();
        use_state(move || driver.borrow().state.snapshot())
    };
    let toasts = use_toast();

    let runtime = Runtime {
        driver,
        endpoint,
        debounce_ms,
        mapper,
        map_row,
        toasts,
        snapshot: snapshot.clone(),
    };

    {
        let runtime = runtime.clone();
        use_effect_with((), move |_| {
            runtime.run(GridState::mount);
            move || runtime.teardown()
        });
    }

    let set_pagination = {
        let runtime = runtime.clone();
        Callback::from(move |pagination: Pagination| {
            runtime.run(|state| state.set_pagination(pagination))
        })
    };
    let set_sort = {
        let runtime = runtime.clone();
        Callback::from(move |sort: SortModel| runtime.run(|state| state.set_sort(sort)))
    };
    let set_search = {
        let runtime = runtime.clone();
        Callback::from(move |input: String| {
            runtime.run(|state| state.set_search(Some(&input)))
        })
    };
    let set_filter = {
        let runtime = runtime.clone();
        Callback::from(move |filter: Option<F>| {
            runtime.run(|state| state.set_filter(filter))
        })
    };
    let refresh = Callback::from(move |()| runtime.run(GridState::refresh));

    ServerGridHandle {
        snapshot: (*snapshot).clone(),
        set_pagination,
        set_sort,
        set_search,
        set_filter,
        refresh,
    }
}
