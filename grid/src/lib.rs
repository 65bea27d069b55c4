//! Server-driven data grids: one paginated, sortable, searchable and
//! filterable collection loaded page by page from the admin API.
//!
//! [`state::GridState`] holds the rules and performs no I/O. On native
//! targets [`controller::GridController`] drives it on tokio; the web UI
//! drives it from a Yew hook.

pub mod admin;
pub mod cancel;
pub mod config;
pub mod debounce;
pub mod mapper;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod state;
pub mod view;

#[cfg(not(target_arch = "wasm32"))]
pub mod controller;
#[cfg(not(target_arch = "wasm32"))]
pub mod fetch;

pub use config::GridOptions;
pub use mapper::{DefaultParamMapper, PageQuery, ParamMapper, QueryParams};
pub use model::{
    Cell, GridRow, Page, Pagination, RowKey, SortDirection, SortItem,
    SortModel,
};
pub use normalize::{RowMapper, deserialize_rows, identity_rows, normalize};
pub use notify::{Notifier, failure_message};
pub use state::{Effect, FetchTicket, GridSnapshot, GridState, Outcome};

#[cfg(not(target_arch = "wasm32"))]
pub use controller::{GridController, GridDeps};
#[cfg(not(target_arch = "wasm32"))]
pub use fetch::{EndpointFetcher, PageFetcher};
