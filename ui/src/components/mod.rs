pub mod admin_layout;
pub mod data_table;
pub mod pagination_controls;
pub mod server_toolbar;
pub mod toast;

pub use admin_layout::AdminLayout;
pub use data_table::{DataTable, TableVariant};
pub use pagination_controls::PaginationControls;
pub use server_toolbar::{SelectFilter, ServerToolbar};
pub use toast::ToastContainer;
