pub mod use_authentication;
pub mod use_server_grid;

pub use use_authentication::use_authentication;
pub use use_server_grid::{ServerGridConfig, ServerGridHandle, use_server_grid};
