//! Utility functions shared by the library and the CLI.
//!
//! ## Modules
//!
//! - [`app_data`] - Configuration and app data directory management
//! - [`page`] - Grid pagination

pub mod app_data;
pub mod page;

pub use app_data::*;
pub use page::*;
