//! Court site adapters: one strategy per opinion source, looked up by court id.

mod adapter;
mod config;
pub mod minn;
pub mod pa;
pub mod registry;

pub use adapter::{Adapter, FetchRequest, ParseError, collect_records};
pub use config::{SiteConfig, StatusPolicy};
pub use registry::{court_ids, lookup};
