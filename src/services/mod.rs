pub mod catalog;
pub mod draft_store;
pub mod materializer;

pub use catalog::{Catalog, ScanReport};
pub use materializer::MaterializePayload;
