// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod normalize;
pub mod candidates;
pub mod probe;
pub mod resolver;
pub mod record;
pub mod registry;
pub mod places;
pub mod enrich;
pub mod batch;
pub mod input;
pub mod export;
pub mod config;
pub mod cli;

pub use record::{BusinessRecord, EnrichedRecord, SourceMethod};
pub use resolver::{SiteResolution, SiteResolver};
