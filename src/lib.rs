//! # kbnb - property listing search and filtering
//!
//! The engine behind a rental listing browser: type-ahead search over
//! property names and a multi-criterion filter with per-host aggregates.
//!
//! ## Architecture
//!
//! - [`index`] - Property records, ingestion, and the prefix (trie) index
//! - [`query`] - Filter criteria, expression parsing, host aggregates, and the filter engine
//! - [`output`] - Terminal rendering of matches, grid pages and host tables
//! - [`utils`] - Configuration and pagination helpers
//!
//! ## Quick Start
//!
//! ```no_run
//! use kbnb::index::{PrefixIndex, PropertySource};
//! use kbnb::query::{FilterCriteria, FilterEngine};
//! use std::path::Path;
//!
//! let source = PropertySource::open(Path::new("properties.json")).unwrap();
//!
//! // Type-ahead search
//! let index = PrefixIndex::build(source.records());
//! for m in index.query("sun") {
//!     println!("{} {}", m.id, m.name);
//! }
//!
//! // Filtering
//! let criteria = FilterCriteria::new().with_location("US").super_hosts_only(true);
//! let engine = FilterEngine::new();
//! let visible = engine.apply(source.records(), &criteria);
//! println!("{} listings", visible.len());
//! ```
//!
//! Both components are pure over immutable snapshots: an index is built
//! once and only read afterwards, and filtering never mutates its input.

pub mod index;
pub mod output;
pub mod query;
pub mod utils;
