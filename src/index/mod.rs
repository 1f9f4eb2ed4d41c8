pub mod build;
pub mod source;
pub mod stats;
pub mod trie;
pub mod types;

pub use build::IndexBuilder;
pub use source::{IngestError, PropertySource};
pub use trie::{PrefixIndex, fold_key};
pub use types::*;
