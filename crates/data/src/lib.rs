//! Collation mapping tables and the objects that own them.
//!
//! A data provider assembles [`CollationData`] from [`CollationDataParts`];
//! construction validates every side-table reference so iteration never
//! indexes out of bounds on well-formed input. [`Tailoring`] pairs a table
//! with shared [`CollationSettings`], and [`root`] exposes the process-wide
//! root once [`install_root`] has run.

pub mod contexts;
pub mod data;
mod error;
pub mod fcd;
pub mod root;
pub mod settings;
pub mod tailoring;
pub mod trie;

pub use contexts::{ContextCursor, ContextEntry, ContextTrie, CursorState, MatchResult};
pub use data::{CollationData, CollationDataParts};
pub use error::{DataError, Result};
pub use root::{install_root, root};
pub use settings::CollationSettings;
pub use tailoring::{DataRef, Tailoring};
pub use trie::{Ce32Trie, Ce32TrieBuilder, MAX_CODE_POINT, TrieRange};
