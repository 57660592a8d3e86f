//! Error types for mapping-table construction and settings.

use colla_primitives::{Ce32, Tag};
use thiserror::Error;

/// Errors raised while assembling or validating collation data.
#[derive(Debug, Error)]
pub enum DataError {
	/// A special CE32 points past the end of a side table.
	#[error("{ce32:?} references {table}[{index}..{end}] but the table has {len} entries")]
	BadReference {
		ce32: Ce32,
		table: &'static str,
		index: usize,
		end: usize,
		len: usize,
	},

	/// A tag that only exists at build time (or not at all) was found in a table.
	#[error("{tag:?} tag is not valid in runtime data ({ce32:?})")]
	InvalidTag { ce32: Ce32, tag: Tag },

	/// An expansion32 entry is not a simple or long CE32.
	#[error("expansion {ce32:?} holds non-simple entry {entry:?}")]
	ExpansionEntry { ce32: Ce32, entry: Ce32 },

	/// A side table has more entries than a CE32 index can address.
	#[error("{table} holds {len} entries but CE32 indexes reach only {max}")]
	TableTooLarge { table: &'static str, len: usize, max: usize },

	/// The trie ranges do not cover U+0000..=U+10FFFF contiguously.
	#[error("trie ranges must cover all code points contiguously; gap or overlap at U+{at:04X}")]
	TrieCoverage { at: u32 },

	/// Context strings must be non-empty, strictly sorted and unique.
	#[error("context trie entry {entry} is empty or out of order")]
	ContextOrder { entry: usize },

	/// The base table itself has a base.
	#[error("base collation data must not have a base of its own")]
	NestedBase,

	/// The jamo CE32 table has the wrong number of entries.
	#[error("jamo table must hold {expected} CE32s, found {found}")]
	JamoLength { expected: usize, found: usize },

	/// Settings could not be parsed.
	#[error("failed to parse collation settings: {0}")]
	Settings(#[from] toml::de::Error),

	/// The root tailoring was registered more than once.
	#[error("root collation is already installed")]
	RootInstalled,

	/// The root tailoring must not chain to a base.
	#[error("root collation data must not have a base")]
	RootHasBase,
}

/// Result type for collation data operations.
pub type Result<T> = std::result::Result<T, DataError>;
