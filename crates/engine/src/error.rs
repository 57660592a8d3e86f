//! Errors raised while turning text into collation elements.

use colla_primitives::{Ce32, Tag};
use thiserror::Error;

fn cp_label(c: &Option<u32>) -> String {
	match c {
		Some(c) => format!("U+{c:04X}"),
		None => "<no code point>".to_string(),
	}
}

/// Failures of CE32 dispatch. All of them indicate corrupt or inconsistent
/// mapping data, never bad input text.
#[derive(Debug, Error)]
pub enum CollationError {
	/// A tag that must not occur at runtime reached the dispatcher.
	#[error("{tag:?} tag in {ce32:?} is not valid at runtime (at {})", cp_label(.c))]
	Dispatch { c: Option<u32>, ce32: Ce32, tag: Tag },

	/// A fallback CE32 was found in a table without a base.
	#[error("fallback {ce32:?} at {} but no base table is available", cp_label(.c))]
	MissingBase { c: Option<u32>, ce32: Ce32 },

	/// A special CE32 points outside its side table.
	#[error("{ce32:?} references {table}[{index}] which does not exist")]
	IndexOutOfRange {
		table: &'static str,
		index: usize,
		ce32: Ce32,
	},

	/// Indirections did not settle on a terminal value.
	#[error("resolving {} did not settle within {limit} steps (last {ce32:?})", cp_label(.c))]
	ResolutionDepth { c: Option<u32>, ce32: Ce32, limit: usize },

	/// A set analyzer failed while visiting a mapping.
	#[error("analysis failed at {}", cp_label(.c))]
	Analysis {
		c: Option<u32>,
		#[source]
		source: Box<CollationError>,
	},
}

impl CollationError {
	pub(crate) fn out_of_range(table: &'static str, index: usize, ce32: Ce32) -> Self {
		Self::IndexOutOfRange { table, index, ce32 }
	}

	/// Wraps `self` with the code point whose mapping was being analyzed.
	pub(crate) fn during_analysis(self, c: u32) -> Self {
		match self {
			Self::Analysis { .. } => self,
			other => Self::Analysis {
				c: Some(c),
				source: Box::new(other),
			},
		}
	}
}

/// Result type for collation element iteration.
pub type Result<T> = std::result::Result<T, CollationError>;
