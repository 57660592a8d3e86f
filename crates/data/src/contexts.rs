//! Context tries for prefix and contraction mappings.
//!
//! A context trie maps code point strings to CE32s, plus a default CE32 used
//! when no stored string matches. Contraction tries store the suffix that
//! follows the starting code point; prefix tries store the preceding text
//! reversed, so both are matched by reading away from the starting character.

use colla_primitives::Ce32;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// One stored context string and its mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
	pub context: Vec<u32>,
	pub ce32: Ce32,
}

/// Serialized form of a [`ContextTrie`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextTrieParts {
	pub default: Ce32,
	#[serde(default)]
	pub entries: Vec<ContextEntry>,
}

/// Default CE32 plus sorted context entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContextTrieParts", into = "ContextTrieParts")]
pub struct ContextTrie {
	default: Ce32,
	entries: Vec<ContextEntry>,
}

impl ContextTrie {
	/// Builds a trie from entries in any order. Duplicate or empty contexts are rejected.
	pub fn new(default: Ce32, mut entries: Vec<ContextEntry>) -> Result<Self> {
		entries.sort_by(|a, b| a.context.cmp(&b.context));
		for (i, pair) in entries.windows(2).enumerate() {
			if pair[0].context == pair[1].context {
				return Err(DataError::ContextOrder { entry: i + 1 });
			}
		}
		if let Some(i) = entries.iter().position(|e| e.context.is_empty()) {
			return Err(DataError::ContextOrder { entry: i });
		}
		Ok(Self { default, entries })
	}

	/// Mapping used when no stored context matches.
	#[inline]
	pub fn default_ce32(&self) -> Ce32 {
		self.default
	}

	/// Stored entries in code point order.
	pub fn entries(&self) -> &[ContextEntry] {
		&self.entries
	}

	/// Starts matching at the root.
	pub fn cursor(&self) -> ContextCursor<'_> {
		ContextCursor {
			entries: &self.entries,
			state: CursorState { lo: 0, hi: self.entries.len(), depth: 0 },
		}
	}
}

impl TryFrom<ContextTrieParts> for ContextTrie {
	type Error = DataError;

	fn try_from(parts: ContextTrieParts) -> Result<Self> {
		Self::new(parts.default, parts.entries)
	}
}

impl From<ContextTrie> for ContextTrieParts {
	fn from(trie: ContextTrie) -> Self {
		Self {
			default: trie.default,
			entries: trie.entries,
		}
	}
}

/// Outcome of feeding one code point to a [`ContextCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
	/// No stored string continues with the input so far.
	NoMatch,
	/// The input is a proper prefix of stored strings but not stored itself.
	NoValue,
	/// The input is stored and no longer string extends it.
	FinalValue,
	/// The input is stored and longer strings extend it.
	IntermediateValue,
}

impl MatchResult {
	#[inline]
	pub fn has_value(self) -> bool {
		matches!(self, Self::FinalValue | Self::IntermediateValue)
	}

	#[inline]
	pub fn has_next(self) -> bool {
		matches!(self, Self::NoValue | Self::IntermediateValue)
	}
}

/// Saved position of a [`ContextCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
	lo: usize,
	hi: usize,
	depth: usize,
}

/// Incremental matcher over a [`ContextTrie`].
///
/// The cursor narrows the sorted entry slice to the entries sharing the input
/// read so far.
#[derive(Debug, Clone, Copy)]
pub struct ContextCursor<'a> {
	entries: &'a [ContextEntry],
	state: CursorState,
}

impl<'a> ContextCursor<'a> {
	/// Consumes `c` and reports whether the extended input matches.
	pub fn next(&mut self, c: u32) -> MatchResult {
		let CursorState { lo, hi, depth } = self.state;
		let range = &self.entries[lo..hi];
		let below = range.partition_point(|e| e.context.get(depth).is_none_or(|&x| x < c));
		let through = range.partition_point(|e| e.context.get(depth).is_none_or(|&x| x <= c));
		self.state = CursorState {
			lo: lo + below,
			hi: lo + through,
			depth: depth + 1,
		};
		self.result()
	}

	fn result(&self) -> MatchResult {
		let CursorState { lo, hi, depth } = self.state;
		if lo == hi {
			return MatchResult::NoMatch;
		}
		let has_value = self.entries[lo].context.len() == depth;
		match (has_value, hi - lo > 1) {
			(true, true) => MatchResult::IntermediateValue,
			(true, false) => MatchResult::FinalValue,
			(false, _) => MatchResult::NoValue,
		}
	}

	/// The mapping of the input read so far, if it is a stored string.
	pub fn value(&self) -> Option<Ce32> {
		let CursorState { lo, hi, depth } = self.state;
		self.entries[lo..hi]
			.first()
			.filter(|e| e.context.len() == depth)
			.map(|e| e.ce32)
	}

	/// Returns to the root.
	pub fn reset(&mut self) {
		self.state = CursorState { lo: 0, hi: self.entries.len(), depth: 0 };
	}

	pub fn save(&self) -> CursorState {
		self.state
	}

	/// Restores a state saved from a cursor over the same trie.
	pub fn restore(&mut self, state: CursorState) {
		self.state = state;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(context: &[u32], ce32: u32) -> ContextEntry {
		ContextEntry { context: context.to_vec(), ce32: Ce32(ce32) }
	}

	fn sample() -> ContextTrie {
		ContextTrie::new(
			Ce32(0x100),
			vec![entry(&[0x68], 0x200), entry(&[0x68, 0x68], 0x300), entry(&[0x6c, 0x6c], 0x400)],
		)
		.expect("valid trie")
	}

	#[test]
	fn stepping_reports_trie_results() {
		let trie = sample();
		let mut cursor = trie.cursor();
		assert_eq!(cursor.next(0x68), MatchResult::IntermediateValue);
		assert_eq!(cursor.value(), Some(Ce32(0x200)));
		assert_eq!(cursor.next(0x68), MatchResult::FinalValue);
		assert_eq!(cursor.value(), Some(Ce32(0x300)));
		assert_eq!(cursor.next(0x68), MatchResult::NoMatch);
		assert_eq!(cursor.value(), None);

		cursor.reset();
		assert_eq!(cursor.next(0x6c), MatchResult::NoValue);
		assert_eq!(cursor.value(), None);
		let saved = cursor.save();
		assert_eq!(cursor.next(0x6d), MatchResult::NoMatch);
		cursor.restore(saved);
		assert_eq!(cursor.next(0x6c), MatchResult::FinalValue);
		assert_eq!(cursor.value(), Some(Ce32(0x400)));
	}

	#[test]
	fn unknown_first_code_point_is_no_match() {
		let trie = sample();
		let mut cursor = trie.cursor();
		assert_eq!(cursor.next(0x61), MatchResult::NoMatch);
		assert_eq!(cursor.next(0x68), MatchResult::NoMatch);
	}

	#[test]
	fn duplicates_and_empty_contexts_are_rejected() {
		let dup = ContextTrie::new(Ce32(0), vec![entry(&[1], 1), entry(&[1], 2)]);
		assert!(matches!(dup, Err(DataError::ContextOrder { entry: 1 })));
		let empty = ContextTrie::new(Ce32(0), vec![entry(&[], 1)]);
		assert!(matches!(empty, Err(DataError::ContextOrder { entry: 0 })));
	}

	#[test]
	fn entries_are_sorted_by_code_point() {
		let trie = ContextTrie::new(Ce32(0), vec![entry(&[0x10000], 1), entry(&[0xffff], 2)])
			.expect("valid trie");
		let keys: Vec<_> = trie.entries().iter().map(|e| e.context[0]).collect();
		assert_eq!(keys, vec![0xffff, 0x10000]);
	}
}
