//! Code point to CE32 lookup.
//!
//! The table is a sorted list of maximal same-value ranges covering
//! U+0000..=U+10FFFF. Latin-1 is mirrored into a flat array so the hottest
//! lookups skip the binary search.

use colla_primitives::Ce32;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

pub const MAX_CODE_POINT: u32 = 0x10_ffff;
const LATIN1_LIMIT: u32 = 0x100;

/// One maximal run of code points sharing a CE32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieRange {
	pub start: u32,
	pub end: u32,
	pub value: Ce32,
}

/// Immutable code point to CE32 map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TrieRange>", into = "Vec<TrieRange>")]
pub struct Ce32Trie {
	latin1: Box<[Ce32; LATIN1_LIMIT as usize]>,
	starts: Vec<u32>,
	values: Vec<Ce32>,
}

impl Ce32Trie {
	/// Builds a trie from ranges that cover every code point exactly once.
	///
	/// Adjacent ranges with equal values are merged.
	pub fn from_ranges(ranges: Vec<TrieRange>) -> Result<Self> {
		let mut starts: Vec<u32> = Vec::with_capacity(ranges.len());
		let mut values: Vec<Ce32> = Vec::with_capacity(ranges.len());
		let mut next = 0u32;
		for range in ranges {
			if range.start != next || range.end < range.start || range.end > MAX_CODE_POINT {
				return Err(DataError::TrieCoverage { at: next });
			}
			if values.last() != Some(&range.value) {
				starts.push(range.start);
				values.push(range.value);
			}
			next = range.end + 1;
		}
		if next != MAX_CODE_POINT + 1 {
			return Err(DataError::TrieCoverage { at: next });
		}
		Ok(Self::assemble(starts, values))
	}

	fn assemble(starts: Vec<u32>, values: Vec<Ce32>) -> Self {
		let mut trie = Self {
			latin1: Box::new([Ce32(0); LATIN1_LIMIT as usize]),
			starts,
			values,
		};
		for c in 0..LATIN1_LIMIT {
			trie.latin1[c as usize] = trie.search(c);
		}
		trie
	}

	/// Returns the CE32 for `c`. Values beyond U+10FFFF read as U+FFFD.
	#[inline]
	pub fn get(&self, c: u32) -> Ce32 {
		if c < LATIN1_LIMIT {
			self.latin1[c as usize]
		} else if c > MAX_CODE_POINT {
			self.search(0xfffd)
		} else {
			self.search(c)
		}
	}

	fn search(&self, c: u32) -> Ce32 {
		let i = self.starts.partition_point(|&s| s <= c).saturating_sub(1);
		self.values[i]
	}

	/// Iterates the maximal same-value ranges in code point order.
	pub fn ranges(&self) -> impl Iterator<Item = TrieRange> + '_ {
		self.starts.iter().zip(&self.values).enumerate().map(|(i, (&start, &value))| {
			let end = self.starts.get(i + 1).map_or(MAX_CODE_POINT, |&next| next - 1);
			TrieRange { start, end, value }
		})
	}

	/// Distinct CE32 values stored in the trie (with repeats across ranges).
	pub fn values(&self) -> impl Iterator<Item = Ce32> + '_ {
		self.values.iter().copied()
	}
}

impl TryFrom<Vec<TrieRange>> for Ce32Trie {
	type Error = DataError;

	fn try_from(ranges: Vec<TrieRange>) -> Result<Self> {
		Self::from_ranges(ranges)
	}
}

impl From<Ce32Trie> for Vec<TrieRange> {
	fn from(trie: Ce32Trie) -> Self {
		trie.ranges().collect()
	}
}

/// Mutable range map that produces a [`Ce32Trie`].
#[derive(Debug, Clone)]
pub struct Ce32TrieBuilder {
	ranges: Vec<TrieRange>,
}

impl Ce32TrieBuilder {
	/// Starts with every code point mapped to `initial`.
	pub fn new(initial: Ce32) -> Self {
		Self {
			ranges: vec![TrieRange { start: 0, end: MAX_CODE_POINT, value: initial }],
		}
	}

	pub fn set(&mut self, c: u32, value: Ce32) -> &mut Self {
		self.set_range(c, c, value)
	}

	/// Maps `start..=end` to `value`. Out-of-range or inverted bounds are ignored.
	pub fn set_range(&mut self, start: u32, end: u32, value: Ce32) -> &mut Self {
		let end = end.min(MAX_CODE_POINT);
		if start > end {
			return self;
		}
		let new = TrieRange { start, end, value };
		let mut out = Vec::with_capacity(self.ranges.len() + 2);
		let mut inserted = false;
		for r in self.ranges.drain(..) {
			if r.end < start {
				out.push(r);
				continue;
			}
			if r.start > end {
				if !inserted {
					out.push(new);
					inserted = true;
				}
				out.push(r);
				continue;
			}
			if r.start < start {
				out.push(TrieRange { end: start - 1, ..r });
			}
			if !inserted {
				out.push(new);
				inserted = true;
			}
			if r.end > end {
				out.push(TrieRange { start: end + 1, ..r });
			}
		}
		if !inserted {
			out.push(new);
		}
		self.ranges = out;
		self
	}

	pub fn build(&self) -> Ce32Trie {
		let mut starts = Vec::with_capacity(self.ranges.len());
		let mut values: Vec<Ce32> = Vec::with_capacity(self.ranges.len());
		for r in &self.ranges {
			if values.last() != Some(&r.value) {
				starts.push(r.start);
				values.push(r.value);
			}
		}
		Ce32Trie::assemble(starts, values)
	}
}
