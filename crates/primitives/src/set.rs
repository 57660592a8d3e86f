//! Sets of code points and strings, used as analyzer output.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use smallvec::SmallVec;

/// A code point sequence; may contain unpaired surrogates.
pub type CpString = SmallVec<[u32; 4]>;

/// A set of code points (as merged ranges) and multi-code-point strings.
///
/// Single-code-point strings are stored as code points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodePointSet {
	/// Disjoint, non-adjacent ranges keyed by start, valued by inclusive end.
	ranges: BTreeMap<u32, u32>,
	strings: BTreeSet<CpString>,
}

impl CodePointSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, c: u32) {
		self.add_range(c, c);
	}

	/// Adds `start..=end`, merging with overlapping or adjacent ranges.
	pub fn add_range(&mut self, start: u32, end: u32) {
		debug_assert!(start <= end);
		let mut start = start;
		let mut end = end;
		if let Some((&s, &e)) = self.ranges.range(..=start).next_back()
			&& e.saturating_add(1) >= start
		{
			start = s;
			end = end.max(e);
		}
		let absorbed: Vec<u32> = self
			.ranges
			.range(start..=end.saturating_add(1))
			.map(|(&s, _)| s)
			.collect();
		for s in absorbed {
			if let Some(e) = self.ranges.remove(&s) {
				end = end.max(e);
			}
		}
		self.ranges.insert(start, end);
	}

	/// Adds a string; a one-code-point string adds that code point.
	pub fn add_string(&mut self, s: &[u32]) {
		match s {
			[] => {}
			[c] => self.add(*c),
			_ => {
				self.strings.insert(CpString::from_slice(s));
			}
		}
	}

	/// Adds every code point and string of `other`.
	pub fn add_all(&mut self, other: &Self) {
		for range in other.ranges() {
			self.add_range(*range.start(), *range.end());
		}
		self.strings.extend(other.strings.iter().cloned());
	}

	pub fn contains(&self, c: u32) -> bool {
		self.ranges.range(..=c).next_back().is_some_and(|(_, &e)| c <= e)
	}

	/// Returns true if any code point of `start..=end` is in the set.
	pub fn contains_some(&self, start: u32, end: u32) -> bool {
		self.ranges.range(..=end).next_back().is_some_and(|(_, &e)| e >= start)
	}

	/// Returns true if every code point of `start..=end` is in the set.
	pub fn contains_all(&self, start: u32, end: u32) -> bool {
		self.ranges.range(..=start).next_back().is_some_and(|(_, &e)| e >= end)
	}

	pub fn contains_string(&self, s: &[u32]) -> bool {
		match s {
			[] => false,
			[c] => self.contains(*c),
			_ => self.strings.contains(s),
		}
	}

	/// Convenience lookup for a `str` (never contains surrogates).
	pub fn contains_str(&self, s: &str) -> bool {
		let cps: CpString = s.chars().map(u32::from).collect();
		self.contains_string(&cps)
	}

	/// Returns the sub-ranges of `start..=end` not covered by `self`.
	pub fn ranges_excluding(&self, start: u32, end: u32) -> Vec<RangeInclusive<u32>> {
		let mut out = Vec::new();
		let mut next = start;
		let first = self
			.ranges
			.range(..=start)
			.next_back()
			.map(|(&s, _)| s)
			.unwrap_or(start);
		for (&s, &e) in self.ranges.range(first..=end) {
			if e < next {
				continue;
			}
			if s > next {
				out.push(next..=s - 1);
			}
			match e.checked_add(1) {
				Some(n) if e < end => next = n,
				_ => return out,
			}
		}
		out.push(next..=end);
		out
	}

	pub fn ranges(&self) -> impl Iterator<Item = RangeInclusive<u32>> + '_ {
		self.ranges.iter().map(|(&s, &e)| s..=e)
	}

	pub fn range_count(&self) -> usize {
		self.ranges.len()
	}

	pub fn strings(&self) -> impl Iterator<Item = &[u32]> + '_ {
		self.strings.iter().map(|s| s.as_slice())
	}

	/// Number of code points plus number of strings.
	pub fn len(&self) -> usize {
		let cps: usize = self.ranges.iter().map(|(&s, &e)| (e - s) as usize + 1).sum();
		cps + self.strings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ranges.is_empty() && self.strings.is_empty()
	}
}
