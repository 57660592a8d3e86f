use std::cmp::Ordering;

use colla_data::{CollationData, ContextEntry, ContextTrie};
use colla_primitives::ce32::CONTRACT_SINGLE_CP_NO_MATCH;
use colla_primitives::{Ce32, CodePointSet, FALLBACK_CE32, NO_CE32, Tag, ce, hangul};

use super::{SENTINEL, context_of, joined};
use crate::error::{CollationError, Result};
use crate::iter::{MAX_RESOLUTION_STEPS, integrity};

/// Finds the code points and strings a tailoring maps differently from its
/// base.
///
/// Every non-fallback code point of the tailoring is compared with the base
/// mapping. Prefix and contraction mappings are compared entry by entry, so
/// a tailored contraction adds the contraction string rather than its first
/// code point.
///
/// A long primary that equals the primary the base computes for an
/// offset-tagged code point is a copy of the base mapping and is not
/// reported.
#[derive(Debug)]
pub struct TailoredSet<'s> {
	tailored: &'s mut CodePointSet,
	unreversed_prefix: Vec<u32>,
	suffix: Option<Vec<u32>>,
}

impl<'s> TailoredSet<'s> {
	pub fn new(tailored: &'s mut CodePointSet) -> Self {
		Self {
			tailored,
			unreversed_prefix: Vec::new(),
			suffix: None,
		}
	}

	/// Adds everything `data` tailors. Fails if `data` has no base.
	pub fn for_data(&mut self, data: &CollationData) -> Result<()> {
		let Some(base) = data.base() else {
			return Err(CollationError::MissingBase {
				c: None,
				ce32: FALLBACK_CE32,
			});
		};
		let before = self.tailored.len();
		for range in data.trie().ranges() {
			if range.value == FALLBACK_CE32 {
				continue;
			}
			for c in range.start..=range.end {
				self.handle_ce32(data, base, c, range.value)
					.map_err(|err| err.during_analysis(c))?;
			}
		}
		tracing::debug!(added = self.tailored.len() - before, "tailored set computed");
		Ok(())
	}

	fn handle_ce32(&mut self, data: &CollationData, base: &CollationData, c: u32, ce32: Ce32) -> Result<()> {
		let ce32 = data.final_ce32(ce32);
		if ce32 == FALLBACK_CE32 {
			return Ok(());
		}
		let base_ce32 = base.final_ce32(base.ce32(c));
		if ce32.is_self_contained() && base_ce32.is_self_contained() {
			if ce32 != base_ce32 {
				self.tailored.add(c);
			}
			return Ok(());
		}
		self.compare(data, base, c, ce32, base_ce32, 0)
	}

	fn compare(
		&mut self,
		data: &CollationData,
		base: &CollationData,
		c: u32,
		ce32: Ce32,
		base_ce32: Ce32,
		depth: usize,
	) -> Result<()> {
		if depth >= MAX_RESOLUTION_STEPS {
			return Err(CollationError::ResolutionDepth {
				c: Some(c),
				ce32,
				limit: MAX_RESOLUTION_STEPS,
			});
		}
		let mut ce32 = ce32;
		let mut base_ce32 = base_ce32;

		if ce32.is_prefix() {
			let prefixes = context_of(data, ce32)?;
			ce32 = data.final_ce32(prefixes.default_ce32());
			if base_ce32.is_prefix() {
				let base_prefixes = context_of(base, base_ce32)?;
				base_ce32 = base.final_ce32(base_prefixes.default_ce32());
				self.compare_prefixes(data, base, c, prefixes, base_prefixes, depth)?;
			} else {
				self.add_prefixes(data, c, prefixes)?;
			}
		} else if base_ce32.is_prefix() {
			let base_prefixes = context_of(base, base_ce32)?;
			base_ce32 = base.final_ce32(base_prefixes.default_ce32());
			self.add_prefixes(base, c, base_prefixes)?;
		}

		if ce32.is_contraction() {
			let suffixes = context_of(data, ce32)?;
			ce32 = contraction_default(data, ce32, suffixes);
			if base_ce32.is_contraction() {
				let base_suffixes = context_of(base, base_ce32)?;
				base_ce32 = contraction_default(base, base_ce32, base_suffixes);
				self.compare_contractions(data, base, c, suffixes, base_suffixes, depth)?;
			} else {
				self.add_contractions(c, suffixes);
			}
		} else if base_ce32.is_contraction() {
			let base_suffixes = context_of(base, base_ce32)?;
			base_ce32 = contraction_default(base, base_ce32, base_suffixes);
			self.add_contractions(c, base_suffixes);
		}

		let tag = ce32.special_tag();
		let base_tag = base_ce32.special_tag();
		if !hangul::is_hangul(c) {
			for (tag, ce32) in [(tag, ce32), (base_tag, base_ce32)] {
				if tag == Some(Tag::Hangul) {
					return Err(integrity(CollationError::Dispatch {
						c: Some(c),
						ce32,
						tag: Tag::Hangul,
					}));
				}
			}
		}

		// A long primary equal to the base's computed offset primary is a copy.
		if base_tag == Some(Tag::Offset) {
			if !ce32.is_long_primary() {
				self.add(c);
				return Ok(());
			}
			let data_ce = *base
				.ces()
				.get(base_ce32.index())
				.ok_or_else(|| CollationError::out_of_range("ces", base_ce32.index(), base_ce32))?;
			if ce32.long_primary_weight() != ce::three_byte_primary_for_offset_data(c, data_ce) {
				self.add(c);
			}
			return Ok(());
		}

		if tag != base_tag {
			self.add(c);
			return Ok(());
		}
		let differs = match tag {
			Some(Tag::Expansion32) => {
				let ours = data
					.expansion_ce32s(ce32)
					.ok_or_else(|| CollationError::out_of_range("ce32s", ce32.index(), ce32))?;
				let theirs = base
					.expansion_ce32s(base_ce32)
					.ok_or_else(|| CollationError::out_of_range("ce32s", base_ce32.index(), base_ce32))?;
				ours != theirs
			}
			Some(Tag::Expansion) => {
				let ours = data
					.expansion_ces(ce32)
					.ok_or_else(|| CollationError::out_of_range("ces", ce32.index(), ce32))?;
				let theirs = base
					.expansion_ces(base_ce32)
					.ok_or_else(|| CollationError::out_of_range("ces", base_ce32.index(), base_ce32))?;
				ours != theirs
			}
			Some(Tag::Hangul) => {
				let (jamo, len) = hangul::decompose(c);
				jamo[..len].iter().any(|&j| self.tailored.contains(j))
			}
			_ => ce32 != base_ce32,
		};
		if differs {
			self.add(c);
		}
		Ok(())
	}

	/// Merges two prefix lists in context order.
	fn compare_prefixes(
		&mut self,
		data: &CollationData,
		base: &CollationData,
		c: u32,
		prefixes: &ContextTrie,
		base_prefixes: &ContextTrie,
		depth: usize,
	) -> Result<()> {
		let (mut i, mut j) = (0, 0);
		loop {
			let ours = prefixes.entries().get(i);
			let theirs = base_prefixes.entries().get(j);
			match (key(ours).cmp(key(theirs)), ours, theirs) {
				(Ordering::Less, Some(ours), _) => {
					self.add_prefix(data, &ours.context, c, ours.ce32)?;
					i += 1;
				}
				(Ordering::Greater, _, Some(theirs)) => {
					self.add_prefix(base, &theirs.context, c, theirs.ce32)?;
					j += 1;
				}
				(Ordering::Equal, Some(ours), Some(theirs)) => {
					self.set_prefix(&ours.context);
					self.compare(data, base, c, ours.ce32, theirs.ce32, depth + 1)?;
					self.unreversed_prefix.clear();
					i += 1;
					j += 1;
				}
				_ => return Ok(()),
			}
		}
	}

	/// Merges two suffix lists in context order.
	fn compare_contractions(
		&mut self,
		data: &CollationData,
		base: &CollationData,
		c: u32,
		suffixes: &ContextTrie,
		base_suffixes: &ContextTrie,
		depth: usize,
	) -> Result<()> {
		let (mut i, mut j) = (0, 0);
		loop {
			let ours = suffixes.entries().get(i);
			let theirs = base_suffixes.entries().get(j);
			match (key(ours).cmp(key(theirs)), ours, theirs) {
				(Ordering::Less, Some(ours), _) => {
					self.add_suffix(c, &ours.context);
					i += 1;
				}
				(Ordering::Greater, _, Some(theirs)) => {
					self.add_suffix(c, &theirs.context);
					j += 1;
				}
				(Ordering::Equal, Some(ours), Some(theirs)) => {
					self.suffix = Some(ours.context.clone());
					self.compare(data, base, c, ours.ce32, theirs.ce32, depth + 1)?;
					self.suffix = None;
					i += 1;
					j += 1;
				}
				_ => return Ok(()),
			}
		}
	}

	fn add_prefixes(&mut self, d: &CollationData, c: u32, prefixes: &ContextTrie) -> Result<()> {
		for entry in prefixes.entries() {
			self.add_prefix(d, &entry.context, c, entry.ce32)?;
		}
		Ok(())
	}

	fn add_prefix(&mut self, d: &CollationData, prefix: &[u32], c: u32, ce32: Ce32) -> Result<()> {
		self.set_prefix(prefix);
		let ce32 = d.final_ce32(ce32);
		if ce32.is_contraction() {
			let suffixes = context_of(d, ce32)?;
			self.add_contractions(c, suffixes);
		}
		self.tailored.add_string(&joined(&self.unreversed_prefix, c, None));
		self.unreversed_prefix.clear();
		Ok(())
	}

	fn add_contractions(&mut self, c: u32, suffixes: &ContextTrie) {
		for entry in suffixes.entries() {
			self.add_suffix(c, &entry.context);
		}
	}

	fn add_suffix(&mut self, c: u32, suffix: &[u32]) {
		self.tailored.add_string(&joined(&self.unreversed_prefix, c, Some(suffix)));
	}

	fn add(&mut self, c: u32) {
		if self.unreversed_prefix.is_empty() && self.suffix.is_none() {
			self.tailored.add(c);
		} else {
			self.tailored.add_string(&joined(&self.unreversed_prefix, c, self.suffix.as_deref()));
		}
	}

	/// Stores a prefix context, which is kept reversed, in text order.
	fn set_prefix(&mut self, reversed: &[u32]) {
		self.unreversed_prefix.clear();
		self.unreversed_prefix.extend(reversed.iter().rev());
	}
}

fn key(entry: Option<&ContextEntry>) -> &[u32] {
	entry.map_or(SENTINEL, |entry| entry.context.as_slice())
}

/// The mapping of the code point alone, [`NO_CE32`] if it has none.
fn contraction_default(d: &CollationData, ce32: Ce32, suffixes: &ContextTrie) -> Ce32 {
	if ce32.flags() & CONTRACT_SINGLE_CP_NO_MATCH != 0 {
		NO_CE32
	} else {
		d.final_ce32(suffixes.default_ce32())
	}
}
