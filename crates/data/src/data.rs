//! Immutable collation mapping tables.

use std::sync::Arc;

use colla_primitives::ce::{self, Ce};
use colla_primitives::ce32::{MAX_INDEX, Tag};
use colla_primitives::hangul::JAMO_CE32S_LENGTH;
use colla_primitives::{Ce32, CodePointSet, FALLBACK_CE32, UNASSIGNED_CE32};
use serde::Deserialize;

use crate::contexts::ContextTrie;
use crate::error::{DataError, Result};
use crate::fcd;
use crate::trie::Ce32Trie;

/// Primary lead byte for numeric collation when the provider gives none.
pub const DEFAULT_NUMERIC_PRIMARY: u32 = 0x1000_0000;

/// Side-table length addressable through a CE32 index.
const MAX_TABLE_LEN: usize = MAX_INDEX as usize + 1;

fn default_numeric_primary() -> u32 {
	DEFAULT_NUMERIC_PRIMARY
}

/// The pieces a data provider hands over to build a [`CollationData`].
#[derive(Debug, Clone, Deserialize)]
pub struct CollationDataParts {
	pub trie: Ce32Trie,
	/// Expansion CE32s; also holds the non-numeric CE32s of digits and, at
	/// index 0, the CE32 of U+0000.
	#[serde(default)]
	pub ce32s: Vec<Ce32>,
	/// Expansion CEs and offset-tag base data.
	#[serde(default)]
	pub ces: Vec<Ce>,
	#[serde(default)]
	pub contexts: Vec<ContextTrie>,
	/// CE32s of the 19 L, 21 V and 27 T jamo, relative to this table's side
	/// tables. May be empty when no Hangul-tagged CE32 occurs in the table.
	#[serde(default)]
	pub jamo_ce32s: Vec<Ce32>,
	#[serde(default = "default_numeric_primary")]
	pub numeric_primary: u32,
	/// Extra code points before which backward iteration cannot start.
	#[serde(default)]
	pub unsafe_backward: Vec<[u32; 2]>,
	#[serde(skip)]
	pub base: Option<Arc<CollationData>>,
}

impl CollationDataParts {
	/// Parts with only a trie; everything else empty.
	pub fn new(trie: Ce32Trie) -> Self {
		Self {
			trie,
			ce32s: Vec::new(),
			ces: Vec::new(),
			contexts: Vec::new(),
			jamo_ce32s: Vec::new(),
			numeric_primary: DEFAULT_NUMERIC_PRIMARY,
			unsafe_backward: Vec::new(),
			base: None,
		}
	}

	/// Chains the table to a base for fallback.
	pub fn with_base(mut self, base: Arc<CollationData>) -> Self {
		self.base = Some(base);
		self
	}
}

/// A validated mapping table, optionally chained to a base table.
///
/// Every special CE32 reachable from the trie, the context tries and the
/// side tables references in-range data, so lookups during iteration only
/// fail on logic errors.
#[derive(Debug)]
pub struct CollationData {
	trie: Ce32Trie,
	ce32s: Vec<Ce32>,
	ces: Vec<Ce>,
	contexts: Vec<ContextTrie>,
	jamo_ce32s: Box<[Ce32]>,
	numeric_primary: u32,
	unsafe_backward: CodePointSet,
	base: Option<Arc<CollationData>>,
}

impl CollationData {
	/// Validates and assembles a table.
	pub fn new(parts: CollationDataParts) -> Result<Self> {
		let CollationDataParts {
			trie,
			ce32s,
			ces,
			contexts,
			jamo_ce32s,
			numeric_primary,
			unsafe_backward,
			base,
		} = parts;

		let mut unsafe_set = CodePointSet::new();
		if let Some(base) = &base {
			if base.base.is_some() {
				tracing::error!("nested base collation data");
				return Err(DataError::NestedBase);
			}
			unsafe_set.add_all(&base.unsafe_backward);
		}
		for (table, len) in [("ce32s", ce32s.len()), ("ces", ces.len()), ("contexts", contexts.len())] {
			if len > MAX_TABLE_LEN {
				tracing::error!(table, len, "side table exceeds the CE32 index range");
				return Err(DataError::TableTooLarge {
					table,
					len,
					max: MAX_TABLE_LEN,
				});
			}
		}
		if !jamo_ce32s.is_empty() && jamo_ce32s.len() != JAMO_CE32S_LENGTH {
			return Err(DataError::JamoLength {
				expected: JAMO_CE32S_LENGTH,
				found: jamo_ce32s.len(),
			});
		}
		for [start, end] in unsafe_backward {
			if start <= end {
				unsafe_set.add_range(start, end);
			}
		}

		let data = Self {
			trie,
			ce32s,
			ces,
			contexts,
			jamo_ce32s: jamo_ce32s.into_boxed_slice(),
			numeric_primary: numeric_primary & 0xff00_0000,
			unsafe_backward: unsafe_set,
			base,
		};
		let data = data.validate()?;
		tracing::debug!(
			ranges = data.trie.ranges().count(),
			ce32s = data.ce32s.len(),
			ces = data.ces.len(),
			contexts = data.contexts.len(),
			has_base = data.base.is_some(),
			"collation data assembled"
		);
		Ok(data)
	}

	fn validate(mut self) -> Result<Self> {
		let mut suffix_chars = CodePointSet::new();
		for ce32 in self.trie.values() {
			self.check_ce32(ce32, &mut suffix_chars)?;
		}
		for &ce32 in &self.jamo_ce32s {
			self.check_ce32(ce32, &mut suffix_chars)?;
		}
		for &ce32 in &self.ce32s {
			self.check_ce32(ce32, &mut suffix_chars)?;
		}
		for trie in &self.contexts {
			self.check_ce32(trie.default_ce32(), &mut suffix_chars)?;
			for entry in trie.entries() {
				self.check_ce32(entry.ce32, &mut suffix_chars)?;
			}
		}
		self.unsafe_backward.add_all(&suffix_chars);
		Ok(self)
	}

	fn check_ce32(&self, ce32: Ce32, suffix_chars: &mut CodePointSet) -> Result<()> {
		let Some(tag) = ce32.special_tag() else {
			return Ok(());
		};
		match tag {
			Tag::Reserved3 | Tag::BuilderData | Tag::LeadSurrogate => {
				tracing::error!(?ce32, ?tag, "runtime-invalid tag in collation data");
				Err(DataError::InvalidTag { ce32, tag })
			}
			Tag::Fallback
			| Tag::LongPrimary
			| Tag::LongSecondary
			| Tag::LatinExpansion
			| Tag::Implicit => Ok(()),
			Tag::Hangul => {
				if self.jamo_ce32s.len() == JAMO_CE32S_LENGTH {
					Ok(())
				} else {
					Err(DataError::JamoLength {
						expected: JAMO_CE32S_LENGTH,
						found: self.jamo_ce32s.len(),
					})
				}
			}
			Tag::Expansion32 => {
				let entries = self.span(ce32, "ce32s", &self.ce32s, ce32.length())?;
				match entries.iter().find(|e| !e.is_simple_or_long()) {
					Some(&entry) => Err(DataError::ExpansionEntry { ce32, entry }),
					None => Ok(()),
				}
			}
			Tag::Expansion => self.span(ce32, "ces", &self.ces, ce32.length()).map(drop),
			Tag::Digit => self.span(ce32, "ce32s", &self.ce32s, 1).map(drop),
			Tag::Offset => self.span(ce32, "ces", &self.ces, 1).map(drop),
			Tag::U0000 => {
				if self.ce32s.is_empty() {
					Err(DataError::BadReference { ce32, table: "ce32s", index: 0, end: 1, len: 0 })
				} else {
					Ok(())
				}
			}
			Tag::Prefix => self.span(ce32, "contexts", &self.contexts, 1).map(drop),
			Tag::Contraction => {
				let tries = self.span(ce32, "contexts", &self.contexts, 1)?;
				for entry in tries.iter().flat_map(|t| t.entries()) {
					for &c in &entry.context {
						suffix_chars.add(c);
					}
				}
				Ok(())
			}
		}
	}

	fn span<'a, T>(&self, ce32: Ce32, table: &'static str, items: &'a [T], len: usize) -> Result<&'a [T]> {
		let index = ce32.index();
		items.get(index..index + len).ok_or_else(|| {
			tracing::error!(?ce32, table, index, len, "side-table reference out of range");
			DataError::BadReference {
				ce32,
				table,
				index,
				end: index + len,
				len: items.len(),
			}
		})
	}

	/// CE32 for `c` in this table only.
	#[inline]
	pub fn ce32(&self, c: u32) -> Ce32 {
		self.trie.get(c)
	}

	/// CE32 for `c`, following a fallback to the base once.
	///
	/// Returns the table the CE32 belongs to.
	pub fn ce32_with_fallback(&self, c: u32) -> (&CollationData, Ce32) {
		let ce32 = self.trie.get(c);
		match &self.base {
			Some(base) if ce32 == FALLBACK_CE32 => (base, base.trie.get(c)),
			_ => (self, ce32),
		}
	}

	pub fn base(&self) -> Option<&CollationData> {
		self.base.as_deref()
	}

	pub fn trie(&self) -> &Ce32Trie {
		&self.trie
	}

	pub fn ce32s(&self) -> &[Ce32] {
		&self.ce32s
	}

	pub fn ces(&self) -> &[Ce] {
		&self.ces
	}

	pub fn contexts(&self) -> &[ContextTrie] {
		&self.contexts
	}

	/// The context trie a prefix or contraction CE32 refers to.
	pub fn context(&self, ce32: Ce32) -> Option<&ContextTrie> {
		self.contexts.get(ce32.index())
	}

	/// The CE32s an expansion32 CE32 refers to.
	pub fn expansion_ce32s(&self, ce32: Ce32) -> Option<&[Ce32]> {
		self.ce32s.get(ce32.index()..ce32.index() + ce32.length())
	}

	/// The CEs an expansion CE32 refers to.
	pub fn expansion_ces(&self, ce32: Ce32) -> Option<&[Ce]> {
		self.ces.get(ce32.index()..ce32.index() + ce32.length())
	}

	pub fn jamo_ce32s(&self) -> &[Ce32] {
		&self.jamo_ce32s
	}

	pub fn numeric_primary(&self) -> u32 {
		self.numeric_primary
	}

	/// Digit check used for numeric backward iteration.
	pub fn is_digit(&self, c: u32) -> bool {
		if c < 0x660 {
			(0x30..=0x39).contains(&c)
		} else {
			self.ce32_with_fallback(c).1.has_tag(Tag::Digit)
		}
	}

	/// Backward iteration must not start right before `c`.
	///
	/// Covers characters with a nonzero leading combining class, contraction
	/// suffix characters, and digits under numeric collation.
	pub fn is_unsafe_backward(&self, c: u32, numeric: bool) -> bool {
		self.unsafe_backward.contains(c) || fcd::lccc(c) != 0 || (numeric && self.is_digit(c))
	}

	/// Resolves the indirections that do not depend on context.
	pub fn indirect_ce32(&self, ce32: Ce32) -> Ce32 {
		match ce32.special_tag() {
			Some(Tag::Digit) => self.ce32s.get(ce32.index()).copied().unwrap_or(UNASSIGNED_CE32),
			Some(Tag::LeadSurrogate) => UNASSIGNED_CE32,
			Some(Tag::U0000) => self.ce32s.first().copied().unwrap_or(UNASSIGNED_CE32),
			_ => ce32,
		}
	}

	/// [`CollationData::indirect_ce32`] for any CE32.
	#[inline]
	pub fn final_ce32(&self, ce32: Ce32) -> Ce32 {
		if ce32.is_special() { self.indirect_ce32(ce32) } else { ce32 }
	}

	/// Long-primary CE for `c` under an offset-tag CE32.
	pub fn ce_from_offset_ce32(&self, c: u32, ce32: Ce32) -> Option<Ce> {
		let data_ce = *self.ces.get(ce32.index())?;
		Some(ce::make_ce(ce::three_byte_primary_for_offset_data(c, data_ce)))
	}
}
