use colla_data::CollationData;
use colla_primitives::ce32::CONTRACT_SINGLE_CP_NO_MATCH;
use colla_primitives::{Ce32, CodePointSet, FALLBACK_CE32, Tag, ce, hangul};

use super::{CeSink, context_of, joined};
use crate::error::{CollationError, Result};
use crate::iter::{CeBuffer, CollationIterator, MAX_RESOLUTION_STEPS, integrity};
use crate::utf16::Utf16Source;

/// Which set a string is added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
	Contractions,
	Expansions,
}

/// How ranges of the table being walked relate to the tailored set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckTailored {
	/// No base; visit everything.
	Off,
	/// Walking a tailoring: record its non-fallback ranges.
	Collect,
	/// Walking the base: skip what the tailoring already covered.
	Exclude,
}

/// Collects contractions and expansions of a table and, for a tailoring,
/// of the parts of its base it does not override.
///
/// Contractions are the strings that match as a unit: a code point with
/// a suffix, or with a prefix when `add_prefixes` is set. Expansions are
/// the code points (or prefixed strings) that produce more than one CE.
/// A [`CeSink`] additionally receives the CEs of every visited mapping.
pub struct ContractionsAndExpansions<'s> {
	contractions: Option<&'s mut CodePointSet>,
	expansions: Option<&'s mut CodePointSet>,
	sink: Option<&'s mut dyn CeSink>,
	add_prefixes: bool,
	check: CheckTailored,
	tailored: CodePointSet,
	unreversed_prefix: Vec<u32>,
	suffix: Option<Vec<u32>>,
}

impl<'s> ContractionsAndExpansions<'s> {
	pub fn new(
		contractions: Option<&'s mut CodePointSet>,
		expansions: Option<&'s mut CodePointSet>,
		sink: Option<&'s mut dyn CeSink>,
		add_prefixes: bool,
	) -> Self {
		Self {
			contractions,
			expansions,
			sink,
			add_prefixes,
			check: CheckTailored::Off,
			tailored: CodePointSet::new(),
			unreversed_prefix: Vec::new(),
			suffix: None,
		}
	}

	/// Walks `data` and then the parts of its base it leaves untouched.
	pub fn for_data(&mut self, data: &CollationData) -> Result<()> {
		let base = data.base();
		if base.is_some() {
			self.check = CheckTailored::Collect;
		}
		self.walk(data)?;
		let Some(base) = base else {
			return Ok(());
		};
		self.check = CheckTailored::Exclude;
		self.walk(base)?;
		self.check = CheckTailored::Off;
		Ok(())
	}

	/// Visits the mapping of a single code point.
	pub fn for_code_point(&mut self, data: &CollationData, c: u32) -> Result<()> {
		let (d, ce32) = data.ce32_with_fallback(c);
		self.handle_ce32(d, c, c, ce32, 0).map_err(|err| err.during_analysis(c))
	}

	fn walk(&mut self, d: &CollationData) -> Result<()> {
		tracing::debug!(check = ?self.check, ranges = d.trie().ranges().count(), "contraction and expansion pass");
		for range in d.trie().ranges() {
			self.handle_range(d, range.start, range.end, range.value)
				.map_err(|err| err.during_analysis(range.start))?;
		}
		tracing::debug!(tailored = self.tailored.len(), "contraction and expansion pass done");
		Ok(())
	}

	fn handle_range(&mut self, d: &CollationData, start: u32, end: u32, ce32: Ce32) -> Result<()> {
		match self.check {
			CheckTailored::Off => {}
			CheckTailored::Collect => {
				if ce32 == FALLBACK_CE32 {
					return Ok(());
				}
				self.tailored.add_range(start, end);
			}
			CheckTailored::Exclude => {
				if start == end {
					if self.tailored.contains(start) {
						return Ok(());
					}
				} else if self.tailored.contains_some(start, end) {
					for rest in self.tailored.ranges_excluding(start, end) {
						self.handle_ce32(d, *rest.start(), *rest.end(), ce32, 0)?;
					}
					return Ok(());
				}
			}
		}
		self.handle_ce32(d, start, end, ce32, 0)
	}

	fn handle_ce32(
		&mut self,
		d: &CollationData,
		start: u32,
		end: u32,
		ce32: Ce32,
		depth: usize,
	) -> Result<()> {
		let mut ce32 = ce32;
		for _ in depth..MAX_RESOLUTION_STEPS {
			let Some(tag) = ce32.special_tag() else {
				if let Some(sink) = self.sink.as_deref_mut() {
					sink.handle_ce(ce32.to_ce());
				}
				return Ok(());
			};
			match tag {
				Tag::Fallback | Tag::Offset | Tag::Implicit => return Ok(()),
				Tag::Reserved3 | Tag::BuilderData | Tag::LeadSurrogate => {
					return Err(integrity(CollationError::Dispatch {
						c: Some(start),
						ce32,
						tag,
					}));
				}
				Tag::LongPrimary | Tag::LongSecondary => {
					if let Some(sink) = self.sink.as_deref_mut() {
						sink.handle_ce(ce32.to_ce());
					}
					return Ok(());
				}
				Tag::LatinExpansion => {
					if let Some(sink) = self.sink.as_deref_mut() {
						sink.handle_expansion(&[ce::latin_ce0_from_ce32(ce32.0), ce::latin_ce1_from_ce32(ce32.0)]);
					}
					if self.unreversed_prefix.is_empty() {
						self.add_expansions(start, end);
					}
					return Ok(());
				}
				Tag::Expansion32 => {
					let items = d
						.expansion_ce32s(ce32)
						.ok_or_else(|| CollationError::out_of_range("ce32s", ce32.index(), ce32))?;
					if let Some(sink) = self.sink.as_deref_mut() {
						let ces: CeBuffer = items.iter().map(|item| item.to_ce()).collect();
						sink.handle_expansion(&ces);
					}
					if self.unreversed_prefix.is_empty() {
						self.add_expansions(start, end);
					}
					return Ok(());
				}
				Tag::Expansion => {
					let items = d
						.expansion_ces(ce32)
						.ok_or_else(|| CollationError::out_of_range("ces", ce32.index(), ce32))?;
					if let Some(sink) = self.sink.as_deref_mut() {
						sink.handle_expansion(items);
					}
					if self.unreversed_prefix.is_empty() {
						self.add_expansions(start, end);
					}
					return Ok(());
				}
				Tag::Prefix => return self.handle_prefixes(d, start, end, ce32, depth + 1),
				Tag::Contraction => return self.handle_contractions(d, start, end, ce32, depth + 1),
				Tag::Digit => {
					ce32 = *d
						.ce32s()
						.get(ce32.index())
						.ok_or_else(|| CollationError::out_of_range("ce32s", ce32.index(), ce32))?;
				}
				Tag::U0000 => {
					ce32 = *d
						.ce32s()
						.first()
						.ok_or_else(|| CollationError::out_of_range("ce32s", 0, ce32))?;
				}
				Tag::Hangul => {
					if !hangul::is_hangul(start) || !hangul::is_hangul(end) {
						return Err(integrity(CollationError::Dispatch {
							c: Some(start),
							ce32,
							tag,
						}));
					}
					if let Some(sink) = self.sink.as_deref_mut() {
						let mut iter = CollationIterator::new(d, Utf16Source::new(&[]), false);
						for c in start..=end {
							sink.handle_expansion(iter.ces_for_ce32(d, c, ce32)?);
						}
					}
					// With a prefix, the strings were added by the caller.
					if self.unreversed_prefix.is_empty() {
						self.add_expansions(start, end);
					}
					return Ok(());
				}
			}
		}
		Err(CollationError::ResolutionDepth {
			c: Some(start),
			ce32,
			limit: MAX_RESOLUTION_STEPS,
		})
	}

	fn handle_prefixes(
		&mut self,
		d: &CollationData,
		start: u32,
		end: u32,
		ce32: Ce32,
		depth: usize,
	) -> Result<()> {
		let trie = context_of(d, ce32)?;
		self.handle_ce32(d, start, end, trie.default_ce32(), depth)?;
		if !self.add_prefixes {
			return Ok(());
		}
		for entry in trie.entries() {
			self.unreversed_prefix.clear();
			self.unreversed_prefix.extend(entry.context.iter().rev());
			self.add_strings(start, end, Target::Contractions);
			self.add_strings(start, end, Target::Expansions);
			self.handle_ce32(d, start, end, entry.ce32, depth)?;
		}
		self.unreversed_prefix.clear();
		Ok(())
	}

	fn handle_contractions(
		&mut self,
		d: &CollationData,
		start: u32,
		end: u32,
		ce32: Ce32,
		depth: usize,
	) -> Result<()> {
		let trie = context_of(d, ce32)?;
		// Under a prefix, a default without a single-code-point match only
		// falls back to the shorter prefix, which is visited separately.
		if ce32.flags() & CONTRACT_SINGLE_CP_NO_MATCH == 0 {
			self.handle_ce32(d, start, end, trie.default_ce32(), depth)?;
		}
		for entry in trie.entries() {
			self.suffix = Some(entry.context.clone());
			self.add_strings(start, end, Target::Contractions);
			if !self.unreversed_prefix.is_empty() {
				self.add_strings(start, end, Target::Expansions);
			}
			self.handle_ce32(d, start, end, entry.ce32, depth)?;
		}
		self.suffix = None;
		Ok(())
	}

	fn add_expansions(&mut self, start: u32, end: u32) {
		if self.unreversed_prefix.is_empty() && self.suffix.is_none() {
			if let Some(expansions) = self.expansions.as_deref_mut() {
				expansions.add_range(start, end);
			}
		} else {
			self.add_strings(start, end, Target::Expansions);
		}
	}

	fn add_strings(&mut self, start: u32, end: u32, target: Target) {
		let set = match target {
			Target::Contractions => self.contractions.as_deref_mut(),
			Target::Expansions => self.expansions.as_deref_mut(),
		};
		let Some(set) = set else {
			return;
		};
		for c in start..=end {
			set.add_string(&joined(&self.unreversed_prefix, c, self.suffix.as_deref()));
		}
	}
}

impl std::fmt::Debug for ContractionsAndExpansions<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ContractionsAndExpansions")
			.field("add_prefixes", &self.add_prefixes)
			.field("check", &self.check)
			.field("has_sink", &self.sink.is_some())
			.field("tailored", &self.tailored.len())
			.finish_non_exhaustive()
	}
}
