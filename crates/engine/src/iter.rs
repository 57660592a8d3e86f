//! The collation element iterator.
//!
//! [`CollationIterator`] turns the code points of a [`TextSource`] into
//! 64-bit collation elements by looking up each code point's CE32 and
//! dispatching on its tag. Contractions, prefixes and digit runs may read
//! ahead or behind in the text; the source is always left right after the
//! consumed input.

mod numeric;
mod skipped;

use colla_data::{CollationData, ContextCursor, ContextTrie, CursorState, fcd};
use colla_primitives::ce::{self, Ce, NO_CE};
use colla_primitives::ce32::{CONTRACT_NEXT_CCC, CONTRACT_SINGLE_CP_NO_MATCH, CONTRACT_TRAILING_CCC, HANGUL_NO_SPECIAL_JAMO};
use colla_primitives::{Ce32, FALLBACK_CE32, Tag, hangul};
use smallvec::SmallVec;

use self::skipped::SkippedState;
use crate::error::{CollationError, Result};
use crate::source::TextSource;

/// Buffered CEs; most code points produce only a few.
pub(crate) type CeBuffer = SmallVec<[Ce; 32]>;

/// Upper bound on tag hops while resolving one CE32.
pub const MAX_RESOLUTION_STEPS: usize = 16;

/// Logs a data-integrity violation on its way out.
pub(crate) fn integrity(err: CollationError) -> CollationError {
	tracing::error!(error = %err, "collation data integrity violation");
	err
}

/// Iterates the collation elements of text from a [`TextSource`].
#[derive(Debug)]
pub struct CollationIterator<'d, S> {
	data: &'d CollationData,
	source: S,
	ces: CeBuffer,
	ces_index: usize,
	skipped: Option<SkippedState>,
	/// Code points the forward pass may still read, `None` for no limit.
	num_cp_fwd: Option<usize>,
	numeric: bool,
}

impl<'d, S: TextSource> CollationIterator<'d, S> {
	pub fn new(data: &'d CollationData, source: S, numeric: bool) -> Self {
		Self {
			data,
			source,
			ces: CeBuffer::new(),
			ces_index: 0,
			skipped: None,
			num_cp_fwd: None,
			numeric,
		}
	}

	pub fn data(&self) -> &'d CollationData {
		self.data
	}

	pub fn source(&self) -> &S {
		&self.source
	}

	pub fn into_source(self) -> S {
		self.source
	}

	pub fn is_numeric(&self) -> bool {
		self.numeric
	}

	/// Drops buffered CEs and any contraction bookkeeping.
	pub fn reset(&mut self) {
		self.ces.clear();
		self.ces_index = 0;
		if let Some(skipped) = self.skipped.as_mut() {
			skipped.clear();
		}
	}

	pub fn offset(&self) -> usize {
		self.source.offset()
	}

	pub fn reset_to_offset(&mut self, offset: usize) {
		self.reset();
		self.source.reset_to_offset(offset);
	}

	/// Number of CEs buffered so far.
	pub fn ces_len(&self) -> usize {
		self.ces.len()
	}

	/// Clears the buffer once every buffered CE has been returned.
	pub fn clear_ces_if_none_remaining(&mut self) {
		if self.ces_index == self.ces.len() {
			self.reset();
		}
	}

	/// Returns the next CE, or [`NO_CE`] at the end of the text.
	pub fn next_ce(&mut self) -> Result<Ce> {
		while self.ces_index >= self.ces.len() {
			if !self.append_next()? {
				self.ces.push(NO_CE);
				break;
			}
		}
		let ce = self.ces[self.ces_index];
		self.ces_index += 1;
		Ok(ce)
	}

	/// Reads the rest of the text and returns all of its CEs.
	pub fn fetch_ces(&mut self) -> Result<&[Ce]> {
		while self.next_ce()? != NO_CE {
			self.ces_index = self.ces.len();
		}
		// The buffer ends with the NO_CE that stopped the loop.
		let len = self.ces.len().saturating_sub(1);
		Ok(&self.ces[..len])
	}

	/// Returns the previous CE, or [`NO_CE`] at the start of the text.
	///
	/// When one code point produces several CEs, `offsets` receives their
	/// text offsets, one more than there are CEs. Call
	/// [`CollationIterator::reset_to_offset`] before changing direction.
	pub fn previous_ce(&mut self, offsets: &mut Vec<usize>) -> Result<Ce> {
		loop {
			if let Some(ce) = self.ces.pop() {
				return Ok(ce);
			}
			offsets.clear();
			let limit = self.source.offset();
			let Some(c) = self.source.previous_code_point() else {
				return Ok(NO_CE);
			};
			if self.data.is_unsafe_backward(c, self.numeric) {
				return self.previous_ce_unsafe(offsets);
			}
			let (d, ce32) = self.data.ce32_with_fallback(c);
			if ce32.is_simple_or_long() {
				return Ok(ce32.to_ce());
			}
			self.append_ces_from_ce32(d, Some(c), ce32, false)?;
			if self.ces.len() > 1 {
				offsets.push(self.source.offset());
				while offsets.len() <= self.ces.len() {
					offsets.push(limit);
				}
			}
		}
	}

	/// Moves back to a safe boundary and iterates forward to the start
	/// offset, since the CEs before it depend on what follows.
	fn previous_ce_unsafe(&mut self, offsets: &mut Vec<usize>) -> Result<Ce> {
		let mut num_backward = 1;
		while let Some(c) = self.source.previous_code_point() {
			num_backward += 1;
			if !self.data.is_unsafe_backward(c, self.numeric) {
				break;
			}
		}
		tracing::trace!(num_backward, "backward iteration from unsafe boundary");
		self.num_cp_fwd = Some(num_backward);
		self.ces_index = 0;
		let mut offset = self.source.offset();
		while let Some(remaining) = self.num_cp_fwd.filter(|&n| n > 0) {
			self.num_cp_fwd = Some(remaining - 1);
			let before = self.ces.len();
			let more = self.append_next().inspect_err(|_| self.num_cp_fwd = None)?;
			if !more {
				break;
			}
			if self.ces.len() > before {
				offsets.push(offset);
				offset = self.source.offset();
				while offsets.len() < self.ces.len() {
					offsets.push(offset);
				}
			} else {
				offset = self.source.offset();
			}
		}
		offsets.push(offset);
		self.num_cp_fwd = None;
		self.source.backward_num_code_points(num_backward);
		self.ces_index = 0;
		match self.ces.pop() {
			Some(ce) => Ok(ce),
			None => self.previous_ce(offsets),
		}
	}

	/// Appends the CEs of the next code point, or of a longer match starting
	/// with it. Returns false at the end of the text.
	fn append_next(&mut self) -> Result<bool> {
		let Some((c, ce32)) = self.source.handle_next_ce32(self.data) else {
			return Ok(false);
		};
		let data = self.data;
		let (d, ce32) = if ce32 == FALLBACK_CE32 {
			match data.base() {
				Some(base) => (base, base.ce32(c)),
				None => return Err(integrity(CollationError::MissingBase { c: Some(c), ce32 })),
			}
		} else {
			(data, ce32)
		};
		if !ce32.is_special() || ce32.is_long_primary() {
			self.ces.push(ce32.to_ce());
		} else {
			self.append_ces_from_ce32(d, Some(c), ce32, true)?;
		}
		Ok(true)
	}

	/// Appends the CEs for `ce32` (the mapping of `c` in `d`).
	///
	/// `c` is `None` when the value does not belong to a single code point,
	/// such as a jamo of a Hangul syllable or a contraction result.
	fn append_ces_from_ce32(&mut self, d: &'d CollationData, c: Option<u32>, ce32: Ce32, forward: bool) -> Result<()> {
		let mut d = d;
		let mut c = c;
		let mut ce32 = ce32;
		let mut steps = 0;
		while let Some(tag) = ce32.special_tag() {
			steps += 1;
			if steps > MAX_RESOLUTION_STEPS {
				return Err(integrity(CollationError::ResolutionDepth {
					c,
					ce32,
					limit: MAX_RESOLUTION_STEPS,
				}));
			}
			match tag {
				Tag::Reserved3 | Tag::BuilderData | Tag::LeadSurrogate => {
					return Err(integrity(CollationError::Dispatch { c, ce32, tag }));
				}
				Tag::Fallback => match (c, d.base()) {
					(Some(cp), Some(base)) => {
						d = base;
						ce32 = base.ce32(cp);
					}
					_ => return Err(integrity(CollationError::MissingBase { c, ce32 })),
				},
				Tag::LongPrimary | Tag::LongSecondary => {
					self.ces.push(ce32.to_ce());
					return Ok(());
				}
				Tag::LatinExpansion => {
					self.ces.push(ce::latin_ce0_from_ce32(ce32.0));
					self.ces.push(ce::latin_ce1_from_ce32(ce32.0));
					return Ok(());
				}
				Tag::Expansion32 => {
					let items = d
						.expansion_ce32s(ce32)
						.ok_or_else(|| CollationError::out_of_range("ce32s", ce32.index(), ce32))?;
					self.ces.extend(items.iter().map(|item| item.to_ce()));
					return Ok(());
				}
				Tag::Expansion => {
					let items = d
						.expansion_ces(ce32)
						.ok_or_else(|| CollationError::out_of_range("ces", ce32.index(), ce32))?;
					self.ces.extend_from_slice(items);
					return Ok(());
				}
				Tag::Prefix => {
					if forward {
						self.source.backward_num_code_points(1);
					}
					ce32 = self.ce32_from_prefix(d, ce32)?;
					if forward {
						self.source.forward_num_code_points(1);
					}
				}
				Tag::Contraction => {
					let trie = context_trie(d, ce32)?;
					let default = trie.default_ce32();
					if !forward {
						ce32 = default;
						continue;
					}
					let fast = self.skipped.is_none() && self.num_cp_fwd.is_none();
					let next = if fast {
						self.source.next_code_point()
					} else {
						self.next_skipped_code_point()
					};
					let Some(next) = next else {
						ce32 = default;
						continue;
					};
					if ce32.flags() & CONTRACT_NEXT_CCC != 0 && fcd::lccc(next) == 0 {
						// No suffix can start with a starter.
						if fast {
							self.source.backward_num_code_points(1);
						} else {
							self.backward_num_skipped(1);
						}
						ce32 = default;
						continue;
					}
					match self.next_ce32_from_contraction(d, ce32, trie, default, next)? {
						Some(found) => ce32 = found,
						None => return Ok(()),
					}
				}
				Tag::Digit => {
					if self.numeric {
						self.append_numeric_ces(ce32, forward);
						return Ok(());
					}
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
					let Some(syllable) = c.filter(|&cp| hangul::is_hangul(cp)) else {
						return Err(integrity(CollationError::Dispatch { c, ce32, tag }));
					};
					let jamo = hangul::jamo_indexes(syllable);
					let table = d.jamo_ce32s();
					let get = move |index: usize| {
						table
							.get(index)
							.copied()
							.ok_or_else(|| CollationError::out_of_range("jamo_ce32s", index, ce32))
					};
					if ce32.flags() & HANGUL_NO_SPECIAL_JAMO != 0 {
						self.ces.push(get(jamo.l)?.to_ce());
						self.ces.push(get(jamo.v)?.to_ce());
						if let Some(t) = jamo.t {
							self.ces.push(get(t)?.to_ce());
						}
						return Ok(());
					}
					// Jamo may be contractions; resolve them without a code point.
					self.append_ces_from_ce32(d, None, get(jamo.l)?, forward)?;
					self.append_ces_from_ce32(d, None, get(jamo.v)?, forward)?;
					let Some(t) = jamo.t else {
						return Ok(());
					};
					ce32 = get(t)?;
					c = None;
				}
				Tag::Offset => {
					let Some(cp) = c else {
						return Err(integrity(CollationError::Dispatch { c, ce32, tag }));
					};
					let ce = d
						.ce_from_offset_ce32(cp, ce32)
						.ok_or_else(|| CollationError::out_of_range("ces", ce32.index(), ce32))?;
					self.ces.push(ce);
					return Ok(());
				}
				Tag::Implicit => {
					let Some(cp) = c else {
						return Err(integrity(CollationError::Dispatch { c, ce32, tag }));
					};
					self.ces.push(ce::unassigned_ce_from_code_point(cp));
					return Ok(());
				}
			}
		}
		self.ces.push(ce32.to_ce());
		Ok(())
	}

	/// Matches the longest prefix before the current code point.
	///
	/// Expects the source to be positioned before that code point and
	/// leaves it there.
	fn ce32_from_prefix(&mut self, d: &'d CollationData, ce32: Ce32) -> Result<Ce32> {
		let trie = context_trie(d, ce32)?;
		let mut result = trie.default_ce32();
		let mut cursor = trie.cursor();
		let mut look_behind = 0;
		while let Some(c) = self.source.previous_code_point() {
			look_behind += 1;
			let matched = cursor.next(c);
			if matched.has_value()
				&& let Some(value) = cursor.value()
			{
				result = value;
			}
			if !matched.has_next() {
				break;
			}
		}
		self.source.forward_num_code_points(look_behind);
		Ok(result)
	}

	fn next_skipped_code_point(&mut self) -> Option<u32> {
		if let Some(skipped) = self.skipped.as_mut()
			&& skipped.has_next()
		{
			return skipped.next();
		}
		if self.num_cp_fwd == Some(0) {
			return None;
		}
		let c = self.source.next_code_point()?;
		if let Some(skipped) = self.skipped.as_mut()
			&& !skipped.is_empty()
		{
			skipped.inc_beyond();
		}
		if let Some(n) = self.num_cp_fwd.as_mut() {
			*n -= 1;
		}
		Some(c)
	}

	fn backward_num_skipped(&mut self, n: usize) {
		let mut n = n;
		if let Some(skipped) = self.skipped.as_mut()
			&& !skipped.is_empty()
		{
			n = skipped.backward_num_code_points(n);
		}
		self.source.backward_num_code_points(n);
		if let Some(fwd) = self.num_cp_fwd.as_mut() {
			*fwd += n;
		}
	}

	fn save_skipped_state(&mut self, state: CursorState) {
		if let Some(skipped) = self.skipped.as_mut()
			&& !skipped.is_empty()
		{
			skipped.save_trie_state(state);
		}
	}

	/// Finds the longest contiguous suffix match after the contraction
	/// starter, falling back to a discontiguous match over combining marks.
	///
	/// Returns `None` when the CEs were already appended.
	fn next_ce32_from_contraction(
		&mut self,
		d: &'d CollationData,
		contraction_ce32: Ce32,
		trie: &'d ContextTrie,
		ce32: Ce32,
		c: u32,
	) -> Result<Option<Ce32>> {
		let mut ce32 = ce32;
		let mut c = c;
		// Code points read since the contraction starter.
		let mut look_ahead = 1;
		// Code points read since the last match.
		let mut since_match = 1;
		let mut suffixes = trie.cursor();
		self.save_skipped_state(suffixes.save());
		let mut matched = suffixes.next(c);
		loop {
			if matched.has_value() {
				if let Some(value) = suffixes.value() {
					ce32 = value;
				}
				if !matched.has_next() {
					return Ok(Some(ce32));
				}
				let Some(next) = self.next_skipped_code_point() else {
					return Ok(Some(ce32));
				};
				c = next;
				self.save_skipped_state(suffixes.save());
				since_match = 1;
			} else {
				let next = if matched.has_next() { self.next_skipped_code_point() } else { None };
				match next {
					Some(next) => {
						c = next;
						since_match += 1;
					}
					None => {
						let flags = contraction_ce32.flags();
						if flags & CONTRACT_TRAILING_CCC != 0
							&& (flags & CONTRACT_SINGLE_CP_NO_MATCH == 0 || since_match < look_ahead)
						{
							// Try a discontiguous match from the first unmatched code point.
							if since_match > 1 {
								self.backward_num_skipped(since_match);
								let Some(next) = self.next_skipped_code_point() else {
									return Ok(Some(ce32));
								};
								c = next;
								look_ahead -= since_match - 1;
								since_match = 1;
							}
							if fcd::fcd16(c) > 0xff {
								return self.next_ce32_from_discontiguous_contraction(d, suffixes, ce32, look_ahead, c);
							}
						}
						break;
					}
				}
			}
			look_ahead += 1;
			matched = suffixes.next(c);
		}
		self.backward_num_skipped(since_match);
		Ok(Some(ce32))
	}

	/// Extends a contraction match by skipping combining marks that are not
	/// blocked from the starter, as canonical closure requires.
	fn next_ce32_from_discontiguous_contraction(
		&mut self,
		d: &'d CollationData,
		suffixes: ContextCursor<'d>,
		ce32: Ce32,
		look_ahead: usize,
		c: u32,
	) -> Result<Option<Ce32>> {
		let mut suffixes = suffixes;
		let mut ce32 = ce32;
		let mut look_ahead = look_ahead;
		let mut c = c;

		// The trailing combining class of `c` must be less than the lccc of
		// the next code point for that one to be reachable.
		let mut fcd16 = fcd::fcd16(c);
		let Some(next) = self.next_skipped_code_point() else {
			self.backward_num_skipped(1);
			return Ok(Some(ce32));
		};
		look_ahead += 1;
		let mut prev_cc = fcd16 as u8;
		fcd16 = fcd::fcd16(next);
		if fcd16 <= 0xff {
			self.backward_num_skipped(2);
			return Ok(Some(ce32));
		}

		let is_top = self.skipped.as_ref().is_none_or(SkippedState::is_empty);
		if is_top {
			// Replay the text matched so far into a fresh cursor.
			self.skipped.get_or_insert_with(SkippedState::default);
			suffixes.reset();
			if look_ahead > 2 {
				self.source.backward_num_code_points(look_ahead);
				for _ in 2..look_ahead {
					if let Some(replayed) = self.source.next_code_point() {
						suffixes.next(replayed);
					}
				}
				// Step over `c` and the code point after it again.
				self.source.forward_num_code_points(2);
			}
			if let Some(skipped) = self.skipped.as_mut() {
				skipped.save_trie_state(suffixes.save());
			}
		} else if let Some(skipped) = self.skipped.as_ref() {
			suffixes.restore(skipped.trie_state());
		}
		let Some(skipped) = self.skipped.as_mut() else {
			return Ok(Some(ce32));
		};
		skipped.set_first_skipped(c);
		let mut since_match = 2;
		c = next;
		loop {
			let mut extended = false;
			if prev_cc < (fcd16 >> 8) as u8 {
				let matched = suffixes.next(c);
				if matched.has_value() {
					extended = true;
					if let Some(value) = suffixes.value() {
						ce32 = value;
					}
					since_match = 0;
					if let Some(skipped) = self.skipped.as_mut() {
						skipped.record_match();
						if matched.has_next() {
							skipped.save_trie_state(suffixes.save());
						}
					}
					if !matched.has_next() {
						break;
					}
				}
			}
			if !extended {
				if let Some(skipped) = self.skipped.as_mut() {
					skipped.skip(c);
					suffixes.restore(skipped.trie_state());
				}
				prev_cc = fcd16 as u8;
			}
			let Some(next) = self.next_skipped_code_point() else {
				break;
			};
			c = next;
			since_match += 1;
			fcd16 = fcd::fcd16(c);
			if fcd16 <= 0xff {
				break;
			}
		}
		self.backward_num_skipped(since_match);

		let Some(skipped) = self.skipped.as_mut() else {
			return Ok(Some(ce32));
		};
		skipped.replace_match();
		if is_top && !skipped.is_empty() {
			// Emit the match, then the skipped code points, which may start
			// contractions of their own.
			let data = self.data;
			let mut d = d;
			let mut c = None;
			loop {
				self.append_ces_from_ce32(d, c, ce32, true)?;
				let Some(next) = self.skipped.as_mut().and_then(SkippedState::next) else {
					break;
				};
				c = Some(next);
				(d, ce32) = data.ce32_with_fallback(next);
			}
			if let Some(skipped) = self.skipped.as_mut() {
				skipped.clear();
			}
			return Ok(None);
		}
		Ok(Some(ce32))
	}

	fn append_numeric_ces(&mut self, ce32: Ce32, forward: bool) {
		let data = self.data;
		let mut digits: SmallVec<[u8; 64]> = SmallVec::new();
		let mut ce32 = ce32;
		if forward {
			loop {
				digits.push(ce32.digit_value());
				if self.num_cp_fwd == Some(0) {
					break;
				}
				let Some(c) = self.source.next_code_point() else {
					break;
				};
				ce32 = data.ce32_with_fallback(c).1;
				if !ce32.has_tag(Tag::Digit) {
					self.source.backward_num_code_points(1);
					break;
				}
				if let Some(n) = self.num_cp_fwd.as_mut() {
					*n -= 1;
				}
			}
		} else {
			loop {
				digits.push(ce32.digit_value());
				let Some(c) = self.source.previous_code_point() else {
					break;
				};
				ce32 = data.ce32_with_fallback(c).1;
				if !ce32.has_tag(Tag::Digit) {
					self.source.forward_num_code_points(1);
					break;
				}
			}
			digits.reverse();
		}
		numeric::append_digit_run(&digits, data.numeric_primary(), &mut self.ces);
	}

	/// The CEs for one mapping value, bypassing the text.
	///
	/// Only meaningful for values that do not consult the text, such as
	/// Hangul syllables with self-contained jamo.
	pub(crate) fn ces_for_ce32(&mut self, d: &'d CollationData, c: u32, ce32: Ce32) -> Result<&[Ce]> {
		self.reset();
		self.append_ces_from_ce32(d, Some(c), ce32, true)?;
		Ok(&self.ces)
	}
}

fn context_trie(d: &CollationData, ce32: Ce32) -> Result<&ContextTrie> {
	d.context(ce32)
		.ok_or_else(|| integrity(CollationError::out_of_range("contexts", ce32.index(), ce32)))
}

#[cfg(test)]
mod tests;
