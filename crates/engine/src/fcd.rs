//! UTF-16 iteration that normalizes non-FCD segments on the fly.
//!
//! Text is read in place while it passes the FCD check. When a boundary fails
//! the check, the surrounding segment is decomposed into a private buffer and
//! read from there; offsets keep referring to the raw text.

use colla_data::fcd;
use colla_primitives::utf16;

use crate::source::TextSource;

/// Which way the raw text has been checked from the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckDirection {
	/// Raw text before `pos` is unchecked and read backward with checks.
	Backward,
	/// `start..limit` is a checked segment, raw or normalized.
	Segment,
	/// Raw text from `pos` is unchecked and read forward with checks.
	Forward,
}

/// A [`TextSource`] that presents FCD text over arbitrary UTF-16 input.
#[derive(Debug, Clone)]
pub struct FcdUtf16Source<'t> {
	raw: &'t [u16],
	normalized: Vec<u16>,
	in_normalized: bool,
	check_dir: CheckDirection,
	segment_start: usize,
	segment_limit: usize,
	start: usize,
	pos: usize,
	limit: usize,
}

impl<'t> FcdUtf16Source<'t> {
	pub fn new(raw: &'t [u16]) -> Self {
		Self {
			raw,
			normalized: Vec::new(),
			in_normalized: false,
			check_dir: CheckDirection::Forward,
			segment_start: 0,
			segment_limit: 0,
			start: 0,
			pos: 0,
			limit: raw.len(),
		}
	}

	pub fn check_direction(&self) -> CheckDirection {
		self.check_dir
	}

	/// True while code points come from the normalization buffer.
	pub fn is_normalizing(&self) -> bool {
		self.in_normalized
	}

	fn text(&self) -> &[u16] {
		if self.in_normalized { &self.normalized } else { self.raw }
	}

	fn take_next(&mut self) -> Option<u32> {
		if self.pos >= self.limit {
			return None;
		}
		let (c, len) = utf16::decode_at(&self.text()[..self.limit], self.pos);
		self.pos += len;
		Some(c)
	}

	fn take_previous(&mut self) -> Option<u32> {
		if self.pos <= self.start {
			return None;
		}
		let start = self.start;
		let (c, len) = utf16::decode_before(&self.text()[start..], self.pos - start);
		self.pos -= len;
		Some(c)
	}

	fn switch_to_forward(&mut self) {
		if self.check_dir == CheckDirection::Backward {
			// Turn around inside the raw text.
			self.start = self.pos;
			self.segment_start = self.pos;
			if self.pos == self.segment_limit {
				self.limit = self.raw.len();
				self.check_dir = CheckDirection::Forward;
			} else {
				self.check_dir = CheckDirection::Segment;
			}
			return;
		}
		if self.in_normalized {
			self.pos = self.segment_limit;
			self.start = self.segment_limit;
			self.segment_start = self.segment_limit;
			self.in_normalized = false;
		}
		self.limit = self.raw.len();
		self.check_dir = CheckDirection::Forward;
	}

	fn switch_to_backward(&mut self) {
		if self.check_dir == CheckDirection::Forward {
			self.limit = self.pos;
			self.segment_limit = self.pos;
			if self.pos == self.segment_start {
				self.start = 0;
				self.check_dir = CheckDirection::Backward;
			} else {
				self.check_dir = CheckDirection::Segment;
			}
			return;
		}
		if self.in_normalized {
			self.pos = self.segment_start;
			self.limit = self.segment_start;
			self.segment_limit = self.segment_start;
			self.in_normalized = false;
		}
		self.start = 0;
		self.check_dir = CheckDirection::Backward;
	}

	/// Checks the raw segment starting at `pos` and either marks it as a
	/// passing segment or normalizes it.
	fn next_segment(&mut self) {
		let raw = self.raw;
		let mut p = self.pos;
		let mut prev_cc = 0u8;
		loop {
			let q = p;
			let (c, len) = utf16::decode_at(raw, p);
			p += len;
			let fcd16 = fcd::fcd16(c);
			let lead_cc = (fcd16 >> 8) as u8;
			if lead_cc == 0 && q != self.pos {
				self.limit = q;
				self.segment_limit = q;
				break;
			}
			if lead_cc != 0 && (prev_cc > lead_cc || fcd::is_tibetan_composite_vowel(fcd16)) {
				// Extend to the next boundary where lccc is 0.
				let mut end = p;
				while end < raw.len() {
					let (c, len) = utf16::decode_at(raw, end);
					if fcd::fcd16(c) <= 0xff {
						break;
					}
					end += len;
				}
				self.normalize(self.pos, end);
				self.pos = self.start;
				break;
			}
			prev_cc = fcd16 as u8;
			if p == raw.len() || prev_cc == 0 {
				self.limit = p;
				self.segment_limit = p;
				break;
			}
		}
		self.check_dir = CheckDirection::Segment;
	}

	fn previous_segment(&mut self) {
		let raw = self.raw;
		let mut p = self.pos;
		let mut next_cc = 0u8;
		loop {
			let q = p;
			let (c, len) = utf16::decode_before(raw, p);
			p -= len;
			let fcd16 = fcd::fcd16(c);
			let trail_cc = fcd16 as u8;
			if trail_cc == 0 && q != self.pos {
				self.start = q;
				self.segment_start = q;
				break;
			}
			if trail_cc != 0 && ((next_cc != 0 && trail_cc > next_cc) || fcd::is_tibetan_composite_vowel(fcd16)) {
				// Extend back past characters with nonzero fcd16 to an lccc of 0.
				let mut begin = p;
				let mut f = fcd16;
				while f > 0xff && p > 0 {
					let (c, len) = utf16::decode_before(raw, p);
					p -= len;
					f = fcd::fcd16(c);
					if f == 0 {
						break;
					}
					begin = p;
				}
				self.normalize(begin, self.pos);
				self.pos = self.limit;
				break;
			}
			next_cc = (fcd16 >> 8) as u8;
			if p == 0 || next_cc == 0 {
				self.start = p;
				self.segment_start = p;
				break;
			}
		}
		self.check_dir = CheckDirection::Segment;
	}

	fn normalize(&mut self, from: usize, to: usize) {
		self.normalized.clear();
		fcd::nfd_utf16(&self.raw[from..to], &mut self.normalized);
		tracing::trace!(from, to, normalized = self.normalized.len(), "normalized non-FCD segment");
		self.segment_start = from;
		self.segment_limit = to;
		self.start = 0;
		self.limit = self.normalized.len();
		self.in_normalized = true;
	}
}

impl TextSource for FcdUtf16Source<'_> {
	fn next_code_point(&mut self) -> Option<u32> {
		loop {
			match self.check_dir {
				CheckDirection::Forward => {
					if self.pos >= self.limit {
						return None;
					}
					let (c, len) = utf16::decode_at(self.raw, self.pos);
					let after = self.pos + len;
					let fcd16 = fcd::fcd16(c);
					if fcd16 & 0xff != 0
						&& (fcd::is_tibetan_composite_vowel(fcd16)
							|| (after < self.limit && fcd::lccc(utf16::decode_at(self.raw, after).0) != 0))
					{
						self.next_segment();
						return self.take_next();
					}
					self.pos = after;
					return Some(c);
				}
				CheckDirection::Segment if self.pos != self.limit => return self.take_next(),
				_ => self.switch_to_forward(),
			}
		}
	}

	fn previous_code_point(&mut self) -> Option<u32> {
		loop {
			match self.check_dir {
				CheckDirection::Backward => {
					if self.pos <= self.start {
						return None;
					}
					let (c, len) = utf16::decode_before(self.raw, self.pos);
					let before = self.pos - len;
					let fcd16 = fcd::fcd16(c);
					if fcd16 > 0xff
						&& (fcd::is_tibetan_composite_vowel(fcd16)
							|| (before > self.start && fcd::tccc(utf16::decode_before(self.raw, before).0) != 0))
					{
						self.previous_segment();
						return self.take_previous();
					}
					self.pos = before;
					return Some(c);
				}
				CheckDirection::Segment if self.pos != self.start => return self.take_previous(),
				_ => self.switch_to_backward(),
			}
		}
	}

	fn offset(&self) -> usize {
		if self.check_dir != CheckDirection::Segment || !self.in_normalized {
			self.pos
		} else if self.pos == self.start {
			self.segment_start
		} else {
			self.segment_limit
		}
	}

	fn reset_to_offset(&mut self, offset: usize) {
		let offset = offset.min(self.raw.len());
		self.in_normalized = false;
		self.start = offset;
		self.segment_start = offset;
		self.pos = offset;
		self.limit = self.raw.len();
		self.check_dir = CheckDirection::Forward;
	}
}

/// Two sources are at the same place when they check in the same direction
/// and sit at the same raw position, or at the same index of the same
/// normalized segment.
impl PartialEq for FcdUtf16Source<'_> {
	fn eq(&self, other: &Self) -> bool {
		if self.check_dir != other.check_dir {
			return false;
		}
		if self.check_dir == CheckDirection::Segment && self.in_normalized != other.in_normalized {
			return false;
		}
		if self.check_dir != CheckDirection::Segment || !self.in_normalized {
			self.pos == other.pos
		} else {
			self.segment_start == other.segment_start && self.pos - self.start == other.pos - other.start
		}
	}
}

#[cfg(test)]
mod tests {
	use colla_primitives::utf16;
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	use super::*;

	fn units(s: &str) -> Vec<u16> {
		s.encode_utf16().collect()
	}

	fn forward(text: &[u16]) -> Vec<u32> {
		let mut src = FcdUtf16Source::new(text);
		std::iter::from_fn(|| src.next_code_point()).collect()
	}

	fn backward(text: &[u16]) -> Vec<u32> {
		let mut src = FcdUtf16Source::new(text);
		src.reset_to_offset(text.len());
		let mut out: Vec<u32> = std::iter::from_fn(|| src.previous_code_point()).collect();
		out.reverse();
		out
	}

	#[test]
	fn fcd_text_is_read_in_place() {
		let text = units("a\u{e0}\u{301}b");
		let mut src = FcdUtf16Source::new(&text);
		let got: Vec<u32> = std::iter::from_fn(|| src.next_code_point()).collect();
		assert_eq!(got, vec![0x61, 0xe0, 0x301, 0x62]);
		assert!(!src.is_normalizing());
	}

	#[test]
	fn misordered_marks_are_reordered() {
		// acute (230) before cedilla (202)
		let text = units("a\u{301}\u{327}b");
		assert_eq!(forward(&text), vec![0x61, 0x327, 0x301, 0x62]);
		assert_eq!(backward(&text), vec![0x61, 0x327, 0x301, 0x62]);
	}

	#[test]
	fn precomposed_with_lower_mark_is_decomposed() {
		// U+00C0 has tccc 230; U+0327 has lccc 202
		let text = units("\u{c0}\u{327}x");
		assert_eq!(forward(&text), vec![0x41, 0x327, 0x300, 0x78]);
		assert_eq!(backward(&text), vec![0x41, 0x327, 0x300, 0x78]);
	}

	#[test]
	fn tibetan_composite_vowel_always_decomposes() {
		let text = units("\u{f40}\u{f73}");
		assert_eq!(forward(&text), vec![0xf40, 0xf71, 0xf72]);
		assert_eq!(backward(&text), vec![0xf40, 0xf71, 0xf72]);
	}

	#[test]
	fn direction_changes_inside_a_normalized_segment() {
		let text = units("a\u{301}\u{327}b");
		let mut src = FcdUtf16Source::new(&text);
		assert_eq!(src.next_code_point(), Some(0x61));
		assert_eq!(src.next_code_point(), Some(0x327));
		assert!(src.is_normalizing());
		assert_eq!(src.previous_code_point(), Some(0x327));
		assert_eq!(src.previous_code_point(), Some(0x61));
		assert_eq!(src.previous_code_point(), None);
		assert_eq!(src.next_code_point(), Some(0x61));
		assert_eq!(src.next_code_point(), Some(0x327));
		assert_eq!(src.next_code_point(), Some(0x301));
		assert_eq!(src.next_code_point(), Some(0x62));
		assert_eq!(src.next_code_point(), None);
	}

	#[test]
	fn offsets_inside_a_segment_map_to_its_raw_bounds() {
		let text = units("a\u{301}\u{327}b");
		let mut src = FcdUtf16Source::new(&text);
		src.forward_num_code_points(1);
		assert_eq!(src.offset(), 1);
		src.forward_num_code_points(1);
		assert!(src.is_normalizing());
		assert_eq!(src.offset(), 3);
		src.forward_num_code_points(1);
		assert_eq!(src.offset(), 3);
		src.forward_num_code_points(1);
		assert_eq!(src.offset(), 4);
	}

	#[test]
	fn equality_follows_position_and_direction() {
		let text = units("ab\u{301}\u{327}");
		let mut a = FcdUtf16Source::new(&text);
		let mut b = FcdUtf16Source::new(&text);
		assert_eq!(a, b);
		a.next_code_point();
		assert_ne!(a, b);
		b.next_code_point();
		assert_eq!(a, b);
		a.forward_num_code_points(2);
		b.forward_num_code_points(2);
		assert!(a.is_normalizing());
		assert_eq!(a, b);
		b.next_code_point();
		assert_ne!(a, b);
	}

	fn mixed_text() -> impl Strategy<Value = Vec<u16>> {
		let pieces = prop::sample::select(vec![
			"a", "e", "\u{c0}", "\u{e9}", "\u{300}", "\u{301}", "\u{327}", "\u{323}", "\u{f71}", "\u{f72}",
			"\u{f73}", "\u{1d15e}", "\u{1d165}", "\u{ac00}",
		]);
		prop::collection::vec(pieces, 0..12).prop_map(|v| v.concat().encode_utf16().collect())
	}

	fn is_fcd(cps: &[u32]) -> bool {
		cps.windows(2).all(|w| {
			let lead = fcd::lccc(w[1]);
			lead == 0 || fcd::tccc(w[0]) <= lead
		})
	}

	proptest! {
		#[test]
		fn output_is_fcd_and_stable(text in mixed_text()) {
			let once = forward(&text);
			prop_assert!(is_fcd(&once));
			let mut again = Vec::new();
			for &c in &once {
				utf16::push(&mut again, c);
			}
			prop_assert_eq!(forward(&again), once.clone());
			prop_assert_eq!(backward(&text), once);
		}

		#[test]
		fn offsets_round_trip_at_segment_starts(text in mixed_text(), steps in 0usize..16) {
			let mut src = FcdUtf16Source::new(&text);
			for _ in 0..steps {
				if src.next_code_point().is_none() {
					break;
				}
			}
			if !src.is_normalizing() || src.pos == src.start {
				let offset = src.offset();
				let expected = src.clone().next_code_point();
				let mut fresh = FcdUtf16Source::new(&text);
				fresh.reset_to_offset(offset);
				prop_assert_eq!(fresh.next_code_point(), expected);
			}
		}
	}
}
