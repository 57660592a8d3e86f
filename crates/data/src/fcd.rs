//! Canonical combining class and FCD helpers.
//!
//! `fcd16(c)` packs the combining class of the first character of `c`'s
//! canonical decomposition (lccc) into the high byte and that of the last
//! character (tccc) into the low byte. Text is FCD when, at every boundary,
//! the tccc before it is not greater than a nonzero lccc after it.

use colla_primitives::utf16;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::{canonical_combining_class, decompose_canonical};

/// Below this code point nothing decomposes and nothing combines.
const MIN_DECOMP_NO_CP: u32 = 0xc0;
/// Below this code point every lccc is zero.
const MIN_LCCC_CP: u32 = 0x300;

/// Canonical combining class of `c`; zero for surrogates and non-characters.
#[inline]
pub fn ccc(c: u32) -> u8 {
	char::from_u32(c).map_or(0, canonical_combining_class)
}

/// Returns `(lccc << 8) | tccc` for `c`.
pub fn fcd16(c: u32) -> u16 {
	if c < MIN_DECOMP_NO_CP {
		return 0;
	}
	let Some(ch) = char::from_u32(c) else {
		return 0;
	};
	let mut lead: Option<u8> = None;
	let mut trail = 0u8;
	decompose_canonical(ch, |d| {
		let cc = canonical_combining_class(d);
		lead.get_or_insert(cc);
		trail = cc;
	});
	(u16::from(lead.unwrap_or(0)) << 8) | u16::from(trail)
}

/// Leading combining class of `c`'s decomposition.
#[inline]
pub fn lccc(c: u32) -> u8 {
	if c < MIN_LCCC_CP { 0 } else { (fcd16(c) >> 8) as u8 }
}

/// Trailing combining class of `c`'s decomposition.
#[inline]
pub fn tccc(c: u32) -> u8 {
	fcd16(c) as u8
}

/// U+0F73, U+0F75 and U+0F81 decompose to marks whose order the FCD check
/// alone does not catch; they always force normalization.
#[inline]
pub fn is_tibetan_composite_vowel(fcd16: u16) -> bool {
	fcd16 == 0x8182 || fcd16 == 0x8184
}

/// Appends the NFD of a UTF-16 span to `out`.
///
/// Unpaired surrogates are copied through and split the span into
/// independently normalized runs.
pub fn nfd_utf16(span: &[u16], out: &mut Vec<u16>) {
	let mut run: Vec<char> = Vec::new();
	for c in utf16::code_points(span) {
		match char::from_u32(c) {
			Some(ch) => run.push(ch),
			None => {
				flush_nfd(&mut run, out);
				utf16::push(out, c);
			}
		}
	}
	flush_nfd(&mut run, out);
}

fn flush_nfd(run: &mut Vec<char>, out: &mut Vec<u16>) {
	for ch in run.drain(..).nfd() {
		utf16::push(out, u32::from(ch));
	}
}

/// Returns the length of the longest prefix of `text` that is already NFD and
/// ends right after a starter, so that `text[limit..]` can be normalized on
/// its own and appended.
pub fn nfd_quick_check_limit(text: &[u16]) -> usize {
	let mut boundary = 0;
	let mut prev_cc = 0u8;
	let mut i = 0;
	while i < text.len() {
		let (c, len) = utf16::decode_at(text, i);
		i += len;
		let Some(ch) = char::from_u32(c) else {
			boundary = i;
			prev_cc = 0;
			continue;
		};
		let mut decomposes = false;
		decompose_canonical(ch, |d| decomposes |= d != ch);
		let cc = canonical_combining_class(ch);
		if decomposes || (cc != 0 && cc < prev_cc) {
			return boundary;
		}
		prev_cc = cc;
		if cc == 0 {
			boundary = i;
		}
	}
	text.len()
}
