//! Small mapping tables shared by the tests.
//!
//! The root maps Latin letters to simple CE32s with primaries 0x20..0x39,
//! a few combining marks to long secondaries and exercises most tags:
//! `ch` and `a` + acute contract, `x` after `y` has a prefix mapping, `é`
//! expands, `à` is a Latin expansion, digits, U+0000, Hangul syllables,
//! and CJK ideographs use offset data. Everything else is implicit.

use std::sync::Arc;

use colla_data::{
	Ce32TrieBuilder, CollationData, CollationDataParts, CollationSettings, ContextEntry, ContextTrie, Tailoring,
};
use colla_primitives::ce::Ce;
use colla_primitives::ce32::{CONTRACT_NEXT_CCC, CONTRACT_TRAILING_CCC, HANGUL_NO_SPECIAL_JAMO};
use colla_primitives::hangul::{HANGUL_BASE, HANGUL_END, JAMO_CE32S_LENGTH};
use colla_primitives::{Ce32, FALLBACK_CE32, Tag, UNASSIGNED_CE32};

use crate::iter::CollationIterator;
use crate::utf16::Utf16Source;

pub const GRAVE: Ce32 = Ce32::long_secondary(0x8800_0500);
pub const ACUTE: Ce32 = Ce32::long_secondary(0x8a00_0500);
pub const DOT_BELOW: Ce32 = Ce32::long_secondary(0x8c00_0500);
pub const CEDILLA: Ce32 = Ce32::long_secondary(0x9000_0500);

/// Primary of `ch`, between `h` and `i`.
pub const CH: Ce32 = Ce32::simple(0x2780, 0x05, 0x05);
/// Primary of `a` + acute, between `a` and `b`.
pub const A_ACUTE: Ce32 = Ce32::simple(0x2080, 0x05, 0x05);
/// `x` after `y`.
pub const X_AFTER_Y: Ce32 = Ce32::simple(0x3f00, 0x05, 0x05);

pub const OFFSET_DATA_CE: Ce = (0x7b02_0200u64 << 32) | (0x4e00 << 8) | 1;

const CONTRACTION_CH: u32 = 0;
const CONTRACTION_A: u32 = 1;
const PREFIX_X: u32 = 2;

pub fn units(s: &str) -> Vec<u16> {
	s.encode_utf16().collect()
}

pub fn simple(primary: u16) -> Ce32 {
	Ce32::simple(primary, 0x05, 0x05)
}

/// CE32 of a lowercase ASCII letter.
pub fn letter(c: char) -> Ce32 {
	simple(0x2000 + ((c as u16 - 'a' as u16) << 8))
}

pub fn digit_ce32(d: u8) -> Ce32 {
	simple(0x1100 + (u16::from(d) << 8))
}

pub fn jamo_ce32(index: usize) -> Ce32 {
	simple(0x6000 + ((index as u16) << 8))
}

fn jamo_code_points() -> impl Iterator<Item = u32> {
	(0x1100..=0x1112).chain(0x1161..=0x1175).chain(0x11a8..=0x11c2)
}

pub fn root_parts() -> CollationDataParts {
	let mut builder = Ce32TrieBuilder::new(UNASSIGNED_CE32);
	builder.set(0, Ce32::from_tag_and_index(Tag::U0000, 0));
	for c in 'a'..='z' {
		builder.set(c as u32, letter(c));
		let upper = letter(c).0 & 0xffff_ff00 | 0x8f;
		builder.set(c.to_ascii_uppercase() as u32, Ce32(upper));
	}
	for d in 0..10u8 {
		builder.set(0x30 + u32::from(d), Ce32::digit(1 + u32::from(d), d));
	}
	builder.set(0x300, GRAVE);
	builder.set(0x301, ACUTE);
	builder.set(0x323, DOT_BELOW);
	builder.set(0x327, CEDILLA);
	builder.set(0xe0, Ce32::latin_expansion(0x20, 0x05, 0x88));
	builder.set(0xe9, Ce32::from_tag_index_and_length(Tag::Expansion32, 11, 2));
	builder.set('c' as u32, Ce32::from_tag_index_and_length(Tag::Contraction, CONTRACTION_CH, 0));
	builder.set(
		'a' as u32,
		Ce32::from_tag_index_and_length(
			Tag::Contraction,
			CONTRACTION_A,
			(CONTRACT_NEXT_CCC | CONTRACT_TRAILING_CCC) >> 8,
		),
	);
	builder.set('x' as u32, Ce32::from_tag_and_index(Tag::Prefix, PREFIX_X));
	for (index, c) in jamo_code_points().enumerate() {
		builder.set(c, jamo_ce32(index));
	}
	builder.set_range(
		HANGUL_BASE,
		HANGUL_END,
		Ce32::from_tag_index_and_length(Tag::Hangul, 0, HANGUL_NO_SPECIAL_JAMO >> 8),
	);
	builder.set_range(0x4e00, 0x9fff, Ce32::from_tag_and_index(Tag::Offset, 0));

	let mut parts = CollationDataParts::new(builder.build());
	parts.ce32s = vec![Ce32(0)];
	parts.ce32s.extend((0..10).map(digit_ce32));
	parts.ce32s.extend([letter('e'), ACUTE]);
	parts.ces = vec![OFFSET_DATA_CE];
	parts.contexts = vec![
		ContextTrie::new(letter('c'), vec![ContextEntry { context: vec!['h' as u32], ce32: CH }])
			.expect("valid contraction"),
		ContextTrie::new(letter('a'), vec![ContextEntry { context: vec![0x301], ce32: A_ACUTE }])
			.expect("valid contraction"),
		ContextTrie::new(letter('x'), vec![ContextEntry { context: vec!['y' as u32], ce32: X_AFTER_Y }])
			.expect("valid prefix"),
	];
	parts.jamo_ce32s = (0..JAMO_CE32S_LENGTH).map(jamo_ce32).collect();
	parts
}

pub fn root_data() -> Arc<CollationData> {
	Arc::new(CollationData::new(root_parts()).expect("valid root"))
}

pub fn root_tailoring() -> Tailoring {
	Tailoring::new(root_data(), CollationSettings::default())
}

/// A tailoring of [`root_data`]:
///
/// * `b` gets a new primary and `c` loses its `ch` contraction,
/// * `d` and U+4E00 are mapped to exactly what the root produces,
/// * U+1100 gets a new primary, so Hangul syllables starting with it change,
/// * U+4E01 gets a new primary,
/// * `x` keeps its prefix after `y` and gains one after `z`.
pub fn tailored_data(root: Arc<CollationData>) -> CollationData {
	let mut builder = Ce32TrieBuilder::new(FALLBACK_CE32);
	builder.set('b' as u32, simple(0x2180));
	builder.set('c' as u32, letter('c'));
	builder.set('d' as u32, letter('d'));
	builder.set(0x1100, simple(0x5000));
	builder.set_range(
		HANGUL_BASE,
		HANGUL_END,
		Ce32::from_tag_index_and_length(Tag::Hangul, 0, HANGUL_NO_SPECIAL_JAMO >> 8),
	);
	builder.set(0x4e00, Ce32::long_primary(0x7b02_0200));
	builder.set(0x4e01, Ce32::long_primary(0x7c02_0200));
	builder.set('x' as u32, Ce32::from_tag_and_index(Tag::Prefix, 0));

	let mut parts = CollationDataParts::new(builder.build()).with_base(root);
	parts.contexts = vec![
		ContextTrie::new(
			letter('x'),
			vec![
				ContextEntry { context: vec!['y' as u32], ce32: X_AFTER_Y },
				ContextEntry { context: vec!['z' as u32], ce32: simple(0x3f80) },
			],
		)
		.expect("valid prefix"),
	];
	let mut jamo: Vec<Ce32> = (0..JAMO_CE32S_LENGTH).map(jamo_ce32).collect();
	jamo[0] = simple(0x5000);
	parts.jamo_ce32s = jamo;
	CollationData::new(parts).expect("valid tailoring")
}

/// All CEs of `text` read directly, without normalization.
pub fn ces(data: &CollationData, text: &str, numeric: bool) -> Vec<Ce> {
	let text = units(text);
	let mut iter = CollationIterator::new(data, Utf16Source::new(&text), numeric);
	iter.fetch_ces().expect("valid data").to_vec()
}
