//! Tests for CE32 dispatch and iteration in both directions.

use std::sync::Arc;

use colla_data::{Ce32TrieBuilder, CollationDataParts, ContextEntry};
use colla_primitives::UNASSIGNED_CE32;
use colla_primitives::ce::{make_ce, unassigned_ce_from_code_point};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

use super::*;
use crate::fixtures::*;
use crate::utf16::Utf16Source;

#[fixture]
fn root() -> Arc<CollationData> {
	root_data()
}

fn ce(ce32: Ce32) -> Ce {
	ce32.to_ce()
}

fn letters(s: &str) -> Vec<Ce> {
	s.chars().map(|c| ce(letter(c))).collect()
}

#[rstest]
fn plain_letters(root: Arc<CollationData>) {
	assert_eq!(ces(&root, "abc", false), letters("abc"));
	assert_eq!(ces(&root, "", false), Vec::<Ce>::new());
}

#[rstest]
#[case("chip", vec![ce(CH), ce(letter('i')), ce(letter('p'))])]
#[case("cx", vec![ce(letter('c')), ce(letter('x'))])]
#[case("c", vec![ce(letter('c'))])]
#[case("hc", vec![ce(letter('h')), ce(letter('c'))])]
fn contiguous_contraction(root: Arc<CollationData>, #[case] text: &str, #[case] expected: Vec<Ce>) {
	assert_eq!(ces(&root, text, false), expected);
}

#[rstest]
#[case("a\u{301}", vec![ce(A_ACUTE)])]
#[case("a\u{301}\u{301}", vec![ce(A_ACUTE), ce(ACUTE)])]
#[case("a\u{327}\u{301}", vec![ce(A_ACUTE), ce(CEDILLA)])]
#[case("a\u{327}\u{323}\u{301}b", vec![ce(A_ACUTE), ce(CEDILLA), ce(DOT_BELOW), ce(letter('b'))])]
#[case("a\u{300}\u{301}", vec![ce(letter('a')), ce(GRAVE), ce(ACUTE)])]
#[case("a\u{327}", vec![ce(letter('a')), ce(CEDILLA)])]
fn contraction_over_combining_marks(root: Arc<CollationData>, #[case] text: &str, #[case] expected: Vec<Ce>) {
	assert_eq!(ces(&root, text, false), expected);
}

#[rstest]
#[case("yx", vec![ce(letter('y')), ce(X_AFTER_Y)])]
#[case("zx", vec![ce(letter('z')), ce(letter('x'))])]
#[case("x", vec![ce(letter('x'))])]
fn prefix_matches_preceding_text(root: Arc<CollationData>, #[case] text: &str, #[case] expected: Vec<Ce>) {
	assert_eq!(ces(&root, text, false), expected);
}

#[rstest]
fn expansions(root: Arc<CollationData>) {
	assert_eq!(ces(&root, "\u{e9}", false), vec![ce(letter('e')), ce(ACUTE)]);
	assert_eq!(ces(&root, "\u{e0}", false), vec![ce(letter('a')), ce(GRAVE)]);
}

#[rstest]
fn digits_without_numeric_collation(root: Arc<CollationData>) {
	assert_eq!(ces(&root, "12", false), vec![ce(digit_ce32(1)), ce(digit_ce32(2))]);
}

#[rstest]
fn digit_runs_collate_numerically(root: Arc<CollationData>) {
	assert_eq!(
		ces(&root, "a12b", true),
		vec![ce(letter('a')), make_ce(0x100e_0000), ce(letter('b'))]
	);
	assert_eq!(ces(&root, "007", true), vec![make_ce(0x1009_0000)]);
}

#[rstest]
fn indirect_and_algorithmic_values(root: Arc<CollationData>) {
	assert_eq!(ces(&root, "\0", false), vec![0]);
	assert_eq!(ces(&root, "\u{4e01}", false), vec![make_ce(0x7b02_0300)]);
	assert_eq!(ces(&root, "\u{e000}", false), vec![unassigned_ce_from_code_point(0xe000)]);
}

#[rstest]
fn hangul_syllables_use_jamo(root: Arc<CollationData>) {
	assert_eq!(ces(&root, "\u{ac00}", false), vec![ce(jamo_ce32(0)), ce(jamo_ce32(19))]);
	assert_eq!(
		ces(&root, "\u{ac01}", false),
		vec![ce(jamo_ce32(0)), ce(jamo_ce32(19)), ce(jamo_ce32(40))]
	);
}

#[rstest]
fn tailoring_falls_back_to_root(root: Arc<CollationData>) {
	let tailored = tailored_data(root);
	assert_eq!(ces(&tailored, "ab", false), vec![ce(letter('a')), ce(simple(0x2180))]);
	assert_eq!(ces(&tailored, "ch", false), letters("ch"));
	assert_eq!(ces(&tailored, "zx", false), vec![ce(letter('z')), ce(simple(0x3f80))]);
	assert_eq!(ces(&tailored, "a\u{301}", false), vec![ce(A_ACUTE)]);
}

#[test]
fn fallback_without_base_is_an_error() {
	let data = CollationData::new(CollationDataParts::new(Ce32TrieBuilder::new(FALLBACK_CE32).build()))
		.expect("valid data");
	let text = units("q");
	let mut iter = CollationIterator::new(&data, Utf16Source::new(&text), false);
	assert!(matches!(
		iter.next_ce(),
		Err(CollationError::MissingBase { c: Some(0x71), .. })
	));
}

#[test]
fn cyclic_indirection_is_bounded() {
	let looping = Ce32::digit(0, 1);
	let mut builder = Ce32TrieBuilder::new(UNASSIGNED_CE32);
	builder.set('q' as u32, looping);
	let mut parts = CollationDataParts::new(builder.build());
	parts.ce32s = vec![looping];
	let data = CollationData::new(parts).expect("valid data");
	let text = units("q");
	let mut iter = CollationIterator::new(&data, Utf16Source::new(&text), false);
	assert!(matches!(
		iter.next_ce(),
		Err(CollationError::ResolutionDepth { limit: MAX_RESOLUTION_STEPS, .. })
	));
}

/// Every tag either resolves to CEs, is rejected by table validation, or
/// fails with an error; none of them loops or panics.
#[rstest]
fn every_tag_terminates(#[values(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15)] bits: u32) {
	let tag = Tag::from_bits(bits);
	let mut builder = Ce32TrieBuilder::new(UNASSIGNED_CE32);
	builder.set('q' as u32, Ce32::from_tag_index_and_length(tag, 0, 1));
	let mut parts = CollationDataParts::new(builder.build());
	parts.ce32s = vec![simple(0x4000)];
	parts.ces = vec![OFFSET_DATA_CE];
	parts.contexts = vec![
		ContextTrie::new(simple(0x4100), vec![ContextEntry { context: vec!['r' as u32], ce32: simple(0x4200) }])
			.expect("valid context"),
	];
	let data = match CollationData::new(parts) {
		Ok(data) => data,
		Err(_) => {
			assert!(tag.is_invalid_at_runtime() || tag == Tag::Hangul, "{tag:?} rejected");
			return;
		}
	};
	let text = units("qrq");
	let mut iter = CollationIterator::new(&data, Utf16Source::new(&text), bits % 2 == 0);
	match iter.fetch_ces() {
		Ok(ces) => assert!(!ces.is_empty()),
		Err(err) => assert!(
			matches!(tag, Tag::Fallback | Tag::Hangul),
			"{tag:?} failed with {err}"
		),
	}
}

#[rstest]
#[case("abc", false)]
#[case("chip", false)]
#[case("a\u{301}b", false)]
#[case("a\u{327}\u{301}", false)]
#[case("a\u{327}\u{323}\u{301}ch", false)]
#[case("yxzx", false)]
#[case("\u{e9}t\u{ac01}\u{e0}", false)]
#[case("x12y345", true)]
#[case("9\u{4e01}0", true)]
fn backward_iteration_mirrors_forward(root: Arc<CollationData>, #[case] text: &str, #[case] numeric: bool) {
	let forward = ces(&root, text, numeric);
	let units = units(text);
	let mut iter = CollationIterator::new(root.as_ref(), Utf16Source::new(&units), numeric);
	iter.reset_to_offset(units.len());
	let mut offsets = Vec::new();
	let mut backward = Vec::new();
	loop {
		let ce = iter.previous_ce(&mut offsets).expect("valid data");
		if ce == NO_CE {
			break;
		}
		backward.push(ce);
	}
	backward.reverse();
	assert_eq!(backward, forward);
}

#[rstest]
fn backward_expansion_reports_offsets(root: Arc<CollationData>) {
	let units = units("b\u{e9}");
	let mut iter = CollationIterator::new(root.as_ref(), Utf16Source::new(&units), false);
	iter.reset_to_offset(units.len());
	let mut offsets = Vec::new();
	assert_eq!(iter.previous_ce(&mut offsets).expect("valid data"), ce(ACUTE));
	assert_eq!(offsets, vec![1, 2, 2]);
	assert_eq!(iter.previous_ce(&mut offsets).expect("valid data"), ce(letter('e')));
	assert_eq!(iter.previous_ce(&mut offsets).expect("valid data"), ce(letter('b')));
	assert_eq!(iter.previous_ce(&mut offsets).expect("valid data"), NO_CE);
}

#[rstest]
fn next_ce_reports_end_repeatedly(root: Arc<CollationData>) {
	let units = units("\u{e9}");
	let mut iter = CollationIterator::new(root.as_ref(), Utf16Source::new(&units), false);
	assert_eq!(iter.next_ce().expect("valid data"), ce(letter('e')));
	assert_eq!(iter.next_ce().expect("valid data"), ce(ACUTE));
	assert_eq!(iter.next_ce().expect("valid data"), NO_CE);
	assert_eq!(iter.next_ce().expect("valid data"), NO_CE);
	iter.reset_to_offset(0);
	assert_eq!(iter.fetch_ces().expect("valid data"), &[ce(letter('e')), ce(ACUTE)]);
}
