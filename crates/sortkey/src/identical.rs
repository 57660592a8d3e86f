//! The identical level: the NFD form of the text in BOCSU.

use colla_data::fcd;

use crate::bocsu;
use crate::error::Result;
use crate::sink::ByteSink;

/// Writes the identical level for `text` and returns the final anchor.
///
/// The prefix that passes the NFD quick check is encoded as is; the rest is
/// decomposed first and continues from the same anchor. No level separator
/// is written.
pub fn write_identical_level<S: ByteSink + ?Sized>(text: &[u16], sink: &mut S) -> Result<u32> {
	let limit = fcd::nfd_quick_check_limit(text);
	let mut prev = 0;
	if limit != 0 {
		prev = bocsu::write_identical_level_run(prev, &text[..limit], sink)?;
	}
	if limit < text.len() {
		let mut nfd = Vec::with_capacity(text.len() - limit);
		fcd::nfd_utf16(&text[limit..], &mut nfd);
		tracing::trace!(limit, len = text.len(), decomposed = nfd.len(), "identical level needs decomposition");
		prev = bocsu::write_identical_level_run(prev, &nfd, sink)?;
	}
	Ok(prev)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;
	use crate::sink::SortKeyBuffer;

	fn identical(text: &str) -> Vec<u8> {
		let units: Vec<u16> = text.encode_utf16().collect();
		let mut sink = SortKeyBuffer::new();
		write_identical_level(&units, &mut sink).expect("unlimited");
		sink.into_bytes()
	}

	#[test]
	fn decomposes_before_encoding() {
		assert_eq!(identical("a\u{e9}"), vec![0x92, 0x96, 0xd4, 0xba]);
	}

	#[rstest]
	#[case("a\u{e9}", "ae\u{301}")]
	#[case("\u{1e0b}\u{323}", "d\u{323}\u{307}")]
	#[case("\u{ac00}", "\u{1100}\u{1161}")]
	fn canonically_equivalent_text_is_identical(#[case] a: &str, #[case] b: &str) {
		assert_eq!(identical(a), identical(b));
	}

	#[test]
	fn different_text_differs() {
		assert!(identical("ab") < identical("ac"));
		assert!(identical("a") < identical("ab"));
		assert_eq!(identical(""), Vec::<u8>::new());
	}

	#[test]
	fn merge_separator_resets_the_anchor() {
		assert_eq!(identical("a\u{fffe}b"), vec![0x92, 0x02, 0x93]);
	}
}
