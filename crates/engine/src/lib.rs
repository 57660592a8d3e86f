//! Collation element iteration over mapping tables.
//!
//! A [`CollationIterator`] reads code points from any [`TextSource`] and
//! dispatches on the CE32 tags of a [`colla_data::CollationData`] table.
//! Sources exist for plain UTF-16 buffers, for UTF-16 that is normalized to
//! FCD on the fly, and for external cursors such as a rope. The [`sets`]
//! analyzers walk whole tables.

/// Cursor-backed text sources.
pub mod cursor;
mod error;
/// Incremental FCD normalization of UTF-16 text.
pub mod fcd;
/// The CE32 dispatch engine.
pub mod iter;
/// Table analyzers.
pub mod sets;
/// The text access trait.
pub mod source;
/// Direct UTF-16 text source.
pub mod utf16;

#[cfg(test)]
mod fixtures;

use colla_data::Tailoring;
use colla_primitives::Ce;
use ropey::RopeSlice;

pub use cursor::{CodePointCursor, CursorSource, RopeCursor};
pub use error::{CollationError, Result};
pub use fcd::{CheckDirection, FcdUtf16Source};
pub use iter::{CollationIterator, MAX_RESOLUTION_STEPS};
pub use sets::{CeSink, ContractionsAndExpansions, TailoredSet};
pub use source::TextSource;
pub use utf16::Utf16Source;

/// All CEs of `source` under a tailoring's table and numeric setting.
pub fn collect_ces<S: TextSource>(tailoring: &Tailoring, source: S) -> Result<Vec<Ce>> {
	let mut iter = CollationIterator::new(tailoring.data(), source, tailoring.settings().numeric);
	Ok(iter.fetch_ces()?.to_vec())
}

/// All CEs of UTF-16 `text`, normalizing to FCD when the tailoring's
/// settings ask for it.
pub fn collation_elements(tailoring: &Tailoring, text: &[u16]) -> Result<Vec<Ce>> {
	let settings = tailoring.settings();
	tracing::trace!(len = text.len(), normalization = settings.normalization, "collating utf-16 text");
	if settings.normalization {
		collect_ces(tailoring, FcdUtf16Source::new(text))
	} else {
		collect_ces(tailoring, Utf16Source::new(text))
	}
}

/// All CEs of a rope slice, read in place. The text is assumed to be FCD.
pub fn rope_collation_elements(tailoring: &Tailoring, text: RopeSlice<'_>) -> Result<Vec<Ce>> {
	collect_ces(tailoring, CursorSource::new(RopeCursor::new(text)))
}

#[cfg(test)]
mod tests {
	use colla_data::CollationSettings;
	use pretty_assertions::assert_eq;
	use ropey::Rope;

	use super::*;
	use crate::fixtures::*;

	fn tailoring(numeric: bool, normalization: bool) -> Tailoring {
		let mut tailoring = root_tailoring();
		tailoring.set_numeric(numeric);
		tailoring.set_normalization(normalization);
		tailoring
	}

	#[test]
	fn normalization_setting_reorders_marks() {
		let text = units("a\u{301}\u{327}");
		let plain = collation_elements(&tailoring(false, false), &text).expect("valid data");
		assert_eq!(plain, vec![A_ACUTE.to_ce(), CEDILLA.to_ce()]);
		let normalized = collation_elements(&tailoring(false, true), &text).expect("valid data");
		assert_eq!(normalized, vec![A_ACUTE.to_ce(), CEDILLA.to_ce()]);

		let text = units("b\u{301}\u{327}");
		let plain = collation_elements(&tailoring(false, false), &text).expect("valid data");
		assert_eq!(plain, vec![letter('b').to_ce(), ACUTE.to_ce(), CEDILLA.to_ce()]);
		let normalized = collation_elements(&tailoring(false, true), &text).expect("valid data");
		assert_eq!(normalized, vec![letter('b').to_ce(), CEDILLA.to_ce(), ACUTE.to_ce()]);
	}

	#[test]
	fn numeric_setting_is_applied() {
		let text = units("a12");
		let numeric = collation_elements(&tailoring(true, false), &text).expect("valid data");
		assert_eq!(numeric.len(), 2);
		let plain = collation_elements(&tailoring(false, false), &text).expect("valid data");
		assert_eq!(plain.len(), 3);
	}

	#[test]
	fn rope_matches_utf16() {
		let text = "chip \u{e9}a\u{327}\u{301} yx \u{ac01}\u{1f600}";
		let rope = Rope::from_str(text);
		let tailoring = Tailoring::new(root_data(), CollationSettings::default());
		assert_eq!(
			rope_collation_elements(&tailoring, rope.slice(..)).expect("valid data"),
			collation_elements(&tailoring, &units(text)).expect("valid data"),
		);
	}
}
