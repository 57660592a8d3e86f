//! Text access for the collation iterator.

use colla_data::CollationData;
use colla_primitives::Ce32;

/// Bidirectional code point access over some text representation.
///
/// Offsets are opaque positions in the source's own units; the only contract
/// is that [`TextSource::reset_to_offset`] with a value returned by
/// [`TextSource::offset`] restores that position.
pub trait TextSource {
	/// Returns the next code point, or `None` at the end of the text.
	fn next_code_point(&mut self) -> Option<u32>;

	/// Returns the previous code point, or `None` at the start of the text.
	fn previous_code_point(&mut self) -> Option<u32>;

	fn forward_num_code_points(&mut self, n: usize) {
		for _ in 0..n {
			if self.next_code_point().is_none() {
				break;
			}
		}
	}

	fn backward_num_code_points(&mut self, n: usize) {
		for _ in 0..n {
			if self.previous_code_point().is_none() {
				break;
			}
		}
	}

	fn offset(&self) -> usize;

	fn reset_to_offset(&mut self, offset: usize);

	/// Reads the next code point and its CE32 from `data`.
	///
	/// Sources with a faster lookup path override this.
	fn handle_next_ce32(&mut self, data: &CollationData) -> Option<(u32, Ce32)> {
		let c = self.next_code_point()?;
		Some((c, data.ce32(c)))
	}
}

impl<S: TextSource + ?Sized> TextSource for &mut S {
	fn next_code_point(&mut self) -> Option<u32> {
		(**self).next_code_point()
	}

	fn previous_code_point(&mut self) -> Option<u32> {
		(**self).previous_code_point()
	}

	fn forward_num_code_points(&mut self, n: usize) {
		(**self).forward_num_code_points(n);
	}

	fn backward_num_code_points(&mut self, n: usize) {
		(**self).backward_num_code_points(n);
	}

	fn offset(&self) -> usize {
		(**self).offset()
	}

	fn reset_to_offset(&mut self, offset: usize) {
		(**self).reset_to_offset(offset);
	}

	fn handle_next_ce32(&mut self, data: &CollationData) -> Option<(u32, Ce32)> {
		(**self).handle_next_ce32(data)
	}
}
