//! Direct iteration over a UTF-16 buffer.

use colla_data::CollationData;
use colla_primitives::{Ce32, utf16};

use crate::source::TextSource;

/// Reads code points straight from UTF-16 code units.
///
/// Unpaired surrogates are returned as themselves. Offsets are code unit
/// indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf16Source<'t> {
	text: &'t [u16],
	pos: usize,
}

impl<'t> Utf16Source<'t> {
	pub fn new(text: &'t [u16]) -> Self {
		Self { text, pos: 0 }
	}

	pub fn text(&self) -> &'t [u16] {
		self.text
	}
}

impl TextSource for Utf16Source<'_> {
	fn next_code_point(&mut self) -> Option<u32> {
		if self.pos >= self.text.len() {
			return None;
		}
		let (c, len) = utf16::decode_at(self.text, self.pos);
		self.pos += len;
		Some(c)
	}

	fn previous_code_point(&mut self) -> Option<u32> {
		if self.pos == 0 {
			return None;
		}
		let (c, len) = utf16::decode_before(self.text, self.pos);
		self.pos -= len;
		Some(c)
	}

	fn offset(&self) -> usize {
		self.pos
	}

	fn reset_to_offset(&mut self, offset: usize) {
		self.pos = offset.min(self.text.len());
	}

	fn handle_next_ce32(&mut self, data: &CollationData) -> Option<(u32, Ce32)> {
		let &unit = self.text.get(self.pos)?;
		if !utf16::is_surrogate(u32::from(unit)) {
			self.pos += 1;
			let c = u32::from(unit);
			return Some((c, data.ce32(c)));
		}
		let c = self.next_code_point()?;
		Some((c, data.ce32(c)))
	}
}
