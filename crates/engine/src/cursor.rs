//! Iteration through an external bidirectional cursor.

use std::fmt;

use ropey::RopeSlice;
use ropey::iter::Chars;

use crate::source::TextSource;

/// A bidirectional code point cursor over text the iterator does not own.
///
/// Indexes are whatever unit the cursor counts in; they only need to be
/// stable for [`CodePointCursor::move_to`].
pub trait CodePointCursor {
	fn next(&mut self) -> Option<u32>;
	fn previous(&mut self) -> Option<u32>;
	fn index(&self) -> usize;
	fn move_to(&mut self, index: usize);
}

/// Adapts a [`CodePointCursor`] into a [`TextSource`].
#[derive(Debug, Clone)]
pub struct CursorSource<C> {
	cursor: C,
}

impl<C: CodePointCursor> CursorSource<C> {
	pub fn new(cursor: C) -> Self {
		Self { cursor }
	}

	pub fn cursor(&self) -> &C {
		&self.cursor
	}

	pub fn into_inner(self) -> C {
		self.cursor
	}
}

impl<C: CodePointCursor> TextSource for CursorSource<C> {
	fn next_code_point(&mut self) -> Option<u32> {
		self.cursor.next()
	}

	fn previous_code_point(&mut self) -> Option<u32> {
		self.cursor.previous()
	}

	fn offset(&self) -> usize {
		self.cursor.index()
	}

	fn reset_to_offset(&mut self, offset: usize) {
		self.cursor.move_to(offset);
	}
}

/// Cursor over a rope slice, indexed in chars.
#[derive(Clone)]
pub struct RopeCursor<'a> {
	slice: RopeSlice<'a>,
	chars: Chars<'a>,
	index: usize,
}

impl<'a> RopeCursor<'a> {
	pub fn new(slice: RopeSlice<'a>) -> Self {
		Self {
			slice,
			chars: slice.chars(),
			index: 0,
		}
	}
}

impl fmt::Debug for RopeCursor<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RopeCursor")
			.field("len_chars", &self.slice.len_chars())
			.field("index", &self.index)
			.finish()
	}
}

impl CodePointCursor for RopeCursor<'_> {
	fn next(&mut self) -> Option<u32> {
		let ch = self.chars.next()?;
		self.index += 1;
		Some(ch as u32)
	}

	fn previous(&mut self) -> Option<u32> {
		let ch = self.chars.prev()?;
		self.index -= 1;
		Some(ch as u32)
	}

	fn index(&self) -> usize {
		self.index
	}

	fn move_to(&mut self, index: usize) {
		let index = index.min(self.slice.len_chars());
		self.chars = self.slice.chars_at(index);
		self.index = index;
	}
}
