//! Binary Ordered Compression for Scalar Unicode.
//!
//! Encodes a code point sequence as differences from a moving anchor so that
//! byte order equals code point order. Bytes 0 and 1 are never written; 2 is
//! only written for U+FFFE, the merge separator.

use colla_primitives::utf16;

use crate::error::Result;
use crate::sink::ByteSink;

const SLOPE_MIN: i32 = 3;
const SLOPE_MAX: i32 = 0xff;
const SLOPE_MIDDLE: i32 = 0x81;

/// Trail byte values per position.
const SLOPE_TAIL_COUNT: i32 = SLOPE_MAX - SLOPE_MIN + 1;

pub const SLOPE_MAX_BYTES: usize = 4;

const SLOPE_SINGLE: i32 = 80;
const SLOPE_LEAD_2: i32 = 42;
const SLOPE_LEAD_3: i32 = 3;

const SLOPE_REACH_POS_1: i32 = SLOPE_SINGLE;
const SLOPE_REACH_NEG_1: i32 = -SLOPE_SINGLE;

const SLOPE_REACH_POS_2: i32 = SLOPE_LEAD_2 * SLOPE_TAIL_COUNT + (SLOPE_LEAD_2 - 1);
const SLOPE_REACH_NEG_2: i32 = -SLOPE_REACH_POS_2 - 1;

const SLOPE_REACH_POS_3: i32 = SLOPE_LEAD_3 * SLOPE_TAIL_COUNT * SLOPE_TAIL_COUNT
	+ (SLOPE_LEAD_3 - 1) * SLOPE_TAIL_COUNT
	+ (SLOPE_TAIL_COUNT - 1);
const SLOPE_REACH_NEG_3: i32 = -SLOPE_REACH_POS_3 - 1;

const SLOPE_START_POS_2: i32 = SLOPE_MIDDLE + SLOPE_SINGLE + 1;
const SLOPE_START_POS_3: i32 = SLOPE_START_POS_2 + SLOPE_LEAD_2;

const SLOPE_START_NEG_2: i32 = SLOPE_MIDDLE + SLOPE_REACH_NEG_1;
const SLOPE_START_NEG_3: i32 = SLOPE_START_NEG_2 - SLOPE_LEAD_2;

/// Written for U+FFFE in place of a difference.
pub const MERGE_SEPARATOR_BYTE: u8 = 2;
const MERGE_SEPARATOR: u32 = 0xfffe;

/// Main Unihan block, where the anchor stays fixed.
const UNIHAN_START: i32 = 0x4e00;
const UNIHAN_LIMIT: i32 = 0xa000;

/// The bytes for one difference, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffBytes {
	bytes: [u8; SLOPE_MAX_BYTES],
	len: usize,
}

impl DiffBytes {
	pub fn as_slice(&self) -> &[u8] {
		&self.bytes[..self.len]
	}
}

/// A trailing byte; the value is always below [`SLOPE_TAIL_COUNT`].
fn tail(m: i32) -> u8 {
	(SLOPE_MIN + m) as u8
}

/// Encodes `diff` in one to four bytes.
pub fn encode_diff(diff: i32) -> DiffBytes {
	let mut bytes = [0u8; SLOPE_MAX_BYTES];
	let len;
	if diff >= SLOPE_REACH_NEG_1 {
		if diff <= SLOPE_REACH_POS_1 {
			bytes[0] = (SLOPE_MIDDLE + diff) as u8;
			len = 1;
		} else if diff <= SLOPE_REACH_POS_2 {
			bytes[0] = (SLOPE_START_POS_2 + diff / SLOPE_TAIL_COUNT) as u8;
			bytes[1] = tail(diff % SLOPE_TAIL_COUNT);
			len = 2;
		} else if diff <= SLOPE_REACH_POS_3 {
			let mut d = diff;
			bytes[2] = tail(d % SLOPE_TAIL_COUNT);
			d /= SLOPE_TAIL_COUNT;
			bytes[1] = tail(d % SLOPE_TAIL_COUNT);
			bytes[0] = (SLOPE_START_POS_3 + d / SLOPE_TAIL_COUNT) as u8;
			len = 3;
		} else {
			let mut d = diff;
			bytes[3] = tail(d % SLOPE_TAIL_COUNT);
			d /= SLOPE_TAIL_COUNT;
			bytes[2] = tail(d % SLOPE_TAIL_COUNT);
			d /= SLOPE_TAIL_COUNT;
			bytes[1] = tail(d % SLOPE_TAIL_COUNT);
			bytes[0] = SLOPE_MAX as u8;
			len = 4;
		}
	} else {
		// Floor division keeps every trailing remainder non-negative.
		let mut d = diff;
		if diff >= SLOPE_REACH_NEG_2 {
			bytes[1] = tail(d.rem_euclid(SLOPE_TAIL_COUNT));
			d = d.div_euclid(SLOPE_TAIL_COUNT);
			bytes[0] = (SLOPE_START_NEG_2 + d) as u8;
			len = 2;
		} else if diff >= SLOPE_REACH_NEG_3 {
			bytes[2] = tail(d.rem_euclid(SLOPE_TAIL_COUNT));
			d = d.div_euclid(SLOPE_TAIL_COUNT);
			bytes[1] = tail(d.rem_euclid(SLOPE_TAIL_COUNT));
			d = d.div_euclid(SLOPE_TAIL_COUNT);
			bytes[0] = (SLOPE_START_NEG_3 + d) as u8;
			len = 3;
		} else {
			bytes[3] = tail(d.rem_euclid(SLOPE_TAIL_COUNT));
			d = d.div_euclid(SLOPE_TAIL_COUNT);
			bytes[2] = tail(d.rem_euclid(SLOPE_TAIL_COUNT));
			d = d.div_euclid(SLOPE_TAIL_COUNT);
			bytes[1] = tail(d.rem_euclid(SLOPE_TAIL_COUNT));
			bytes[0] = SLOPE_MIN as u8;
			len = 4;
		}
	}
	DiffBytes { bytes, len }
}

/// Writes the encoding of `diff`.
pub fn write_diff<S: ByteSink + ?Sized>(diff: i32, sink: &mut S) -> Result<()> {
	let encoded = encode_diff(diff);
	sink.try_reserve(encoded.len)?;
	sink.append(encoded.as_slice());
	Ok(())
}

/// Moves the anchor to the middle of its neighborhood so that nearby code
/// points in either direction get short differences.
fn recenter(prev: i32) -> i32 {
	if (UNIHAN_START..UNIHAN_LIMIT).contains(&prev) {
		// Unihan text mostly moves downwards from the end of the block.
		(UNIHAN_LIMIT - 1) - SLOPE_REACH_POS_2
	} else {
		(prev & !0x7f) - SLOPE_REACH_NEG_1
	}
}

/// Encodes code points starting from anchor `prev` and returns the new anchor.
pub fn write_code_points<S, I>(prev: u32, code_points: I, sink: &mut S) -> Result<u32>
where
	S: ByteSink + ?Sized,
	I: IntoIterator<Item = u32>,
{
	let mut prev = prev as i32;
	for c in code_points {
		prev = recenter(prev);
		if c == MERGE_SEPARATOR {
			sink.try_reserve(1)?;
			sink.append(&[MERGE_SEPARATOR_BYTE]);
			prev = 0;
		} else {
			let c = c as i32;
			write_diff(c - prev, sink)?;
			prev = c;
		}
	}
	Ok(prev as u32)
}

/// Encodes a UTF-16 run starting from anchor `prev` and returns the new
/// anchor, for continuing with the next run.
pub fn write_identical_level_run<S: ByteSink + ?Sized>(prev: u32, text: &[u16], sink: &mut S) -> Result<u32> {
	write_code_points(prev, utf16::code_points(text), sink)
}
