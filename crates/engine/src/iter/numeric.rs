//! Collation elements for digit runs under numeric collation.
//!
//! A run of decimal digits sorts by numeric value. Leading zeros are
//! dropped, and runs longer than 254 significant digits are split into
//! segments that each get their own primaries.

use colla_primitives::ce;

use super::CeBuffer;

const MAX_SEGMENT_DIGITS: usize = 254;

/// Appends the CEs for a digit run (values 0..=9, most significant first).
pub(super) fn append_digit_run(digits: &[u8], numeric_primary: u32, out: &mut CeBuffer) {
	let mut pos = 0;
	while pos < digits.len() {
		// Keep at least one digit so that zero still produces a CE.
		while pos + 1 < digits.len() && digits[pos] == 0 {
			pos += 1;
		}
		let len = (digits.len() - pos).min(MAX_SEGMENT_DIGITS);
		append_segment(&digits[pos..pos + len], numeric_primary, out);
		pos += len;
	}
}

fn append_segment(digits: &[u8], numeric_primary: u32, out: &mut CeBuffer) {
	let mut length = digits.len();
	if length <= 7 {
		let mut value = digits.iter().fold(0u32, |v, &d| v * 10 + u32::from(d));
		// Small values get a single second byte.
		let mut first_byte = 2u32;
		let mut num_bytes = 74u32;
		if value < num_bytes {
			out.push(ce::make_ce(numeric_primary | ((first_byte + value) << 16)));
			return;
		}
		value -= num_bytes;
		first_byte += num_bytes;
		num_bytes = 40;
		if value < num_bytes * 254 {
			let primary = numeric_primary | ((first_byte + value / 254) << 16) | ((2 + value % 254) << 8);
			out.push(ce::make_ce(primary));
			return;
		}
		value -= num_bytes * 254;
		first_byte += num_bytes;
		num_bytes = 16;
		if value < num_bytes * 254 * 254 {
			let mut primary = numeric_primary | (2 + value % 254);
			value /= 254;
			primary |= (2 + value % 254) << 8;
			value /= 254;
			primary |= (first_byte + value % 254) << 16;
			out.push(ce::make_ce(primary));
			return;
		}
	}

	// Two digits per byte, each pair p stored as 11 + 2p; the last pair is
	// stored one lower so that a longer number with the same prefix sorts after.
	let num_pairs = (length as u32).div_ceil(2);
	let mut primary = numeric_primary | ((128 + num_pairs) << 16);
	while digits[length - 1] == 0 && digits[length - 2] == 0 {
		length -= 2;
	}
	let (mut pair, mut pos) = if length & 1 == 1 {
		(u32::from(digits[0]), 1)
	} else {
		(u32::from(digits[0]) * 10 + u32::from(digits[1]), 2)
	};
	pair = 11 + 2 * pair;
	let mut shift = 8;
	while pos < length {
		if shift == 0 {
			primary |= pair;
			out.push(ce::make_ce(primary));
			primary = numeric_primary;
			shift = 16;
		} else {
			primary |= pair << shift;
			shift -= 8;
		}
		pair = 11 + 2 * (u32::from(digits[pos]) * 10 + u32::from(digits[pos + 1]));
		pos += 2;
	}
	primary |= (pair - 1) << shift;
	out.push(ce::make_ce(primary));
}
