//! 64-bit collation elements.
//!
//! Layout: primary weight in bits 63..32, secondary in 31..16, tertiary
//! (with case bits) in 15..0.

/// A 64-bit collation element.
pub type Ce = u64;

/// Primary weight of [`NO_CE`].
pub const NO_CE_PRIMARY: u32 = 1;
/// End-of-input sentinel CE; sorts lower than any real CE of the same primary.
pub const NO_CE: Ce = 0x1_0100_0100;

pub const COMMON_SECONDARY_CE: u64 = 0x0500_0000;
pub const COMMON_TERTIARY_CE: u64 = 0x0500;
pub const COMMON_SEC_AND_TER_CE: u64 = 0x0500_0500;

/// Lead byte of implicit primaries for unassigned code points.
pub const UNASSIGNED_IMPLICIT_BYTE: u32 = 0xfe;

/// Makes a CE from a primary weight with common secondary and tertiary weights.
#[inline]
pub const fn make_ce(primary: u32) -> Ce {
	((primary as u64) << 32) | COMMON_SEC_AND_TER_CE
}

#[inline]
pub const fn primary(ce: Ce) -> u32 {
	(ce >> 32) as u32
}

/// `ppppsstt` -> `pppp0000ss00tt00`
#[inline]
pub const fn from_simple_ce32(ce32: u32) -> Ce {
	(((ce32 & 0xffff_0000) as u64) << 32) | (((ce32 & 0xff00) as u64) << 16) | (((ce32 & 0xff) as u64) << 8)
}

/// `ppppppC1` -> `pppppp0005000500`
#[inline]
pub const fn from_long_primary_ce32(ce32: u32) -> Ce {
	(((ce32 & 0xffff_ff00) as u64) << 32) | COMMON_SEC_AND_TER_CE
}

/// `ssssttC2` -> `00000000sssstt00`
#[inline]
pub const fn from_long_secondary_ce32(ce32: u32) -> Ce {
	(ce32 & 0xffff_ff00) as u64
}

/// First CE of a latin expansion: one-byte primary, common secondary, tertiary.
#[inline]
pub const fn latin_ce0_from_ce32(ce32: u32) -> Ce {
	(((ce32 & 0xff00_0000) as u64) << 32) | COMMON_SECONDARY_CE | (((ce32 & 0x00ff_0000) >> 8) as u64)
}

/// Second CE of a latin expansion: primary-ignorable, secondary byte, common tertiary.
#[inline]
pub const fn latin_ce1_from_ce32(ce32: u32) -> Ce {
	(((ce32 & 0xff00) as u64) << 16) | COMMON_TERTIARY_CE
}

/// Implicit primary for an unassigned code point.
///
/// Leaves a gap before U+0000 so that `[first unassigned]` can sort before it.
pub const fn unassigned_primary_from_code_point(c: u32) -> u32 {
	let mut c = c + 1;
	let mut primary = 2 + (c % 18) * 14;
	c /= 18;
	primary |= (2 + (c % 254)) << 8;
	c /= 254;
	primary |= (4 + (c % 251)) << 16;
	primary | (UNASSIGNED_IMPLICIT_BYTE << 24)
}

#[inline]
pub const fn unassigned_ce_from_code_point(c: u32) -> Ce {
	make_ce(unassigned_primary_from_code_point(c))
}

/// Increments a three-byte primary by `offset` steps, skipping the byte values
/// reserved in compressible primary lead-byte groups.
pub const fn inc_three_byte_primary_by_offset(base_primary: u32, is_compressible: bool, offset: u32) -> u32 {
	let mut offset = offset.wrapping_add((base_primary >> 8) & 0xff).wrapping_sub(2);
	let mut primary = ((offset % 254) + 2) << 8;
	offset /= 254;
	if is_compressible {
		offset = offset.wrapping_add((base_primary >> 16) & 0xff).wrapping_sub(4);
		primary |= ((offset % 251) + 4) << 16;
		offset /= 251;
	} else {
		offset = offset.wrapping_add((base_primary >> 16) & 0xff).wrapping_sub(2);
		primary |= ((offset % 254) + 2) << 16;
		offset /= 254;
	}
	primary | ((base_primary & 0xff00_0000).wrapping_add(offset << 24))
}

/// Computes the primary for `c` from offset-tag side data.
///
/// `data_ce` holds the three-byte base primary in its upper half and
/// `bbbbbbss` in its lower half: the base code point and the per-code-point
/// step, with bit 7 flagging a compressible lead byte.
pub const fn three_byte_primary_for_offset_data(c: u32, data_ce: u64) -> u32 {
	let primary = (data_ce >> 32) as u32;
	let lower32 = data_ce as u32;
	let offset = c.saturating_sub(lower32 >> 8).wrapping_mul(lower32 & 0x7f);
	let is_compressible = (lower32 & 0x80) != 0;
	inc_three_byte_primary_by_offset(primary, is_compressible, offset)
}
