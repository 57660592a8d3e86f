//! Hangul syllable and conjoining jamo arithmetic.

pub const HANGUL_BASE: u32 = 0xac00;
pub const HANGUL_END: u32 = 0xd7a3;
pub const HANGUL_COUNT: u32 = 11172;

pub const JAMO_L_BASE: u32 = 0x1100;
pub const JAMO_V_BASE: u32 = 0x1161;
/// One before the first trailing consonant; `t == 0` means "no T jamo".
pub const JAMO_T_BASE: u32 = 0x11a7;

pub const JAMO_L_COUNT: u32 = 19;
pub const JAMO_V_COUNT: u32 = 21;
pub const JAMO_T_COUNT: u32 = 28;
pub const JAMO_VT_COUNT: u32 = JAMO_V_COUNT * JAMO_T_COUNT;

/// Number of entries in a mapping table's jamo CE32 array:
/// all L and V jamo plus the T jamo without the "no T" slot.
pub const JAMO_CE32S_LENGTH: usize = (JAMO_L_COUNT + JAMO_V_COUNT + JAMO_T_COUNT - 1) as usize;

#[inline]
pub const fn is_hangul(c: u32) -> bool {
	c.wrapping_sub(HANGUL_BASE) < HANGUL_COUNT
}

/// Indexes of a syllable's jamo into the jamo CE32 array.
///
/// The T index is `None` for LV syllables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JamoIndexes {
	pub l: usize,
	pub v: usize,
	pub t: Option<usize>,
}

/// Splits a Hangul syllable into jamo CE32-array indexes.
pub const fn jamo_indexes(syllable: u32) -> JamoIndexes {
	let mut c = syllable - HANGUL_BASE;
	let t = c % JAMO_T_COUNT;
	c /= JAMO_T_COUNT;
	let v = c % JAMO_V_COUNT;
	c /= JAMO_V_COUNT;
	JamoIndexes {
		l: c as usize,
		v: (JAMO_L_COUNT + v) as usize,
		// 39 = 19 L + 21 V - 1 for the omitted t == 0
		t: if t == 0 { None } else { Some((JAMO_L_COUNT + JAMO_V_COUNT - 1 + t) as usize) },
	}
}

/// Decomposes a Hangul syllable into two or three conjoining jamo.
pub fn decompose(syllable: u32) -> ([u32; 3], usize) {
	let mut c = syllable - HANGUL_BASE;
	let t = c % JAMO_T_COUNT;
	c /= JAMO_T_COUNT;
	let l = JAMO_L_BASE + c / JAMO_V_COUNT;
	let v = JAMO_V_BASE + c % JAMO_V_COUNT;
	if t == 0 {
		([l, v, 0], 2)
	} else {
		([l, v, JAMO_T_BASE + t], 3)
	}
}
