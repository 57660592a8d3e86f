//! Packed 32-bit mapping-table values.
//!
//! A CE32 is either a *simple* collation element (`ppppsstt`: 16-bit primary,
//! 8-bit secondary and tertiary bytes) or a *special* value whose low byte is
//! at least [`SPECIAL_CE32_LOW_BYTE`]. Special values carry a 4-bit [`Tag`]
//! in bits 3..0 and, depending on the tag, a length in bits 12..8 and an index
//! into the side tables in bits 31..13.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ce::{self, Ce};

/// Low byte at and above which a CE32 is special (tagged).
pub const SPECIAL_CE32_LOW_BYTE: u32 = 0xc0;
/// Low byte of a long-primary CE32.
pub const LONG_PRIMARY_CE32_LOW_BYTE: u32 = 0xc1;

/// Maximum number of CEs (or CE32s) an expansion tag can reference.
pub const MAX_EXPANSION_LENGTH: usize = 31;
/// Largest side-table index that fits into a special CE32.
pub const MAX_INDEX: u32 = 0x7ffff;

/// Contraction flag: the code point alone has no mapping without a suffix match.
pub const CONTRACT_SINGLE_CP_NO_MATCH: u32 = 0x100;
/// Contraction flag: every suffix starts with a character with lccc != 0.
pub const CONTRACT_NEXT_CCC: u32 = 0x200;
/// Contraction flag: at least one suffix ends with a character with lccc != 0.
pub const CONTRACT_TRAILING_CCC: u32 = 0x400;
/// Hangul flag: none of the jamo CE32s is special.
pub const HANGUL_NO_SPECIAL_JAMO: u32 = 0x100;

/// The closed set of special CE32 tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
	/// Look the code point up in the base table instead.
	Fallback = 0,
	/// `ppppppC1`: three-byte primary, common secondary/tertiary.
	LongPrimary = 1,
	/// `ssssttC2`: primary-ignorable with explicit secondary/tertiary.
	LongSecondary = 2,
	/// Unused; never valid in data.
	Reserved3 = 3,
	/// Two Latin CEs packed into the CE32 itself.
	LatinExpansion = 4,
	/// `length` CE32s starting at `ce32s[index]`.
	Expansion32 = 5,
	/// `length` CEs starting at `ces[index]`.
	Expansion = 6,
	/// Only used while a table is being built; never valid at runtime.
	BuilderData = 7,
	/// Prefix context trie at `contexts[index]`.
	Prefix = 8,
	/// Contraction suffix trie at `contexts[index]`.
	Contraction = 9,
	/// Decimal digit; `ce32s[index]` holds the non-numeric CE32.
	Digit = 10,
	/// U+0000; `ce32s[0]` holds its CE32.
	U0000 = 11,
	/// Hangul syllable, resolved through the jamo table.
	Hangul = 12,
	/// UTF-16 lead surrogate unit data; never valid for whole code points.
	LeadSurrogate = 13,
	/// Algorithmic primary from `ces[index]` base data.
	Offset = 14,
	/// Implicit (unassigned) primary computed from the code point.
	Implicit = 15,
}

impl Tag {
	/// Decodes the low four bits of `bits`.
	pub const fn from_bits(bits: u32) -> Self {
		match bits & 0xf {
			0 => Self::Fallback,
			1 => Self::LongPrimary,
			2 => Self::LongSecondary,
			3 => Self::Reserved3,
			4 => Self::LatinExpansion,
			5 => Self::Expansion32,
			6 => Self::Expansion,
			7 => Self::BuilderData,
			8 => Self::Prefix,
			9 => Self::Contraction,
			10 => Self::Digit,
			11 => Self::U0000,
			12 => Self::Hangul,
			13 => Self::LeadSurrogate,
			14 => Self::Offset,
			_ => Self::Implicit,
		}
	}

	/// Returns true for tags that must never be seen while iterating published data.
	pub const fn is_invalid_at_runtime(self) -> bool {
		matches!(self, Self::Reserved3 | Self::BuilderData | Self::LeadSurrogate)
	}
}

/// A packed 32-bit mapping value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ce32(pub u32);

/// The code point is not mapped here; use the base table.
pub const FALLBACK_CE32: Ce32 = Ce32(SPECIAL_CE32_LOW_BYTE);
/// Marker for "no mapping" inside context resolution.
pub const NO_CE32: Ce32 = Ce32(1);
/// Implicit tag with the maximum index; maps to an unassigned-implicit CE.
pub const UNASSIGNED_CE32: Ce32 = Ce32(0xffff_ffff);

impl Ce32 {
	/// Builds a simple CE32 from a 16-bit primary and secondary/tertiary bytes.
	///
	/// The tertiary byte must stay below [`SPECIAL_CE32_LOW_BYTE`].
	pub const fn simple(primary: u16, secondary: u8, tertiary: u8) -> Self {
		debug_assert!((tertiary as u32) < SPECIAL_CE32_LOW_BYTE);
		Self(((primary as u32) << 16) | ((secondary as u32) << 8) | tertiary as u32)
	}

	/// Builds a long-primary CE32 from a three-byte primary `pppppp00`.
	pub const fn long_primary(primary: u32) -> Self {
		Self((primary & 0xffff_ff00) | LONG_PRIMARY_CE32_LOW_BYTE)
	}

	/// Builds a long-secondary CE32 from the lower 32 CE bits `sssstt00`.
	pub const fn long_secondary(lower32: u32) -> Self {
		Self((lower32 & 0xffff_ff00) | SPECIAL_CE32_LOW_BYTE | Tag::LongSecondary as u32)
	}

	/// Builds a latin-expansion CE32 `pptt ssC4`: a first CE with a one-byte
	/// primary and tertiary byte, and a second, primary-ignorable CE with a
	/// secondary byte.
	pub const fn latin_expansion(primary: u8, tertiary: u8, secondary: u8) -> Self {
		Self(
			((primary as u32) << 24)
				| ((tertiary as u32) << 16)
				| ((secondary as u32) << 8)
				| SPECIAL_CE32_LOW_BYTE
				| Tag::LatinExpansion as u32,
		)
	}

	/// Builds a special CE32 from a tag and a side-table index.
	///
	/// Index bits above [`MAX_INDEX`] are dropped.
	pub const fn from_tag_and_index(tag: Tag, index: u32) -> Self {
		Self(((index & MAX_INDEX) << 13) | SPECIAL_CE32_LOW_BYTE | tag as u32)
	}

	/// Builds a special CE32 from a tag, a side-table index and a 5-bit length
	/// (or flag bits, for contraction and Hangul tags).
	pub const fn from_tag_index_and_length(tag: Tag, index: u32, length: u32) -> Self {
		let length = length & MAX_EXPANSION_LENGTH as u32;
		Self(((index & MAX_INDEX) << 13) | (length << 8) | SPECIAL_CE32_LOW_BYTE | tag as u32)
	}

	/// Builds a digit CE32 for `digit` whose non-numeric CE32 is `ce32s[index]`.
	pub const fn digit(index: u32, digit: u8) -> Self {
		Self(((index & MAX_INDEX) << 13) | (((digit & 0xf) as u32) << 8) | SPECIAL_CE32_LOW_BYTE | Tag::Digit as u32)
	}

	/// Returns true if this is a tagged value.
	#[inline]
	pub const fn is_special(self) -> bool {
		(self.0 & 0xff) >= SPECIAL_CE32_LOW_BYTE
	}

	/// Returns the tag of a special CE32, or `None` for a simple one.
	#[inline]
	pub const fn special_tag(self) -> Option<Tag> {
		if self.is_special() {
			Some(Tag::from_bits(self.0))
		} else {
			None
		}
	}

	#[inline]
	pub const fn has_tag(self, tag: Tag) -> bool {
		self.is_special() && (self.0 & 0xf) == tag as u32
	}

	#[inline]
	pub const fn is_long_primary(self) -> bool {
		(self.0 & 0xff) == LONG_PRIMARY_CE32_LOW_BYTE
	}

	#[inline]
	pub const fn is_prefix(self) -> bool {
		self.has_tag(Tag::Prefix)
	}

	#[inline]
	pub const fn is_contraction(self) -> bool {
		self.has_tag(Tag::Contraction)
	}

	/// Simple, long-primary or long-secondary: converts to exactly one CE.
	pub const fn is_simple_or_long(self) -> bool {
		match self.special_tag() {
			None => true,
			Some(tag) => matches!(tag, Tag::LongPrimary | Tag::LongSecondary),
		}
	}

	/// The CEs for this value do not depend on context or side tables.
	pub const fn is_self_contained(self) -> bool {
		match self.special_tag() {
			None => true,
			Some(tag) => matches!(tag, Tag::LongPrimary | Tag::LongSecondary | Tag::LatinExpansion),
		}
	}

	/// Side-table index (bits 31..13).
	#[inline]
	pub const fn index(self) -> usize {
		(self.0 >> 13) as usize
	}

	/// Expansion length (bits 12..8).
	#[inline]
	pub const fn length(self) -> usize {
		(self.0 >> 8) as usize & MAX_EXPANSION_LENGTH
	}

	/// Digit value of a digit-tagged CE32.
	#[inline]
	pub const fn digit_value(self) -> u8 {
		((self.0 >> 8) & 0xf) as u8
	}

	/// Flag bits of a contraction or Hangul CE32.
	#[inline]
	pub const fn flags(self) -> u32 {
		self.0 & 0x1f00
	}

	/// Three-byte primary of a long-primary CE32.
	#[inline]
	pub const fn long_primary_weight(self) -> u32 {
		self.0 & 0xffff_ff00
	}

	/// Converts a simple, long-primary or long-secondary CE32 into its CE.
	///
	/// Other special values are not meaningful here; callers check
	/// [`Ce32::is_simple_or_long`] first.
	pub const fn to_ce(self) -> Ce {
		let tertiary = self.0 & 0xff;
		if tertiary < SPECIAL_CE32_LOW_BYTE {
			ce::from_simple_ce32(self.0)
		} else if (tertiary & 0xf) == Tag::LongPrimary as u32 {
			ce::from_long_primary_ce32(self.0)
		} else {
			ce::from_long_secondary_ce32(self.0)
		}
	}
}

impl fmt::Debug for Ce32 {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.special_tag() {
			None => write!(f, "Ce32({:#010x})", self.0),
			Some(tag) => write!(f, "Ce32({:#010x} {tag:?})", self.0),
		}
	}
}

impl From<u32> for Ce32 {
	fn from(value: u32) -> Self {
		Self(value)
	}
}
