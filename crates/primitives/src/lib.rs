//! Core value types for collation: packed mapping values, collation elements,
//! Hangul arithmetic, UTF-16 helpers, code point sets and shared handles.

/// 64-bit collation elements and weight arithmetic.
pub mod ce;
/// Packed 32-bit mapping values and their tags.
pub mod ce32;
/// Hangul syllable and conjoining jamo arithmetic.
pub mod hangul;
/// Code point and string sets.
pub mod set;
/// Reference-counted copy-on-write handles.
pub mod shared;
/// UTF-16 code unit helpers.
pub mod utf16;

pub use ce::{Ce, NO_CE};
pub use ce32::{Ce32, FALLBACK_CE32, NO_CE32, Tag, UNASSIGNED_CE32};
pub use set::{CodePointSet, CpString};
pub use shared::Shared;
