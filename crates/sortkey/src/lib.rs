//! Byte-level output for sort keys.
//!
//! [`bocsu`] encodes code point sequences so that byte order equals code
//! point order, [`write_identical_level`] applies it to the NFD form of a
//! string, and [`SortKeyBuffer`] collects the bytes.

pub mod bocsu;
mod error;
mod identical;
pub mod sink;

pub use bocsu::{MERGE_SEPARATOR_BYTE, write_diff, write_identical_level_run};
pub use error::{CodecError, Result};
pub use identical::write_identical_level;
pub use sink::{ByteSink, SortKeyBuffer};
