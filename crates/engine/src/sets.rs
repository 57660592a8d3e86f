//! Analyzers that walk a mapping table and collect code points and strings.
//!
//! [`ContractionsAndExpansions`] gathers the strings that map as a unit and
//! the code points that map to more than one CE. [`TailoredSet`] computes
//! which code points and strings a tailoring maps differently from its base.

mod contractions;
mod tailored;

pub use self::contractions::ContractionsAndExpansions;
pub use self::tailored::TailoredSet;

use colla_data::{CollationData, ContextTrie};
use colla_primitives::{Ce, Ce32, CpString};

use crate::error::{CollationError, Result};

/// Receives the CEs of the mappings a [`ContractionsAndExpansions`] visits.
pub trait CeSink {
	fn handle_ce(&mut self, ce: Ce);

	fn handle_expansion(&mut self, ces: &[Ce]);
}

/// Sorts after every stored context string.
const SENTINEL: &[u32] = &[0x11_0000];

fn context_of(d: &CollationData, ce32: Ce32) -> Result<&ContextTrie> {
	d.context(ce32)
		.ok_or_else(|| CollationError::out_of_range("contexts", ce32.index(), ce32))
}

/// `prefix` + `c` + `suffix` as one string.
fn joined(prefix: &[u32], c: u32, suffix: Option<&[u32]>) -> CpString {
	let mut s = CpString::from_slice(prefix);
	s.push(c);
	if let Some(suffix) = suffix {
		s.extend_from_slice(suffix);
	}
	s
}
