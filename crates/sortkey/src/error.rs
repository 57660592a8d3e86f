//! Errors raised while writing sort key bytes.

use std::collections::TryReserveError;

use thiserror::Error;

/// The output buffer could not take the bytes of the next character.
///
/// Nothing of that character has been written when either is returned.
#[derive(Debug, Error)]
pub enum CodecError {
	/// The buffer would grow past its configured limit.
	#[error("sort key needs {requested} bytes but is limited to {limit}")]
	CapacityExceeded { requested: usize, limit: usize },

	/// The allocator refused to grow the buffer.
	#[error("could not grow sort key buffer to {requested} bytes")]
	Allocation {
		requested: usize,
		#[source]
		source: TryReserveError,
	},
}

/// Result type for sort key output.
pub type Result<T> = std::result::Result<T, CodecError>;
