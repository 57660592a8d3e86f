//! Byte sinks for sort key output.

use crate::error::{CodecError, Result};

/// Smallest allocation made when a buffer first grows.
const MIN_CAPACITY: usize = 32;

/// Room kept free after every growth step, enough for one encoded character.
pub const MIN_LOOK_AHEAD: usize = 4;

/// Destination for encoded bytes.
///
/// Writers reserve the full length of a character's encoding before
/// appending any of it, so a failed reservation leaves the sink unchanged.
pub trait ByteSink {
	/// Makes room for `additional` more bytes.
	fn try_reserve(&mut self, additional: usize) -> Result<()>;

	/// Appends bytes previously reserved with [`ByteSink::try_reserve`].
	fn append(&mut self, bytes: &[u8]);
}

impl ByteSink for Vec<u8> {
	fn try_reserve(&mut self, additional: usize) -> Result<()> {
		Vec::try_reserve(self, additional).map_err(|source| CodecError::Allocation {
			requested: self.len().saturating_add(additional),
			source,
		})
	}

	fn append(&mut self, bytes: &[u8]) {
		self.extend_from_slice(bytes);
	}
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
	fn try_reserve(&mut self, additional: usize) -> Result<()> {
		(**self).try_reserve(additional)
	}

	fn append(&mut self, bytes: &[u8]) {
		(**self).append(bytes);
	}
}

/// A growable sort key with an optional size limit.
///
/// Capacity at least doubles on growth and always leaves
/// [`MIN_LOOK_AHEAD`] bytes beyond the reservation that triggered it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortKeyBuffer {
	bytes: Vec<u8>,
	limit: Option<usize>,
}

impl SortKeyBuffer {
	pub fn new() -> Self {
		Self::default()
	}

	/// A buffer that refuses to hold more than `limit` bytes.
	pub fn with_limit(limit: usize) -> Self {
		Self {
			bytes: Vec::new(),
			limit: Some(limit),
		}
	}

	pub fn limit(&self) -> Option<usize> {
		self.limit
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.bytes.capacity()
	}

	pub fn clear(&mut self) {
		self.bytes.clear();
	}
}

impl ByteSink for SortKeyBuffer {
	fn try_reserve(&mut self, additional: usize) -> Result<()> {
		let requested = self.bytes.len().saturating_add(additional);
		if let Some(limit) = self.limit
			&& requested > limit
		{
			tracing::warn!(requested, limit, "sort key limit reached");
			return Err(CodecError::CapacityExceeded { requested, limit });
		}
		let capacity = self.bytes.capacity();
		if requested <= capacity {
			return Ok(());
		}
		let mut target = capacity
			.saturating_mul(2)
			.max(requested.saturating_add(MIN_LOOK_AHEAD))
			.max(MIN_CAPACITY);
		if let Some(limit) = self.limit {
			target = target.min(limit);
		}
		tracing::trace!(from = capacity, to = target, "growing sort key buffer");
		self.bytes
			.try_reserve_exact(target - self.bytes.len())
			.map_err(|source| CodecError::Allocation { requested, source })
	}

	fn append(&mut self, bytes: &[u8]) {
		self.bytes.extend_from_slice(bytes);
	}
}
