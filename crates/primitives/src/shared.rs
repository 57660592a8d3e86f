//! Reference-counted, copy-on-write shared ownership.
//!
//! Several tailorings can hold the same settings object; the first one that
//! needs to change it gets a private copy while the others keep reading the
//! original.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A counted reference to a value shared between owners.
///
/// Cloning the handle takes another reference; dropping it releases one.
/// The count is atomic, so handles may be cloned and dropped on any thread.
pub struct Shared<T> {
	inner: Arc<T>,
}

impl<T> Shared<T> {
	/// Wraps `value` with a single reference held by the returned handle.
	pub fn new(value: T) -> Self {
		Self { inner: Arc::new(value) }
	}

	/// Returns the shared value without claiming write access.
	#[inline]
	pub fn read_only(&self) -> &T {
		&self.inner
	}

	/// Returns the number of handles currently referencing the value.
	pub fn ref_count(&self) -> usize {
		Arc::strong_count(&self.inner)
	}

	/// Returns true if both handles reference the same allocation.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<T: Clone> Shared<T> {
	/// Returns write access to the value, cloning it first if any other handle
	/// references it.
	///
	/// With a count of one the value is returned in place. Otherwise the clone
	/// is moved into a fresh allocation whose only reference is this handle,
	/// and the other handles keep the original untouched. Holding `&mut self`
	/// guarantees no new reference can be taken through this handle while the
	/// count is checked, so an observed count of one cannot grow mid-check.
	pub fn copy_on_write(&mut self) -> &mut T {
		Arc::make_mut(&mut self.inner)
	}

	/// Returns true if [`Shared::copy_on_write`] would clone.
	pub fn is_shared(&self) -> bool {
		self.ref_count() > 1
	}
}

impl<T> Clone for Shared<T> {
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner) }
	}
}

impl<T> Deref for Shared<T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.inner
	}
}

impl<T> From<Arc<T>> for Shared<T> {
	fn from(inner: Arc<T>) -> Self {
		Self { inner }
	}
}

impl<T: Default> Default for Shared<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Shared")
			.field("refs", &self.ref_count())
			.field("value", &*self.inner)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::thread;

	use super::*;

	#[test]
	fn unique_handle_writes_in_place() {
		let mut a = Shared::new(vec![1, 2, 3]);
		let before = a.read_only().as_ptr();
		a.copy_on_write().push(4);
		assert_eq!(a.read_only().as_ptr(), before);
		assert_eq!(*a, vec![1, 2, 3, 4]);
		assert_eq!(a.ref_count(), 1);
	}

	#[test]
	fn shared_handle_clones_before_writing() {
		let mut a = Shared::new(vec![1, 2, 3]);
		let b = a.clone();
		assert_eq!(a.ref_count(), 2);
		assert!(a.is_shared());

		a.copy_on_write().push(4);
		assert!(!a.ptr_eq(&b));
		assert_eq!(*a, vec![1, 2, 3, 4]);
		assert_eq!(*b, vec![1, 2, 3]);
		assert_eq!(a.ref_count(), 1);
		assert_eq!(b.ref_count(), 1);
	}

	#[test]
	fn counts_stay_exact_across_threads() {
		let a = Shared::new(0u32);
		thread::scope(|scope| {
			for _ in 0..8 {
				scope.spawn(|| {
					for _ in 0..1000 {
						let h = a.clone();
						assert!(h.ref_count() >= 2);
					}
				});
			}
		});
		assert_eq!(a.ref_count(), 1);
	}
}
