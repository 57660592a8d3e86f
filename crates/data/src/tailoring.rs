//! Locale tailorings: mapping data plus settings and version metadata.

use std::sync::Arc;

use colla_primitives::Shared;

use crate::data::CollationData;
use crate::settings::CollationSettings;

/// Version byte of the tailoring format, written as `version[0]`.
pub const BUILDER_VERSION: u8 = 9;

/// Mapping data either owned by one tailoring or shared with others.
#[derive(Debug)]
pub enum DataRef {
	Owned(Box<CollationData>),
	Shared(Arc<CollationData>),
}

impl DataRef {
	pub fn get(&self) -> &CollationData {
		match self {
			Self::Owned(data) => data,
			Self::Shared(data) => data,
		}
	}
}

/// A mapping table with its settings, rules and version.
///
/// Logically immutable once published; the `set_*` methods are setup calls
/// for a tailoring that no other thread can see yet.
#[derive(Debug)]
pub struct Tailoring {
	data: DataRef,
	settings: Shared<CollationSettings>,
	rules: String,
	version: [u8; 4],
}

impl Tailoring {
	/// A root tailoring over shared data.
	pub fn new(data: Arc<CollationData>, settings: CollationSettings) -> Self {
		tracing::debug!(?settings, "root tailoring created");
		Self {
			data: DataRef::Shared(data),
			settings: Shared::new(settings),
			rules: String::new(),
			version: [0; 4],
		}
	}

	/// A tailoring that owns `data` and shares `base`'s settings until it
	/// changes one.
	pub fn derived(base: &Tailoring, data: CollationData, rules: impl Into<String>) -> Self {
		let settings = base.settings.clone();
		tracing::debug!(refs = settings.ref_count(), "tailoring created sharing base settings");
		Self {
			data: DataRef::Owned(Box::new(data)),
			settings,
			rules: rules.into(),
			version: base.version,
		}
	}

	pub fn data(&self) -> &CollationData {
		self.data.get()
	}

	pub fn data_ref(&self) -> &DataRef {
		&self.data
	}

	pub fn settings(&self) -> &CollationSettings {
		self.settings.read_only()
	}

	/// Shared handle to the settings, for tailorings created from this one.
	pub fn shared_settings(&self) -> &Shared<CollationSettings> {
		&self.settings
	}

	/// Write access to the settings, copying them first if shared.
	pub fn settings_mut(&mut self) -> &mut CollationSettings {
		if self.settings.is_shared() {
			tracing::debug!(refs = self.settings.ref_count(), "settings shared; cloning before write");
		} else {
			tracing::trace!("settings unshared; writing in place");
		}
		self.settings.copy_on_write()
	}

	pub fn set_numeric(&mut self, numeric: bool) {
		if self.settings().numeric != numeric {
			self.settings_mut().numeric = numeric;
		}
	}

	pub fn set_normalization(&mut self, normalization: bool) {
		if self.settings().normalization != normalization {
			self.settings_mut().normalization = normalization;
		}
	}

	pub fn rules(&self) -> &str {
		&self.rules
	}

	pub fn version(&self) -> [u8; 4] {
		self.version
	}

	/// Mixes the base data version and the rules version into this
	/// tailoring's version, keeping the UCA version bits of the base.
	pub fn set_version(&mut self, base: [u8; 4], rules: [u8; 4]) {
		self.version = [
			BUILDER_VERSION,
			base[1],
			(base[2] & 0xc0).wrapping_add(rules[0].wrapping_add(rules[0] >> 6) & 0x3f),
			(rules[1] << 3)
				.wrapping_add(rules[1] >> 5)
				.wrapping_add(rules[2])
				.wrapping_add(rules[3] << 4)
				.wrapping_add(rules[3] >> 4),
		];
	}

	/// The UCA version encoded in `version[1]` and the top bits of `version[2]`.
	pub fn uca_version(&self) -> u32 {
		(u32::from(self.version[1]) << 4) | u32::from(self.version[2] >> 6)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::CollationDataParts;
	use crate::trie::Ce32TrieBuilder;
	use colla_primitives::{FALLBACK_CE32, UNASSIGNED_CE32};

	fn root() -> Tailoring {
		let trie = Ce32TrieBuilder::new(UNASSIGNED_CE32).build();
		let data = CollationData::new(CollationDataParts::new(trie)).expect("valid root");
		Tailoring::new(Arc::new(data), CollationSettings::default())
	}

	fn child(base: &Tailoring) -> Tailoring {
		let trie = Ce32TrieBuilder::new(FALLBACK_CE32).build();
		let base_data = match base.data_ref() {
			DataRef::Shared(data) => data.clone(),
			DataRef::Owned(_) => unreachable!("root data is shared"),
		};
		let data = CollationData::new(CollationDataParts::new(trie).with_base(base_data)).expect("valid tailoring");
		Tailoring::derived(base, data, "&a<b")
	}

	#[test]
	fn settings_are_copied_on_first_write() {
		let root = root();
		let mut tailoring = child(&root);
		assert!(tailoring.shared_settings().ptr_eq(root.shared_settings()));
		assert_eq!(root.shared_settings().ref_count(), 2);

		tailoring.set_numeric(true);
		assert!(tailoring.settings().numeric);
		assert!(!root.settings().numeric);
		assert!(!tailoring.shared_settings().ptr_eq(root.shared_settings()));
		assert_eq!(root.shared_settings().ref_count(), 1);
		assert_eq!(tailoring.rules(), "&a<b");
	}

	#[test]
	fn unchanged_setting_keeps_sharing() {
		let root = root();
		let mut tailoring = child(&root);
		tailoring.set_normalization(false);
		assert!(tailoring.shared_settings().ptr_eq(root.shared_settings()));
	}

	#[test]
	fn version_mixing() {
		let mut tailoring = root();
		tailoring.set_version([9, 0xd0, 0x80, 0], [1, 2, 3, 4]);
		// rules[1]<<3 = 16, rules[1]>>5 = 0, +3, rules[3]<<4 = 64, rules[3]>>4 = 0
		assert_eq!(tailoring.version(), [9, 0xd0, 0x81, 83]);
		assert_eq!(tailoring.uca_version(), (0xd0 << 4) | 2);
	}
}
