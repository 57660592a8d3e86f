//! Per-tailoring collation options.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options that change how text is turned into collation elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollationSettings {
	/// Sort digit runs by numeric value.
	pub numeric: bool,
	/// Check input for FCD and normalize offending spans; when off the text
	/// is assumed to be FCD already.
	pub normalization: bool,
}

impl CollationSettings {
	/// Parses settings from TOML; missing keys keep their defaults.
	pub fn from_toml(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::DataError;

	#[test]
	fn missing_keys_default_to_off() {
		let settings = CollationSettings::from_toml("numeric = true").expect("valid settings");
		assert_eq!(settings, CollationSettings { numeric: true, normalization: false });
		assert_eq!(CollationSettings::from_toml("").expect("empty is valid"), CollationSettings::default());
	}

	#[test]
	fn type_errors_surface_as_settings_errors() {
		let err = CollationSettings::from_toml("numeric = 3").expect_err("not a bool");
		assert!(matches!(err, DataError::Settings(_)));
	}
}
