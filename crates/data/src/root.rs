//! Process-wide root collation.

use std::sync::{Arc, OnceLock};

use crate::error::{DataError, Result};
use crate::tailoring::Tailoring;

static ROOT: OnceLock<Arc<Tailoring>> = OnceLock::new();

/// Installs the root tailoring. Succeeds once per process.
pub fn install_root(root: Tailoring) -> Result<Arc<Tailoring>> {
	if root.data().base().is_some() {
		return Err(DataError::RootHasBase);
	}
	let root = Arc::new(root);
	match ROOT.set(root.clone()) {
		Ok(()) => {
			tracing::debug!(version = ?root.version(), "root collation installed");
			Ok(root)
		}
		Err(_) => {
			tracing::warn!("root collation install attempted twice");
			Err(DataError::RootInstalled)
		}
	}
}

/// The installed root tailoring, if any.
pub fn root() -> Option<&'static Arc<Tailoring>> {
	ROOT.get()
}
