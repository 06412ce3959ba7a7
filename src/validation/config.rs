//! Configuration validation functions

use super::path::normalize_path;
use super::Validator;
use crate::config::{Mapping, SyncConfiguration};
use crate::error::SyncError;
use crate::exclusion::PatternMatcher;
use std::path::Path;

/// Reject mappings whose source and destination normalize to the same directory
pub fn validate_mapping_paths(source: &Path, destination: &Path) -> Result<(), SyncError> {
	let source = normalize_path(source);
	let destination = normalize_path(destination);
	if source == destination {
		return Err(SyncError::InvalidMapping { source, destination });
	}
	Ok(())
}

impl Validator for Mapping {
	fn validate(&self) -> Result<(), SyncError> {
		validate_mapping_paths(&self.source, &self.destination)?;
		PatternMatcher::new(&self.exclude_patterns)?;
		Ok(())
	}
}

impl Validator for SyncConfiguration {
	fn validate(&self) -> Result<(), SyncError> {
		self.mappings.iter().try_for_each(|m| m.validate())
	}
}


// vim: ts=4
