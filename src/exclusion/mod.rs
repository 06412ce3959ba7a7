//! Exclusion rules
//!
//! Two layers: the global folder-name list (literal substrings checked against
//! directory paths) and per-mapping glob patterns (`PatternMatcher`).

mod patterns;

pub use patterns::PatternMatcher;

use std::path::Path;

/// Global exclusion list, matched as literal substrings of directory paths
#[derive(Debug, Clone, Default)]
pub struct FolderExclusions {
	names: Vec<String>,
}

impl FolderExclusions {
	pub fn new(names: &[String]) -> Self {
		// An empty substring would match every directory
		let names = names.iter().filter(|n| !n.is_empty()).cloned().collect();
		Self { names }
	}

	/// First exclusion substring contained in `dir`
	pub fn matching_name(&self, dir: &Path) -> Option<&str> {
		let dir = dir.to_string_lossy();
		self.names.iter().find(|name| dir.contains(name.as_str())).map(|n| n.as_str())
	}

	/// Check if a directory should be skipped, together with everything below it
	pub fn should_exclude_dir(&self, dir: &Path) -> bool {
		self.matching_name(dir).is_some()
	}

	/// Check if a file lives in an excluded directory
	///
	/// Only the directory component is inspected, so an exclusion of `build`
	/// does not reject a file named `build.rs`.
	pub fn should_exclude_file(&self, path: &Path) -> bool {
		match path.parent() {
			Some(dir) => self.should_exclude_dir(dir),
			None => false,
		}
	}
}

/// Errors that can occur during exclusion processing
#[derive(Debug)]
pub enum ExclusionError {
	/// Failed to parse a glob pattern
	InvalidPattern { pattern: String, message: String },
}

impl std::fmt::Display for ExclusionError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ExclusionError::InvalidPattern { pattern, message } => {
				write!(f, "Invalid exclusion pattern {}: {}", pattern, message)
			}
		}
	}
}

impl std::error::Error for ExclusionError {}

impl From<ExclusionError> for crate::error::SyncError {
	fn from(e: ExclusionError) -> Self {
		match e {
			ExclusionError::InvalidPattern { pattern, message } => {
				crate::error::SyncError::InvalidPattern { pattern, message }
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn exclusions(names: &[&str]) -> FolderExclusions {
		FolderExclusions::new(&names.iter().map(|n| n.to_string()).collect::<Vec<_>>())
	}

	#[test]
	fn test_substring_match_on_directory() {
		let ex = exclusions(&["node_modules", ".git"]);

		assert!(ex.should_exclude_file(Path::new("/proj/src/node_modules/x.js")));
		assert!(ex.should_exclude_file(Path::new("/proj/.git/objects/ab/cd")));
		assert!(!ex.should_exclude_file(Path::new("/proj/src/main.js")));
	}

	#[test]
	fn test_file_name_is_not_checked() {
		let ex = exclusions(&["build"]);

		assert!(!ex.should_exclude_file(Path::new("/proj/build.rs")));
		assert!(ex.should_exclude_file(Path::new("/proj/build/out.o")));
	}

	#[test]
	fn test_literal_substring_not_component() {
		let ex = exclusions(&["tmp"]);

		// Substring semantics: "tmpfiles" and "/tmp/" both contain "tmp"
		assert!(ex.should_exclude_dir(Path::new("/proj/tmpfiles")));
		assert!(ex.should_exclude_dir(Path::new("/tmp/proj")));
		assert_eq!(ex.matching_name(Path::new("/proj/tmpfiles")), Some("tmp"));
	}

	#[test]
	fn test_empty_names_ignored() {
		let ex = exclusions(&[""]);
		assert_eq!(ex.matching_name(Path::new("/proj")), None);
		assert!(!ex.should_exclude_dir(Path::new("/proj")));
	}

	#[test]
	fn test_root_file_has_no_parent() {
		let ex = exclusions(&["x"]);
		assert!(!ex.should_exclude_file(Path::new("/")));
	}
}

// vim: ts=4
