//! Per-mapping exclusion using shell-style glob patterns

use super::ExclusionError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Compiled set of exclude globs, matched against whole path strings
///
/// `*` also matches `/`, so `*.tmp` excludes `/proj/deep/a.tmp`.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
	patterns: Vec<String>,
	exclude_set: GlobSet,
}

impl PatternMatcher {
	/// Create a new pattern matcher
	pub fn new(exclude_patterns: &[String]) -> Result<Self, ExclusionError> {
		let exclude_set = Self::build_glob_set(exclude_patterns)?;
		Ok(Self { patterns: exclude_patterns.to_vec(), exclude_set })
	}

	/// Build a GlobSet from patterns
	fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ExclusionError> {
		let mut builder = GlobSetBuilder::new();

		for pattern in patterns {
			let glob = Glob::new(pattern).map_err(|e| ExclusionError::InvalidPattern {
				pattern: pattern.clone(),
				message: e.to_string(),
			})?;
			builder.add(glob);
		}

		builder.build().map_err(|e| ExclusionError::InvalidPattern {
			pattern: patterns.join(", "),
			message: format!("Failed to build pattern set: {}", e),
		})
	}

	/// Check if a path is excluded by any pattern
	pub fn is_excluded(&self, path: &Path) -> bool {
		!self.patterns.is_empty() && self.exclude_set.is_match(path)
	}

	/// First pattern that matches `path`, for log messages
	pub fn matching_pattern(&self, path: &Path) -> Option<&str> {
		self.exclude_set.matches(path).first().map(|&idx| self.patterns[idx].as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matcher(patterns: &[&str]) -> PatternMatcher {
		PatternMatcher::new(&patterns.iter().map(|p| p.to_string()).collect::<Vec<_>>()).unwrap()
	}

	#[test]
	fn test_basic_exclusion() {
		let matcher = matcher(&["*.log", "*.tmp"]);

		assert!(matcher.is_excluded(Path::new("/proj/test.log")));
		assert!(matcher.is_excluded(Path::new("/proj/foo/bar.tmp")));
		assert!(!matcher.is_excluded(Path::new("/proj/test.txt")));
	}

	#[test]
	fn test_wildcards_and_sequences() {
		let matcher = matcher(&["*/cache?/*", "*.[oa]"]);

		assert!(matcher.is_excluded(Path::new("/proj/cache1/x.rs")));
		assert!(!matcher.is_excluded(Path::new("/proj/cache12/x.rs")));
		assert!(matcher.is_excluded(Path::new("/proj/lib.a")));
		assert!(matcher.is_excluded(Path::new("/proj/main.o")));
		assert!(!matcher.is_excluded(Path::new("/proj/main.c")));
	}

	#[test]
	fn test_negated_sequence() {
		let matcher = matcher(&["*.[!g]o"]);

		assert!(matcher.is_excluded(Path::new("/proj/a.xo")));
		assert!(!matcher.is_excluded(Path::new("/proj/a.go")));
	}

	#[test]
	fn test_pattern_must_match_whole_path() {
		let matcher = matcher(&["a.tmp"]);

		assert!(!matcher.is_excluded(Path::new("/proj/a.tmp")));
		assert!(matcher.is_excluded(Path::new("a.tmp")));
	}

	#[test]
	fn test_empty_matcher_excludes_nothing() {
		let matcher = matcher(&[]);
		assert_eq!(matcher.matching_pattern(Path::new("/anything")), None);
		assert!(!matcher.is_excluded(Path::new("/anything")));
	}

	#[test]
	fn test_matching_pattern_reports_first() {
		let matcher = matcher(&["*.md", "*.tmp", "*"]);
		assert_eq!(matcher.matching_pattern(Path::new("/p/a.tmp")), Some("*.tmp"));
		assert_eq!(matcher.matching_pattern(Path::new("/p/a.rs")), Some("*"));
	}

	#[test]
	fn test_invalid_pattern() {
		let result = PatternMatcher::new(&["[unclosed".to_string()]);
		match result {
			Err(ExclusionError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "[unclosed"),
			other => panic!("expected InvalidPattern, got {:?}", other.map(|_| ())),
		}
	}
}

// vim: ts=4
