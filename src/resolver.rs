//! Mapping resolution
//!
//! Decides whether a path falls under a mapping, which mapping wins when
//! several overlap, and where the path lands on the destination side. All
//! queries normalize their input first and never fail: "no mapping" is `None`.

use std::path::{Path, PathBuf};

use crate::config::{Mapping, SyncConfiguration};
use crate::error::SyncError;
use crate::exclusion::{FolderExclusions, PatternMatcher};
use crate::strategies::{BatchPolicy, MatchPolicy};
use crate::validation::{is_path_within_root, normalize_path, rebase_path, validate_mapping_paths};

/// A mapping with normalized roots and compiled exclude globs
#[derive(Debug, Clone)]
pub struct MappingRule {
	/// Position in the configured mapping list
	pub index: usize,
	pub source: PathBuf,
	pub destination: PathBuf,
	excludes: PatternMatcher,
}

impl MappingRule {
	fn compile(index: usize, mapping: &Mapping) -> Result<Self, SyncError> {
		validate_mapping_paths(&mapping.source, &mapping.destination)?;
		Ok(MappingRule {
			index,
			source: normalize_path(&mapping.source),
			destination: normalize_path(&mapping.destination),
			excludes: PatternMatcher::new(&mapping.exclude_patterns)?,
		})
	}

	/// Check if `path` is below this rule's source directory
	pub fn contains(&self, path: &Path) -> bool {
		is_path_within_root(path, &self.source)
	}

	/// Exclude glob of this mapping matching `path`, if any
	pub fn excluding_pattern(&self, path: &Path) -> Option<&str> {
		self.excludes.matching_pattern(path)
	}
}

/// Outcome of resolving one path
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
	/// Normalized source path
	pub path: PathBuf,
	/// Destination path inside the winning mapping
	pub destination: PathBuf,
	pub rule: &'a MappingRule,
}

/// Path-to-mapping resolver built from a `SyncConfiguration`
#[derive(Debug, Clone)]
pub struct MappingResolver {
	rules: Vec<MappingRule>,
	folders: FolderExclusions,
	match_policy: MatchPolicy,
	batch_policy: BatchPolicy,
}

impl MappingResolver {
	/// Compile all mappings; fails on the first invalid mapping or glob
	pub fn new(config: &SyncConfiguration) -> Result<Self, SyncError> {
		let rules = config
			.mappings
			.iter()
			.enumerate()
			.map(|(idx, m)| MappingRule::compile(idx, m))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(MappingResolver {
			rules,
			folders: FolderExclusions::new(&config.exclude_folder_names),
			match_policy: config.match_policy,
			batch_policy: config.batch_policy,
		})
	}

	pub fn rules(&self) -> &[MappingRule] {
		&self.rules
	}

	pub fn folder_exclusions(&self) -> &FolderExclusions {
		&self.folders
	}

	/// Check if at least one mapping source contains `path`
	pub fn is_syncable(&self, path: &Path) -> bool {
		let path = normalize_path(path);
		self.rules.iter().any(|rule| rule.contains(&path))
	}

	/// Check a multi-path selection according to the batch policy
	///
	/// An empty selection is never syncable.
	pub fn is_syncable_batch<I, P>(&self, paths: I) -> bool
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let mut paths = paths.into_iter();
		match self.batch_policy {
			BatchPolicy::AnyPath => paths.any(|p| self.is_syncable(p.as_ref())),
			BatchPolicy::LastPath => paths.last().map_or(false, |p| self.is_syncable(p.as_ref())),
		}
	}

	/// Pick the winning mapping for an already normalized path
	fn select(&self, path: &Path) -> Option<&MappingRule> {
		let mut candidates = self.rules.iter().filter(|rule| rule.contains(path));
		match self.match_policy {
			MatchPolicy::FirstMatch => candidates.next(),
			MatchPolicy::LastMatch => candidates.last(),
			MatchPolicy::MostSpecific => candidates.fold(None, |best: Option<&MappingRule>, rule| {
				let depth = rule.source.components().count();
				match best {
					Some(b) if b.source.components().count() >= depth => Some(b),
					_ => Some(rule),
				}
			}),
		}
	}

	/// Resolve `path` to its winning mapping and destination
	pub fn resolve(&self, path: &Path) -> Option<Resolution<'_>> {
		let path = normalize_path(path);
		let rule = self.select(&path)?;
		let destination = rebase_path(&path, &rule.source, &rule.destination)?;
		Some(Resolution { path, destination, rule })
	}

	/// Destination of `path`, or `None` when no mapping contains it
	pub fn resolve_destination(&self, path: &Path) -> Option<PathBuf> {
		self.resolve(path).map(|r| r.destination)
	}

	/// Check global folder exclusions and the exclude globs of `rule`
	pub fn is_excluded(&self, path: &Path, rule: &MappingRule) -> bool {
		let path = normalize_path(path);
		self.folders.should_exclude_file(&path) || rule.excludes.is_excluded(&path)
	}
}


// vim: ts=4
