//! Sync engine
//!
//! Mirrors single files, batches and whole folders from mapping sources to
//! their destinations. Each call runs to completion on the caller's thread;
//! status messages go to the configured `StatusSink`.
//!
//! ```rust,ignore
//! use filesync::config::{Mapping, SyncConfiguration};
//! use filesync::sync::SyncEngine;
//!
//! let mut config = SyncConfiguration::default();
//! config.mappings.push(Mapping::new("/proj/src", "/srv/www").exclude("*.tmp"));
//! config.exclude_folder_names.push("node_modules".to_string());
//!
//! let engine = SyncEngine::builder(config).build()?;
//! let report = engine.sync_folder("/proj/src");
//! println!("{}", report.summary());
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filetime::FileTime;
use ignore::WalkBuilder;

use crate::callbacks::{NoStatus, StatusEvent, StatusSink};
use crate::config::{Mapping, SettingsStore, SyncConfiguration};
use crate::error::SyncError;
use crate::logging::*;
use crate::resolver::MappingResolver;
use crate::validation::{normalize_path, validate_mapping_paths};

/// Why a path was left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
	/// Directory path contains a global exclusion substring
	Folder(String),
	/// Mapping exclude glob matched the full path
	Pattern(String),
}

impl fmt::Display for ExclusionReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExclusionReason::Folder(name) => write!(f, "excluded folder '{}'", name),
			ExclusionReason::Pattern(pattern) => write!(f, "exclude pattern '{}'", pattern),
		}
	}
}

/// Result of syncing one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
	Copied { source: PathBuf, destination: PathBuf },
	Excluded { path: PathBuf, reason: ExclusionReason },
	Unmapped { path: PathBuf },
}

impl SyncOutcome {
	pub fn is_copied(&self) -> bool {
		matches!(self, SyncOutcome::Copied { .. })
	}
}

/// A path that failed, paired with its error
#[derive(Debug)]
pub struct SyncFailure {
	pub path: PathBuf,
	pub error: SyncError,
}

impl fmt::Display for SyncFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.path.display(), self.error)
	}
}

/// Collected results of a batch or folder sync
#[derive(Debug, Default)]
pub struct SyncReport {
	/// (source, destination) pairs that were copied
	pub copied: Vec<(PathBuf, PathBuf)>,
	/// Paths that were excluded or not under any mapping
	pub skipped: Vec<PathBuf>,
	pub failures: Vec<SyncFailure>,
}

impl SyncReport {
	/// True when nothing failed
	pub fn is_success(&self) -> bool {
		self.failures.is_empty()
	}

	fn record(&mut self, path: &Path, result: Result<SyncOutcome, SyncError>) {
		match result {
			Ok(SyncOutcome::Copied { source, destination }) => {
				self.copied.push((source, destination))
			}
			Ok(SyncOutcome::Excluded { path, .. }) | Ok(SyncOutcome::Unmapped { path }) => {
				self.skipped.push(path)
			}
			Err(error) => self.failures.push(SyncFailure { path: path.to_path_buf(), error }),
		}
	}

	/// One-line summary, e.g. "3 copied, 1 skipped, 0 failed"
	pub fn summary(&self) -> String {
		format!(
			"{} copied, {} skipped, {} failed",
			self.copied.len(),
			self.skipped.len(),
			self.failures.len()
		)
	}
}

//////////
// Engine //
//////////

/// Builder for `SyncEngine`
pub struct SyncEngineBuilder {
	config: SyncConfiguration,
	status: Arc<dyn StatusSink>,
	store: Option<Arc<dyn SettingsStore>>,
}

impl SyncEngineBuilder {
	/// Status sink for copy notifications and failures
	pub fn status_sink<S: StatusSink + 'static>(mut self, sink: S) -> Self {
		self.status = Arc::new(sink);
		self
	}

	/// Store that receives the configuration after toggles and new mappings
	pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
		self.store = Some(store);
		self
	}

	/// Validate the configuration and build the engine
	pub fn build(self) -> Result<SyncEngine, SyncError> {
		let resolver = MappingResolver::new(&self.config)?;
		Ok(SyncEngine { config: self.config, resolver, status: self.status, store: self.store })
	}
}

/// Mapping-driven one-way mirroring engine
pub struct SyncEngine {
	config: SyncConfiguration,
	resolver: MappingResolver,
	status: Arc<dyn StatusSink>,
	store: Option<Arc<dyn SettingsStore>>,
}

impl SyncEngine {
	pub fn builder(config: SyncConfiguration) -> SyncEngineBuilder {
		SyncEngineBuilder { config, status: Arc::new(NoStatus), store: None }
	}

	pub fn config(&self) -> &SyncConfiguration {
		&self.config
	}

	pub fn resolver(&self) -> &MappingResolver {
		&self.resolver
	}

	/// Replace the configuration, e.g. after the settings file changed
	pub fn reload(&mut self, config: SyncConfiguration) -> Result<(), SyncError> {
		self.resolver = MappingResolver::new(&config)?;
		self.config = config;
		debug!("Configuration reloaded: {} mappings", self.config.mappings.len());
		Ok(())
	}

	fn persist(&self, config: &SyncConfiguration) -> Result<(), SyncError> {
		if let Some(ref store) = self.store {
			store.save(config)?;
		}
		Ok(())
	}

	// ========================================================================
	// ENABLED FLAG & COMMAND VISIBILITY
	// ========================================================================

	pub fn is_enabled(&self) -> bool {
		self.config.filesync_enabled
	}

	/// Flip the enabled flag and persist it; returns the new value
	pub fn enable_toggle(&mut self) -> Result<bool, SyncError> {
		let mut config = self.config.clone();
		config.filesync_enabled = !config.filesync_enabled;
		self.persist(&config)?;
		self.config = config;
		info!("FileSync {}", if self.is_enabled() { "enabled" } else { "disabled" });
		Ok(self.is_enabled())
	}

	/// Single-file sync command is offered
	pub fn file_command_visible<P: AsRef<Path>>(&self, paths: &[P]) -> bool {
		self.is_enabled() && paths.len() < 2 && self.is_syncable_batch(paths)
	}

	/// Multi-file sync command is offered
	pub fn files_command_visible<P: AsRef<Path>>(&self, paths: &[P]) -> bool {
		self.is_enabled() && paths.len() > 1 && self.is_syncable_batch(paths)
	}

	/// Open-settings command is offered
	pub fn settings_command_enabled(&self) -> bool {
		self.is_enabled()
	}

	// ========================================================================
	// RESOLUTION QUERIES
	// ========================================================================

	pub fn is_syncable(&self, path: impl AsRef<Path>) -> bool {
		self.resolver.is_syncable(path.as_ref())
	}

	pub fn is_syncable_batch<P: AsRef<Path>>(&self, paths: &[P]) -> bool {
		self.resolver.is_syncable_batch(paths)
	}

	pub fn resolve_destination(&self, path: impl AsRef<Path>) -> Option<PathBuf> {
		self.resolver.resolve_destination(path.as_ref())
	}

	/// Check `path` against the global list and its winning mapping's globs
	pub fn is_excluded(&self, path: impl AsRef<Path>) -> bool {
		let path = path.as_ref();
		match self.resolver.resolve(path) {
			Some(resolution) => self.resolver.is_excluded(&resolution.path, resolution.rule),
			None => self.resolver.folder_exclusions().should_exclude_file(&normalize_path(path)),
		}
	}

	// ========================================================================
	// MAPPINGS
	// ========================================================================

	/// Append a mapping and persist the configuration
	///
	/// An existing file given as `source` is replaced by its parent directory.
	/// Nothing is appended when validation or persistence fails.
	pub fn add_mapping(
		&mut self,
		source: impl AsRef<Path>,
		destination: impl AsRef<Path>,
	) -> Result<Mapping, SyncError> {
		let mut source = normalize_path(source.as_ref());
		let destination = normalize_path(destination.as_ref());
		validate_mapping_paths(&source, &destination)?;

		if source.is_file() {
			if let Some(parent) = source.parent() {
				source = parent.to_path_buf();
			}
			validate_mapping_paths(&source, &destination)?;
		}

		let mapping = Mapping::new(source, destination);
		let mut config = self.config.clone();
		config.mappings.push(mapping.clone());
		let resolver = MappingResolver::new(&config)?;
		self.persist(&config)?;

		self.config = config;
		self.resolver = resolver;
		info!("Added mapping {} -> {}", mapping.source.display(), mapping.destination.display());
		Ok(mapping)
	}

	// ========================================================================
	// SYNC OPERATIONS
	// ========================================================================

	/// Save trigger: syncs `path` only while the engine is enabled
	pub fn on_save(&self, path: impl AsRef<Path>) -> Result<Option<SyncOutcome>, SyncError> {
		if !self.is_enabled() {
			debug!("FileSync disabled, ignoring save of {}", path.as_ref().display());
			return Ok(None);
		}
		self.sync_file(path).map(Some)
	}

	/// Mirror one file to its mapped destination
	pub fn sync_file(&self, path: impl AsRef<Path>) -> Result<SyncOutcome, SyncError> {
		let path = normalize_path(path.as_ref());
		let result = self.sync_file_inner(path.clone());
		if let Err(ref e) = result {
			error!("FileSync: failed to sync {}: {}", path.display(), e);
			self.status.notify(StatusEvent::error(format!("FileSync: {}", e)));
		}
		result
	}

	fn sync_file_inner(&self, path: PathBuf) -> Result<SyncOutcome, SyncError> {
		if let Some(dir) = path.parent() {
			if let Some(name) = self.resolver.folder_exclusions().matching_name(dir) {
				debug!("Skipping {}: inside excluded folder '{}'", path.display(), name);
				let reason = ExclusionReason::Folder(name.to_string());
				return Ok(SyncOutcome::Excluded { path, reason });
			}
		}

		let resolution = match self.resolver.resolve(&path) {
			Some(r) => r,
			None => {
				debug!("No mapping for {}", path.display());
				return Ok(SyncOutcome::Unmapped { path });
			}
		};

		if let Some(pattern) = resolution.rule.excluding_pattern(&path) {
			debug!(
				"Skipping {}: matches exclude pattern '{}' of mapping #{}",
				path.display(),
				pattern,
				resolution.rule.index
			);
			let reason = ExclusionReason::Pattern(pattern.to_string());
			return Ok(SyncOutcome::Excluded { path, reason });
		}

		let destination = resolution.destination;
		mirror_file(&path, &destination)?;

		info!(
			source = %path.display(),
			destination = %destination.display(),
			mapping = resolution.rule.index,
			"file mirrored"
		);
		self.status.notify(StatusEvent::info(format!(
			"FileSync: {} -> {}",
			path.display(),
			destination.display()
		)));
		Ok(SyncOutcome::Copied { source: path, destination })
	}

	/// Sync each path in order; failures are collected, not fatal
	pub fn sync_files<I, P>(&self, paths: I) -> SyncReport
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let mut report = SyncReport::default();
		self.sync_each(paths, &mut report);
		self.finish_batch(&report);
		report
	}

	fn sync_each<I, P>(&self, paths: I, report: &mut SyncReport)
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		for path in paths {
			let path = path.as_ref();
			report.record(path, self.sync_file(path));
		}
	}

	/// Log the batch summary; warn through the status sink if anything failed
	fn finish_batch(&self, report: &SyncReport) {
		info!("FileSync batch: {}", report.summary());
		if !report.is_success() {
			self.status.notify(StatusEvent::warn(format!("FileSync: {}", report.summary())));
		}
	}

	/// Sync every file below `folder`, never descending into excluded folders
	pub fn sync_folder(&self, folder: impl AsRef<Path>) -> SyncReport {
		let folder = normalize_path(folder.as_ref());
		let mut report = SyncReport::default();

		if let Some(name) = self.resolver.folder_exclusions().matching_name(&folder) {
			info!("Folder {} is excluded by '{}', nothing to sync", folder.display(), name);
			return report;
		}

		if let Err(e) = fs::metadata(&folder) {
			warn!("Cannot sync folder {}: {}", folder.display(), e);
			let error = SyncError::io(&folder, e);
			report.failures.push(SyncFailure { path: folder, error });
			self.finish_batch(&report);
			return report;
		}

		let files = self.collect_files(&folder, &mut report);
		debug!("Collected {} files under {}", files.len(), folder.display());
		self.sync_each(files, &mut report);
		self.finish_batch(&report);
		report
	}

	/// Walk `folder` depth-first in file name order, pruning excluded directories
	fn collect_files(&self, folder: &Path, report: &mut SyncReport) -> Vec<PathBuf> {
		let exclusions = self.resolver.folder_exclusions().clone();
		let walker = WalkBuilder::new(folder)
			.standard_filters(false)
			.follow_links(false)
			.sort_by_file_name(|a, b| a.cmp(b))
			.filter_entry(move |entry| {
				let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
				!(is_dir && exclusions.should_exclude_dir(entry.path()))
			})
			.build();

		let mut files = Vec::new();
		for result in walker {
			match result {
				Ok(entry) => {
					let is_file = match entry.file_type() {
						Some(ft) if ft.is_file() => true,
						Some(ft) if ft.is_symlink() => entry.path().is_file(),
						_ => false,
					};
					if is_file {
						files.push(entry.into_path());
					}
				}
				Err(e) => {
					let path = walk_error_path(&e).unwrap_or(folder).to_path_buf();
					warn!("Cannot read {} during folder sync: {}", path.display(), e);
					let message = e.to_string();
					let source = e
						.into_io_error()
						.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
					report.failures.push(SyncFailure {
						path: path.clone(),
						error: SyncError::io(path, source),
					});
				}
			}
		}
		files
	}
}

/// Innermost path carried by a walk error
fn walk_error_path(err: &ignore::Error) -> Option<&Path> {
	match err {
		ignore::Error::WithPath { path, .. } => Some(path.as_path()),
		ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
			walk_error_path(err)
		}
		ignore::Error::Loop { child, .. } => Some(child.as_path()),
		_ => None,
	}
}

/// Create `dir` and its ancestors; an existing directory is fine
fn ensure_dir(dir: &Path) -> Result<(), SyncError> {
	match fs::create_dir_all(dir) {
		Ok(()) => Ok(()),
		// Lost a race against another creator
		Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
		Err(e) => Err(SyncError::io(dir, e)),
	}
}

/// Copy contents and permissions, then carry over access/modification times
fn mirror_file(source: &Path, destination: &Path) -> Result<(), SyncError> {
	let meta = fs::metadata(source).map_err(|e| SyncError::io(source, e))?;
	if is_same_file(source, &meta, destination) {
		return Err(SyncError::SameFile {
			source: source.to_path_buf(),
			destination: destination.to_path_buf(),
		});
	}

	if let Some(parent) = destination.parent() {
		ensure_dir(parent)?;
	}
	copy_contents(source, destination)?;

	let atime = FileTime::from_last_access_time(&meta);
	let mtime = FileTime::from_last_modification_time(&meta);
	filetime::set_file_times(destination, atime, mtime)
		.map_err(|e| SyncError::io(destination, e))?;
	Ok(())
}

/// Check if `destination` already exists and is the file at `source`
#[cfg(unix)]
fn is_same_file(_source: &Path, source_meta: &fs::Metadata, destination: &Path) -> bool {
	use std::os::unix::fs::MetadataExt;

	match fs::metadata(destination) {
		Ok(dest) => dest.dev() == source_meta.dev() && dest.ino() == source_meta.ino(),
		Err(_) => false,
	}
}

#[cfg(not(unix))]
fn is_same_file(source: &Path, _source_meta: &fs::Metadata, destination: &Path) -> bool {
	match (fs::canonicalize(source), fs::canonicalize(destination)) {
		(Ok(a), Ok(b)) => a == b,
		_ => false,
	}
}

/// Copy bytes and permissions over `destination`
///
/// A read-only destination (left behind by copying a read-only source) is
/// removed and the copy retried once.
fn copy_contents(source: &Path, destination: &Path) -> Result<(), SyncError> {
	match fs::copy(source, destination) {
		Ok(_) => Ok(()),
		Err(e) if e.kind() == io::ErrorKind::PermissionDenied && is_readonly_file(destination) => {
			debug!("Replacing read-only {}", destination.display());
			fs::remove_file(destination).map_err(|e| SyncError::io(destination, e))?;
			fs::copy(source, destination)
				.map(|_| ())
				.map_err(|e| copy_error(source, destination, e))
		}
		Err(e) => Err(copy_error(source, destination, e)),
	}
}

fn is_readonly_file(path: &Path) -> bool {
	fs::symlink_metadata(path).map_or(false, |m| m.is_file() && m.permissions().readonly())
}

/// Attribute a failed copy to the side that is at fault
fn copy_error(source: &Path, destination: &Path, e: io::Error) -> SyncError {
	if fs::File::open(source).is_err() {
		SyncError::io(source, e)
	} else {
		SyncError::io(destination, e)
	}
}


// vim: ts=4
