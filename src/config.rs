//! Configuration for FileSync
//!
//! `SyncConfiguration` is the in-memory settings value the engine works on.
//! Reading and writing it is the job of a `SettingsStore`; the engine only
//! calls `save()` after it mutates the configuration itself.
//!
//! Settings file lookup:
//! 1. `--config <FILE>` on the command line
//! 2. `FILESYNC_CONFIG` environment variable
//! 3. `~/.filesync/settings.json`

use crate::error::ConfigError;
use crate::strategies::{BatchPolicy, MatchPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ============================================================================
// MAPPING
// ============================================================================

/// One mirroring rule: files under `source` are copied below `destination`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
	/// Source directory
	pub source: PathBuf,

	/// Destination directory
	pub destination: PathBuf,

	/// Shell-style globs matched against the full path of a source file
	#[serde(default, rename = "exclude_pattern_list", alias = "exclude_patterns")]
	pub exclude_patterns: Vec<String>,
}

impl Mapping {
	pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
		Mapping { source: source.into(), destination: destination.into(), exclude_patterns: vec![] }
	}

	/// Add an exclude glob
	pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
		self.exclude_patterns.push(pattern.into());
		self
	}
}

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfiguration {
	/// Ordered mapping list
	pub mappings: Vec<Mapping>,

	/// Substrings that disqualify any file whose directory path contains them
	pub exclude_folder_names: Vec<String>,

	/// Gates the save trigger and the visibility of manual sync commands
	#[serde(alias = "enabled")]
	pub filesync_enabled: bool,

	/// Tie-break between overlapping mappings
	pub match_policy: MatchPolicy,

	/// How a multi-path selection is judged syncable
	pub batch_policy: BatchPolicy,

	/// Delay before a status message is rendered (milliseconds)
	pub status_delay_ms: u64,
}

impl Default for SyncConfiguration {
	fn default() -> Self {
		SyncConfiguration {
			mappings: vec![],
			exclude_folder_names: vec![],
			filesync_enabled: true,
			match_policy: MatchPolicy::MostSpecific,
			batch_policy: BatchPolicy::AnyPath,
			status_delay_ms: 1000,
		}
	}
}

impl SyncConfiguration {
	/// Configuration reproducing the legacy resolution quirks
	pub fn legacy() -> Self {
		SyncConfiguration {
			match_policy: MatchPolicy::LastMatch,
			batch_policy: BatchPolicy::LastPath,
			..Default::default()
		}
	}
}

// ============================================================================
// SETTINGS STORES
// ============================================================================

/// Persistence collaborator for `SyncConfiguration`
pub trait SettingsStore: Send + Sync {
	fn load(&self) -> Result<SyncConfiguration, ConfigError>;

	fn save(&self, config: &SyncConfiguration) -> Result<(), ConfigError>;
}

/// File-backed settings: TOML for `.toml` files, JSON5 in / pretty JSON out otherwise
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
	path: PathBuf,
}

impl JsonSettingsStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		JsonSettingsStore { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn is_toml(&self) -> bool {
		self.path.extension().map_or(false, |ext| ext == "toml")
	}
}

impl SettingsStore for JsonSettingsStore {
	fn load(&self) -> Result<SyncConfiguration, ConfigError> {
		let contents = match fs::read_to_string(&self.path) {
			Ok(c) => c,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Ok(SyncConfiguration::default());
			}
			Err(e) => return Err(ConfigError::ReadFailed { path: self.path.clone(), source: e }),
		};

		let parsed = if self.is_toml() {
			toml::from_str(&contents).map_err(|e| e.to_string())
		} else {
			json5::from_str(&contents).map_err(|e| e.to_string())
		};
		parsed.map_err(|message| ConfigError::ParseFailed { path: self.path.clone(), message })
	}

	fn save(&self, config: &SyncConfiguration) -> Result<(), ConfigError> {
		let contents = if self.is_toml() {
			toml::to_string_pretty(config).map_err(|e| e.to_string())
		} else {
			serde_json::to_string_pretty(config).map_err(|e| e.to_string())
		}
		.map_err(|message| ConfigError::SerializeFailed { message })?;

		if let Some(parent) = self.path.parent() {
			if !parent.as_os_str().is_empty() {
				fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFailed {
					path: parent.to_path_buf(),
					source: e,
				})?;
			}
		}
		fs::write(&self.path, contents)
			.map_err(|e| ConfigError::WriteFailed { path: self.path.clone(), source: e })
	}
}

/// In-memory settings store; remembers the last saved configuration
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
	saved: Mutex<Option<SyncConfiguration>>,
}

impl MemorySettingsStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Last configuration passed to `save()`
	pub fn last_saved(&self) -> Option<SyncConfiguration> {
		self.saved.lock().ok().and_then(|guard| guard.clone())
	}
}

impl SettingsStore for MemorySettingsStore {
	fn load(&self) -> Result<SyncConfiguration, ConfigError> {
		Ok(self.last_saved().unwrap_or_default())
	}

	fn save(&self, config: &SyncConfiguration) -> Result<(), ConfigError> {
		if let Ok(mut guard) = self.saved.lock() {
			*guard = Some(config.clone());
		}
		Ok(())
	}
}

/// Default settings file location
pub fn default_settings_path() -> PathBuf {
	if let Ok(path) = std::env::var("FILESYNC_CONFIG") {
		return PathBuf::from(path);
	}
	std::env::var("HOME")
		.ok()
		.map(|h| PathBuf::from(h).join(".filesync"))
		.unwrap_or_else(|| PathBuf::from(".filesync"))
		.join("settings.json")
}


// vim: ts=4
