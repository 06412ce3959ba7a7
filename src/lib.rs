//! # FileSync - One-way directory mirroring
//!
//! FileSync copies files from source trees to destination trees according to
//! an ordered list of mappings. Folders whose path contains a globally excluded
//! name are never touched, and each mapping can exclude files with shell-style
//! globs. Copies overwrite the destination and keep the source timestamps.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use filesync::{Mapping, SyncConfiguration, SyncEngine};
//!
//! let mut config = SyncConfiguration::default();
//! config.mappings.push(Mapping::new("/home/me/site", "/srv/www"));
//! config.exclude_folder_names.push(".git".to_string());
//!
//! let engine = SyncEngine::builder(config).build()?;
//! if engine.is_syncable("/home/me/site/index.html") {
//!     engine.sync_file("/home/me/site/index.html")?;
//! }
//! ```

pub mod callbacks;
pub mod config;
pub mod error;
pub mod exclusion;
pub mod logging;
pub mod resolver;
pub mod strategies;
pub mod sync;
pub mod validation;

// Re-export commonly used types
pub use callbacks::{DeferredStatus, StatusEvent, StatusLevel, StatusSink};
pub use config::{JsonSettingsStore, Mapping, SettingsStore, SyncConfiguration};
pub use error::{ConfigError, SyncError};
pub use resolver::MappingResolver;
pub use strategies::{BatchPolicy, MatchPolicy};
pub use sync::{SyncEngine, SyncOutcome, SyncReport};

// vim: ts=4
