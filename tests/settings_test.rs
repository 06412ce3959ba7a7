/// Mapping management, enabled flag and settings persistence
///
/// Covers add_mapping validation, the enabled toggle, command visibility,
/// the save hook and reload, with settings written through a real store.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use filesync::config::{
	JsonSettingsStore, Mapping, MemorySettingsStore, SettingsStore, SyncConfiguration,
};
use filesync::error::SyncError;
use filesync::strategies::BatchPolicy;
use filesync::sync::SyncEngine;

fn create_file(dir: &Path, name: &str, content: &str) -> PathBuf {
	let path = dir.join(name);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(&path, content).unwrap();
	path
}

// ===================================================================
// ADD MAPPING
// ===================================================================

#[test]
fn test_add_mapping_uses_parent_of_file() {
	let root = TempDir::new().unwrap();
	let file = create_file(root.path(), "a/b.txt", "b");
	let mut engine = SyncEngine::builder(SyncConfiguration::default()).build().unwrap();

	let mapping = engine.add_mapping(&file, root.path().join("dest")).unwrap();

	assert_eq!(mapping.source, root.path().join("a"));
	assert_eq!(engine.config().mappings, vec![mapping]);
	assert!(engine.is_syncable(&file));
}

#[test]
fn test_add_mapping_same_paths_fails() {
	let store = Arc::new(MemorySettingsStore::new());
	let mut engine = SyncEngine::builder(SyncConfiguration::default())
		.settings_store(store.clone())
		.build()
		.unwrap();

	let result = engine.add_mapping("/same", "/same");

	assert!(matches!(result, Err(SyncError::InvalidMapping { .. })));
	assert!(engine.config().mappings.is_empty());
	assert!(store.last_saved().is_none());
}

#[test]
fn test_add_mapping_file_inside_destination_fails() {
	let root = TempDir::new().unwrap();
	let file = create_file(root.path(), "site/index.html", "<html>");
	let mut engine = SyncEngine::builder(SyncConfiguration::default()).build().unwrap();

	// The file's parent is the destination itself
	let result = engine.add_mapping(&file, root.path().join("site"));

	assert!(matches!(result, Err(SyncError::InvalidMapping { .. })));
	assert!(engine.config().mappings.is_empty());
}

#[test]
fn test_add_mapping_appends_and_persists() {
	let root = TempDir::new().unwrap();
	let store = Arc::new(JsonSettingsStore::new(root.path().join("settings.json")));
	let mut config = SyncConfiguration::default();
	config.mappings.push(Mapping::new("/first", "/first-out"));
	let mut engine = SyncEngine::builder(config).settings_store(store.clone()).build().unwrap();

	engine.add_mapping("/second", "/second-out").unwrap();

	let saved = store.load().unwrap();
	assert_eq!(saved.mappings.len(), 2);
	assert_eq!(saved.mappings[0].source, PathBuf::from("/first"));
	assert_eq!(saved.mappings[1].source, PathBuf::from("/second"));
	assert_eq!(saved.mappings[1].destination, PathBuf::from("/second-out"));
}

// ===================================================================
// ENABLED FLAG
// ===================================================================

#[test]
fn test_toggle_flips_and_persists() {
	let root = TempDir::new().unwrap();
	let store = Arc::new(JsonSettingsStore::new(root.path().join("settings.json")));
	let mut engine = SyncEngine::builder(SyncConfiguration::default())
		.settings_store(store.clone())
		.build()
		.unwrap();

	assert!(engine.is_enabled());
	assert!(!engine.enable_toggle().unwrap());
	assert!(!store.load().unwrap().filesync_enabled);
	assert!(engine.enable_toggle().unwrap());
	assert!(store.load().unwrap().filesync_enabled);
}

#[test]
fn test_toggle_persist_failure_keeps_flag() {
	let root = TempDir::new().unwrap();
	let blocker = create_file(root.path(), "blocker", "not a dir");
	let store = Arc::new(JsonSettingsStore::new(blocker.join("settings.json")));
	let mut engine =
		SyncEngine::builder(SyncConfiguration::default()).settings_store(store).build().unwrap();

	assert!(matches!(engine.enable_toggle(), Err(SyncError::Config(_))));
	assert!(engine.is_enabled());
}

#[test]
fn test_save_hook_respects_enabled_flag() {
	let root = TempDir::new().unwrap();
	let src = root.path().join("src");
	let dest = root.path().join("dest");
	let file = create_file(&src, "saved.txt", "v1");
	let config = SyncConfiguration {
		mappings: vec![Mapping::new(&src, &dest)],
		filesync_enabled: false,
		..Default::default()
	};
	let mut engine = SyncEngine::builder(config).build().unwrap();

	assert_eq!(engine.on_save(&file).unwrap(), None);
	assert!(!dest.join("saved.txt").exists());

	// Explicit sync is not gated
	assert!(engine.sync_file(&file).unwrap().is_copied());

	fs::write(&file, "v2").unwrap();
	engine.enable_toggle().unwrap();
	assert!(engine.on_save(&file).unwrap().unwrap().is_copied());
	assert_eq!(fs::read_to_string(dest.join("saved.txt")).unwrap(), "v2");
}

#[test]
fn test_command_visibility() {
	let config = SyncConfiguration {
		mappings: vec![Mapping::new("/proj", "/deploy")],
		..Default::default()
	};
	let mut engine = SyncEngine::builder(config).build().unwrap();

	assert!(engine.file_command_visible(&["/proj/a"]));
	assert!(!engine.file_command_visible(&["/proj/a", "/proj/b"]));
	assert!(engine.files_command_visible(&["/proj/a", "/proj/b"]));
	assert!(!engine.files_command_visible(&["/x/a", "/y/b"]));
	assert!(!engine.file_command_visible(&["/other/a"]));
	assert!(engine.settings_command_enabled());

	engine.enable_toggle().unwrap();
	assert!(!engine.file_command_visible(&["/proj/a"]));
	assert!(!engine.files_command_visible(&["/proj/a", "/proj/b"]));
	assert!(!engine.settings_command_enabled());
}

// ===================================================================
// RELOAD
// ===================================================================

#[test]
fn test_reload_replaces_configuration() {
	let mut engine = SyncEngine::builder(SyncConfiguration::default()).build().unwrap();
	assert!(!engine.is_syncable("/proj/a"));

	let config = SyncConfiguration {
		mappings: vec![Mapping::new("/proj", "/deploy")],
		batch_policy: BatchPolicy::LastPath,
		..Default::default()
	};
	engine.reload(config).unwrap();

	assert!(engine.is_syncable("/proj/a"));
	assert!(!engine.is_syncable_batch(&["/proj/a", "/elsewhere"]));
}

#[test]
fn test_reload_rejects_invalid_configuration() {
	let mut engine = SyncEngine::builder(SyncConfiguration {
		mappings: vec![Mapping::new("/proj", "/deploy")],
		..Default::default()
	})
	.build()
	.unwrap();

	let bad = SyncConfiguration {
		mappings: vec![Mapping::new("/proj", "/deploy").exclude("[broken")],
		..Default::default()
	};
	assert!(matches!(engine.reload(bad), Err(SyncError::InvalidPattern { .. })));
	// Previous configuration stays active
	assert_eq!(engine.resolve_destination("/proj/x"), Some(PathBuf::from("/deploy/x")));
}

#[test]
fn test_engines_are_independent() {
	let a = SyncEngine::builder(SyncConfiguration {
		mappings: vec![Mapping::new("/a", "/a-out")],
		..Default::default()
	})
	.build()
	.unwrap();
	let b = SyncEngine::builder(SyncConfiguration::default()).build().unwrap();

	assert!(a.is_syncable("/a/file"));
	assert!(!b.is_syncable("/a/file"));
}

// vim: ts=4
