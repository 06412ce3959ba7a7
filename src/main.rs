// vim: ts=4
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use filesync::callbacks::{DeferredStatus, StatusLevel};
use filesync::config::{default_settings_path, JsonSettingsStore, SettingsStore};
use filesync::logging::{self, *};
use filesync::sync::{SyncEngine, SyncOutcome, SyncReport};
use filesync::validation::Validator;

///////////////////////
// Utility functions //
///////////////////////

fn paths_arg(matches: &ArgMatches, name: &str) -> Vec<PathBuf> {
	matches.get_many::<String>(name).map(|v| v.map(PathBuf::from).collect()).unwrap_or_default()
}

fn path_arg(matches: &ArgMatches, name: &str) -> Result<PathBuf, Box<dyn Error>> {
	matches
		.get_one::<String>(name)
		.map(PathBuf::from)
		.ok_or_else(|| format!("{}: argument required", name).into())
}

fn print_outcome(outcome: &SyncOutcome) {
	match outcome {
		SyncOutcome::Copied { source, destination } => {
			println!("copied   {} -> {}", source.display(), destination.display())
		}
		SyncOutcome::Excluded { path, reason } => {
			println!("excluded {} ({})", path.display(), reason)
		}
		SyncOutcome::Unmapped { path } => println!("unmapped {}", path.display()),
	}
}

fn print_report(report: &SyncReport) -> ExitCode {
	for failure in &report.failures {
		eprintln!("failed   {}", failure);
	}
	println!("{}", report.summary());
	if report.is_success() {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	}
}

fn cli() -> Command {
	Command::new("FileSync")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Mirror files from mapped source folders to their destinations")
		.subcommand_required(true)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.help("Settings file (default: $FILESYNC_CONFIG or ~/.filesync/settings.json)"),
		)
		.subcommand(
			Command::new("file").about("Sync one file").arg(Arg::new("path").required(true)),
		)
		.subcommand(
			Command::new("files")
				.about("Sync several files")
				.arg(Arg::new("path").required(true).action(ArgAction::Append).num_args(1..)),
		)
		.subcommand(
			Command::new("folder")
				.about("Sync every file below a folder")
				.arg(Arg::new("dir").required(true)),
		)
		.subcommand(
			Command::new("saved")
				.about("Save hook: sync a file if FileSync is enabled")
				.arg(Arg::new("path").required(true)),
		)
		.subcommand(
			Command::new("check")
				.about("Show whether paths are syncable and which commands apply")
				.arg(Arg::new("path").required(true).action(ArgAction::Append).num_args(1..)),
		)
		.subcommand(
			Command::new("resolve")
				.about("Print the destination of a path")
				.arg(Arg::new("path").required(true)),
		)
		.subcommand(
			Command::new("add-mapping")
				.about("Add a source -> destination mapping")
				.arg(Arg::new("source").required(true))
				.arg(Arg::new("destination").required(true)),
		)
		.subcommand(Command::new("toggle").about("Enable or disable FileSync"))
}

fn run(engine: &mut SyncEngine, matches: &ArgMatches) -> Result<ExitCode, Box<dyn Error>> {
	match matches.subcommand() {
		Some(("file", sub)) => {
			print_outcome(&engine.sync_file(path_arg(sub, "path")?)?);
			Ok(ExitCode::SUCCESS)
		}
		Some(("files", sub)) => Ok(print_report(&engine.sync_files(paths_arg(sub, "path")))),
		Some(("folder", sub)) => Ok(print_report(&engine.sync_folder(path_arg(sub, "dir")?))),
		Some(("saved", sub)) => {
			if let Some(outcome) = engine.on_save(path_arg(sub, "path")?)? {
				print_outcome(&outcome);
			}
			Ok(ExitCode::SUCCESS)
		}
		Some(("check", sub)) => {
			let paths = paths_arg(sub, "path");
			for path in &paths {
				let destination = engine.resolve_destination(path);
				println!(
					"{}: syncable={} excluded={} destination={}",
					path.display(),
					engine.is_syncable(path),
					engine.is_excluded(path),
					destination.as_ref().map_or("-".to_string(), |d| d.display().to_string())
				);
			}
			println!("enabled={}", engine.is_enabled());
			println!("batch syncable={}", engine.is_syncable_batch(&paths));
			println!("file command={}", engine.file_command_visible(&paths));
			println!("files command={}", engine.files_command_visible(&paths));
			Ok(ExitCode::SUCCESS)
		}
		Some(("resolve", sub)) => match engine.resolve_destination(path_arg(sub, "path")?) {
			Some(destination) => {
				println!("{}", destination.display());
				Ok(ExitCode::SUCCESS)
			}
			None => {
				eprintln!("no mapping");
				Ok(ExitCode::FAILURE)
			}
		},
		Some(("add-mapping", sub)) => {
			let source = path_arg(sub, "source")?;
			let mapping = engine.add_mapping(source, path_arg(sub, "destination")?)?;
			println!("{} -> {}", mapping.source.display(), mapping.destination.display());
			Ok(ExitCode::SUCCESS)
		}
		Some(("toggle", _)) => {
			let enabled = engine.enable_toggle()?;
			println!("FileSync {}", if enabled { "enabled" } else { "disabled" });
			Ok(ExitCode::SUCCESS)
		}
		_ => Err("unknown subcommand".into()),
	}
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
	let matches = cli().get_matches();
	logging::init_tracing();

	let settings_path =
		matches
			.get_one::<String>("config")
			.map(PathBuf::from)
			.unwrap_or_else(default_settings_path);
	debug!("settings: {}", settings_path.display());
	let store = Arc::new(JsonSettingsStore::new(settings_path));
	let config = store.load()?;
	if let Err(e) = config.validate() {
		error!("Invalid settings in {}: {}", store.path().display(), e);
		return Err(e.into());
	}

	let (status, renderer) =
		DeferredStatus::spawn(Duration::from_millis(config.status_delay_ms), |event| {
			match event.level {
				StatusLevel::Info => println!("{}", event.message),
				StatusLevel::Warn | StatusLevel::Error => eprintln!("{}", event.message),
			}
		});

	let mut engine = SyncEngine::builder(config).status_sink(status).settings_store(store).build()?;
	let result = run(&mut engine, &matches);

	// Dropping the engine closes the status channel; wait for queued messages
	drop(engine);
	if let Err(e) = renderer.await {
		warn!("status renderer stopped: {}", e);
	}

	result
}
