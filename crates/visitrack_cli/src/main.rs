//! Interactive Visitrack shell.
//!
//! Reads one command per stdin line, executes it against the store and
//! prints the feedback. Config comes from `visitrack.json` in the working
//! directory, or the file given with `--config`.

use clap::Parser;
use log::error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use visitrack_core::config::DEFAULT_CONFIG_FILE;
use visitrack_core::{
    core_version, init_logging_from_config, open_sqlite_or_fallback, AppConfig, DataStorage,
    JsonStorage, SqliteStorage, StorageBackend, TrackerService,
};

/// Interactive person/location/visit tracker.
#[derive(Debug, Parser)]
#[command(name = "visitrack", version, about)]
struct Args {
    /// Path to the JSON config file; a missing file means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("warning: {err}; using default configuration");
            AppConfig::default()
        }
    };

    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    println!("Visitrack {}", core_version());
    let result = match config.backend {
        StorageBackend::Json => run_shell(TrackerService::bootstrap(JsonStorage::new(
            config.data_dir.clone(),
        ))),
        StorageBackend::Sqlite => run_sqlite(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=app_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_sqlite(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_sqlite_or_fallback(config.sqlite_path())?;
    let storage = SqliteStorage::try_new(&conn)?;
    run_shell(TrackerService::bootstrap(storage))
}

fn run_shell<S: DataStorage>(
    mut service: TrackerService<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Type `help` for the list of commands.");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        match service.execute(&line) {
            Ok(outcome) => {
                println!("{}", outcome.message);
                if outcome.exit {
                    return Ok(());
                }
            }
            Err(err) => println!("Error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_defaults_and_can_be_overridden() {
        let args = Args::try_parse_from(["visitrack"]).unwrap();
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_FILE));

        let args = Args::try_parse_from(["visitrack", "--config", "alt.json"]).unwrap();
        assert_eq!(args.config, PathBuf::from("alt.json"));

        assert!(Args::try_parse_from(["visitrack", "--unknown"]).is_err());
    }
}
