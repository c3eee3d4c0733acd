//! FileWarden CLI - drive checking runs and repairs from the shell.
//!
//! Each invocation opens the store, performs one step and exits, so a
//! scheduler can call `checking-execute` repeatedly until the run finishes.

mod handlers;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filewarden_core::config::{AppConfig, CheckingConfig};
use filewarden_core::{FileWarden, StateBackend};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "filewarden")]
#[command(about = "Integrity checking and repair for a managed file store")]
struct Args {
    /// Store root directory
    #[arg(long, global = true, env = AppConfig::ROOT_ENV_VAR)]
    root: Option<PathBuf>,

    /// Root a URI scheme at a directory (name=dir, repeatable)
    #[arg(long = "scheme", global = true, value_parser = parse_scheme)]
    schemes: Vec<(String, PathBuf)>,

    /// Keep run state in data/checking-run.json instead of the catalog database
    #[arg(long, global = true)]
    json_state: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request a checking run over the whole catalog
    CheckingStart,

    /// Cancel the current checking run
    CheckingCancel,

    /// Check files for up to the given number of seconds
    CheckingExecute {
        #[arg(default_value_t = CheckingConfig::DEFAULT_SLICE_SECONDS)]
        seconds: u64,

        /// List every missing file found in this slice
        #[arg(long)]
        log: bool,
    },

    /// Move files back to the paths the catalog expects
    CheckingRepair {
        mapping_file: PathBuf,

        /// Report each move before it happens
        #[arg(long)]
        log: bool,

        /// Two-column `expected,current` layout
        #[arg(long)]
        legacy: bool,

        /// Skip the first row
        #[arg(long)]
        has_headers: bool,

        /// Field delimiter
        #[arg(long, default_value_t = ',', value_parser = parse_delimiter)]
        delimiter: char,
    },

    /// Show the current checking run
    CheckingStatus,

    /// Register URIs in the catalog
    CatalogAdd {
        #[arg(required = true)]
        uris: Vec<String>,
    },
}

fn parse_scheme(s: &str) -> std::result::Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => {
            Ok((name.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("expected name=dir, got '{}'", s)),
    }
}

fn parse_delimiter(s: &str) -> std::result::Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!("delimiter must be a single ASCII character, got '{}'", s)),
    }
}

fn default_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(AppConfig::APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn init_logging(debug: bool) {
    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact();

    if std::env::var_os("RUST_LOG").is_some() {
        builder.with_env_filter(EnvFilter::from_default_env()).init();
    } else {
        let log_level = if debug { Level::DEBUG } else { Level::INFO };
        builder.with_max_level(log_level).init();
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.debug);

    let root = args.root.unwrap_or_else(default_root);
    debug!("Store root: {}", root.display());

    let mut builder = FileWarden::builder(&root).auto_create_dirs(true);
    for (scheme, dir) in args.schemes {
        builder = builder.with_scheme(scheme, dir);
    }
    if args.json_state {
        builder = builder.state_backend(StateBackend::Json);
    }
    let warden = builder
        .build()
        .with_context(|| format!("Failed to open store at {}", root.display()))?;

    let output = handlers::Output::new(args.json);
    match args.command {
        Command::CheckingStart => handlers::checking_start(&warden, &output),
        Command::CheckingCancel => handlers::checking_cancel(&warden, &output),
        Command::CheckingExecute { seconds, log } => {
            handlers::checking_execute(&warden, &output, seconds, log)
        }
        Command::CheckingRepair {
            mapping_file,
            log,
            legacy,
            has_headers,
            delimiter,
        } => handlers::checking_repair(
            &warden,
            &output,
            &mapping_file,
            handlers::mapping_layout(legacy, has_headers, delimiter),
            log,
        ),
        Command::CheckingStatus => handlers::checking_status(&warden, &output),
        Command::CatalogAdd { uris } => handlers::catalog_add(&warden, &output, &uris),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheme() {
        assert_eq!(
            parse_scheme("archive=/mnt/archive").unwrap(),
            ("archive".to_string(), PathBuf::from("/mnt/archive"))
        );
        assert!(parse_scheme("archive").is_err());
        assert!(parse_scheme("=/mnt").is_err());
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";").unwrap(), ';');
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn test_args_parse_repair() {
        let args = Args::try_parse_from([
            "filewarden",
            "--root",
            "/tmp/store",
            "checking-repair",
            "map.csv",
            "--legacy",
            "--delimiter",
            ";",
        ])
        .unwrap();

        match args.command {
            Command::CheckingRepair {
                legacy, delimiter, ..
            } => {
                assert!(legacy);
                assert_eq!(delimiter, ';');
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
