//! `components_builder` command-line tool.
//!
//! ```text
//! components_builder export [--format F] [--minify] <file>
//! components_builder validate <file>
//! components_builder stats <file>
//! components_builder save [--replace] <file>
//! components_builder show
//! ```
//!
//! `<file>` is a `.json`, `.js` or `.ts` file. `save` and `show` work on the
//! document persisted under `COMPONENTS_STORAGE_DIR`.

use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;
use tracing::{error, info, warn};

use components_builder::batch::{statistics, type_distribution};
use components_builder::export::{export_values, json, ExportOptions, UnknownFormat};
use components_builder::import::{import_file, parse_file, validate_components, ImportError, ImportOptions};
use components_builder::storage::{load_state, save_state, FileStorage, StorageError};
use components_builder::store::DocumentStore;
use components_builder::validation::{validate_many, validation_summary};
use components_builder::Config;

const USAGE: &str = "usage: components_builder <export [--format F] [--minify] | validate | stats | save [--replace]> <file>\n       components_builder show";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}\n{}", USAGE)]
    Usage(String),
    #[error(transparent)]
    Format(#[from] UnknownFormat),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command {
    Export { file: PathBuf, options: ExportOptions },
    Validate { file: PathBuf },
    Stats { file: PathBuf },
    Save { file: PathBuf, replace: bool },
    Show,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, CliError> {
    let mut args = args.into_iter();
    let command = args
        .next()
        .ok_or_else(|| CliError::Usage("missing command".into()))?;

    let mut options = ExportOptions::default();
    let mut replace = false;
    let mut file = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" | "-f" => {
                let value = args
                    .next()
                    .ok_or_else(|| CliError::Usage("--format needs a value".into()))?;
                options.format = value.parse()?;
            }
            "--minify" => options.minify = true,
            "--replace" => replace = true,
            flag if flag.starts_with('-') => {
                return Err(CliError::Usage(format!("unknown flag {flag}")));
            }
            _ if file.is_none() => file = Some(PathBuf::from(&arg)),
            _ => return Err(CliError::Usage(format!("unexpected argument {arg}"))),
        }
    }

    let need_file = |file: Option<PathBuf>| file.ok_or_else(|| CliError::Usage(format!("{command} needs a file")));
    Ok(match command.as_str() {
        "export" => Command::Export {
            file: need_file(file)?,
            options,
        },
        "validate" => Command::Validate { file: need_file(file)? },
        "stats" => Command::Stats { file: need_file(file)? },
        "save" => Command::Save {
            file: need_file(file)?,
            replace,
        },
        "show" => Command::Show,
        other => return Err(CliError::Usage(format!("unknown command {other}"))),
    })
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run(command: Command, config: &Config) -> Result<ExitCode, CliError> {
    match command {
        Command::Export { file, options } => {
            let values = parse_file(&file)?;
            let result = export_values(&values, options);
            info!(format = %result.format, bytes = result.size, "exported");
            println!("{}", result.content);
        }
        Command::Validate { file } => {
            let imported = validate_components(parse_file(&file)?);
            for warning in &imported.warnings {
                warn!("{warning}");
            }
            let result = validate_many(&imported.valid);
            for (key, errors) in &result.errors {
                for e in errors {
                    println!("{key}: {} [{}] {}", e.field, e.code, e.message);
                }
            }
            println!("{}", validation_summary(&result));
            if !result.valid || !imported.invalid.is_empty() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Stats { file } => {
            let imported = validate_components(parse_file(&file)?);
            let stats = statistics(&imported.valid);
            println!(
                "{} components, {} interactive, {} with errors",
                stats.total, stats.interactive, stats.with_errors
            );
            for share in type_distribution(&imported.valid) {
                println!(
                    "  {:<14} {:>3}  {:>5.1}%",
                    share.kind.display_name(),
                    share.count,
                    share.percentage
                );
            }
        }
        Command::Save { file, replace } => {
            let mut storage = FileStorage::new(&config.storage_dir);
            let state = load_state(&storage)?.unwrap_or_default();
            let mut store = DocumentStore::from_persisted(state, config.store_options());

            let options = ImportOptions {
                replace,
                ..Default::default()
            };
            let result = import_file(&mut store, &file, options);
            for warning in &result.warnings {
                warn!("{warning}");
            }
            if !result.success {
                return Err(CliError::Rejected(result.error.unwrap_or_default()));
            }

            save_state(&mut storage, &store.persisted())?;
            info!(
                imported = result.components.len(),
                total = store.len(),
                dir = %config.storage_dir.display(),
                "saved document"
            );
        }
        Command::Show => {
            let storage = FileStorage::new(&config.storage_dir);
            let state = load_state(&storage)?.unwrap_or_default();
            println!("{}", json::format_message(&state.components, false));
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // Initialise tracing (respects RUST_LOG env, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();
    let config = Config::from_env();

    let outcome = parse_args(std::env::args().skip(1)).and_then(|command| run(command, &config));
    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
