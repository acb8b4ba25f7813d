//! CLI smoke and inspection entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `formiq_core` linkage.
//! - Inspect exported form files and the autosave slot without a UI.
//!
//! ```bash
//! formiq_cli
//! formiq_cli templates registration
//! formiq_cli inspect contact.json
//! FORMIQ_DB_PATH=/tmp/formiq.db formiq_cli restore
//! ```

use chrono::Utc;
use clap::{Parser, Subcommand};
use formiq_core::db::open_db;
use formiq_core::{
    default_log_level, init_logging, search_templates, Autosaver, AutosaveConfig, FormStore,
    SqliteAutosaveStorage,
};
use log::{error, info};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_DB_FILE: &str = "formiq_autosave.sqlite3";

#[derive(Parser)]
#[command(name = "formiq_cli")]
#[command(version)]
#[command(about = "FormIQ form editing core tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the core version
    Version,
    /// List built-in templates
    Templates {
        /// Case-insensitive title/description filter
        #[arg(default_value = "")]
        query: String,
    },
    /// Import an exported form file and list its fields
    Inspect { file: PathBuf },
    /// Show the autosave record eligible for restore
    Restore {
        /// Autosave database path
        #[arg(long, env = "FORMIQ_DB_PATH")]
        db_path: Option<PathBuf>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Templates { .. } => "templates",
            Self::Inspect { .. } => "inspect",
            Self::Restore { .. } => "restore",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_dir = env::temp_dir().join("formiq_logs");
    if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    let command = cli.command.unwrap_or(Commands::Version);
    let name = command.name();
    info!("event=cli_command module=cli status=start command={name}");

    let result = match command {
        Commands::Version => {
            println!("formiq_core version={}", formiq_core::core_version());
            Ok(())
        }
        Commands::Templates { query } => {
            list_templates(&query);
            Ok(())
        }
        Commands::Inspect { file } => inspect(&file),
        Commands::Restore { db_path } => restore(resolve_db_path(db_path)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error command={name} error={message}");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn list_templates(query: &str) {
    for template in search_templates(query) {
        println!(
            "{} ({} fields) - {}",
            template.title,
            template.field_count(),
            template.description
        );
    }
}

fn inspect(path: &Path) -> Result<(), String> {
    let json =
        std::fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    let mut store = FormStore::new();
    store
        .import_form(&json)
        .map_err(|err| format!("{}: {err}", path.display()))?;

    let form = store.form();
    println!("{} [{} fields]", form.title, form.fields.len());
    for (index, field) in form.fields.iter().enumerate() {
        let required = if field.required { " *" } else { "" };
        println!("{index:>3}. {:<9} {}{required}", field.kind, field.label);
    }
    Ok(())
}

fn restore(path: PathBuf) -> Result<(), String> {
    let conn = open_db(&path).map_err(|err| format!("{}: {err}", path.display()))?;
    let autosaver = Autosaver::new(SqliteAutosaveStorage::new(&conn), AutosaveConfig::default());

    match autosaver
        .restore_candidate(Utc::now())
        .map_err(|err| err.to_string())?
    {
        Some(record) => println!(
            "restorable: {} ({} fields) saved at {}",
            record.form.title,
            record.form.fields.len(),
            record.timestamp.to_rfc3339()
        ),
        None => println!("no restorable autosave in {}", path.display()),
    }
    Ok(())
}

fn resolve_db_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| env::temp_dir().join(DEFAULT_DB_FILE))
}

#[cfg(test)]
mod tests {
    use super::{resolve_db_path, Cli, Commands, DEFAULT_DB_FILE};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_version() {
        let cli = Cli::try_parse_from(["formiq_cli"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn subcommands_parse_their_arguments() {
        let cli = Cli::try_parse_from(["formiq_cli", "templates"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Templates { ref query }) if query.is_empty()));

        let cli = Cli::try_parse_from(["formiq_cli", "inspect", "form.json"]).unwrap();
        assert!(
            matches!(cli.command, Some(Commands::Inspect { ref file }) if file == &PathBuf::from("form.json"))
        );

        let cli =
            Cli::try_parse_from(["formiq_cli", "restore", "--db-path", "/tmp/a.db"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Restore { db_path: Some(ref path) }) if path == &PathBuf::from("/tmp/a.db")
        ));
    }

    #[test]
    fn inspect_requires_a_file_and_unknown_commands_fail() {
        assert!(Cli::try_parse_from(["formiq_cli", "inspect"]).is_err());
        assert!(Cli::try_parse_from(["formiq_cli", "publish"]).is_err());
    }

    #[test]
    fn blank_db_path_falls_back_to_temp_dir() {
        let path = resolve_db_path(Some(PathBuf::new()));
        assert!(path.ends_with(DEFAULT_DB_FILE));
    }
}
