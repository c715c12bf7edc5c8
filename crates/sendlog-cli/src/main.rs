mod backend;
mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{
    completions, contacts, export, import, log, lookup, template, Context,
};
use crate::error::{exit_code_for, report_error};
use crate::util::{parse_company_scope, parse_platform};
use sendlog_config as config;
use sendlog_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "sendlog", version, about = "Log off-platform emails against contacts")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Company scope for lookups and new contacts (overrides config)
    #[arg(long, global = true)]
    company_scope: Option<String>,
    /// Platform tag for records that carry none (overrides config)
    #[arg(long, global = true)]
    platform: Option<String>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
    #[command(subcommand)]
    Template(template::TemplateCommand),
    #[command(name = "add-contact")]
    AddContact(contacts::AddContactArgs),
    Show(contacts::ShowArgs),
    List(contacts::ListArgs),
    /// Show how an address resolves to a contact
    Lookup(lookup::LookupArgs),
    #[command(subcommand)]
    Import(import::ImportCommand),
    #[command(subcommand)]
    Export(export::ExportCommand),
    /// Log a pasted email (file or stdin)
    #[command(name = "log-email")]
    LogEmail(log::LogEmailArgs),
    /// Log a send from individual fields
    #[command(name = "log-send")]
    LogSend(log::LogSendArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        company_scope,
        platform,
        json,
        verbose,
        command,
    } = cli;

    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Template(cmd) => template::run(cmd, json),
        command => {
            let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
            if verbose {
                match config::resolve_config_path(config_path.clone()) {
                    Ok(path) => {
                        if path.exists() {
                            debug!(path = %path.display(), "config resolved");
                        } else {
                            debug!(path = %path.display(), "config missing, using defaults");
                        }
                    }
                    Err(err) => {
                        debug!(error = %err, "config unavailable");
                    }
                }
            }

            let scope = match company_scope.as_deref() {
                Some(raw) => Some(parse_company_scope(raw)?),
                None => app_config.company_scope.clone(),
            };
            let platform = match platform.as_deref() {
                Some(raw) => parse_platform(raw)?,
                None => app_config.default_platform.clone(),
            };

            let db_path =
                paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
            if verbose {
                debug!(path = %db_path.display(), "database path resolved");
            }

            let store = Store::open(&db_path)
                .with_context(|| format!("open database {}", db_path.display()))?;
            store.migrate().with_context(|| "run migrations")?;

            let ctx = Context {
                store: &store,
                json,
                config: &app_config,
                scope,
                platform,
            };

            match command {
                Command::AddContact(args) => contacts::add_contact(&ctx, args),
                Command::Show(args) => contacts::show_contact(&ctx, args),
                Command::List(args) => contacts::list_contacts(&ctx, args),
                Command::Lookup(args) => lookup::lookup(&ctx, args),
                Command::Import(cmd) => match cmd {
                    import::ImportCommand::Csv(args) => import::import_csv(&ctx, args),
                },
                Command::Export(cmd) => match cmd {
                    export::ExportCommand::Csv(args) => export::export_csv(&ctx, args),
                },
                Command::LogEmail(args) => log::log_email(&ctx, args),
                Command::LogSend(args) => log::log_send(&ctx, args),
                Command::Completions(_) | Command::Template(_) => {
                    unreachable!("handled before store initialization")
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
