//! Reserve CLI - track payroll acquisition leads from the terminal
//!
//! Every change lands in the local store first; cloud sync runs in the
//! background and is awaited before the process exits.

mod cli;
mod commands;
mod config;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;
use reserve_core::User;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ConfigCommands, RecordCommands, UserCommands};
use crate::commands::common::App;
use crate::commands::completions::run_completions;
use crate::commands::config::{run_config_set, run_config_show};
use crate::commands::export::run_export;
use crate::commands::summary::run_summary;
use crate::commands::sync::run_sync;
use crate::commands::{record, session, user};
use crate::config::{resolve_actor, resolve_db_path};
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVES: &str = "warn,reserve_cli=info,reserve_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let db_path = resolve_db_path(cli.db_path);
    let app = App::open(&db_path, resolve_actor(cli.actor))?;

    let result = dispatch(&app, cli.command).await;
    app.finish().await;
    result
}

async fn dispatch(app: &App, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Record(command) => match command {
            RecordCommands::Add {
                company,
                fields,
                force,
            } => record::run_add(app, &company, fields, force),
            RecordCommands::List {
                filter,
                sort,
                asc,
                limit,
                json,
            } => record::run_list(app, &filter, sort, asc, limit, json),
            RecordCommands::Show { id, json } => record::run_show(app, &id, json),
            RecordCommands::Update {
                id,
                company,
                fields,
                owner,
            } => record::run_update(app, &id, company, fields, owner.as_deref()),
            RecordCommands::Delete { id } => record::run_delete(app, &id),
            RecordCommands::Import { path } => record::run_import(app, &path),
        },
        Commands::User(command) => match command {
            UserCommands::Add {
                employee_id,
                name,
                role,
                department,
                line,
                title,
                target,
            } => {
                let mut new_user = User::new(employee_id, name, role, department, line);
                new_user.title = title;
                new_user.yearly_target = target;
                user::run_add(app, new_user)
            }
            UserCommands::List { json } => user::run_list(app, json),
            UserCommands::Delete { employee_id } => user::run_delete(app, &employee_id),
            UserCommands::Import { path } => user::run_import(app, &path),
        },
        Commands::Use { employee_id } => session::run_use(app, &employee_id),
        Commands::Whoami => session::run_whoami(app),
        Commands::Logout => session::run_logout(app),
        Commands::Summary { json } => run_summary(app, json),
        Commands::Export { format, output } => run_export(app, format, output.as_deref()),
        Commands::Config(command) => match command {
            ConfigCommands::Show => run_config_show(app),
            ConfigCommands::Set {
                enable,
                disable,
                api_key,
                bin_id,
            } => run_config_set(app, enable, disable, api_key, bin_id),
        },
        Commands::Sync => run_sync(app).await,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
    }
}
