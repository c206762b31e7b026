//! crisp - command-line client for the CRISP threat-intelligence platform.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod confirm;
mod error;

use clap::Parser;

use crate::cli::{AuthCommands, Cli, Commands, ConfigCommands, TrustDecision};
use crate::error::CliError;

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
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crisp=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Auth { command } => {
            let context = commands::build_context(profile)?;
            match command {
                AuthCommands::Login { username, password } => {
                    commands::run_login(&context, &username, &password).await?;
                }
                AuthCommands::Status => commands::run_status(&context)?,
                AuthCommands::Logout => commands::run_logout(&context).await?,
            }
        }
        Commands::List(args) => {
            let context = commands::build_context(profile)?;
            commands::run_list(&context, &args).await?;
        }
        Commands::Show { resource, id, json } => {
            let context = commands::build_context(profile)?;
            commands::run_show(&context, resource, &id, json).await?;
        }
        Commands::Create {
            resource,
            data,
            json,
            yes,
        } => {
            let context = commands::build_context(profile)?;
            commands::run_create(&context, resource, &data, json, yes).await?;
        }
        Commands::Update {
            resource,
            id,
            data,
            json,
            yes,
        } => {
            let context = commands::build_context(profile)?;
            commands::run_update(&context, resource, &id, &data, json, yes).await?;
        }
        Commands::Deactivate { resource, id, yes } => {
            let context = commands::build_context(profile)?;
            commands::run_deactivate(&context, resource, &id, yes).await?;
        }
        Commands::Reactivate { resource, id, yes } => {
            let context = commands::build_context(profile)?;
            commands::run_reactivate(&context, resource, &id, yes).await?;
        }
        Commands::Delete { resource, ids, yes } => {
            let context = commands::build_context(profile)?;
            commands::run_delete(&context, resource, &ids, yes).await?;
        }
        Commands::Respond { id, decision, yes } => {
            let context = commands::build_context(profile)?;
            commands::run_respond(&context, &id, decision == TrustDecision::Accept, yes).await?;
        }
        Commands::MarkRead { id, yes } => {
            let context = commands::build_context(profile)?;
            commands::run_mark_read(&context, &id, yes).await?;
        }
        Commands::Watch { resource, interval } => {
            let context = commands::build_context(profile)?;
            commands::run_watch(&context, resource, interval).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Init {
                base_url,
                envelope,
                poll_interval_secs,
                items_per_page,
                no_activate,
            } => {
                let options = commands::InitOptions {
                    base_url,
                    envelope,
                    poll_interval_secs,
                    items_per_page,
                    no_activate,
                };
                commands::run_config_init(profile, &options)?;
            }
            ConfigCommands::Show => commands::run_config_show(profile)?,
        },
        Commands::Completions { shell, output } => {
            commands::run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
