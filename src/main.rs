use anyhow::{Context, Result};
use bbox::api::auth::TokenStore;
use bbox::api::client::ApiClient;
use bbox::api::error::exit_code;
use bbox::api::ApiError;
use bbox::cli::{AccountCommand, Cli, Command, LogLevel};
use bbox::commands::{self, accounts, config_cmd, Session};
use bbox::config::{Config, IdCache};
use bbox::output::print_output;
use bbox::resource::Resolver;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding `--log-level` with a full filter directive
const LOG_ENV: &str = "BBOX_LOG";

fn setup_logging(level: LogLevel, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => match level.to_tracing_level() {
            Some(level) => EnvFilter::new(level.to_string().to_lowercase()),
            None => return Ok(None),
        },
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("bbox {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());

    Ok(Some(guard))
}

async fn run(cli: Cli) -> Result<String> {
    let mut config = Config::load();

    // Local commands need no credentials
    let command = match cli.command {
        Command::Config { command } => {
            return config_cmd::run(
                command,
                &mut config,
                cli.client.as_deref(),
                cli.api_url.as_deref(),
            )
        }
        Command::Accounts {
            command: AccountCommand::Default { id: None },
        } => return Ok(accounts::show_default(&config, cli.client.as_deref())),
        command => command,
    };

    let (name, section) = config.effective_client(
        cli.client.as_deref(),
        cli.client_id.as_deref(),
        cli.secret.as_deref(),
    )?;
    let grant = section
        .grant()
        .ok_or_else(|| ApiError::Unauthorized(format!("client '{}' is incomplete", name)))?;
    let api_url = section.effective_api_url(cli.api_url.as_deref())?;
    let auth_url = section.effective_auth_url(&api_url)?;
    let account = section.effective_account(cli.account.as_deref());

    tracing::debug!("Using {} as {} (account {:?})", api_url, name, account);

    // Tokens are kept per section; credentials overridden by flags get their own file
    let token_name = if config.client(&name) == Some(&section) {
        name.clone()
    } else {
        grant.id().to_string()
    };

    let mut client = ApiClient::with_grant(
        &api_url,
        &auth_url,
        grant,
        account.as_deref(),
        Duration::from_secs(config.effective_timeout_secs()),
    )?;
    if let Some(dir) = Config::config_dir() {
        client = client.with_token_store(TokenStore::for_client(&dir, &token_name));
    }

    let mut resolver = Resolver::new(client);
    if let Some(memo) = IdCache::open_default() {
        resolver = resolver.with_memo(Arc::new(memo));
    }

    let mut session = Session::new(resolver, cli.output);
    let result = commands::execute(command, &mut session, &mut config, &name).await;

    // The token endpoint may rotate a user application's refresh token
    if let Some(rotated) = session.resolver.api().credentials.current_refresh_token().await {
        if let Some(stored) = config.clients.get_mut(&name) {
            if stored.refresh_token.as_deref() != Some(rotated.as_str()) {
                stored.refresh_token = Some(rotated);
                if let Err(e) = config.save() {
                    tracing::warn!("Could not save rotated refresh token: {e:#}");
                }
            }
        }
    }

    result
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .map(ApiError::exit_code)
        .unwrap_or(exit_code::GENERAL)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let guard = match setup_logging(cli.log_level, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            std::process::exit(exit_code::GENERAL);
        }
    };

    let code = match run(cli).await {
        Ok(output) => {
            print_output(&output);
            exit_code::SUCCESS
        }
        Err(err) => {
            tracing::debug!("{err:?}");
            eprintln!("ERROR: {err:#}");
            exit_code_for(&err)
        }
    };

    // Flush buffered log lines before exiting
    drop(guard);
    std::process::exit(code);
}
