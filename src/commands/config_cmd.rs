use crate::api::auth::TokenStore;
use crate::cli::{ConfigCommand, ConfigKey};
use crate::config::{ClientSection, Config, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use anyhow::{anyhow, bail, Context, Result};
use url::Url;

/// Local configuration commands; these never touch the API.
///
/// `client` is the `--client` flag and `api_url` the `--api-url` flag, used
/// when adding sections.
pub fn run(
    command: ConfigCommand,
    config: &mut Config,
    client: Option<&str>,
    api_url: Option<&str>,
) -> Result<String> {
    match command {
        ConfigCommand::Show => return Ok(describe(config)),
        ConfigCommand::Set { key, value } => apply(config, client, key, value)?,
        ConfigCommand::ClientAdd { id, client_secret } => {
            let section = ClientSection {
                client_id: Some(id.clone()),
                secret: Some(client_secret),
                ..ClientSection::default()
            };
            add_section(config, &id, section, api_url)?;
        }
        ConfigCommand::UserAdd {
            email,
            app_id,
            app_secret,
            refresh_token,
        } => {
            let section = ClientSection {
                app_id: Some(app_id),
                app_secret: Some(app_secret),
                refresh_token: Some(refresh_token),
                ..ClientSection::default()
            };
            add_section(config, &email, section, api_url)?;
        }
        ConfigCommand::ClientRemove { name } => {
            remove_section(config, &name)?;
            if let Some(dir) = Config::config_dir() {
                let store = TokenStore::for_client(&dir, &name);
                if let Err(e) = store.clear() {
                    tracing::warn!("Could not remove {}: {}", store.path().display(), e);
                }
            }
        }
    }

    config.save()?;
    Ok(describe(config))
}

fn apply(config: &mut Config, client: Option<&str>, key: ConfigKey, value: String) -> Result<()> {
    match key {
        ConfigKey::DefaultClient => {
            if config.client(&value).is_none() {
                bail!("No client '{}' configured", value);
            }
            config.default_client = Some(value);
            return Ok(());
        }
        ConfigKey::TimeoutSecs => {
            let secs = value
                .parse::<u64>()
                .with_context(|| format!("Invalid timeout '{}'", value))?;
            config.timeout_secs = Some(secs);
            return Ok(());
        }
        ConfigKey::ApiUrl | ConfigKey::AuthUrl => {
            Url::parse(&value).with_context(|| format!("Invalid API URL '{}'", value))?;
        }
        _ => {}
    }

    let name = config.selected_client(client).ok_or_else(|| {
        anyhow!("No client selected; pass --client <name> or run `bbox config client-add <id> <secret>`")
    })?;
    let section = config.client_mut(&name);
    let field = match key {
        ConfigKey::ApiUrl => &mut section.api_url,
        ConfigKey::AuthUrl => &mut section.auth_url,
        ConfigKey::ClientId => &mut section.client_id,
        ConfigKey::Secret => &mut section.secret,
        ConfigKey::AppId => &mut section.app_id,
        ConfigKey::AppSecret => &mut section.app_secret,
        ConfigKey::RefreshToken => &mut section.refresh_token,
        ConfigKey::DefaultAccount => &mut section.default_account,
        ConfigKey::DefaultClient | ConfigKey::TimeoutSecs => return Ok(()),
    };
    *field = Some(value);
    Ok(())
}

/// Store `section` under `name`, replacing any previous one. The first
/// section added becomes the default.
fn add_section(
    config: &mut Config,
    name: &str,
    mut section: ClientSection,
    api_url: Option<&str>,
) -> Result<()> {
    section.api_url = Some(section.effective_api_url(api_url)?);
    crate::config::check_section(name, &section)?;

    config.clients.insert(name.to_string(), section);
    if config.default_client.is_none() {
        config.default_client = Some(name.to_string());
    }
    tracing::info!("Added client {}", name);
    Ok(())
}

fn remove_section(config: &mut Config, name: &str) -> Result<()> {
    if config.clients.remove(name).is_none() {
        bail!("No client '{}' configured", name);
    }
    if config.default_client.as_deref() == Some(name) {
        config.default_client = None;
    }
    Ok(())
}

fn describe(config: &Config) -> String {
    let mut lines = vec![
        row(
            "default_client",
            config.default_client.clone().unwrap_or_else(|| "(not set)".to_string()),
        ),
        row(
            "timeout_secs",
            config
                .timeout_secs
                .map(|t| t.to_string())
                .unwrap_or_else(|| format!("{} (default)", DEFAULT_TIMEOUT_SECS)),
        ),
    ];

    if config.clients.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "No clients configured; `bbox config client-add <id> <secret>` adds one for {}",
            DEFAULT_API_URL
        ));
    }

    for (name, section) in &config.clients {
        lines.push(String::new());
        let marker = if config.default_client.as_deref() == Some(name) {
            " (default)"
        } else {
            ""
        };
        lines.push(format!("[{}]{}", name, marker));

        let fields = [
            ("api_url", section.api_url.clone()),
            ("auth_url", section.auth_url.clone()),
            ("client_id", section.client_id.clone()),
            ("secret", section.secret.as_deref().map(mask)),
            ("app_id", section.app_id.clone()),
            ("app_secret", section.app_secret.as_deref().map(mask)),
            ("refresh_token", section.refresh_token.as_deref().map(mask)),
            ("default_account", section.default_account.clone()),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                lines.push(row(key, value));
            }
        }
    }

    lines.join("\n")
}

fn row(key: &str, value: String) -> String {
    format!("{:<16} {}", key, value)
}

fn mask(secret: &str) -> String {
    let tail: String = secret.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{}", tail)
    }
}
