use super::{util, Session};
use crate::cli::AccountCommand;
use crate::config::Config;
use crate::resource::{RemoteApi, ResourceKind};
use anyhow::Result;

const KIND: ResourceKind = ResourceKind::Account;

pub async fn run<A: RemoteApi>(
    command: AccountCommand,
    session: &mut Session<A>,
    config: &mut Config,
    client: &str,
) -> Result<String> {
    match command {
        AccountCommand::List(args) => util::list(session, KIND, &args.ids).await,
        AccountCommand::Show(args) => util::show(session, KIND, &args.ids).await,
        AccountCommand::Default { id: Some(id) } => {
            let account = session.resolver.find_one(KIND, &id).await?;
            config.set_default_account(client, account.id())?;
            tracing::info!("Default account for {} set to {}", client, account.id());
            Ok(format!("Default account set to {}", account.id()))
        }
        AccountCommand::Default { id: None } => Ok(show_default(config, Some(client))),
    }
}

/// The selected client's default account. Reads only the config file, so it
/// works without credentials.
pub fn show_default(config: &Config, client: Option<&str>) -> String {
    config
        .selected_client(client)
        .and_then(|name| config.client(&name)?.default_account.clone())
        .unwrap_or_else(|| "No default account configured".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientSection;

    #[test]
    fn test_show_default_needs_no_credentials() {
        let mut config = Config::default();
        assert_eq!(show_default(&config, None), "No default account configured");

        // A section holding only a default account is enough
        config.client_mut("cli-12345").default_account = Some("acc-12345".to_string());
        assert_eq!(show_default(&config, None), "acc-12345");
        assert!(config.validate("cli-12345").is_err());

        config.clients.insert("cli-67890".to_string(), ClientSection::default());
        assert_eq!(show_default(&config, Some("cli-67890")), "No default account configured");
        assert_eq!(show_default(&config, Some("cli-12345")), "acc-12345");
    }
}
