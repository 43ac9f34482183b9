//! Configuration Management
//!
//! Handles persistent configuration storage for bbox, and the identifier
//! cache that remembers every identifier the client has resolved.
//!
//! The config file holds any number of named client sections. Each section
//! is either an API client (`client_id` and `secret`) or a user application
//! (`app_id`, `app_secret` and a `refresh_token`).

use crate::api::auth::Grant;
use crate::api::ApiError;
use crate::resource::IdentityMemo;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// API endpoint used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.gb1.brightbox.com";

/// Request timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Section used when `--client` isn't given
    #[serde(default)]
    pub default_client: Option<String>,
    /// HTTP request timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub clients: BTreeMap<String, ClientSection>,
}

/// One named set of credentials
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClientSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Token endpoint base when it differs from `api_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Account used when a command doesn't name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_account: Option<String>,
}

impl ClientSection {
    /// A section with any user application field is a user application
    pub fn is_user_app(&self) -> bool {
        self.app_id.is_some() || self.app_secret.is_some() || self.refresh_token.is_some()
    }

    /// Required keys that are unset or blank, named as `config set` takes them
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required: Vec<(&'static str, &Option<String>)> = if self.is_user_app() {
            vec![
                ("api-url", &self.api_url),
                ("app-id", &self.app_id),
                ("app-secret", &self.app_secret),
                ("refresh-token", &self.refresh_token),
            ]
        } else {
            vec![
                ("api-url", &self.api_url),
                ("client-id", &self.client_id),
                ("secret", &self.secret),
            ]
        };

        required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Token grant for this section, if it is complete
    pub fn grant(&self) -> Option<Grant> {
        if !self.is_valid() {
            return None;
        }
        if self.is_user_app() {
            Some(Grant::RefreshToken {
                app_id: self.app_id.clone()?,
                app_secret: self.app_secret.clone()?,
                refresh_token: self.refresh_token.clone()?,
            })
        } else {
            Some(Grant::ClientCredentials {
                client_id: self.client_id.clone()?,
                secret: self.secret.clone()?,
            })
        }
    }

    /// Get effective API URL (CLI/env > section > default), validated
    pub fn effective_api_url(&self, cli: Option<&str>) -> Result<String> {
        let raw = cli
            .map(String::from)
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        normalise_url(&raw)
    }

    /// Token endpoint base: the section's `auth_url`, else the API URL in use
    pub fn effective_auth_url(&self, api_url: &str) -> Result<String> {
        match &self.auth_url {
            Some(raw) => normalise_url(raw),
            None => Ok(api_url.to_string()),
        }
    }

    /// Get effective account (CLI/env > section default)
    pub fn effective_account(&self, cli: Option<&str>) -> Option<String> {
        cli.map(String::from).or_else(|| self.default_account.clone())
    }
}

fn normalise_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw).with_context(|| format!("Invalid API URL '{}'", raw))?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

impl Config {
    /// Directory holding the config file, token files and the identifier cache
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bbox"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file; a missing or unreadable file
    /// yields the defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Section chosen for this run: `--client`, then `default_client`, then
    /// the only section if there is exactly one
    pub fn selected_client(&self, cli: Option<&str>) -> Option<String> {
        if let Some(name) = cli.map(String::from).or_else(|| self.default_client.clone()) {
            return Some(name);
        }
        match self.clients.len() {
            1 => self.clients.keys().next().cloned(),
            _ => None,
        }
    }

    pub fn client(&self, name: &str) -> Option<&ClientSection> {
        self.clients.get(name)
    }

    /// Section by name, created empty if absent
    pub fn client_mut(&mut self, name: &str) -> &mut ClientSection {
        self.clients.entry(name.to_string()).or_default()
    }

    /// The named section, provided it has every field its kind of client needs
    pub fn validate(&self, name: &str) -> Result<&ClientSection> {
        let section = self.client(name).ok_or_else(|| {
            ApiError::Unauthorized(format!(
                "no client '{}' configured; run `bbox config client-add <id> <secret>`",
                name
            ))
        })?;
        check_section(name, section)?;
        Ok(section)
    }

    /// Credentials for this run. `--client-id` and `--secret` (or their
    /// environment variables) override the selected section; with no section
    /// selected they form an API client of their own against the default
    /// endpoint.
    pub fn effective_client(
        &self,
        cli_client: Option<&str>,
        client_id: Option<&str>,
        secret: Option<&str>,
    ) -> Result<(String, ClientSection)> {
        let name = self
            .selected_client(cli_client)
            .or_else(|| client_id.map(String::from))
            .ok_or_else(|| {
                ApiError::Unauthorized(
                    "no client configured; set BRIGHTBOX_CLIENT_ID and BRIGHTBOX_SECRET \
                     or run `bbox config client-add <id> <secret>`"
                        .to_string(),
                )
            })?;

        let stored = self.client(&name);
        if stored.is_none() && client_id.is_none() {
            self.validate(&name)?;
        }

        let mut section = stored.cloned().unwrap_or_default();
        if client_id.is_some() || secret.is_some() {
            section.app_id = None;
            section.app_secret = None;
            section.refresh_token = None;
            if let Some(id) = client_id {
                section.client_id = Some(id.to_string());
            }
            if let Some(secret) = secret {
                section.secret = Some(secret.to_string());
            }
        }
        if stored.is_none() {
            section.api_url = Some(DEFAULT_API_URL.to_string());
        }

        check_section(&name, &section)?;
        Ok((name, section))
    }

    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Set the client's default account and save
    pub fn set_default_account(&mut self, client: &str, account: &str) -> Result<()> {
        self.client_mut(client).default_account = Some(account.to_string());
        self.save()
    }
}

/// Fail with the first missing key of `section` and the command that sets it
pub fn check_section(name: &str, section: &ClientSection) -> Result<()> {
    let missing = section.missing_fields();
    if let Some(key) = missing.first() {
        return Err(ApiError::Unauthorized(format!(
            "client '{}' is missing {}; run `bbox config set {} <value>`",
            name,
            missing.join(", "),
            key
        ))
        .into());
    }
    Ok(())
}

/// Remembers identifiers as empty marker files, one per identifier
#[derive(Debug, Clone)]
pub struct IdCache {
    dir: PathBuf,
}

impl IdCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Cache under the config directory, if there is one
    pub fn open_default() -> Option<Self> {
        Config::config_dir().map(|p| Self::new(p.join("cache")))
    }

    fn touch(&self, id: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(id);
        if !path.exists() {
            std::fs::File::create(path)?;
        }
        Ok(())
    }
}

impl IdentityMemo for IdCache {
    fn cache_id(&self, id: &str) {
        // Identifiers become file names, so refuse anything path-like
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return;
        }
        if let Err(e) = self.touch(id) {
            tracing::debug!("Could not cache id {}: {}", id, e);
        }
    }
}
