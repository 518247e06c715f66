use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::sync::Mutex;

/// Key under which the token-service credential lives in the env file.
pub const API_KEY_VAR: &str = "API_KEY";

fn default_token_url() -> String {
    "http://localhost:80/gerar-token".to_string()
}

/// Returns true if `key` is a valid env file key: non-empty, uppercase
/// ASCII letters and underscores only.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_uppercase() || c == '_')
}

/// The flat `KEY=value` file backing runtime configuration.
///
/// Reads always go to disk, so a handler that just wrote a key observes
/// its own write. Writes are serialized through a mutex and persisted by
/// atomic rename, so concurrent handlers never see a torn file.
pub struct EnvStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl EnvStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Read and parse the whole file, in file order.
    pub fn load(&self) -> Result<Vec<(String, String)>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read env file: {}", self.path.display()))?;
        Ok(parse_env(&content))
    }

    /// Look up one key, re-reading the file.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .load()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v))
    }

    /// Upsert `key` to `value`, preserving the order of existing lines
    /// (comments and blanks included) and appending new keys at the end.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read env file: {}", self.path.display())
                })
            }
        };

        let mut lines: Vec<String> = Vec::new();
        let mut replaced = false;
        for line in content.lines() {
            let trimmed = line.trim_start();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                if let Some((k, _)) = trimmed.split_once('=') {
                    if k.trim() == key {
                        lines.push(format!("{key}={value}"));
                        replaced = true;
                        continue;
                    }
                }
            }
            lines.push(line.to_string());
        }
        if !replaced {
            lines.push(format!("{key}={value}"));
        }

        let mut out = lines.join("\n");
        out.push('\n');

        // Write to a sibling temp file, then rename over the original so
        // readers only ever observe a complete file.
        let tmp = self.path.with_extension("env.tmp");
        std::fs::write(&tmp, &out)
            .with_context(|| format!("Failed to write env file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace env file: {}", self.path.display()))?;

        Ok(())
    }
}

fn parse_env(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim_start();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Values loaded once at process start. Rewriting the env file later does
/// not change these; actions that must observe their own writes re-read
/// through [`EnvStore::get`].
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub authorized_users: HashSet<i64>,
    pub token_url: String,
    pub api_domain: String,
}

impl BotConfig {
    pub fn load(store: &EnvStore) -> Result<Self> {
        let bot_token = store
            .get("BOT_TOKEN")?
            .context("BOT_TOKEN is not set in the env file")?;

        let users_raw = store
            .get("AUTHORIZED_USERS")?
            .context("AUTHORIZED_USERS is not set in the env file")?;
        let authorized_users = users_raw
            .split(',')
            .map(|s| {
                s.trim()
                    .parse::<i64>()
                    .with_context(|| format!("Invalid chat id in AUTHORIZED_USERS: {s:?}"))
            })
            .collect::<Result<HashSet<i64>>>()?;

        let token_url = store.get("TOKEN_URL")?.unwrap_or_else(default_token_url);

        let api_domain = store
            .get("API_DOMAIN")?
            .context("API_DOMAIN is not set in the env file")?;

        Ok(Self {
            bot_token,
            authorized_users,
            token_url,
            api_domain,
        })
    }
}
