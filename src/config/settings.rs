use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_leaderboard_size() -> usize {
    5
}
fn default_recent_hatims() -> usize {
    5
}
fn default_tick_rate_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Shared passphrase for `hatim admin`. Unset disables the admin view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminAccess {
    Granted,
    Denied,
    Disabled,
}

impl AdminConfig {
    pub fn verify(&self, given: &str) -> AdminAccess {
        match self.passphrase.as_deref() {
            None | Some("") => AdminAccess::Disabled,
            Some(expected) if expected == given => AdminAccess::Granted,
            Some(_) => AdminAccess::Denied,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    #[serde(default = "default_recent_hatims")]
    pub recent_hatims: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            leaderboard_size: default_leaderboard_size(),
            recent_hatims: default_recent_hatims(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "hatim")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("hatim.db"))
    }

    pub fn identity_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("identity.json"))
    }

    /// Load the config, writing the defaults out on first run.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let config = Self::default();
            config.save()?;
            log::info!("wrote default config to {:?}", path);
            return Ok(config);
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Parsing config.toml")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(&path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.display.leaderboard_size, 5);
        assert_eq!(config.display.recent_hatims, 5);
        assert_eq!(config.tui.tick_rate_ms, 1000);
        assert!(config.admin.passphrase.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::parse(
            "[admin]\npassphrase = \"bismillah\"\n\n[display]\nleaderboard_size = 10\n",
        )
        .unwrap();
        assert_eq!(config.admin.passphrase.as_deref(), Some("bismillah"));
        assert_eq!(config.display.leaderboard_size, 10);
        assert_eq!(config.display.recent_hatims, 5);
    }

    #[test]
    fn defaults_serialize_and_parse_back() {
        let text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(!text.contains("passphrase"));
        let config = AppConfig::parse(&text).unwrap();
        assert_eq!(config.tui.tick_rate_ms, 1000);
    }

    #[test]
    fn admin_gate() {
        let mut admin = AdminConfig::default();
        assert_eq!(admin.verify("anything"), AdminAccess::Disabled);
        admin.passphrase = Some("secret".to_string());
        assert_eq!(admin.verify("secret"), AdminAccess::Granted);
        assert_eq!(admin.verify("Secret"), AdminAccess::Denied);
        admin.passphrase = Some(String::new());
        assert_eq!(admin.verify(""), AdminAccess::Disabled);
    }
}
