use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Context used when none has been configured.
pub const DEFAULT_CONTEXT: &str = "default";

/// A named backend the CLI can talk to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Context {
    pub api_url: String,
    /// Username pre-filled by `login` for this context.
    #[serde(default)]
    pub username: Option<String>,
}

impl Context {
    pub fn new(api_url: String) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_context: Option<String>,
    pub contexts: BTreeMap<String, Context>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn home() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".munificent"))
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.yaml"))
    }

    /// Token file for a context: `~/.munificent/sessions/<name>.yaml`.
    pub fn session_path(context: &str) -> Result<PathBuf> {
        Ok(Self::home()?.join("sessions").join(format!("{}.yaml", context)))
    }

    pub fn get_current_context(&self) -> Option<(&String, &Context)> {
        self.current_context
            .as_ref()
            .and_then(|name| self.contexts.get(name).map(|ctx| (name, ctx)))
    }

    /// Context selected by `--context`, falling back to the current one.
    pub fn select(&self, requested: Option<&str>) -> Result<Option<(String, Context)>> {
        match requested {
            Some(name) => {
                let ctx = self
                    .contexts
                    .get(name)
                    .with_context(|| format!("Context '{}' not found", name))?;
                Ok(Some((name.to_string(), ctx.clone())))
            }
            None => Ok(self
                .get_current_context()
                .map(|(name, ctx)| (name.clone(), ctx.clone()))),
        }
    }

    pub fn add(&mut self, name: &str, context: Context, set_current: bool) {
        self.contexts.insert(name.to_string(), context);
        if set_current || self.current_context.is_none() {
            self.current_context = Some(name.to_string());
        }
    }

    /// Remove a context; returns false when it did not exist.
    pub fn remove(&mut self, name: &str) -> bool {
        if self.contexts.remove(name).is_none() {
            return false;
        }
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        true
    }
}
