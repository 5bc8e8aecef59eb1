use anyhow::Context;
use finboard_import::{import::create_loader, Categorizer, CsvImportProfile, Loader};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "FINBOARD_CONFIG";
pub const DATABASE_ENV: &str = "FINBOARD_DATABASE";
pub const BIND_ENV: &str = "FINBOARD_BIND";
pub const DEFAULT_CONFIG_FILE: &str = "finboard.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub uploads_dir: PathBuf,
    /// Allowed CORS origin. Any origin when unset.
    pub cors_origin: Option<String>,
    pub default_limit: i64,
    pub max_upload_bytes: usize,
    /// TOML rule table replacing the built-in keyword rules.
    pub rules_path: Option<PathBuf>,
    /// Extra CSV sources on top of the built-in adapters.
    pub sources: Vec<CsvImportProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/finance.db"),
            bind_addr: "127.0.0.1:5000".to_string(),
            uploads_dir: PathBuf::from("data/uploads"),
            cors_origin: None,
            default_limit: 100,
            max_upload_bytes: 10 * 1024 * 1024,
            rules_path: None,
            sources: Vec::new(),
        }
    }
}

impl Config {
    /// Reads `$FINBOARD_CONFIG`, else `finboard.toml` if present, else defaults,
    /// then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_from(explicit.as_deref())
    }

    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if default_path.exists() => Self::from_file(default_path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(database) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(database);
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.is_empty()) {
            self.bind_addr = bind;
        }
    }

    pub fn categorizer(&self) -> anyhow::Result<Categorizer> {
        match &self.rules_path {
            Some(path) => Categorizer::from_file(path)
                .with_context(|| format!("loading rules {}", path.display())),
            None => Ok(Categorizer::default()),
        }
    }

    /// Builds the loader for this configuration: built-in adapters, configured
    /// profiles and the active rule table.
    pub fn loader(&self) -> anyhow::Result<Loader> {
        let categorizer = self.categorizer()?;
        create_loader(self.sources.clone(), categorizer).context("registering source profiles")
    }
}
