use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, LevelFilter};
use serde::Deserialize;
use url::Url;

use infra::persistence::{Document, FileStorage, MemoryStorage, Storage};

use crate::api::HttpBackend;

#[derive(Deserialize, Debug)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Deserialize, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
    #[serde(default = "ApiConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Where the cart and session live. Without a path everything is kept in
/// memory and forgotten on exit.
#[derive(Deserialize, Debug, Default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

/// `POS_*` environment variables that take precedence over the file.
#[derive(Deserialize, Debug, Default)]
struct EnvOverrides {
    api_url: Option<Url>,
    api_timeout_secs: Option<u64>,
    storage_path: Option<PathBuf>,
}

const ENV_PREFIX: &str = "POS_";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Default)]
pub struct EnvLogger {
    level: Option<LogLevel>,
    #[serde(default)]
    modules: HashMap<String, LogLevel>,
    #[serde(default)]
    timestamp_nanos: bool,
}

/// Storage picked at start-up from `StorageConfig`.
#[derive(Debug, Clone)]
pub enum ConfiguredStorage {
    Memory(MemoryStorage),
    File(FileStorage),
}

impl Config {
    pub fn from_toml(src: &str) -> Result<Self> {
        let config = toml::from_str(src).context("parse config")?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        let overrides: EnvOverrides = envy::prefixed(ENV_PREFIX)
            .from_env()
            .context("read POS_* environment")?;
        self.apply(overrides);
        Ok(())
    }

    pub fn apply_env_from<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides: EnvOverrides = envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .context("read POS_* overrides")?;
        self.apply(overrides);
        Ok(())
    }

    fn apply(&mut self, overrides: EnvOverrides) {
        debug!("Environment overrides: {:?}", overrides);
        if let Some(url) = overrides.api_url {
            self.api.base_url = url;
        }
        if let Some(secs) = overrides.api_timeout_secs {
            self.api.timeout_secs = secs;
        }
        if let Some(path) = overrides.storage_path {
            self.storage.path = Some(path);
        }
    }
}

impl ApiConfig {
    fn default_timeout_secs() -> u64 {
        10
    }

    pub(crate) fn build(&self) -> Result<HttpBackend> {
        debug!("Build API client for {:?}", self);
        HttpBackend::new(
            self.base_url.clone(),
            Duration::from_secs(self.timeout_secs),
        )
        .context("build http client")
    }
}

impl StorageConfig {
    pub(crate) fn build(&self) -> ConfiguredStorage {
        match self.path.as_ref() {
            Some(path) => {
                let storage = FileStorage::new(path);
                debug!("File storage at {:?}", storage.dir());
                ConfiguredStorage::File(storage)
            }
            None => {
                debug!("In-memory storage");
                ConfiguredStorage::Memory(MemoryStorage::new())
            }
        }
    }
}

impl Storage for ConfiguredStorage {
    fn load<D: Document>(&self) -> Result<Option<D>> {
        match self {
            ConfiguredStorage::Memory(s) => s.load(),
            ConfiguredStorage::File(s) => s.load(),
        }
    }

    fn save<D: Document>(&self, document: &D) -> Result<()> {
        match self {
            ConfiguredStorage::Memory(s) => s.save(document),
            ConfiguredStorage::File(s) => s.save(document),
        }
    }

    fn remove<D: Document>(&self) -> Result<()> {
        match self {
            ConfiguredStorage::Memory(s) => s.remove::<D>(),
            ConfiguredStorage::File(s) => s.remove::<D>(),
        }
    }
}

impl LogLevel {
    fn to_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl EnvLogger {
    pub fn builder(&self) -> env_logger::Builder {
        let mut b = env_logger::Builder::from_default_env();
        if let Some(level) = self.level.as_ref() {
            b.filter_level(level.to_filter());
        }

        for (module, level) in self.modules.iter() {
            b.filter_module(module, level.to_filter());
        }

        if self.timestamp_nanos {
            b.format_timestamp_nanos();
        }

        b
    }
}
