use crate::di::{Container, Injectable};
use crate::error::{RapidError, Result};
use dashmap::DashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

mod app;

pub use app::{AppConfig, AppInfo, SwaggerConfig};

/// Configuration service
///
/// Flat string settings from a dotenv file overlaid by the process
/// environment. `NODE_ENV=test` selects `.env.test` instead of `.env`.
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Only the process environment.
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    /// The dotenv file from the working directory, then the process
    /// environment on top.
    pub fn load() -> Result<Self> {
        let file = match env::var("NODE_ENV").as_deref() {
            Ok("test") => ".env.test",
            _ => ".env",
        };
        Self::from_file(file)
    }

    /// Like [`ConfigService::load`] with an explicit dotenv path. A missing
    /// file is not an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let service = Self::default();
        let path = path.as_ref();
        if path.exists() {
            let entries = dotenvy::from_path_iter(path)
                .map_err(|err| RapidError::Config(format!("{}: {err}", path.display())))?;
            for entry in entries {
                let (key, value) =
                    entry.map_err(|err| RapidError::Config(format!("{}: {err}", path.display())))?;
                service.set(&key, &value);
            }
            tracing::debug!(file = %path.display(), "Loaded environment file");
        }
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        Ok(service)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Parses a value, failing with a config error that names the key.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|err| RapidError::Config(format!("invalid {key}={raw:?}: {err}")))
            })
            .transpose()
    }

    pub fn has(&self, key: &str) -> bool {
        self.config.contains_key(key)
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

impl Injectable for ConfigService {
    fn inject(_container: &Container) -> Result<Self> {
        Self::load()
    }

    fn decorate(store: &crate::metadata::MetadataStore) {
        store.define(
            crate::metadata::keys::INJECTABLE,
            true,
            crate::metadata::ClassId::of::<Self>(),
            None,
        );
    }
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("keys", &self.config.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_values_and_parsing() {
        let dir = env::temp_dir().join(format!("rapidfast-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "RAPIDFAST_TEST_PORT=4100").unwrap();
        writeln!(file, "RAPIDFAST_TEST_FLAG=maybe").unwrap();

        let config = ConfigService::from_file(&path).unwrap();
        assert_eq!(config.get_parsed::<u16>("RAPIDFAST_TEST_PORT").unwrap(), Some(4100));
        assert!(config.get_parsed::<bool>("RAPIDFAST_TEST_FLAG").is_err());
        assert_eq!(config.get_parsed::<u16>("RAPIDFAST_TEST_ABSENT").unwrap(), None);
        assert_eq!(config.get_or("RAPIDFAST_TEST_ABSENT", "x"), "x");

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_fine() {
        let config = ConfigService::from_file("/definitely/not/here/.env").unwrap();
        config.set("KEY", "value");
        assert!(config.has("KEY"));
    }
}
