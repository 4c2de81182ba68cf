use crate::config::ConfigService;
use crate::di::{Container, Injectable};
use crate::error::{RapidError, Result};
use crate::swagger::SwaggerInfo;
use crate::swagger::spec::Server;
use serde::Deserialize;
use std::path::Path;

/// Typed application settings.
///
/// Sources, lowest precedence first: built-in defaults, `rapidfast.toml`
/// (or the file named by `RAPIDFAST_CONFIG`), environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    /// `NODE_ENV`; `development` enables verbose errors and request tracing.
    pub environment: String,
    pub log_level: Option<String>,
    pub body_limit: usize,
    pub app: AppInfo,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SwaggerConfig {
    pub enabled: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub path: String,
    pub json_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            environment: "production".to_string(),
            log_level: None,
            body_limit: crate::http::DEFAULT_BODY_LIMIT,
            app: AppInfo::default(),
            swagger: SwaggerConfig::default(),
        }
    }
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            name: "RapidFast API".to_string(),
            description: "API Documentation".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: None,
            description: None,
            version: None,
            path: "/api-docs".to_string(),
            json_path: "/swagger.json".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `.env`, the config file if present, and the environment.
    pub fn load() -> Result<Self> {
        let env = ConfigService::load()?;
        let file = env.get_or("RAPIDFAST_CONFIG", "rapidfast.toml");
        Self::from_sources(&env, Path::new(&file))
    }

    pub fn from_sources(env: &ConfigService, file: &Path) -> Result<Self> {
        let mut config = if file.exists() {
            let text = std::fs::read_to_string(file)?;
            Self::from_toml_str(&text)
                .map_err(|err| RapidError::Config(format!("{}: {err}", file.display())))?
        } else {
            Self::default()
        };
        config.apply_env(env)?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overrides fields with whatever the environment sets.
    pub fn apply_env(&mut self, env: &ConfigService) -> Result<()> {
        if let Some(port) = env.get_parsed::<u16>("PORT")? {
            self.port = port;
        }
        if let Some(host) = env.get("HOST") {
            self.host = host;
        }
        if let Some(environment) = env.get("NODE_ENV") {
            self.environment = environment;
        }
        if let Some(level) = env.get("LOG_LEVEL") {
            self.log_level = Some(level);
        }
        if let Some(limit) = env.get_parsed::<usize>("BODY_LIMIT")? {
            self.body_limit = limit;
        }

        if let Some(name) = env.get("APP_NAME") {
            self.app.name = name;
        }
        if let Some(description) = env.get("APP_DESCRIPTION") {
            self.app.description = description;
        }
        if let Some(version) = env.get("APP_VERSION") {
            self.app.version = version;
        }

        if let Some(enabled) = env.get_parsed::<bool>("SWAGGER_ENABLED")? {
            self.swagger.enabled = enabled;
        }
        if let Some(title) = env.get("SWAGGER_TITLE") {
            self.swagger.title = Some(title);
        }
        if let Some(description) = env.get("SWAGGER_DESCRIPTION") {
            self.swagger.description = Some(description);
        }
        if let Some(version) = env.get("SWAGGER_VERSION") {
            self.swagger.version = Some(version);
        }
        if let Some(path) = env.get("SWAGGER_PATH") {
            self.swagger.path = path;
        }
        if let Some(path) = env.get("SWAGGER_JSON_PATH") {
            self.swagger.json_path = path;
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// `host:port` to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Document info, falling back from swagger settings to app settings.
    pub fn swagger_info(&self) -> SwaggerInfo {
        SwaggerInfo {
            title: self.swagger.title.clone().unwrap_or_else(|| self.app.name.clone()),
            description: Some(
                self.swagger
                    .description
                    .clone()
                    .unwrap_or_else(|| self.app.description.clone()),
            ),
            version: self
                .swagger
                .version
                .clone()
                .unwrap_or_else(|| self.app.version.clone()),
            servers: vec![Server {
                url: "/".to_string(),
                description: Some(format!("{} server", capitalize(&self.environment))),
            }],
        }
    }
}

impl Injectable for AppConfig {
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

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
