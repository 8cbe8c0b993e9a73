use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.stability.ai";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct StabilityConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub credentials_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub stability: StabilityConfig,
    pub storage: StorageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: None,
            port: None,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").ok().filter(|h| !h.is_empty());
        let port = env::var("PORT").ok().and_then(|s| s.parse().ok());

        ServerConfig { host, port }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn bind_address(&self) -> (String, u16) {
        (
            self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        StabilityConfig {
            base_url: None,
            api_key: None,
        }
    }
}

impl StabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url = env::var("STABILITY_API_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty());
        let api_key = env::var("STABILITY_API_KEY").ok().filter(|s| !s.is_empty());

        StabilityConfig { base_url, api_key }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            credentials_path: None,
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let credentials_path = env::var("SD_CREDENTIALS_PATH").ok().map(PathBuf::from);

        StorageConfig { credentials_path }
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = Some(path.into());
        self
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            server: ServerConfig::from_env(),
            stability: StabilityConfig::from_env(),
            storage: StorageConfig::from_env(),
        }
    }

    pub fn with_server(mut self, config: ServerConfig) -> Self {
        self.server = config;
        self
    }

    pub fn with_stability(mut self, config: StabilityConfig) -> Self {
        self.stability = config;
        self
    }

    pub fn with_storage(mut self, config: StorageConfig) -> Self {
        self.storage = config;
        self
    }
}
