use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_json_limit")]
    pub json_limit: usize,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(skip)]
    pub debug_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_url")]
    pub url: String,
    /// No timeout when unset; a slow gateway resolves whenever it answers.
    #[serde(alias = "timeout", default)]
    pub timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(alias = "separatorwidth", default = "default_separator_width")]
    pub separator_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            separator_width: default_separator_width(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: ListenConfig::default(),
            greeting: default_greeting(),
            json_limit: default_json_limit(),
            gateway: GatewayConfig::default(),
            render: RenderConfig::default(),
            debug_logs: false,
        }
    }
}

fn default_port() -> String {
    "5500".to_string()
}

fn default_greeting() -> String {
    "Hello :D".to_string()
}

// Same default as express.json().
fn default_json_limit() -> usize {
    100 * 1024
}

fn default_gateway_url() -> String {
    "http://localhost:5000/chat".to_string()
}

fn default_separator_width() -> usize {
    crate::render::SEPARATOR_WIDTH
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError(path.to_string(), e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as null, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(content)
    }

    /// Address string for the listener, `[::]` when none is configured.
    pub fn listen_addr(&self) -> String {
        let address = self.listen.address.as_deref().unwrap_or("[::]");
        format!("{}:{}", address, self.listen.port)
    }

    pub fn has_tls(&self) -> bool {
        self.listen.tlscert.is_some() && self.listen.tlskey.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}
