// In crates/app-config/src/types.rs

use std::time::Duration;

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// The HTTP listener the service binds.
    pub server: ServerSettings,
    /// Base URLs and timeouts of the upstream services.
    pub services: ServicesSettings,
    /// Settings for the optional run commentary.
    pub commentary: CommentarySettings,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8003,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServicesSettings {
    /// Base URL of the market data service.
    pub data_url: String,
    /// Base URL of the sequence-model predictor.
    pub transformer_url: String,
    /// Base URL of the text-generation service.
    pub ollama_url: String,
    pub data_timeout_secs: u64,
    pub predict_timeout_secs: u64,
    pub generate_timeout_secs: u64,
}

impl Default for ServicesSettings {
    fn default() -> Self {
        Self {
            data_url: "http://data:9001".to_owned(),
            transformer_url: "http://transformer:8089".to_owned(),
            ollama_url: "http://ollama:11434".to_owned(),
            data_timeout_secs: 15,
            predict_timeout_secs: 20,
            generate_timeout_secs: 8,
        }
    }
}

impl ServicesSettings {
    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs)
    }

    pub fn predict_timeout(&self) -> Duration {
        Duration::from_secs(self.predict_timeout_secs)
    }

    pub fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CommentarySettings {
    /// Model name sent to the text-generation service.
    pub model: String,
}

impl Default for CommentarySettings {
    fn default() -> Self {
        Self {
            model: "gpt-oss:20b".to_owned(),
        }
    }
}
