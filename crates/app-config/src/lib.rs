// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{CommentarySettings, ServerSettings, ServicesSettings, Settings};

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from an optional `config/base.toml` file.
/// 2. Merges settings from environment variables with the `APP` prefix and
///    `__` separator (e.g. `APP_SERVICES__DATA_URL=...`).
///
/// Every field carries an in-code default, so the service starts with no
/// configuration present at all.
pub fn load_settings() -> Result<Settings> {
    let settings = Config::builder()
        // 1. Load the base configuration file, if one is shipped.
        .add_source(File::with_name("config/base").required(false))
        // 2. Load settings from environment variables.
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;

    Ok(settings)
}
