use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use translay_sync::SyncConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub gateway: GatewaySettings,
    pub sync: SyncSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewaySettings {
    /// Base URL of the transcription gateway the host channel talks to.
    pub base_url: String,
    /// API key for the gateway. None until the user saves one; the
    /// credential store owns persistence, this is just the loaded value.
    pub api_key: Option<String>,
    /// Display name the bot joins meetings with.
    pub bot_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncSettings {
    /// Fixed tick period of the transcript poll loop, in milliseconds.
    pub poll_interval_ms: u64,
    /// Minimum spacing between two fetch dispatches, in milliseconds.
    pub min_fetch_spacing_ms: u64,
    /// Maximum number of transcript segments retained per meeting.
    pub max_retained_segments: usize,
    /// Default translation language requested from the gateway.
    pub default_language: String,
}

impl From<&SyncSettings> for SyncConfig {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            poll_interval_ms: settings.poll_interval_ms,
            min_fetch_spacing_ms: settings.min_fetch_spacing_ms,
            max_retained_segments: settings.max_retained_segments,
            default_language: settings.default_language.clone(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("TRANSLAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("gateway.base_url", "https://gateway.dev.vexa.ai")?
            .set_default("gateway.api_key", None::<String>)?
            .set_default("gateway.bot_name", "Translay")?
            .set_default("sync.poll_interval_ms", 1000)?
            .set_default("sync.min_fetch_spacing_ms", 1000)?
            .set_default("sync.max_retained_segments", 100)?
            .set_default("sync.default_language", "en")?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::load().expect("Failed to load default settings")
    }
}
