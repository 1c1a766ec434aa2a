//! Configuration types for the advisory engine.

use crate::error::{AdvisoryError, Result};
use crate::profile::FarmProfile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KisanConfig {
    /// User farm profile (location, language).
    pub profile: FarmProfile,
    /// Advisory gateway settings.
    pub gateway: GatewayConfig,
    /// Audio capture/playback settings.
    pub audio: AudioConfig,
}

/// Advisory gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// API key for the generative-AI provider.
    ///
    /// Leave empty to resolve from the `KISAN_API_KEY` or `GEMINI_API_KEY`
    /// environment variable at startup.
    pub api_key: String,
    /// Base URL for the generateContent API.
    pub base_url: String,
    /// Model used for conversational and lookup operations.
    pub flash_model: String,
    /// Model used for image analysis and structured advisory operations.
    pub pro_model: String,
    /// Model used for the realtime voice session.
    pub live_model: String,
    /// WebSocket URL for the realtime voice session.
    pub live_url: String,
    /// Per-operation selection of live vs. demonstration data.
    pub demo: DemoConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com".to_owned(),
            flash_model: "gemini-2.5-flash".to_owned(),
            pro_model: "gemini-2.5-pro".to_owned(),
            live_model: "models/gemini-2.0-flash-exp".to_owned(),
            live_url: "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1alpha.GenerativeService.BidiGenerateContent"
                .to_owned(),
            demo: DemoConfig::default(),
        }
    }
}

/// Selects demonstration payloads instead of live network calls, per
/// operation. Operations not listed here always go to the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Serve the fixed weather report instead of calling the network.
    pub weather: bool,
    /// Serve the fixed fertilizer advice instead of calling the network.
    pub fertilizer: bool,
    /// Serve the fixed scheme list instead of calling the network.
    pub schemes: bool,
    /// Serve the fixed crop recommendations instead of calling the network.
    pub crops: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            weather: true,
            fertilizer: true,
            schemes: true,
            crops: true,
        }
    }
}

/// Audio I/O configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Capture sample rate in Hz (live-mode microphone upload).
    pub input_sample_rate: u32,
    /// Playback sample rate in Hz (synthesis and live-mode downlink).
    pub output_sample_rate: u32,
    /// Samples per outbound live-mode frame.
    pub frame_size: usize,
    /// Input device name (None = system default).
    pub input_device: Option<String>,
    /// Output device name (None = system default).
    pub output_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_sample_rate: 16_000,
            output_sample_rate: 24_000,
            frame_size: 4096,
            input_device: None,
            output_device: None,
        }
    }
}

impl KisanConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AdvisoryError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&raw)
            .map_err(|e| AdvisoryError::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// Load from the default config path, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only when a config file exists but is invalid.
    pub fn load_or_default() -> Result<Self> {
        let path = crate::app_dirs::config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

impl GatewayConfig {
    /// Resolve the API credential: config value first, then the
    /// `KISAN_API_KEY` and `GEMINI_API_KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when no credential is configured anywhere.
    pub fn resolve_api_key(&self) -> Result<String> {
        if !self.api_key.trim().is_empty() {
            return Ok(self.api_key.clone());
        }
        for var in ["KISAN_API_KEY", "GEMINI_API_KEY"] {
            if let Ok(value) = std::env::var(var)
                && !value.trim().is_empty()
            {
                return Ok(value);
            }
        }
        Err(AdvisoryError::Config(
            "no API key: set gateway.api_key or the KISAN_API_KEY env var".to_owned(),
        ))
    }
}
