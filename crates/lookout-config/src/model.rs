// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lookout status relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Lookout configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LookoutConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Telegram delivery settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// WhatsApp Web bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Paired session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Relay pipeline settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram delivery configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `serve` and `check`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Destination chat: a numeric chat id or an `@channel` username.
    #[serde(default)]
    pub chat_id: Option<String>,

    /// Bot API base URL override (self-hosted Bot API servers).
    #[serde(default)]
    pub api_url: Option<String>,
}

/// WhatsApp Web bridge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Base URL of the bridge's HTTP API. The event stream is served at
    /// `{url}/events` over WebSocket.
    #[serde(default = "default_bridge_url")]
    pub url: String,

    /// Seconds to wait before re-dialing a dropped event stream.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: default_bridge_url(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

/// Paired session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Directory holding the paired account's credentials.
    #[serde(default = "default_auth_dir")]
    pub auth_dir: String,

    /// Device name shown in the phone's linked-devices list.
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_dir: default_auth_dir(),
            device_name: default_device_name(),
        }
    }
}

fn default_auth_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("lookout").join("auth"))
        .unwrap_or_else(|| std::path::PathBuf::from("auth"))
        .to_string_lossy()
        .into_owned()
}

fn default_device_name() -> String {
    "StatusArchiver".to_string()
}

/// Largest accepted `relay.caption_text_limit`. Leaves room for the sender
/// header inside Telegram's 1024-character media caption.
pub const MAX_CAPTION_TEXT_LIMIT: usize = 900;

/// Relay pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Pause after every delivery attempt, in milliseconds.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Number of recent status keys remembered for deduplication.
    /// `0` remembers every key for the lifetime of the process.
    #[serde(default = "default_dedup_window")]
    pub dedup_window: usize,

    /// Maximum characters of status text placed in a media caption.
    /// Must be between 1 and [`MAX_CAPTION_TEXT_LIMIT`].
    #[serde(default = "default_caption_text_limit")]
    pub caption_text_limit: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            dedup_window: default_dedup_window(),
            caption_text_limit: default_caption_text_limit(),
        }
    }
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_dedup_window() -> usize {
    10_000
}

fn default_caption_text_limit() -> usize {
    MAX_CAPTION_TEXT_LIMIT
}
