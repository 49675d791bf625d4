// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lookout.toml` > `~/.config/lookout/lookout.toml` > `/etc/lookout/lookout.toml`
//! with environment variable overrides via `LOOKOUT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LookoutConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lookout/lookout.toml` (system-wide)
/// 3. `~/.config/lookout/lookout.toml` (user XDG config)
/// 4. `./lookout.toml` (local directory)
/// 5. `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`
/// 6. `LOOKOUT_*` environment variables
pub fn load_config() -> Result<LookoutConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LookoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LookoutConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LookoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LookoutConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LookoutConfig::default()))
        .merge(Toml::file("/etc/lookout/lookout.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("lookout/lookout.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("lookout.toml"))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// keys survive: `LOOKOUT_TELEGRAM_BOT_TOKEN` maps to `telegram.bot_token`,
/// not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("LOOKOUT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: LOOKOUT_RELAY_THROTTLE_MS -> "relay_throttle_ms"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("log_", "log.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("bridge_", "bridge.", 1)
            .replacen("session_", "session.", 1)
            .replacen("relay_", "relay.", 1);
        mapped.into()
    })
}

/// Unprefixed `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`, as used by
/// existing `.env` deployments.
fn legacy_env_provider() -> Env {
    Env::raw()
        .only(&["TELEGRAM_BOT_TOKEN", "TELEGRAM_CHAT_ID"])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case("telegram_bot_token") {
                "telegram.bot_token".into()
            } else {
                "telegram.chat_id".into()
            }
        })
}
