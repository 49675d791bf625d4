// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lookout check` command implementation.
//!
//! Verifies the pieces `lookout serve` depends on and prints one line per
//! check. Configuration has already been loaded and validated by the time
//! this runs.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use lookout_config::LookoutConfig;
use lookout_core::types::HealthStatus;
use lookout_core::{PluginAdapter, SessionStore};
use lookout_telegram::TelegramSink;
use lookout_whatsapp::{BridgeTransport, FileSessionStore};

/// Status of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, message: String, start: Instant) -> Self {
        Self {
            name,
            status,
            message,
            duration: start.elapsed(),
        }
    }
}

/// Runs every check and prints the report. Returns `false` if any failed.
pub async fn run_check(config: &LookoutConfig) -> bool {
    let use_color = std::io::stdout().is_terminal();
    let results = vec![
        CheckResult::new(
            "Configuration",
            CheckStatus::Pass,
            "valid".to_string(),
            Instant::now(),
        ),
        check_telegram(config).await,
        check_bridge(config).await,
        check_session(config).await,
    ];

    println!();
    println!("  lookout check");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", format_line(result, use_color));
    }
    println!();

    let failed = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    match failed {
        0 => println!("  All required checks passed."),
        1 => println!("  1 check failed."),
        n => println!("  {n} checks failed."),
    }
    println!();

    failed == 0
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!(
            "    {symbol} {:<20} {message} ({duration_ms}ms)",
            result.name
        )
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

async fn check_telegram(config: &LookoutConfig) -> CheckResult {
    let start = Instant::now();
    let sink = match TelegramSink::new(&config.telegram) {
        Ok(sink) => sink,
        Err(e) => return CheckResult::new("Telegram bot", CheckStatus::Fail, e.to_string(), start),
    };
    match sink.bot_username().await {
        Ok(username) => CheckResult::new(
            "Telegram bot",
            CheckStatus::Pass,
            format!("@{username}"),
            start,
        ),
        Err(e) => CheckResult::new("Telegram bot", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_bridge(config: &LookoutConfig) -> CheckResult {
    let start = Instant::now();
    let transport = match BridgeTransport::new(&config.bridge, &config.session.device_name, None) {
        Ok(transport) => transport,
        Err(e) => return CheckResult::new("WhatsApp bridge", CheckStatus::Fail, e.to_string(), start),
    };
    match transport.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(
            "WhatsApp bridge",
            CheckStatus::Pass,
            format!("reachable at {}", config.bridge.url),
            start,
        ),
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("WhatsApp bridge", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("WhatsApp bridge", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("WhatsApp bridge", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_session(config: &LookoutConfig) -> CheckResult {
    let start = Instant::now();
    let store = FileSessionStore::new(&config.session.auth_dir);
    match store.load().await {
        Ok(Some(_)) => CheckResult::new(
            "Session",
            CheckStatus::Pass,
            format!("paired ({})", store.credentials_path().display()),
            start,
        ),
        Ok(None) => CheckResult::new(
            "Session",
            CheckStatus::Warn,
            "not paired; run `lookout login`".to_string(),
            start,
        ),
        Err(e) => CheckResult::new("Session", CheckStatus::Fail, e.to_string(), start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: CheckStatus) -> CheckResult {
        CheckResult {
            name: "Session",
            status,
            message: "not paired".to_string(),
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn plain_lines_are_tagged() {
        assert!(format_line(&result(CheckStatus::Pass), false).contains("[OK]"));
        assert!(format_line(&result(CheckStatus::Warn), false).contains("[WARN]"));
        let line = format_line(&result(CheckStatus::Fail), false);
        assert!(line.contains("[FAIL]"));
        assert!(line.contains("not paired (3ms)"));
    }

    #[tokio::test]
    async fn missing_credentials_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LookoutConfig::default();
        config.session.auth_dir = dir.path().display().to_string();
        assert_eq!(check_session(&config).await.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn missing_bot_token_fails() {
        let mut config = LookoutConfig::default();
        config.telegram.bot_token = None;
        assert_eq!(check_telegram(&config).await.status, CheckStatus::Fail);
    }
}
