// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Lookout configuration system.

use figment::Jail;
use lookout_config::diagnostic::ConfigError;
use lookout_config::{load_and_validate_path, load_and_validate_str, load_config, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_lookout_config() {
    let toml = r#"
[log]
level = "debug"

[telegram]
bot_token = "123:ABC"
chat_id = "-1001234567890"
api_url = "http://localhost:8081"

[bridge]
url = "http://10.0.0.2:8787"
reconnect_delay_secs = 10

[session]
auth_dir = "/var/lib/lookout/auth"
device_name = "Archiver"

[relay]
throttle_ms = 2000
dedup_window = 500
caption_text_limit = 600
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.chat_id.as_deref(), Some("-1001234567890"));
    assert_eq!(
        config.telegram.api_url.as_deref(),
        Some("http://localhost:8081")
    );
    assert_eq!(config.bridge.url, "http://10.0.0.2:8787");
    assert_eq!(config.bridge.reconnect_delay_secs, 10);
    assert_eq!(config.session.auth_dir, "/var/lib/lookout/auth");
    assert_eq!(config.session.device_name, "Archiver");
    assert_eq!(config.relay.throttle_ms, 2000);
    assert_eq!(config.relay.dedup_window, 500);
    assert_eq!(config.relay.caption_text_limit, 600);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.log.level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.chat_id.is_none());
    assert!(config.telegram.api_url.is_none());
    assert_eq!(config.bridge.url, "http://127.0.0.1:8787");
    assert_eq!(config.bridge.reconnect_delay_secs, 5);
    assert!(config.session.auth_dir.ends_with("auth"));
    assert_eq!(config.session.device_name, "StatusArchiver");
    assert_eq!(config.relay.throttle_ms, 1000);
    assert_eq!(config.relay.dedup_window, 10_000);
    assert_eq!(config.relay.caption_text_limit, 900);
}

/// Unknown field in [telegram] produces an error naming the bad key.
#[test]
fn unknown_field_in_telegram_produces_error() {
    let toml = r#"
[telegram]
chatid = "123"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("chatid"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unknown key surfaces as an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_key_diagnostic_has_suggestion() {
    let toml = r#"
[relay]
throttel_ms = 1500
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "throttel_ms");
            assert_eq!(suggestion.as_deref(), Some("throttle_ms"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Wrong value type produces an InvalidType diagnostic.
#[test]
fn wrong_type_produces_invalid_type() {
    let toml = r#"
[relay]
throttle_ms = "fast"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject string throttle");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("throttle_ms"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_are_reported() {
    let toml = r#"
[telegram]
chat_id = "status archive"
"#;

    let errors = load_and_validate_str(toml).expect_err("chat_id with space is invalid");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("telegram.chat_id"))));
}

/// `LOOKOUT_*` variables map onto sections without splitting key names.
#[test]
fn prefixed_env_vars_override_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lookout.toml",
            r#"
[relay]
throttle_ms = 1500
"#,
        )?;
        jail.set_env("LOOKOUT_RELAY_THROTTLE_MS", "2500");
        jail.set_env("LOOKOUT_TELEGRAM_BOT_TOKEN", "xyz-from-env");
        jail.set_env("LOOKOUT_SESSION_AUTH_DIR", "/tmp/lookout-auth");

        let config = load_config()?;
        assert_eq!(config.relay.throttle_ms, 2500);
        assert_eq!(config.telegram.bot_token.as_deref(), Some("xyz-from-env"));
        assert_eq!(config.session.auth_dir, "/tmp/lookout-auth");
        Ok(())
    });
}

/// Bare TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID are honoured, and the
/// prefixed form wins when both are set.
#[test]
fn legacy_env_vars_are_honoured() {
    Jail::expect_with(|jail| {
        jail.set_env("TELEGRAM_BOT_TOKEN", "legacy-token");
        jail.set_env("TELEGRAM_CHAT_ID", "-10042");

        let config = load_config()?;
        assert_eq!(config.telegram.bot_token.as_deref(), Some("legacy-token"));
        assert_eq!(config.telegram.chat_id.as_deref(), Some("-10042"));

        jail.set_env("LOOKOUT_TELEGRAM_CHAT_ID", "@archive");
        let config = load_config()?;
        assert_eq!(config.telegram.chat_id.as_deref(), Some("@archive"));
        Ok(())
    });
}

/// An explicit config path is loaded and validated.
#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        r#"
[bridge]
url = "https://bridge.example:9443"
"#,
    )
    .unwrap();

    let config = load_and_validate_path(&path).expect("custom file should validate");
    assert_eq!(config.bridge.url, "https://bridge.example:9443");
}

/// An unknown key in an explicit file still gets a suggestion.
#[test]
fn explicit_path_unknown_key_is_diagnosed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[bridge]\nurll = \"http://x\"\n").unwrap();

    let errors = load_and_validate_path(&path).expect_err("unknown key");
    match &errors[0] {
        ConfigError::UnknownKey { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("url"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// A caption limit that cannot fit a Telegram media caption is rejected.
#[test]
fn oversized_caption_text_limit_fails_validation() {
    let errors = load_and_validate_str("[relay]\ncaption_text_limit = 5000\n")
        .expect_err("5000 characters cannot fit a media caption");
    assert!(errors.iter().any(|e| e.to_string().contains("caption_text_limit")));

    let errors = load_and_validate_str("[relay]\ncaption_text_limit = 0\n")
        .expect_err("zero leaves an empty caption line");
    assert!(errors.iter().any(|e| e.to_string().contains("caption_text_limit")));
}
