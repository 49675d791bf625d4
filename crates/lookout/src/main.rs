// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookout - relays WhatsApp status updates to a Telegram chat.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod login;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lookout_config::LookoutConfig;
use tracing::error;

/// Lookout - relays WhatsApp status updates to a Telegram chat.
#[derive(Parser, Debug)]
#[command(name = "lookout", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Relay status updates until interrupted.
    Serve,
    /// Link this device by scanning a pairing code.
    Login,
    /// Verify configuration, the Telegram bot and the bridge.
    Check,
}

fn load_config(path: Option<&PathBuf>) -> Result<LookoutConfig, Vec<lookout_config::ConfigError>> {
    match path {
        Some(path) => lookout_config::load_and_validate_path(path),
        None => lookout_config::load_and_validate(),
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lookout={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            lookout_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log.level);

    let code = match cli.command {
        Commands::Serve => match serve::run_serve(config).await {
            Ok(()) => 0,
            Err(e) => {
                error!(error = %e, "lookout serve stopped");
                eprintln!("error: {e}");
                1
            }
        },
        Commands::Login => match login::run_login(config).await {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(e) => {
                error!(error = %e, "pairing failed");
                eprintln!("error: {e}");
                1
            }
        },
        Commands::Check => {
            if check::run_check(&config).await {
                0
            } else {
                1
            }
        }
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["lookout", "serve"]).unwrap();
        assert_eq!(cli.command, Commands::Serve);
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from(["lookout", "login", "--config", "/tmp/l.toml"]).unwrap();
        assert_eq!(cli.command, Commands::Login);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/l.toml")));

        let cli = Cli::try_parse_from(["lookout", "-c", "x.toml", "check"]).unwrap();
        assert_eq!(cli.command, Commands::Check);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["lookout"]).is_err());
        assert!(Cli::try_parse_from(["lookout", "shell"]).is_err());
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookout.toml");
        std::fs::write(
            &path,
            "[relay]\nthrottle_ms = 250\n\n[session]\nauth_dir = \"/var/lib/lookout/auth\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.relay.throttle_ms, 250);
        assert_eq!(config.session.auth_dir, "/var/lib/lookout/auth");
    }

    #[test]
    fn invalid_config_file_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookout.toml");
        std::fs::write(&path, "[relay]\nthrotle_ms = 250\n").unwrap();
        assert!(!load_config(Some(&path)).unwrap_err().is_empty());
    }
}
