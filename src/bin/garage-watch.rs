// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Garage Watch - terminal front-end for a garage envoy controller.
//!
//! Prints the door state whenever it changes and reads commands from
//! stdin: `t` triggers the door, `r` refreshes, `q` quits.
//!
//! ```text
//! garage-watch 192.168.1.20 [--legacy] [--config poller.json]
//! ```
//!
//! The host may also come from `GARAGE_ENVOY_HOST` and the config path from
//! `GARAGE_WATCH_CONFIG`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use garage_envoy::{DoorPoller, DoorView, HistoryEndpoint, HttpConfig, PollerConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "garage-watch")]
#[command(version, about = "Watch and trigger a garage envoy door controller", long_about = None)]
struct Cli {
    /// Controller host name or address, optionally with a port or URL scheme
    #[arg(env = "GARAGE_ENVOY_HOST")]
    host: String,

    /// Poll the legacy `/events?t=state` endpoint instead of `/history`
    #[arg(long)]
    legacy: bool,

    /// JSON file overriding the poll cadence
    #[arg(short, long, env = "GARAGE_WATCH_CONFIG")]
    config: Option<PathBuf>,
}

/// A line typed on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Trigger,
    Refresh,
    Quit,
}

impl Input {
    /// Parses one stdin line. Blank lines and anything unknown are ignored
    /// so a stray keypress never moves the door.
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "t" => Some(Self::Trigger),
            "r" => Some(Self::Refresh),
            "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Number of history entries printed under the current state.
const RECENT_ENTRIES: usize = 5;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let endpoint = if cli.legacy {
        HistoryEndpoint::legacy_events()
    } else {
        HistoryEndpoint::History
    };

    let client = match HttpConfig::new(cli.host).with_endpoint(endpoint).into_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Unable to create HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = cli.config.as_deref().map_or_else(PollerConfig::default, load_config);
    let poller = DoorPoller::spawn(client, config);
    let mut views = poller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&views.borrow_and_update());
            }
            line = lines.next_line() => {
                let command = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {e}");
                        break;
                    }
                };
                let result = match Input::parse(&command) {
                    Some(Input::Trigger) => poller.trigger_door().await,
                    Some(Input::Refresh) => poller.refresh_history().await,
                    Some(Input::Quit) => break,
                    None if command.trim().is_empty() => Ok(()),
                    None => {
                        eprintln!("unknown command {:?} (t = trigger, r = refresh, q = quit)", command.trim());
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    tracing::error!("{e}");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    poller.shutdown().await;
    ExitCode::SUCCESS
}

/// Loads poll settings from `path`, falling back to defaults.
fn load_config(path: &Path) -> PollerConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded poller configuration from {}", path.display());
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file: {e}");
                PollerConfig::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file: {e}");
            PollerConfig::default()
        }
    }
}

fn render(view: &DoorView) {
    if let Some(error) = view.last_error() {
        println!("controller unreachable: {error}");
        return;
    }

    println!(
        "door {} [{}]",
        view.current_state().unwrap_or("unknown"),
        view.trigger_label()
    );
    let skip = view.history().len().saturating_sub(RECENT_ENTRIES);
    for entry in view.history().iter().skip(skip).rev() {
        let when = entry
            .timestamp()
            .map_or_else(|| "--:--:--".to_string(), |ts| ts.format("%H:%M:%S").to_string());
        println!("  {when}  {}", entry.name().unwrap_or("?"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn help_is_not_taken_as_host() {
        let err = Cli::try_parse_from(["garage-watch", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = Cli::try_parse_from(["garage-watch", "--verbose", "door.local"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn extra_positional_is_rejected() {
        assert!(Cli::try_parse_from(["garage-watch", "door.local", "other.local"]).is_err());
    }

    #[test]
    fn host_and_flags() {
        let cli =
            Cli::try_parse_from(["garage-watch", "door.local", "--legacy", "-c", "poll.json"])
                .unwrap();
        assert_eq!(cli.host, "door.local");
        assert!(cli.legacy);
        assert_eq!(cli.config.as_deref(), Some(Path::new("poll.json")));
    }

    #[test]
    fn blank_line_does_not_trigger() {
        assert_eq!(Input::parse(""), None);
        assert_eq!(Input::parse("   "), None);
        assert_eq!(Input::parse("x"), None);
    }

    #[test]
    fn explicit_commands() {
        assert_eq!(Input::parse("t"), Some(Input::Trigger));
        assert_eq!(Input::parse(" r\n"), Some(Input::Refresh));
        assert_eq!(Input::parse("q"), Some(Input::Quit));
    }
}
