//! Entry point for **focus-last**.
//!
//! Without arguments it runs the daemon (start it from your session, e.g.
//! `exec_always focus-last` in the i3 config).  With `--switch` or
//! `--window <name>` it sends one request to the running daemon and exits;
//! bind those to keys.

use clap::Parser;
use focus_last::config::Config;
use focus_last::daemon;
use focus_last::ipc::{client, default_socket_path};
use log::{error, info};
use std::path::PathBuf;

/// Focus the last focused window.
#[derive(Parser, Debug)]
#[command(name = "focus-last", version)]
struct Cli {
    /// Switch to the previous window
    #[arg(long, conflicts_with = "window")]
    switch: bool,

    /// Switch to workspace NAME, or to the previous window if NAME is the
    /// current workspace
    #[arg(long, value_name = "NAME")]
    window: Option<String>,

    /// Configuration file (default: $XDG_CONFIG_HOME/focus-last/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Load the config from `--config` or the default location, falling back
/// to compiled-in defaults when the default file does not exist.
fn load_config(explicit: Option<PathBuf>) -> Config {
    let (path, required) = match explicit {
        Some(path) => (path, true),
        None => (Config::default_path(), false),
    };
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) if required => {
            error!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let socket = default_socket_path();

    let sent = if cli.switch {
        Some(client::send_switch(&socket))
    } else {
        cli.window
            .as_deref()
            .map(|name| client::send_window(&socket, name))
    };

    match sent {
        Some(Ok(())) => {}
        Some(Err(e)) => {
            error!("{}", e);
            std::process::exit(1);
        }
        None => run_daemon(cli.config),
    }
}

/// Daemon mode.  Only returns by exiting the process.
fn run_daemon(config: Option<PathBuf>) {
    let config = load_config(config);
    if let Err(e) = daemon::run(&config, &default_socket_path()) {
        error!("{}", e);
        std::process::exit(1);
    }
}
