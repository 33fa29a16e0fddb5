//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/focus-last/config.json`
//! or the path passed with `--config <path>`.  Every key is optional and a
//! missing file means defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "jump_mode": "name",
//!   "wm_socket": "/run/user/1000/i3/ipc-socket.1234"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a workspace jump request is phrased to i3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JumpMode {
    /// `workspace number "<target>"`: matches `3` against `3: mail`.
    #[default]
    Number,
    /// `workspace "<target>"`: the target is the exact name.
    Name,
}

impl JumpMode {
    /// The i3 command that jumps to `target`.
    pub fn command(self, target: &str) -> String {
        let quoted = quote(target);
        match self {
            JumpMode::Number => format!("workspace number {}", quoted),
            JumpMode::Name => format!("workspace {}", quoted),
        }
    }
}

/// Double-quote an i3 command argument.
fn quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// How workspace names sent by clients are handed to i3.
    #[serde(default)]
    pub jump_mode: JumpMode,

    /// i3 socket to use instead of discovering it.
    #[serde(default)]
    pub wm_socket: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Default location, `$XDG_CONFIG_HOME/focus-last/config.json`.
    pub fn default_path() -> PathBuf {
        let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
            format!("{}/.config", home)
        });
        PathBuf::from(base).join("focus-last").join("config.json")
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{ "jump_mode": "name", "wm_socket": "/tmp/i3.sock" }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.jump_mode, JumpMode::Name);
        assert_eq!(cfg.wm_socket, Some(PathBuf::from("/tmp/i3.sock")));
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.jump_mode, JumpMode::Number);
        assert_eq!(cfg.wm_socket, None);
    }

    #[test]
    fn unknown_keys_ignored() {
        let json = r#"{ "jump_mode": "number", "max_history": 15 }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn bad_jump_mode_rejected() {
        assert!(serde_json::from_str::<Config>(r#"{ "jump_mode": "nearest" }"#).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "jump_mode": "name" }"#).unwrap();
        assert_eq!(Config::load(&path).unwrap().jump_mode, JumpMode::Name);
    }

    #[test]
    fn jump_commands() {
        assert_eq!(JumpMode::Number.command("3"), r#"workspace number "3""#);
        assert_eq!(JumpMode::Name.command("2: term"), r#"workspace "2: term""#);
        assert_eq!(
            JumpMode::Name.command(r#"a "b" \c"#),
            r#"workspace "a \"b\" \\c""#
        );
    }
}
