//! Server configuration: optional TOML file, then `ROSTER_*` environment
//! variables, over built-in defaults.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  /// SQLite database file; `:memory:` keeps everything in memory.
  pub database_path: PathBuf,
}

impl ServerConfig {
  /// Load from `path` (which may be absent) and the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::load_with_env(path, Environment::with_prefix("ROSTER"))
  }

  fn load_with_env(path: &Path, env: Environment) -> Result<Self, ConfigError> {
    Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080_i64)?
      .set_default("database_path", "roster.db")?
      .add_source(File::from(path).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn no_env() -> Environment {
    Environment::with_prefix("ROSTER").source(Some(config::Map::new()))
  }

  #[test]
  fn defaults_apply_without_file() {
    let cfg =
      ServerConfig::load_with_env(Path::new("does-not-exist.toml"), no_env())
        .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.database_path, PathBuf::from("roster.db"));
  }

  #[test]
  fn file_then_environment_override_defaults() {
    let dir = std::env::temp_dir().join(format!("roster-cfg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("roster.toml");
    std::fs::write(&path, "port = 9000\ndatabase_path = \"/tmp/file.db\"\n").unwrap();

    let mut vars = config::Map::new();
    vars.insert("ROSTER_DATABASE_PATH".to_string(), ":memory:".to_string());
    let env = Environment::with_prefix("ROSTER").source(Some(vars));

    let cfg = ServerConfig::load_with_env(&path, env).unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.database_path, PathBuf::from(":memory:"));

    std::fs::remove_dir_all(&dir).ok();
  }
}
