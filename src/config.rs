use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Default)]
#[command(name = "jobtrack")]
#[command(about = "Runs the job tracker service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    /// Overrides `app.database` from the config file
    #[arg(long)]
    pub database: Option<String>,

    /// Overrides `app.port` from the config file
    #[arg(long)]
    pub port: Option<u16>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jobtrack")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_database")]
    database: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

fn default_database() -> String {
    "app.db".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for App {
    fn default() -> Self {
        App {
            database: default_database(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub app: App,
}

impl Config {
    pub fn new(path: &Path) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    /// Builds the process-wide configuration: the file if one exists, built-in
    /// defaults otherwise, then command line overrides on top.
    pub fn resolve(cli: &Cli, config_path: &Path) -> Result<Self> {
        let mut cfg = if config_path.exists() {
            Config::new(config_path)?
        } else if cli.config_path.is_some() {
            anyhow::bail!("config file {} does not exist", config_path.display());
        } else {
            tracing::info!(path = ?config_path, "no config file found, using defaults");
            Config::default()
        };

        if let Some(database) = &cli.database {
            cfg.app.database = database.clone();
        }
        if let Some(port) = cli.port {
            cfg.app.port = port;
        }

        Ok(cfg)
    }

    /// Location of the database file. Relative paths are taken from `data_dir`.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        let db = Path::new(self.app.get_db());
        if db.is_absolute() { db.to_path_buf() } else { data_dir.join(db) }
    }

    fn load_config(path: &Path) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        Config::parse(&yaml_str)
    }

    fn parse(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_section_missing() {
        let cfg = Config::parse("{}").unwrap();
        assert_eq!(cfg.app.get_db(), "app.db");
        assert_eq!(cfg.app.get_port(), 8000);
        assert_eq!(cfg.app.address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_parse_app_section() {
        let yaml = r#"
app:
  database: tracker.db
  host: 127.0.0.1
  port: 9090
"#;
        let cfg = Config::parse(yaml).unwrap();
        assert_eq!(cfg.app.get_db(), "tracker.db");
        assert_eq!(cfg.app.address(), "127.0.0.1:9090");
    }

    #[test]
    fn test_substitute_env_vars_uses_default() {
        let out = Config::substitute_env_vars("port: ${JOBTRACK_TEST_UNSET_PORT:-8123}").unwrap();
        assert_eq!(out, "port: 8123");
    }

    #[test]
    fn test_substitute_env_vars_unterminated() {
        let out = Config::substitute_env_vars("database: ${BROKEN").unwrap();
        assert_eq!(out, "database: ${BROKEN");
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "app:\n  database: a.db\n  port: 7000\n").unwrap();

        let cli = Cli {
            config_path: Some(path.to_string_lossy().into_owned()),
            database: Some("b.db".to_string()),
            port: None,
        };
        let cfg = Config::resolve(&cli, &path).unwrap();
        assert_eq!(cfg.app.get_db(), "b.db");
        assert_eq!(cfg.app.get_port(), 7000);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let cli = Cli {
            config_path: Some(path.to_string_lossy().into_owned()),
            ..Default::default()
        };
        assert!(Config::resolve(&cli, &path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_config_path_is_read_as_is() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"conf\xff.yaml"));
        fs::write(&path, "app:\n  port: 7100\n").unwrap();

        let cfg = Config::resolve(&Cli::default(), &path).unwrap();
        assert_eq!(cfg.app.get_port(), 7100);
    }

    #[test]
    fn test_database_path() {
        let cfg = Config::default();
        assert_eq!(cfg.database_path(Path::new("/srv/data")), PathBuf::from("/srv/data/app.db"));

        let mut cfg = Config::default();
        cfg.app.database = "/var/lib/jobs.db".to_string();
        assert_eq!(cfg.database_path(Path::new("/srv/data")), PathBuf::from("/var/lib/jobs.db"));
    }
}
