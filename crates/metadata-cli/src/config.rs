use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::CliError;

fn default_rpc_port() -> u16 {
    9090
}

fn default_http_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_store() -> String {
    "in-memory".to_string()
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("schema/alpha")
}

fn default_metalogger_mode() -> String {
    "execution-centric".to_string()
}

/// Watcher-specific settings (spec §6 "The watcher additionally accepts a
/// metadata-service address, a kubeconfig path or in-cluster default, and
/// the resource-list path").
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WatcherFileConfig {
    pub metadata_service_addr: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub resource_list: Option<PathBuf>,
    #[serde(default = "default_metalogger_mode")]
    pub metalogger_mode: String,
}

/// Aggregates every configuration surface in spec §6, loadable from an
/// optional TOML file (spec §10.3, matching `schema-forge-acton`'s
/// `SchemaForgeConfig`/`SchemaForgeSettings` pattern).
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_store")]
    pub store: String,
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,
    #[serde(default)]
    pub watcher: WatcherFileConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rpc_port: default_rpc_port(),
            http_port: default_http_port(),
            host: default_host(),
            store: default_store(),
            schema_dir: default_schema_dir(),
            watcher: WatcherFileConfig::default(),
        }
    }
}

/// Discovery order for the config file, matching `schema-forge-cli::config::load_config`:
/// 1. `--config <path>` (explicit)
/// 2. `METADATA_CONFIG` env var
/// 3. `./config.toml` (project-local)
/// 4. `$XDG_CONFIG_HOME/metadata-service/config.toml`
/// 5. `~/.config/metadata-service/config.toml`
pub fn load_config(explicit_path: Option<&Path>) -> Result<ServiceConfig, CliError> {
    if let Some(path) = explicit_path {
        return load_config_from_path(path);
    }

    if let Ok(env_path) = std::env::var("METADATA_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    let local = PathBuf::from("config.toml");
    if local.exists() {
        return load_config_from_path(&local);
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg).join("metadata-service/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/metadata-service/config.toml");
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Ok(ServiceConfig::default())
}

fn load_config_from_path(path: &Path) -> Result<ServiceConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|err| CliError::Config {
        message: format!("failed to parse {}: {err}", path.display()),
    })
}

/// Merges CLI-flag overrides onto a loaded [`ServiceConfig`] (CLI flags win,
/// matching `schema-forge-cli::config::resolve_db_params`).
pub fn resolve(cli: &Cli, mut config: ServiceConfig) -> ServiceConfig {
    if let Some(rpc_port) = cli.rpc_port {
        config.rpc_port = rpc_port;
    }
    if let Some(http_port) = cli.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(store) = &cli.store {
        config.store = store.clone();
    }
    if let Some(schema_dir) = &cli.schema_dir {
        config.schema_dir = schema_dir.clone();
    }
    if let Some(addr) = &cli.watcher_metadata_addr {
        config.watcher.metadata_service_addr = Some(addr.clone());
    }
    if let Some(kubeconfig) = &cli.kubeconfig {
        config.watcher.kubeconfig = Some(kubeconfig.clone());
    }
    if let Some(resource_list) = &cli.resource_list {
        config.watcher.resource_list = Some(resource_list.clone());
    }
    if let Some(mode) = &cli.metalogger_mode {
        config.watcher.metalogger_mode = mode.clone();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_cli() -> Cli {
        Cli {
            config: None,
            rpc_port: None,
            http_port: None,
            host: None,
            store: None,
            schema_dir: None,
            watch: false,
            watcher_metadata_addr: None,
            kubeconfig: None,
            resource_list: None,
            metalogger_mode: None,
            log_level: None,
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.rpc_port, 9090);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.store, "in-memory");
        assert_eq!(config.schema_dir, PathBuf::from("schema/alpha"));
        assert_eq!(config.watcher.metalogger_mode, "execution-centric");
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let toml_str = r#"
rpc_port = 19090
"#;
        let config: ServiceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rpc_port, 19090);
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn cli_overrides_win_over_file_config() {
        let mut cli = empty_cli();
        cli.rpc_port = Some(7777);
        let resolved = resolve(&cli, ServiceConfig::default());
        assert_eq!(resolved.rpc_port, 7777);
        assert_eq!(resolved.http_port, 8080);
    }

    #[test]
    fn load_config_from_explicit_missing_file_errors() {
        let config = load_config(Some(Path::new("/nonexistent/config.toml")));
        assert!(config.is_err());
    }
}
