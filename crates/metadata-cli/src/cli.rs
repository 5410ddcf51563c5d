use std::path::PathBuf;

use clap::Parser;

/// Command-line flags for the `metadata-service` binary (spec §6
/// "Configuration (flags)"), overlaid on top of an optional config file
/// (see [`crate::config`]).
///
/// Mirrors `schema-forge-cli`'s `GlobalOpts` convention: every flag also
/// accepts an environment variable, and CLI-unset flags stay `None` so the
/// config-file value (or the hard-coded default) can take over.
#[derive(Parser, Debug)]
#[command(
    name = "metadata-service",
    version,
    about = "ML-metadata service: RPC and HTTP gateways over a pluggable backing store",
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path [env: METADATA_CONFIG]
    #[arg(short = 'c', long = "config", env = "METADATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// RPC (tonic) port [env: METADATA_RPC_PORT] (default 9090)
    #[arg(long = "rpc-port", env = "METADATA_RPC_PORT")]
    pub rpc_port: Option<u16>,

    /// HTTP (axum) port [env: METADATA_HTTP_PORT] (default 8080)
    #[arg(long = "http-port", env = "METADATA_HTTP_PORT")]
    pub http_port: Option<u16>,

    /// Host address both gateways bind to [env: METADATA_HOST] (default 0.0.0.0)
    #[arg(long = "host", env = "METADATA_HOST")]
    pub host: Option<String>,

    /// Backing-store connection kind: in-memory, mysql, sqlite
    /// [env: METADATA_STORE] (default in-memory)
    #[arg(long = "store", env = "METADATA_STORE")]
    pub store: Option<String>,

    /// Schema root directory [env: METADATA_SCHEMA_DIR] (default schema/alpha)
    #[arg(long = "schema-dir", env = "METADATA_SCHEMA_DIR")]
    pub schema_dir: Option<PathBuf>,

    /// Enable the resource watcher (component F)
    #[arg(long = "watch")]
    pub watch: bool,

    /// metadata-service address the watcher talks to, if different from
    /// this process [env: METADATA_WATCHER_ADDR]
    #[arg(long = "watcher-metadata-addr", env = "METADATA_WATCHER_ADDR")]
    pub watcher_metadata_addr: Option<String>,

    /// Kubeconfig path; omit for in-cluster default [env: KUBECONFIG]
    #[arg(long = "kubeconfig", env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Path to the watched-resource list (JSON array of Group/Version/Kind)
    /// [env: METADATA_RESOURCE_LIST]
    #[arg(long = "resource-list", env = "METADATA_RESOURCE_LIST")]
    pub resource_list: Option<PathBuf>,

    /// MetaLogger cluster-object model: execution-centric, artifact-centric
    /// [env: METADATA_METALOGGER_MODE] (default execution-centric)
    #[arg(
        long = "metalogger-mode",
        env = "METADATA_METALOGGER_MODE",
        value_parser = ["execution-centric", "artifact-centric"]
    )]
    pub metalogger_mode: Option<String>,

    /// Log level override (trace, debug, info, warn, error) [env: RUST_LOG]
    #[arg(long = "log-level", env = "RUST_LOG")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_minimal_args() {
        let cli = Cli::try_parse_from(["metadata-service"]).unwrap();
        assert_eq!(cli.rpc_port, None);
        assert!(!cli.watch);
    }

    #[test]
    fn parse_overrides() {
        let cli = Cli::try_parse_from([
            "metadata-service",
            "--rpc-port",
            "19090",
            "--store",
            "mysql",
            "--watch",
        ])
        .unwrap();
        assert_eq!(cli.rpc_port, Some(19090));
        assert_eq!(cli.store.as_deref(), Some("mysql"));
        assert!(cli.watch);
    }

    #[test]
    fn invalid_metalogger_mode_rejected() {
        let result = Cli::try_parse_from(["metadata-service", "--metalogger-mode", "bogus"]);
        assert!(result.is_err());
    }
}
