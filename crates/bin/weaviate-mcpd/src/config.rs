use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use weaviate_core::connection::{ConnectionDescriptor, Scheme};
use weaviate_store::schema::DEFAULT_COLLECTION;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_TRANSPORT: &str = "stdio";
const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(name = "weaviate-mcpd", version, about = "Weaviate MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "WEAVIATE_HOST")]
    weaviate_host: Option<String>,

    #[arg(long, env = "WEAVIATE_SCHEME", default_value = DEFAULT_SCHEME)]
    weaviate_scheme: String,

    #[arg(long, env = "WEAVIATE_API_KEY", hide_env_values = true)]
    weaviate_api_key: Option<String>,

    #[arg(long, env = "DEFAULT_COLLECTION", default_value = DEFAULT_COLLECTION)]
    default_collection: String,

    #[arg(
        long,
        env = "WEAVIATE_STARTUP_TIMEOUT_SECS",
        default_value_t = DEFAULT_STARTUP_TIMEOUT_SECS
    )]
    startup_timeout_secs: u64,

    #[arg(
        long,
        env = "WEAVIATE_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    request_timeout_secs: u64,

    #[arg(
        long = "wait-ready",
        env = "WEAVIATE_WAIT_READY",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    wait_ready: bool,

    #[arg(long, env = "MCP_TRANSPORT", default_value = DEFAULT_TRANSPORT)]
    mcp_transport: String,

    #[arg(long, env = "PORT")]
    port: Option<u16>,

    #[arg(long, env = "MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

/// How the daemon talks to its MCP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http(SocketAddr),
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub connection: ConnectionDescriptor,
    pub default_collection: String,
    pub wait_ready: bool,
    pub transport: Transport,
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl DaemonConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for DaemonConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let scheme = Scheme::from_str(&args.weaviate_scheme).map_err(|_| {
            ConfigError::InvalidSetting {
                name: "WEAVIATE_SCHEME",
                value: args.weaviate_scheme.clone(),
            }
        })?;

        if args.startup_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "WEAVIATE_STARTUP_TIMEOUT_SECS",
                value: args.startup_timeout_secs.to_string(),
            });
        }
        if args.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "WEAVIATE_REQUEST_TIMEOUT_SECS",
                value: args.request_timeout_secs.to_string(),
            });
        }

        let transport = match args.mcp_transport.trim().to_ascii_lowercase().as_str() {
            "" | "stdio" => Transport::Stdio,
            "http" => Transport::Http(
                args.port
                    .map_or(args.mcp_http_addr, |port| {
                        SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
                    }),
            ),
            _ => {
                return Err(ConfigError::InvalidSetting {
                    name: "MCP_TRANSPORT",
                    value: args.mcp_transport,
                });
            }
        };

        let default_collection = if args.default_collection.trim().is_empty() {
            DEFAULT_COLLECTION.to_string()
        } else {
            args.default_collection
        };

        let connection = ConnectionDescriptor::new(args.weaviate_host, scheme)
            .with_credential(args.weaviate_api_key)
            .with_startup_timeout(Duration::from_secs(args.startup_timeout_secs))
            .with_request_timeout(Duration::from_secs(args.request_timeout_secs));

        Ok(Self {
            connection,
            default_collection,
            wait_ready: args.wait_ready,
            transport,
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            weaviate_host: None,
            weaviate_scheme: DEFAULT_SCHEME.to_string(),
            weaviate_api_key: None,
            default_collection: DEFAULT_COLLECTION.to_string(),
            startup_timeout_secs: DEFAULT_STARTUP_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            wait_ready: false,
            mcp_transport: DEFAULT_TRANSPORT.to_string(),
            port: None,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    #[test]
    fn defaults_to_local_weaviate_over_stdio() {
        let config = DaemonConfig::try_from(base_args()).expect("config should parse");

        assert_eq!(config.connection.host(), "localhost:8080");
        assert_eq!(config.connection.scheme(), Scheme::Http);
        assert!(config.connection.credential().is_none());
        assert_eq!(config.default_collection, "DefaultCollection");
        assert_eq!(config.transport, Transport::Stdio);
    }

    #[test]
    fn blank_default_collection_falls_back() {
        let mut args = base_args();
        args.default_collection = "   ".to_string();

        let config = DaemonConfig::try_from(args).expect("config should parse");
        assert_eq!(config.default_collection, "DefaultCollection");
    }

    #[test]
    fn http_transport_binds_port_on_all_interfaces() {
        let mut args = base_args();
        args.mcp_transport = "HTTP".to_string();
        args.port = Some(8081);

        let config = DaemonConfig::try_from(args).expect("config should parse");
        assert_eq!(
            config.transport,
            Transport::Http("0.0.0.0:8081".parse().expect("valid addr"))
        );
    }

    #[test]
    fn http_transport_without_port_uses_http_addr() {
        let mut args = base_args();
        args.mcp_transport = "http".to_string();

        let config = DaemonConfig::try_from(args).expect("config should parse");
        assert_eq!(
            config.transport,
            Transport::Http("127.0.0.1:4020".parse().expect("valid addr"))
        );
    }

    #[test]
    fn rejects_unknown_scheme_and_transport() {
        let mut args = base_args();
        args.weaviate_scheme = "grpc".to_string();
        assert!(matches!(
            DaemonConfig::try_from(args),
            Err(ConfigError::InvalidSetting { name: "WEAVIATE_SCHEME", .. })
        ));

        let mut args = base_args();
        args.mcp_transport = "sse".to_string();
        assert!(matches!(
            DaemonConfig::try_from(args),
            Err(ConfigError::InvalidSetting { name: "MCP_TRANSPORT", .. })
        ));
    }

    #[test]
    fn api_key_and_timeouts_reach_descriptor() {
        let mut args = base_args();
        args.weaviate_host = Some("cluster.weaviate.network".to_string());
        args.weaviate_scheme = "https".to_string();
        args.weaviate_api_key = Some("key".to_string());
        args.request_timeout_secs = 5;

        let config = DaemonConfig::try_from(args).expect("config should parse");
        assert_eq!(config.connection.host(), "cluster.weaviate.network");
        assert_eq!(config.connection.scheme(), Scheme::Https);
        assert_eq!(config.connection.credential(), Some("key"));
        assert_eq!(config.connection.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn zero_timeouts_are_rejected_by_name() {
        let mut args = base_args();
        args.request_timeout_secs = 0;
        let err = DaemonConfig::try_from(args).expect_err("zero request timeout");
        assert_eq!(err.to_string(), "invalid WEAVIATE_REQUEST_TIMEOUT_SECS value: 0");

        let mut args = base_args();
        args.startup_timeout_secs = 0;
        let err = DaemonConfig::try_from(args).expect_err("zero startup timeout");
        assert_eq!(err.to_string(), "invalid WEAVIATE_STARTUP_TIMEOUT_SECS value: 0");
    }
}
