//! Configuration schema definitions.
//!
//! Every setting is read from the environment first and may be overridden by
//! the matching command-line flag.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use crate::forward::ForwardSettings;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TLS_PORT: u16 = 8443;
pub const DEFAULT_TRACE_ROUTE: &str = "/init";
pub const DEFAULT_HEADER_PREFIX: &str = "X-B3";

/// Root configuration for the relay.
#[derive(Debug, Clone, Parser)]
#[command(name = "trace-relay", version, about = "Relays requests upstream with fresh trace headers")]
pub struct RelayConfig {
    /// Bind host (all interfaces by default).
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Bind port. Falls back to 8080, or 8443 when TLS is enabled.
    #[arg(long, env = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Terminate TLS with the configured certificate and key.
    #[arg(
        long = "enable-tls",
        env = "ENABLE_TLS",
        value_parser = parse_bool,
        action = ArgAction::Set,
        default_value = "false"
    )]
    pub tls_enabled: bool,

    /// Path to the PEM certificate chain.
    #[arg(long, env = "TLS_CERT_PATH", default_value = "/certs/cert.pem")]
    pub tls_cert_path: PathBuf,

    /// Path to the PEM private key.
    #[arg(long, env = "TLS_KEY_PATH", default_value = "/certs/key.pem")]
    pub tls_key_path: PathBuf,

    /// Host every traced request is sent to. Defaults to the inbound Host header.
    #[arg(long, env = "TARGET_HOST")]
    pub target_host: Option<String>,

    /// Header names starting with this prefix are not forwarded (case-insensitive).
    #[arg(long, env = "TRACE_PREFIX", default_value = DEFAULT_HEADER_PREFIX)]
    pub trace_header_prefix: String,

    /// Path prefix that marks a request for forwarding.
    #[arg(long, env = "TRACE_ROUTE", default_value = DEFAULT_TRACE_ROUTE)]
    pub trace_route: String,

    #[arg(long, env = "HEALTH_PATH", default_value = "/health")]
    pub health_path: String,

    #[arg(long, env = "DEBUG_PATH", default_value = "/debug")]
    pub debug_path: String,

    /// Upper bound on the wait for upstream response headers. Unset means no bound.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS")]
    pub upstream_timeout_secs: Option<u64>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Serve Prometheus metrics on this address when set.
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl RelayConfig {
    /// Port to bind, applying the TLS-dependent default.
    pub fn bind_port(&self) -> u16 {
        match (self.port, self.tls_enabled) {
            (Some(port), _) => port,
            (None, true) => DEFAULT_TLS_PORT,
            (None, false) => DEFAULT_PORT,
        }
    }

    /// Target host override, with an empty value meaning no override.
    pub fn target_host(&self) -> Option<&str> {
        self.target_host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }

    /// Settings handed to the forwarding engine.
    pub fn forward_settings(&self) -> ForwardSettings {
        ForwardSettings {
            target_host: self.target_host().map(str::to_string),
            trace_route: self.trace_route.clone(),
            header_filter_prefix: self.trace_header_prefix.clone(),
            inbound_tls: self.tls_enabled,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: None,
            tls_enabled: false,
            tls_cert_path: PathBuf::from("/certs/cert.pem"),
            tls_key_path: PathBuf::from("/certs/key.pem"),
            target_host: None,
            trace_header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
            trace_route: DEFAULT_TRACE_ROUTE.to_string(),
            health_path: "/health".to_string(),
            debug_path: "/debug".to_string(),
            upstream_timeout_secs: None,
            log_format: LogFormat::Text,
            metrics_address: None,
        }
    }
}

/// Parse a boolean the way deployment manifests spell it.
///
/// An empty value counts as `false` so an exported-but-blank variable keeps the default.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "" | "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(format!("expected 'true' or 'false', got {:?}", other)),
    }
}
