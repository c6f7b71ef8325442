use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use tracing::Level;

use crate::authority::Protocol;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates a new CA key pair with the configured key store and prints it as JSON.
    NewKeyPair {
        /// Certificate domain of the key pair.
        #[arg(long, short, value_enum)]
        protocol: ProtocolArg,

        /// Cluster the TLS CA certificate is issued for. Required with '--protocol tls'.
        #[arg(long, short, required_if_eq("protocol", "tls"))]
        cluster_name: Option<String>,

        #[command(flatten)]
        key_store: KeyStoreArgs,
    },
    /// Reports which key of a CA the configured key store would sign with.
    SelectSigner {
        /// Path to the CA, in JSON format.
        #[arg(long, required = true)]
        ca: PathBuf,

        /// Certificate domain to select a key for.
        #[arg(long, short, value_enum)]
        protocol: ProtocolArg,

        /// Consider provisional keys. Ignored for JWT, whose provisional keys never sign.
        #[arg(long, default_value_t = false)]
        allow_provisional: bool,

        #[command(flatten)]
        key_store: KeyStoreArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct KeyStoreArgs {
    /// Key store configuration file, in JSON format. Uses the software key store if missing.
    #[arg(long)]
    pub key_store_config: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ProtocolArg {
    #[value(name = "ssh")]
    Ssh,
    #[value(name = "tls")]
    Tls,
    #[value(name = "jwt")]
    Jwt,
}

impl From<ProtocolArg> for Protocol {
    fn from(value: ProtocolArg) -> Self {
        match value {
            ProtocolArg::Ssh => Protocol::Ssh,
            ProtocolArg::Tls => Protocol::Tls,
            ProtocolArg::Jwt => Protocol::Jwt,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
