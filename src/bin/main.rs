use std::error::Error;

use ca_keystore::commands::CommandError;
use ca_keystore::commands::new_key_pair::NewKeyPairCommand;
use ca_keystore::commands::select_signer::SelectSignerCommand;
use ca_keystore::keystore::KeyStore;
use ca_keystore::keystore::config::KeyStoreConfig;
use ca_keystore::keystore::software::SoftwareKeyStore;
use ca_keystore::parameters::{Commands, KeyStoreArgs, LogLevel};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ca-keystore-cli")]
struct Cli {
    /// Log verbosity, written to stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level: tracing::Level = cli.log_level.into();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.as_str()))
        .with_writer(std::io::stderr)
        .init();

    let key_store_args = match &cli.command {
        Commands::NewKeyPair { key_store, .. } | Commands::SelectSigner { key_store, .. } => {
            key_store
        }
    };

    // The backend is picked once here; everything below is generic over it.
    match load_config(key_store_args)? {
        KeyStoreConfig::Software(config) => {
            debug!(?config, "using software key store");
            let key_store: SoftwareKeyStore = (&config).into();
            run(key_store, cli.command)?
        }
    }
    Ok(())
}

fn load_config(args: &KeyStoreArgs) -> Result<KeyStoreConfig, CommandError> {
    match &args.key_store_config {
        Some(path) => Ok(KeyStoreConfig::from_file(path)?),
        None => Ok(KeyStoreConfig::default()),
    }
}

fn run<K: KeyStore>(key_store: K, command: Commands) -> Result<(), CommandError> {
    match command {
        Commands::NewKeyPair {
            protocol,
            cluster_name,
            ..
        } => {
            let key_pair = NewKeyPairCommand::new(key_store)
                .new_key_pair(protocol.into(), cluster_name.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&key_pair)?);
        }
        Commands::SelectSigner {
            ca,
            protocol,
            allow_provisional,
            ..
        } => {
            let ca = SelectSignerCommand::<K>::load_ca(&ca)?;
            let selected = SelectSignerCommand::new(key_store).select_signer(
                &ca,
                protocol.into(),
                allow_provisional,
            )?;
            println!("{}", serde_json::to_string_pretty(&selected)?);
        }
    }
    Ok(())
}
