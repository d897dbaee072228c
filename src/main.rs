use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;

use alloy_primitives::{Address, B256};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use txlens::config::{self, Config};
use txlens::core::{CreateAccount, MethodDecoding, WizardEvent};
use txlens::domain::abi::AbiRegistry;
use txlens::domain::wizard::{
    AccountForm, Confirmation, CreateType, GethImportFields, NewAccountFields, WalletImportFields,
};
use txlens::infrastructure::{AbiResolver, AbiScanner, LayeredRegistry, NodeClient, ProviderConfig};
use txlens::store::LabelStore;

const DEFAULT_ENDPOINT: &str = "localhost:8545";

#[derive(Debug, Parser)]
#[command(
    name = "txlens",
    version,
    about = "txlens: describe Ethereum transactions and manage node accounts"
)]
struct Args {
    /// Node endpoint: http(s)://, ws(s):// or an IPC path
    #[arg(long, global = true)]
    rpc: Option<String>,

    /// Config file (defaults to $TXLENS_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Describe a transaction in plain language
    Decode {
        hash: B256,

        /// Address whose history the transaction is viewed from (defaults to the sender)
        #[arg(long)]
        address: Option<Address>,

        /// Use pending wording even for mined transactions
        #[arg(long)]
        pending: bool,
    },
    /// Create or import accounts on the node
    #[command(subcommand)]
    CreateAccount(CreateCommand),
    /// Manage contact labels
    #[command(subcommand)]
    Label(LabelCommand),
}

#[derive(Debug, Subcommand)]
enum CreateCommand {
    /// New account from a recovery phrase
    New {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phrase: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        hint: Option<String>,
    },
    /// Import accounts from the node's geth keystore
    Geth {
        #[arg(required = true)]
        addresses: Vec<Address>,
    },
    /// Import an encrypted wallet file
    Import {
        #[arg(long)]
        name: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        password: String,
        #[arg(long)]
        hint: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum LabelCommand {
    Set { address: Address, label: String },
    Remove { address: Address },
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };

    match args.command {
        Command::Decode {
            hash,
            address,
            pending,
        } => {
            let client = connect(args.rpc.as_deref(), &config).await?;
            run_decode(client, &config, hash, address, pending).await
        }
        Command::CreateAccount(command) => {
            let client = connect(args.rpc.as_deref(), &config).await?;
            run_create(client, command).await
        }
        Command::Label(command) => run_label(command),
    }
}

async fn connect(rpc: Option<&str>, config: &Config) -> Result<Arc<NodeClient>> {
    let endpoint = rpc
        .or(config.rpc.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_ENDPOINT);
    let provider = ProviderConfig::from_endpoint(endpoint);
    debug!(endpoint = %provider.display(), "connecting");
    let client = NodeClient::connect(provider)
        .await
        .with_context(|| format!("connect to {endpoint}"))?;
    Ok(Arc::new(client))
}

async fn run_decode(
    client: Arc<NodeClient>,
    config: &Config,
    hash: B256,
    address: Option<Address>,
    pending: bool,
) -> Result<()> {
    let fetched = client
        .transaction(hash)
        .await?
        .ok_or_else(|| anyhow!("transaction {hash} not found"))?;
    let address = address.unwrap_or(fetched.transaction.from);

    let book = config.address_book(&load_contacts());

    let local = scan_abis(config.abi_scan_roots()).await;
    let mut signatures = LayeredRegistry::new().with_layer(Arc::new(local));
    if config.remote_signatures {
        match AbiResolver::new() {
            Ok(resolver) => signatures = signatures.with_layer(Arc::new(resolver)),
            Err(err) => warn!("remote signature lookup disabled: {err:#}"),
        }
    }

    let decoding = MethodDecoding::new(address, Arc::new(book), client, Arc::new(signatures));
    decoding.lookup(fetched.transaction).await;

    let description = decoding
        .describe(fetched.historic && !pending)
        .await
        .ok_or_else(|| anyhow!("transaction {hash} could not be decoded"))?;
    println!("{description}");
    Ok(())
}

async fn scan_abis(roots: Vec<PathBuf>) -> AbiRegistry {
    let registry = match tokio::task::spawn_blocking(move || AbiScanner::scan_roots(&roots)).await
    {
        Ok(registry) => registry,
        Err(err) => {
            warn!("ABI scan aborted: {err}");
            return AbiRegistry::new();
        }
    };
    for error in &registry.stats.errors {
        warn!("{error}");
    }
    debug!(
        files = registry.stats.files,
        functions = registry.len(),
        elapsed_ms = registry.stats.elapsed.as_millis() as u64,
        "ABI scan finished"
    );
    registry
}

fn load_contacts() -> std::collections::BTreeMap<String, String> {
    let Some(path) = config::labels_db_path() else {
        return Default::default();
    };
    match LabelStore::open(&path).and_then(|store| store.load_all()) {
        Ok(labels) => labels,
        Err(err) => {
            warn!("label store disabled: {err:#}");
            Default::default()
        }
    }
}

async fn run_create(client: Arc<NodeClient>, command: CreateCommand) -> Result<()> {
    let form = match command {
        CreateCommand::New {
            name,
            phrase,
            password,
            hint,
        } => AccountForm::New(NewAccountFields {
            name,
            password_hint: hint,
            password,
            phrase,
        }),
        CreateCommand::Geth { addresses } => AccountForm::Geth(GethImportFields { addresses }),
        CreateCommand::Import {
            name,
            file,
            password,
            hint,
        } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("read wallet {}", file.display()))?;
            AccountForm::Import(WalletImportFields {
                name,
                password_hint: hint,
                password,
                json,
            })
        }
    };

    let (events, received) = mpsc::channel();
    let mut wizard = CreateAccount::new(client, events);
    wizard.select_type(form.create_type())?;
    wizard.next();
    wizard.on_change(form_is_valid(&form), form)?;

    let result = wizard.create().await;
    for event in received.try_iter() {
        if let WizardEvent::Error { message } = event {
            eprintln!("error: {message}");
        }
    }
    result?;

    match wizard.confirmation() {
        Some(Confirmation::Account {
            address,
            name,
            phrase,
        }) => {
            println!("Created {} ({name})", address.to_checksum(None));
            if let Some(phrase) = phrase {
                println!("Recovery phrase: {phrase}");
            }
        }
        Some(Confirmation::Geth { addresses }) => {
            for address in addresses {
                println!("Imported {}", address.to_checksum(None));
            }
        }
        None => {}
    }
    wizard.close();
    Ok(())
}

fn form_is_valid(form: &AccountForm) -> bool {
    let filled = |value: &str| !value.trim().is_empty();
    match form {
        AccountForm::New(fields) => {
            filled(&fields.name) && filled(&fields.password) && filled(&fields.phrase)
        }
        AccountForm::Geth(fields) => !fields.addresses.is_empty(),
        AccountForm::Import(fields) => filled(&fields.name) && filled(&fields.json),
    }
}

fn run_label(command: LabelCommand) -> Result<()> {
    let path = config::labels_db_path().ok_or_else(|| anyhow!("no data directory available"))?;
    let store = LabelStore::open(&path)?;

    match command {
        LabelCommand::Set { address, label } => {
            store.set_label(&address.to_string(), &label)?;
        }
        LabelCommand::Remove { address } => {
            if !store.remove_label(&address.to_string())? {
                eprintln!("no label for {}", address.to_checksum(None));
            }
        }
        LabelCommand::List => {
            for (address, label) in store.load_all()? {
                println!("{address}  {label}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_decode_args() {
        let hash = format!("0x{}", "ab".repeat(32));
        let args = Args::try_parse_from(["txlens", "decode", &hash, "--pending"]).unwrap();
        match args.command {
            Command::Decode {
                address, pending, ..
            } => {
                assert!(address.is_none());
                assert!(pending);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_form_validity() {
        assert!(!form_is_valid(&AccountForm::Geth(GethImportFields::default())));
        assert!(!form_is_valid(&AccountForm::New(NewAccountFields {
            name: "main".to_string(),
            ..Default::default()
        })));
        assert!(form_is_valid(&AccountForm::Import(WalletImportFields {
            name: "cold".to_string(),
            json: "{}".to_string(),
            ..Default::default()
        })));
    }
}
