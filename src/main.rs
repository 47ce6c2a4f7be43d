// rpc-rotator CLI
// Inspect provider lists and assemble transaction parameters

mod ui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use rpc_rotator::{keccak256, split_rsv, EndpointManager, ManagerSettings, NetworkConfig, TxParams};

/// RPC endpoint rotation and transaction assembly
#[derive(Parser, Debug)]
#[command(name = "rpc-rotator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rotate between RPC providers and build transaction parameters", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to settings file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "RPC_ROTATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a settings file
    Init(InitCmd),

    /// Load a providers file and show the rotation
    Endpoints(EndpointsCmd),

    /// Build a transaction parameter record
    Tx(TxCmd),

    /// Split a hex signature into r, s and v
    SplitSig(SplitSigCmd),

    /// Keccak-256 of a text input
    Hash(HashCmd),
}

#[derive(Parser, Debug)]
struct InitCmd {
    /// Sending account address
    #[arg(long)]
    account: String,

    /// JSON providers file
    #[arg(long)]
    providers: Option<PathBuf>,

    /// Default gas price multiplier
    #[arg(long)]
    multiplier: Option<f64>,

    /// Network preset (mainnet, goerli, sepolia or a chain id)
    #[arg(long)]
    network: Option<NetworkConfig>,

    /// Overwrite an existing settings file
    #[arg(long)]
    force: bool,
}

#[derive(Parser, Debug)]
struct EndpointsCmd {
    /// JSON providers file (overrides settings)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Network preset used when no providers file is configured
    #[arg(long)]
    network: Option<NetworkConfig>,

    /// Advance the selection this many times
    #[arg(long, default_value = "0")]
    advance: usize,
}

#[derive(Parser, Debug)]
struct TxCmd {
    /// Destination address
    #[arg(long)]
    to: String,

    /// Amount in the chain's smallest unit
    #[arg(long, default_value = "0")]
    value: u128,

    /// Call data as hex (0x...)
    #[arg(long)]
    data: Option<String>,

    /// Account nonce
    #[arg(long)]
    nonce: Option<u64>,

    /// Gas limit
    #[arg(long)]
    gas: Option<u64>,

    /// Base gas price in wei
    #[arg(long)]
    gas_price: Option<u128>,

    /// Gas price multiplier
    #[arg(long)]
    multiplier: Option<f64>,

    /// Sending account (overrides settings)
    #[arg(long)]
    from: Option<String>,

    /// Testing mode: use nonce 1 when --nonce is omitted
    #[arg(long)]
    testing: bool,

    /// Print only the JSON record
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct SplitSigCmd {
    /// 65-byte signature as hex
    signature: String,
}

#[derive(Parser, Debug)]
struct HashCmd {
    /// Text to hash
    input: String,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings_path = cli.config.clone().unwrap_or_else(ManagerSettings::default_path);

    match cli.command {
        Commands::Init(cmd) => init_settings(&settings_path, cmd),
        Commands::Endpoints(cmd) => {
            let settings = load_settings(&settings_path, cli.config.is_some())?;
            show_endpoints(settings, cmd)
        }
        Commands::Tx(cmd) => {
            let settings = load_settings(&settings_path, cli.config.is_some())?;
            build_tx(settings, cmd)
        }
        Commands::SplitSig(cmd) => {
            let sig = split_rsv(&cmd.signature)?;
            println!("r: 0x{}", sig.r);
            println!("s: 0x{}", sig.s);
            println!("v: {}", sig.v);
            Ok(())
        }
        Commands::Hash(cmd) => {
            println!("{}", keccak256(&cmd.input));
            Ok(())
        }
    }
}

/// Load settings; a missing file is only an error when the path was given explicitly
fn load_settings(path: &Path, explicit: bool) -> anyhow::Result<ManagerSettings> {
    if path.exists() {
        debug!("Loading settings from {}", path.display());
        ManagerSettings::load(path)
    } else if explicit {
        anyhow::bail!("Settings file not found: {}", path.display())
    } else {
        warn!("Settings file not found, using defaults");
        Ok(ManagerSettings::default())
    }
}

fn init_settings(path: &Path, cmd: InitCmd) -> anyhow::Result<()> {
    if path.exists() && !cmd.force {
        anyhow::bail!(
            "Settings file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let settings = ManagerSettings::default()
        .with_account_address(Some(cmd.account))
        .with_providers_file(cmd.providers)
        .with_gas_price_multiplier(cmd.multiplier)
        .with_network(cmd.network);
    settings.validate()?;
    settings.save(path)?;

    info!("Settings written to {}", path.display());
    println!("Settings written to {}", path.display());
    Ok(())
}

fn show_endpoints(settings: ManagerSettings, cmd: EndpointsCmd) -> anyhow::Result<()> {
    let settings = settings
        .with_providers_file(cmd.file)
        .with_network(cmd.network);

    // Rotation does not need a sending account
    let mut manager = EndpointManager::new(settings.account_address.clone());
    if !settings.load_endpoints_into(&mut manager)? {
        anyhow::bail!("No providers given (use --file, --network or set providers_file)");
    }

    for _ in 0..cmd.advance {
        manager.advance_endpoint()?;
    }

    ui::print_endpoints(manager.endpoints(), manager.selection_index());
    Ok(())
}

fn build_tx(settings: ManagerSettings, cmd: TxCmd) -> anyhow::Result<()> {
    let settings = settings
        .with_account_address(cmd.from)
        .with_placeholder_nonce(cmd.testing)
        .with_gas_price_multiplier(cmd.multiplier);

    // Build the record without touching the endpoint sources
    let manager = ManagerSettings {
        providers_file: None,
        network: None,
        ..settings.clone()
    }
    .build_manager()?;

    if manager.placeholder_nonce() && cmd.nonce.is_none() && !cmd.json {
        ui::print_warning("Testing mode: using placeholder nonce 1");
    }

    let mut params = TxParams::new(cmd.to).with_value(cmd.value);
    if let Some(data) = cmd.data {
        let hex_data = data.strip_prefix("0x").unwrap_or(&data);
        params = params.with_data(hex::decode(hex_data).context("Invalid --data hex")?);
    }
    if let Some(nonce) = cmd.nonce {
        params = params.with_nonce(nonce);
    }
    if let Some(gas) = cmd.gas {
        params = params.with_gas(gas);
    }
    if let Some(gas_price) = cmd.gas_price {
        params = params.with_gas_price(gas_price);
    }

    let tx = manager.build_transaction(params.apply_settings(&settings))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&tx)?);
    } else {
        ui::print_transaction(&tx);
        println!("{}", serde_json::to_string(&tx)?);
    }
    Ok(())
}
