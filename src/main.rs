mod catalog;
mod chain;
mod commands;
mod config;
mod db;
mod error;
mod fees;
mod intent;
mod models;
mod sequencer;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::chain::wallet::{SimulatedWallet, Wallet};
use crate::config::{AppConfig, DemoTipConfig, SEPOLIA};
use crate::db::Db;
use crate::fees::to_base_units;

#[derive(Parser, Debug)]
#[command(name = "give-me-a-cola")]
#[command(about = "Tip open-source authors with same-chain or cross-chain USDC", long_about = None)]
struct Cli {
    #[arg(long, default_value = "cola.db")]
    db_path: String,

    /// Address of the connected wallet.
    #[arg(
        long,
        env = "COLA_WALLET_ADDRESS",
        default_value = "0x00000000000000000000000000000000000000aa"
    )]
    wallet: Address,

    #[arg(long, env = "COLA_CHAIN_ID", default_value_t = SEPOLIA)]
    chain_id: u64,

    /// Router contract on the connected chain.
    #[arg(long, env = "COLA_ROUTER")]
    router: Option<Address>,

    /// Simulated USDC balance of the wallet.
    #[arg(long, default_value = "100")]
    usdc_balance: String,

    /// Simulated native balance of the wallet, in ETH.
    #[arg(long, default_value = "1")]
    eth_balance: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Projects {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Project {
        #[arg(long)]
        id: i64,
    },
    Quote {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        recipient: Option<String>,
        #[arg(long)]
        target_chain: Option<u64>,
    },
    Tip {
        #[arg(long)]
        project: i64,
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        target_chain: Option<u64>,
        #[arg(long)]
        message: Option<String>,
    },
    Demo {
        #[arg(long, env = "COLA_DEMO_RECIPIENT")]
        recipient: Option<String>,
        #[arg(long, env = "COLA_UNIVERSAL_SWAP_APP")]
        universal_swap_app: Option<String>,
        #[arg(long, env = "COLA_TARGET_ZRC20")]
        target_zrc20: Option<String>,
        #[arg(long, env = "COLA_GATEWAY")]
        gateway: Option<String>,
        /// Skip the animation delays.
        #[arg(long)]
        fast: bool,
    },
    History {
        #[arg(long)]
        project: i64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(router) = cli.router {
        config = config.with_router(cli.chain_id, router);
    }

    let mut wallet = open_wallet(&cli, &config)?;

    let result = match cli.command {
        Commands::Projects { category, json } => {
            commands::projects::list(category.as_deref(), json)
        }
        Commands::Project { id } => commands::projects::show(id),
        Commands::Quote {
            amount,
            recipient,
            target_chain,
        } => commands::quote::run(&config, &wallet, recipient.as_deref(), &amount, target_chain),
        Commands::Tip {
            project,
            recipient,
            amount,
            target_chain,
            message,
        } => {
            let db = Db::open(&cli.db_path)?;
            let args = commands::tip::TipArgs {
                project_id: project,
                recipient: &recipient,
                amount: &amount,
                target_chain,
                message: message.as_deref(),
            };
            commands::tip::run(&db, &config, &mut wallet, &args)
        }
        Commands::Demo {
            recipient,
            universal_swap_app,
            target_zrc20,
            gateway,
            fast,
        } => {
            let demo = DemoTipConfig::new(recipient, universal_swap_app, target_zrc20, gateway);
            commands::demo::run(&mut wallet, &demo, !fast)
        }
        Commands::History { project } => {
            let db = Db::open(&cli.db_path)?;
            commands::history::run(&db, &config, project)
        }
    };

    wallet.disconnect();
    result
}

fn open_wallet(cli: &Cli, config: &AppConfig) -> Result<SimulatedWallet> {
    let native = to_base_units(&cli.eth_balance, 18)
        .with_context(|| format!("invalid --eth-balance: {}", cli.eth_balance))?;
    let mut wallet = SimulatedWallet::new(cli.wallet, cli.chain_id).with_native(native);

    if let Ok(usdc) = config.usdc_for(cli.chain_id) {
        let balance = to_base_units(&cli.usdc_balance, config.bounds.decimals)
            .with_context(|| format!("invalid --usdc-balance: {}", cli.usdc_balance))?;
        wallet = wallet.with_token(usdc, balance);
    }

    wallet.connect()?;
    Ok(wallet)
}
