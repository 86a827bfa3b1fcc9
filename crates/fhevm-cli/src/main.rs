mod commands;
mod config;
mod output;
mod session;

use clap::{Parser, Subcommand};
use quantum_contract::Algorithm;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Overrides;

#[derive(Parser)]
#[command(name = "fhevm", about = "Confidential quantum-compute demo on fhEVM", version)]
struct Cli {
    /// Machine-readable output on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Node JSON-RPC endpoint
    #[arg(long, global = true, env = "FHEVM_RPC_URL")]
    rpc_url: Option<String>,

    /// QuantumPrivacyCompute address
    #[arg(long, global = true, env = "FHEVM_CONTRACT")]
    contract: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Show node, chain, FHE and contract status
    Status,
    /// Connect the node's first account and show its balance
    Connect,
    /// Encrypt a value in [0, 255]
    Encrypt {
        value: String,
    },
    /// Store a value as a 3-qubit quantum state
    InitState {
        value: u64,
    },
    /// Submit a quantum job
    Submit {
        /// Input value in [0, 255]
        input: String,
        /// Algorithm id (0-5) or name
        #[arg(long, short, default_value = "shor")]
        algorithm: Algorithm,
    },
    /// Show a job, or the connected account's job history when no id is given
    Job {
        id: Option<String>,
        /// Execute the job before showing it
        #[arg(long)]
        execute: bool,
    },
    /// Request gateway decryption of a job result
    Decrypt {
        job_id: String,
        /// Seconds to wait for the gateway
        #[arg(long, default_value_t = 120)]
        timeout: u64,
    },
    /// Stream contract events and wallet changes until interrupted
    Watch,
    /// Manage ~/.fhevm/config.json
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Set a config key
    Set { key: String, value: String },
    /// Show the effective config
    Show,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fhevm=debug,fhevm_sdk=debug,quantum_contract=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    output::set_json_mode(cli.json);

    let overrides = Overrides {
        rpc_url: cli.rpc_url,
        contract: cli.contract,
    };

    match cli.command {
        Cmd::Status => commands::status::run(&overrides).await?,
        Cmd::Connect => commands::connect::run(&overrides).await?,
        Cmd::Encrypt { value } => commands::encrypt::run(&overrides, &value).await?,
        Cmd::InitState { value } => commands::init_state::run(&overrides, value).await?,
        Cmd::Submit { input, algorithm } => {
            commands::submit::run(&overrides, &input, algorithm).await?
        }
        Cmd::Job { id, execute } => commands::job::run(&overrides, id.as_deref(), execute).await?,
        Cmd::Decrypt { job_id, timeout } => {
            commands::decrypt::run(&overrides, &job_id, timeout).await?
        }
        Cmd::Watch => commands::watch::run(&overrides).await?,
        Cmd::Config { action } => match action {
            ConfigAction::Set { key, value } => commands::config::set(&key, &value)?,
            ConfigAction::Show => commands::config::show(&overrides)?,
        },
    }
    Ok(())
}
