use std::sync::Arc;

use anyhow::Result;
use fhevm_sdk::provider::{HttpProvider, ProviderError};
use fhevm_sdk::{ContractOptions, FhevmContext, FhevmError, HostEnvironment, WalletState};
use quantum_contract::{QuantumError, QuantumPrivacyCompute};
use tracing::debug;

use crate::config::CliConfig;
use crate::output;

/// Everything a command needs: the node-backed wallet, the readiness
/// context and the demo contract client.
pub struct Session {
    pub config: CliConfig,
    pub provider: Arc<HttpProvider>,
    pub ctx: FhevmContext,
    pub contract: QuantumPrivacyCompute,
}

impl Session {
    /// Must be called inside the tokio runtime.
    pub fn open(config: CliConfig) -> Result<Self> {
        debug!(
            rpc = %config.rpc_url,
            chain_id = config.chain_id,
            contract = %config.contract_address,
            "opening session"
        );
        let provider = Arc::new(HttpProvider::new(&config.rpc_url));
        // no FHE library is linked into the CLI
        let host = HostEnvironment::new().with_wallet(provider.clone());
        let ctx = FhevmContext::mount(host, Arc::new(config.fhevm_config()));

        let options = ContractOptions::new(&config.contract_address)
            .map_err(|e| explain(&config, e))?;
        let contract = QuantumPrivacyCompute::new(ctx.wallet_manager().clone(), options)
            .with_poll_interval(config.poll_interval());

        Ok(Self {
            config,
            provider,
            ctx,
            contract,
        })
    }

    pub async fn connect(&self) -> Result<WalletState> {
        let sp = output::spinner("Connecting to wallet...");
        let result = self.ctx.connect_wallet().await;
        sp.finish_and_clear();
        result.map_err(|e| explain(&self.config, e))
    }
}

/// Attach a hint to SDK errors a user can act on.
pub fn explain(config: &CliConfig, e: FhevmError) -> anyhow::Error {
    let msg = e.to_string();
    match &e {
        FhevmError::Provider(ProviderError::Transport(_)) => output::fail_with_hint(
            &msg,
            &format!(
                "is a node running at {}? change it with `fhevm config set rpc_url <url>`",
                config.rpc_url
            ),
        ),
        FhevmError::Provider(p) if p.is_user_rejection() => {
            output::fail_with_hint(&msg, "the request was rejected in the wallet")
        }
        FhevmError::Provider(ProviderError::Rpc { code: 4100, .. }) => {
            output::fail_with_hint(&msg, "the node exposes no unlocked accounts")
        }
        FhevmError::InvalidAddress(_) => output::fail_with_hint(
            &msg,
            "set a valid contract with `fhevm config set contract_address <0x...>`",
        ),
        FhevmError::InvalidRange(_) => output::fail_with_hint(&msg, "use an integer from 0 to 255"),
        FhevmError::LibraryUnavailable | FhevmError::NotReady => output::fail_with_hint(
            &msg,
            "this build has no FHE library; submit plaintext inputs with `fhevm submit`",
        ),
        FhevmError::TransactionReverted(_) => {
            output::fail_with_hint(&msg, "check the job id and the sending account")
        }
        _ => anyhow::Error::new(e),
    }
}

pub fn explain_quantum(config: &CliConfig, e: QuantumError) -> anyhow::Error {
    match e {
        QuantumError::Sdk(e) => explain(config, e),
        QuantumError::InvalidAlgorithm(_) => output::fail_with_hint(
            &e.to_string(),
            "one of: 0 Shor, 1 Grover, 2 VQE, 3 QAOA, 4 Quantum ML, 5 Custom",
        ),
        other => anyhow::Error::new(other),
    }
}
