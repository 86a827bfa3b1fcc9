// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Wallet connection manager.
//!
//! Owns the single [`WalletState`] of an application instance. Provider
//! notifications are not acted on behind the host's back: they are turned
//! into [`WalletChange`] values and the host decides what to do.
//!
//! ```rust,no_run
//! # use fhevm_sdk::wallet::{WalletChange, WalletManager};
//! # async fn example(wallet: WalletManager) -> fhevm_sdk::error::FhevmResult<()> {
//! wallet.connect().await?;
//! if let Some(mut events) = wallet.provider_events() {
//!     while let Some(change) = wallet.next_change(&mut events).await {
//!         match change {
//!             WalletChange::ReconnectRequested { .. } => { wallet.connect().await?; }
//!             WalletChange::ReloadRequired { .. } => break,
//!             WalletChange::Disconnected => {}
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

use crate::error::{FhevmError, FhevmResult};
use crate::format::format_ether;
use crate::provider::{ProviderError, ProviderEvent};
use crate::rpc::RpcProvider;
use crate::signer::Signer;

/// EIP-1193 code for "no account authorized".
const UNAUTHORIZED: i64 = 4100;

#[derive(Clone, Debug, Default)]
pub struct WalletState {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub is_connected: bool,
    /// Balance in ETH as a decimal string.
    pub balance: Option<String>,
    pub provider: Option<RpcProvider>,
    pub signer: Option<Arc<Signer>>,
}

impl WalletState {
    /// Holds `is_connected == (address && signer)`.
    pub fn is_consistent(&self) -> bool {
        self.is_connected == (self.address.is_some() && self.signer.is_some())
    }
}

/// A provider notification translated for the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletChange {
    /// Account set emptied; state has already been reset.
    Disconnected,
    /// Account set changed while connected; calling `connect()` refreshes state.
    ReconnectRequested { accounts: Vec<Address> },
    /// Chain switched; state from the old chain must not be trusted.
    ReloadRequired { chain_id: u64 },
}

#[derive(Clone)]
pub struct WalletManager {
    provider: Option<RpcProvider>,
    state: Arc<watch::Sender<WalletState>>,
}

impl WalletManager {
    pub fn new(provider: Option<RpcProvider>) -> Self {
        let (state, _) = watch::channel(WalletState::default());
        Self {
            provider,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> WalletState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state.
    pub fn watch(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected
    }

    pub fn address(&self) -> Option<Address> {
        self.state.borrow().address
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.state.borrow().chain_id
    }

    pub fn balance(&self) -> Option<String> {
        self.state.borrow().balance.clone()
    }

    pub fn signer(&self) -> Option<Arc<Signer>> {
        self.state.borrow().signer.clone()
    }

    pub fn provider(&self) -> Option<RpcProvider> {
        self.state.borrow().provider.clone()
    }

    /// Request account access and publish a connected state.
    ///
    /// On any failure the previous state is kept and the error returned.
    pub async fn connect(&self) -> FhevmResult<WalletState> {
        let provider = self.provider.clone().ok_or(FhevmError::ProviderUnavailable)?;

        let next = match Self::read_connected_state(provider).await {
            Ok(s) => s,
            Err(e) => {
                error!("wallet connection failed: {e}");
                return Err(e);
            }
        };

        if let Some(address) = next.address {
            info!(%address, chain_id = ?next.chain_id, "wallet connected");
        }
        self.state.send_replace(next.clone());
        Ok(next)
    }

    async fn read_connected_state(provider: RpcProvider) -> FhevmResult<WalletState> {
        let accounts = provider.request_accounts().await?;
        let address = *accounts.first().ok_or_else(|| ProviderError::Rpc {
            code: UNAUTHORIZED,
            message: "no account authorized".into(),
        })?;
        let chain_id = provider.chain_id().await?;
        let balance = provider.get_balance(address).await?;
        let signer = Signer::new(address, provider.clone());

        Ok(WalletState {
            address: Some(address),
            chain_id: Some(chain_id),
            is_connected: true,
            balance: Some(format_ether(balance)),
            provider: Some(provider),
            signer: Some(signer),
        })
    }

    /// Reset to the empty state. The wallet's own permission grant is untouched.
    pub fn disconnect(&self) {
        self.state.send_replace(WalletState::default());
        info!("wallet disconnected");
    }

    /// Notifications from the host's provider, if there is one.
    pub fn provider_events(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        self.provider.as_ref().map(RpcProvider::subscribe)
    }

    /// Translate one provider notification. An emptied account set
    /// disconnects immediately; everything else is left to the host.
    pub fn handle_event(&self, event: ProviderEvent) -> Option<WalletChange> {
        match event {
            ProviderEvent::AccountsChanged(accounts) if accounts.is_empty() => {
                self.disconnect();
                Some(WalletChange::Disconnected)
            }
            ProviderEvent::AccountsChanged(accounts) => self
                .is_connected()
                .then_some(WalletChange::ReconnectRequested { accounts }),
            ProviderEvent::ChainChanged(chain_id) => {
                Some(WalletChange::ReloadRequired { chain_id })
            }
        }
    }

    /// Wait for the next notification that matters to the host.
    /// Returns `None` once the provider's notification stream is closed.
    pub async fn next_change(
        &self,
        events: &mut broadcast::Receiver<ProviderEvent>,
    ) -> Option<WalletChange> {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(change) = self.handle_event(event) {
                        return Some(change);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("missed {n} provider notifications");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use alloy_primitives::U256;

    fn manager(mock: &Arc<MockProvider>) -> WalletManager {
        WalletManager::new(Some(RpcProvider::new(mock.clone())))
    }

    #[tokio::test]
    async fn connect_without_provider_fails_and_keeps_state() {
        let wallet = WalletManager::new(None);
        let err = wallet.connect().await.unwrap_err();
        assert!(matches!(err, FhevmError::ProviderUnavailable));
        let state = wallet.state();
        assert!(!state.is_connected);
        assert!(state.address.is_none());
        assert!(state.is_consistent());
    }

    #[tokio::test]
    async fn connect_publishes_account_chain_and_balance() {
        let mock = Arc::new(MockProvider::new(8009));
        mock.set_balance(U256::from(1_500_000_000_000_000_000u64));
        let wallet = manager(&mock);

        let state = wallet.connect().await.unwrap();
        assert!(state.is_connected);
        assert!(state.is_consistent());
        assert_eq!(state.address, Some(MockProvider::account(0)));
        assert_eq!(state.chain_id, Some(8009));
        assert_eq!(state.balance.as_deref(), Some("1.500000000000000000"));
        assert_eq!(wallet.address(), Some(MockProvider::account(0)));
        assert!(mock.requests().contains(&"eth_requestAccounts".to_string()));
    }

    #[tokio::test]
    async fn rejected_connect_keeps_previous_state() {
        let mock = Arc::new(MockProvider::new(8009));
        let wallet = manager(&mock);
        wallet.connect().await.unwrap();
        let before = wallet.signer().unwrap();

        mock.reject_account_requests(true);
        let err = wallet.connect().await.unwrap_err();
        assert!(err.is_user_rejection());
        assert!(wallet.is_connected());
        assert!(Arc::ptr_eq(&before, &wallet.signer().unwrap()));
    }

    #[tokio::test]
    async fn disconnect_resets_state() {
        let mock = Arc::new(MockProvider::new(8009));
        let wallet = manager(&mock);
        wallet.connect().await.unwrap();
        wallet.disconnect();
        let state = wallet.state();
        assert!(!state.is_connected);
        assert!(state.address.is_none());
        assert!(state.provider.is_none());
        assert!(state.signer.is_none());
        assert!(state.balance.is_none());
    }

    #[tokio::test]
    async fn reconnect_replaces_signer_identity() {
        let mock = Arc::new(MockProvider::new(8009));
        let wallet = manager(&mock);
        wallet.connect().await.unwrap();
        let first = wallet.signer().unwrap();
        wallet.connect().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &wallet.signer().unwrap()));
    }

    #[tokio::test]
    async fn account_events_translate_to_changes() {
        let mock = Arc::new(MockProvider::new(8009));
        let wallet = manager(&mock);

        // not connected: non-empty change is ignored
        assert_eq!(
            wallet.handle_event(ProviderEvent::AccountsChanged(vec![MockProvider::account(1)])),
            None
        );

        wallet.connect().await.unwrap();
        assert_eq!(
            wallet.handle_event(ProviderEvent::AccountsChanged(vec![MockProvider::account(1)])),
            Some(WalletChange::ReconnectRequested {
                accounts: vec![MockProvider::account(1)]
            })
        );
        // state untouched until the host reconnects
        assert_eq!(wallet.address(), Some(MockProvider::account(0)));

        assert_eq!(
            wallet.handle_event(ProviderEvent::AccountsChanged(vec![])),
            Some(WalletChange::Disconnected)
        );
        assert!(!wallet.is_connected());
    }

    #[tokio::test]
    async fn chain_change_requires_reload() {
        let mock = Arc::new(MockProvider::new(8009));
        let wallet = manager(&mock);
        wallet.connect().await.unwrap();
        assert_eq!(
            wallet.handle_event(ProviderEvent::ChainChanged(11155111)),
            Some(WalletChange::ReloadRequired { chain_id: 11155111 })
        );
        // not reconciled in place
        assert_eq!(wallet.chain_id(), Some(8009));
    }

    #[tokio::test]
    async fn next_change_skips_ignored_events() {
        let mock = Arc::new(MockProvider::new(8009));
        let wallet = manager(&mock);
        let mut events = wallet.provider_events().unwrap();

        mock.emit(ProviderEvent::AccountsChanged(vec![MockProvider::account(2)]));
        mock.emit(ProviderEvent::ChainChanged(9000));

        let change = wallet.next_change(&mut events).await;
        assert_eq!(change, Some(WalletChange::ReloadRequired { chain_id: 9000 }));
    }
}
