// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Readiness context: the one state object an application builds at its
//! composition root and hands to everything that needs wallet or
//! encryption access.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fhevm_sdk::{FhevmConfig, FhevmContext, HostEnvironment};
//!
//! # async fn example(host: HostEnvironment) -> fhevm_sdk::error::FhevmResult<()> {
//! let ctx = FhevmContext::mount(host, Arc::new(FhevmConfig::new(11155111)));
//! ctx.settled().await;
//! if ctx.is_ready() {
//!     ctx.connect_wallet().await?;
//!     let encrypted = ctx.encrypt(42u8).await?;
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use fhevm_types::{DecryptedValue, DecryptionRequest, EncryptedData, FhevmConfig};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::encryption::{self, InstanceHandle, PlainValue};
use crate::error::{FhevmError, FhevmResult};
use crate::host::HostEnvironment;
use crate::signer::Signer;
use crate::wallet::{WalletManager, WalletState};

#[derive(Clone, Debug)]
pub struct FhevmInstanceState {
    pub instance: InstanceHandle,
    pub is_ready: bool,
    pub chain_id: u64,
}

/// Progress of the current configuration's initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStatus {
    Pending,
    Ready,
    Failed,
}

/// Contract-specific decryption flow (request + gateway callback).
#[async_trait]
pub trait Decryptor: Send + Sync {
    async fn decrypt(
        &self,
        signer: Arc<Signer>,
        request: &DecryptionRequest,
    ) -> FhevmResult<Option<DecryptedValue>>;
}

struct Slots {
    config: Arc<FhevmConfig>,
    generation: u64,
    instance: Option<FhevmInstanceState>,
    error: Option<FhevmError>,
}

struct Inner {
    host: HostEnvironment,
    wallet: WalletManager,
    slots: Mutex<Slots>,
    status: watch::Sender<InitStatus>,
    decryptor: Mutex<Option<Arc<dyn Decryptor>>>,
}

/// Cheap-to-clone handle; all clones share one state.
#[derive(Clone)]
pub struct FhevmContext {
    inner: Arc<Inner>,
}

impl FhevmContext {
    /// Build the context and start initializing the FHE instance in the
    /// background. Must be called from within a tokio runtime.
    pub fn mount(host: HostEnvironment, config: Arc<FhevmConfig>) -> Self {
        let (status, _) = watch::channel(InitStatus::Pending);
        let ctx = Self {
            inner: Arc::new(Inner {
                wallet: WalletManager::new(host.wallet().cloned()),
                host,
                slots: Mutex::new(Slots {
                    config: config.clone(),
                    generation: 0,
                    instance: None,
                    error: None,
                }),
                status,
                decryptor: Mutex::new(None),
            }),
        };
        ctx.spawn_init(0, config);
        ctx
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_init(&self, generation: u64, config: Arc<FhevmConfig>) {
        let ctx = self.clone();
        tokio::spawn(async move {
            info!(chain_id = config.chain_id, "initializing fhevm instance");
            let result = encryption::create_instance(&ctx.inner.host, &config).await;

            let mut slots = ctx.slots();
            if slots.generation != generation {
                debug!(generation, "discarding superseded initialization");
                return;
            }
            let status = match result {
                Ok(instance) => {
                    slots.instance = Some(FhevmInstanceState {
                        instance,
                        is_ready: true,
                        chain_id: config.chain_id,
                    });
                    info!("fhevm instance initialized");
                    InitStatus::Ready
                }
                Err(e) => {
                    error!("fhevm initialization failed: {e}");
                    slots.error = Some(e);
                    InitStatus::Failed
                }
            };
            // under the slots lock; `set_config` publishes `Pending` the same way
            ctx.inner.status.send_replace(status);
        });
    }

    /// Swap the configuration. The same `Arc` is a no-op; any other object
    /// discards the current instance and re-initializes. Returns whether a
    /// re-initialization was started.
    pub fn set_config(&self, config: Arc<FhevmConfig>) -> bool {
        let generation = {
            let mut slots = self.slots();
            if Arc::ptr_eq(&slots.config, &config) {
                return false;
            }
            slots.generation += 1;
            slots.config = config.clone();
            slots.instance = None;
            slots.error = None;
            self.inner.status.send_replace(InitStatus::Pending);
            slots.generation
        };
        self.spawn_init(generation, config);
        true
    }

    pub fn config(&self) -> Arc<FhevmConfig> {
        self.slots().config.clone()
    }

    pub fn host(&self) -> &HostEnvironment {
        &self.inner.host
    }

    pub fn status(&self) -> InitStatus {
        *self.inner.status.borrow()
    }

    /// Wait until the current initialization attempt has finished.
    pub async fn settled(&self) -> InitStatus {
        let mut rx = self.inner.status.subscribe();
        let status = match rx.wait_for(|s| *s != InitStatus::Pending).await {
            Ok(s) => *s,
            // sender lives in `self`, so this is unreachable in practice
            Err(_) => self.status(),
        };
        status
    }

    /// True iff the FHE instance is initialized. Independent of the wallet.
    pub fn is_ready(&self) -> bool {
        self.slots().instance.is_some()
    }

    pub fn error(&self) -> Option<FhevmError> {
        self.slots().error.clone()
    }

    pub fn fhevm_instance(&self) -> Option<FhevmInstanceState> {
        self.slots().instance.clone()
    }

    pub fn wallet(&self) -> WalletState {
        self.inner.wallet.state()
    }

    pub fn wallet_manager(&self) -> &WalletManager {
        &self.inner.wallet
    }

    pub async fn connect_wallet(&self) -> FhevmResult<WalletState> {
        self.inner.wallet.connect().await
    }

    pub fn disconnect_wallet(&self) {
        self.inner.wallet.disconnect()
    }

    pub async fn encrypt(&self, value: impl Into<PlainValue>) -> FhevmResult<EncryptedData> {
        let instance = self.fhevm_instance().ok_or(FhevmError::NotReady)?;
        let data = encryption::encrypt_value(&instance.instance, value).await?;
        Ok(EncryptedData::unsigned(data))
    }

    /// Install the contract-specific flow used by [`FhevmContext::decrypt`].
    pub fn set_decryptor(&self, decryptor: Arc<dyn Decryptor>) {
        *self
            .inner
            .decryptor
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(decryptor);
    }

    /// Requires an instance and a connected wallet. Without an installed
    /// [`Decryptor`] there is nothing to run and the result is empty.
    pub async fn decrypt(&self, request: &DecryptionRequest) -> FhevmResult<Option<DecryptedValue>> {
        if !self.is_ready() {
            return Err(FhevmError::NotReady);
        }
        let signer = self
            .inner
            .wallet
            .signer()
            .ok_or(FhevmError::WalletNotConnected)?;

        let decryptor = self
            .inner
            .decryptor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match decryptor {
            Some(d) => d.decrypt(signer, request).await,
            None => {
                debug!(handle = %request.ciphertext, "no decryptor installed");
                Ok(None)
            }
        }
    }
}
