// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Contract dispatch adapter.
//!
//! A [`ContractDispatch`] is bound to one address and one interface type.
//! The interface type lists, at compile time, which call and event structs
//! may be used with it; see [`contract_interface!`](crate::contract_interface).
//!
//! ```rust,ignore
//! alloy_sol_types::sol! {
//!     interface ICounter {
//!         function count() external view returns (uint256);
//!         function increment(uint8 by) external;
//!         event Incremented(address indexed by, uint256 value);
//!     }
//! }
//!
//! fhevm_sdk::contract_interface!(pub Counter {
//!     calls: [ICounter::countCall, ICounter::incrementCall],
//!     events: [ICounter::Incremented],
//! });
//!
//! let counter = ContractDispatch::<Counter>::new(wallet, ContractOptions::new("0x...")?);
//! let tx = counter.send(ICounter::incrementCall { by: 1 }, None).await?;
//! counter.wait_for_transaction(&tx, 1).await?;
//! ```

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy_primitives::{Address, B256, U64};
use alloy_sol_types::{SolCall, SolEvent};
use tokio::sync::{oneshot, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::error::{FhevmError, FhevmResult};
use crate::flag::{ErrorSlot, LoadingFlag};
use crate::format::{parse_address, parse_ether, parse_wei};
use crate::rpc::{LogFilter, RpcProvider, TransactionReceipt, TransactionRequest};
use crate::signer::{PendingTransaction, Signer, DEFAULT_POLL_INTERVAL};
use crate::wallet::WalletManager;

/// Marker for a bound contract interface.
pub trait ContractInterface: Send + Sync + 'static {}

/// `C` is one of the interface's functions.
pub trait HasCall<C: SolCall>: ContractInterface {}

/// `E` is one of the interface's events.
pub trait HasEvent<E: SolEvent>: ContractInterface {}

/// Declare an interface type and its capability set.
#[macro_export]
macro_rules! contract_interface {
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident {
            calls: [$($call:ty),* $(,)?],
            events: [$($event:ty),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::contract::ContractInterface for $name {}
        $(impl $crate::contract::HasCall<$call> for $name {})*
        $(impl $crate::contract::HasEvent<$event> for $name {})*
    };
}

#[derive(Clone, Debug)]
pub struct ContractOptions {
    pub address: Address,
    /// Overrides the wallet's signer when set.
    pub signer: Option<Arc<Signer>>,
}

impl ContractOptions {
    pub fn new(address: &str) -> FhevmResult<Self> {
        Ok(Self {
            address: parse_address(address)?,
            signer: None,
        })
    }

    pub fn with_signer(mut self, signer: Arc<Signer>) -> Self {
        self.signer = Some(signer);
        self
    }
}

/// Per-transaction overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxOptions {
    pub gas_limit: Option<u64>,
    /// Decimal wei.
    pub gas_price: Option<String>,
    /// Decimal ETH.
    pub value: Option<String>,
}

impl TxOptions {
    fn apply(&self, tx: &mut TransactionRequest) -> FhevmResult<()> {
        if let Some(gas) = self.gas_limit {
            tx.gas = Some(U64::from(gas));
        }
        if let Some(price) = &self.gas_price {
            tx.gas_price = Some(parse_wei(price)?);
        }
        if let Some(value) = &self.value {
            tx.value = Some(parse_ether(value)?);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
enum Runner {
    Signer(Arc<Signer>),
    Provider(RpcProvider),
}

impl Runner {
    fn provider(&self) -> &RpcProvider {
        match self {
            Runner::Signer(s) => s.provider(),
            Runner::Provider(p) => p,
        }
    }

    fn from(&self) -> Option<Address> {
        match self {
            Runner::Signer(s) => Some(s.address()),
            Runner::Provider(_) => None,
        }
    }
}

/// Everything whose identity decides whether a binding is still valid.
#[derive(Clone)]
struct BindingKey {
    address: Address,
    explicit: Option<Arc<Signer>>,
    wallet_signer: Option<Arc<Signer>>,
    provider: Option<RpcProvider>,
}

fn same_arc<T>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl BindingKey {
    fn matches(&self, other: &BindingKey) -> bool {
        self.address == other.address
            && same_arc(&self.explicit, &other.explicit)
            && same_arc(&self.wallet_signer, &other.wallet_signer)
            && match (&self.provider, &other.provider) {
                (Some(a), Some(b)) => a.same_as(b),
                (None, None) => true,
                _ => false,
            }
    }

    fn runner(&self) -> Option<Runner> {
        self.explicit
            .clone()
            .or_else(|| self.wallet_signer.clone())
            .map(Runner::Signer)
            .or_else(|| self.provider.clone().map(Runner::Provider))
    }
}

struct Binding {
    key: BindingKey,
    runner: Option<Runner>,
    listeners: Vec<AbortHandle>,
}

impl Binding {
    fn teardown(&mut self) {
        for handle in self.listeners.drain(..) {
            handle.abort();
        }
    }
}

/// Handle to an event listener. Dropping it leaves the listener running.
#[derive(Debug)]
pub struct Subscription {
    handle: AbortHandle,
}

impl Subscription {
    /// Stop the listener. Safe to call repeatedly and after the binding
    /// it belonged to was torn down.
    pub fn unsubscribe(&self) {
        self.handle.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

pub struct ContractDispatch<I: ContractInterface> {
    wallet: WalletManager,
    options: Mutex<ContractOptions>,
    binding: Mutex<Option<Binding>>,
    loading: LoadingFlag,
    error: ErrorSlot,
    poll_interval: Duration,
    _interface: PhantomData<fn() -> I>,
}

impl<I: ContractInterface> ContractDispatch<I> {
    pub fn new(wallet: WalletManager, options: ContractOptions) -> Self {
        Self {
            wallet,
            options: Mutex::new(options),
            binding: Mutex::new(None),
            loading: LoadingFlag::new(),
            error: ErrorSlot::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            _interface: PhantomData,
        }
    }

    /// Interval for receipt and event polling.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn address(&self) -> Address {
        self.lock_options().address
    }

    /// Replace address and/or explicit signer; the next use rebinds.
    pub fn set_options(&self, options: ContractOptions) {
        *self.lock_options() = options;
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn error(&self) -> Option<FhevmError> {
        self.error.get()
    }

    /// Whether a runner is currently available.
    pub fn is_bound(&self) -> bool {
        self.runner().is_ok()
    }

    fn lock_options(&self) -> MutexGuard<'_, ContractOptions> {
        self.options.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_binding(&self) -> MutexGuard<'_, Option<Binding>> {
        self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_key(&self) -> BindingKey {
        let options = self.lock_options().clone();
        let wallet = self.wallet.state();
        BindingKey {
            address: options.address,
            explicit: options.signer,
            wallet_signer: wallet.signer,
            provider: wallet.provider,
        }
    }

    /// Rebuild the binding if anything it depends on changed.
    fn refresh(&self) -> MutexGuard<'_, Option<Binding>> {
        let key = self.current_key();
        let mut binding = self.lock_binding();
        if binding.as_ref().is_some_and(|b| b.key.matches(&key)) {
            return binding;
        }
        if let Some(mut stale) = binding.take() {
            debug!(listeners = stale.listeners.len(), "tearing down stale contract binding");
            stale.teardown();
        }
        let runner = key.runner();
        if runner.is_some() {
            info!(address = %key.address, "contract bound");
        }
        *binding = Some(Binding {
            key,
            runner,
            listeners: Vec::new(),
        });
        binding
    }

    fn runner(&self) -> FhevmResult<Runner> {
        self.refresh()
            .as_ref()
            .and_then(|b| b.runner.clone())
            .ok_or(FhevmError::NotInitialized)
    }

    /// Read-only call.
    pub async fn call<C>(&self, call: C) -> FhevmResult<C::Return>
    where
        C: SolCall,
        I: HasCall<C>,
    {
        let runner = self.runner()?;
        let _busy = self.loading.raise();
        self.error.clear();

        let tx = TransactionRequest {
            from: runner.from(),
            to: self.address(),
            data: call.abi_encode().into(),
            ..Default::default()
        };
        let result: FhevmResult<C::Return> = async {
            let out = runner.provider().call(&tx).await?;
            Ok(C::abi_decode_returns(&out, true)?)
        }
        .await;
        self.error.record(result)
    }

    /// State-changing call, signed by the bound signer.
    pub async fn send<C>(&self, call: C, options: Option<TxOptions>) -> FhevmResult<PendingTransaction>
    where
        C: SolCall,
        I: HasCall<C>,
    {
        if !self.wallet.is_connected() {
            return Err(FhevmError::WalletNotConnected);
        }
        let signer = match self.runner()? {
            Runner::Signer(s) => s,
            Runner::Provider(_) => return Err(FhevmError::WalletNotConnected),
        };
        let _busy = self.loading.raise();
        self.error.clear();

        let result: FhevmResult<PendingTransaction> = async {
            let mut tx = TransactionRequest {
                to: self.address(),
                data: call.abi_encode().into(),
                ..Default::default()
            };
            if let Some(options) = &options {
                options.apply(&mut tx)?;
            }
            signer.send_transaction(tx, self.poll_interval).await
        }
        .await;
        self.error.record(result)
    }

    /// Wait until `tx` is `confirmations` blocks deep.
    pub async fn wait_for_transaction(
        &self,
        tx: &PendingTransaction,
        confirmations: u64,
    ) -> FhevmResult<TransactionReceipt> {
        let _busy = self.loading.raise();
        let result = tx.wait(confirmations).await;
        self.error.record(result)
    }

    /// Invoke `callback` for every `E` the contract emits from now on.
    pub async fn on<E, F>(&self, callback: F) -> FhevmResult<Subscription>
    where
        E: SolEvent + Send + 'static,
        F: Fn(E) + Send + Sync + 'static,
        I: HasEvent<E>,
    {
        self.listen(None, callback).await
    }

    /// Like [`ContractDispatch::on`], restricted to logs whose first
    /// indexed argument equals `topic1`.
    pub async fn on_filtered<E, F>(&self, topic1: B256, callback: F) -> FhevmResult<Subscription>
    where
        E: SolEvent + Send + 'static,
        F: Fn(E) + Send + Sync + 'static,
        I: HasEvent<E>,
    {
        self.listen(Some(topic1), callback).await
    }

    /// Wait for the next matching `E`. Fails with `NotInitialized` if the
    /// binding is torn down first.
    pub async fn once<E>(&self, topic1: Option<B256>) -> FhevmResult<E>
    where
        E: SolEvent + Send + 'static,
        I: HasEvent<E>,
    {
        let (tx, rx) = oneshot::channel();
        let slot = Mutex::new(Some(tx));
        let sub = self
            .listen(topic1, move |event: E| {
                if let Some(tx) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
                    let _ = tx.send(event);
                }
            })
            .await?;
        let event = rx.await.map_err(|_| FhevmError::NotInitialized);
        sub.unsubscribe();
        event
    }

    /// Current key and runner, rebinding first if needed.
    fn bound(&self) -> FhevmResult<(BindingKey, Runner)> {
        let binding = self.refresh();
        binding
            .as_ref()
            .and_then(|b| Some((b.key.clone(), b.runner.clone()?)))
            .ok_or(FhevmError::NotInitialized)
    }

    /// Start `spawn` and register its handle, but only if `key` still
    /// identifies both the current inputs and the stored binding.
    fn attach(&self, key: &BindingKey, spawn: impl FnOnce() -> AbortHandle) -> Option<AbortHandle> {
        if !self.current_key().matches(key) {
            return None;
        }
        let mut binding = self.lock_binding();
        let current = binding.as_mut().filter(|b| b.key.matches(key))?;
        let handle = spawn();
        current.listeners.retain(|h| !h.is_finished());
        current.listeners.push(handle.clone());
        Some(handle)
    }

    async fn listen<E, F>(&self, topic1: Option<B256>, callback: F) -> FhevmResult<Subscription>
    where
        E: SolEvent + Send + 'static,
        F: Fn(E) + Send + Sync + 'static,
    {
        let mut topics = vec![Some(E::SIGNATURE_HASH)];
        if topic1.is_some() {
            topics.push(topic1);
        }
        let callback = Arc::new(callback);

        loop {
            let (key, runner) = self.bound()?;
            let address = key.address;
            let provider = runner.provider().clone();
            let start = provider.block_number().await? + 1;

            let poll = PollLogs {
                provider,
                address,
                topics: topics.clone(),
                from: start,
                interval: self.poll_interval,
            };
            let callback = callback.clone();
            let attached = self.attach(&key, move || {
                tokio::spawn(poll.run(move |e: E| callback(e))).abort_handle()
            });
            match attached {
                Some(handle) => {
                    debug!(event = E::SIGNATURE, %address, "event listener started");
                    return Ok(Subscription { handle });
                }
                None => debug!(event = E::SIGNATURE, "binding changed while starting listener"),
            }
        }
    }
}

struct PollLogs {
    provider: RpcProvider,
    address: Address,
    topics: Vec<Option<B256>>,
    from: u64,
    interval: Duration,
}

impl PollLogs {
    async fn run<E, F>(mut self, callback: F)
    where
        E: SolEvent,
        F: Fn(E),
    {
        loop {
            tokio::time::sleep(self.interval).await;
            let head = match self.provider.block_number().await {
                Ok(h) => h,
                Err(e) => {
                    warn!("block poll error: {e}");
                    continue;
                }
            };
            if head < self.from {
                continue;
            }
            let filter = LogFilter {
                address: self.address,
                topics: self.topics.clone(),
                from_block: U64::from(self.from),
                to_block: U64::from(head),
            };
            let logs = match self.provider.get_logs(&filter).await {
                Ok(logs) => logs,
                Err(e) => {
                    warn!("log poll error: {e}");
                    continue;
                }
            };
            for log in logs {
                match E::decode_raw_log(log.topics.iter().copied(), &log.data, true) {
                    Ok(event) => callback(event),
                    Err(e) => warn!(event = E::SIGNATURE, "skipping unparseable log: {e}"),
                }
            }
            self.from = head + 1;
        }
    }
}
