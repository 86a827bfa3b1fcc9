// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! What the embedding application makes available to the SDK.
//!
//! Either collaborator may be missing; the SDK reports that as
//! `ProviderUnavailable` / `LibraryUnavailable` instead of failing at
//! construction time.

use std::sync::Arc;

use crate::encryption::FheLibrary;
use crate::provider::Eip1193Provider;
use crate::rpc::RpcProvider;

#[derive(Clone, Default)]
pub struct HostEnvironment {
    wallet: Option<RpcProvider>,
    fhe: Option<Arc<dyn FheLibrary>>,
}

impl HostEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wallet(mut self, provider: Arc<dyn Eip1193Provider>) -> Self {
        self.wallet = Some(RpcProvider::new(provider));
        self
    }

    pub fn with_fhe_library(mut self, library: Arc<dyn FheLibrary>) -> Self {
        self.fhe = Some(library);
        self
    }

    pub fn wallet(&self) -> Option<&RpcProvider> {
        self.wallet.as_ref()
    }

    pub fn fhe_library(&self) -> Option<&Arc<dyn FheLibrary>> {
        self.fhe.as_ref()
    }
}

impl std::fmt::Debug for HostEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostEnvironment")
            .field("wallet", &self.wallet.is_some())
            .field("fhe", &self.fhe.is_some())
            .finish()
    }
}
