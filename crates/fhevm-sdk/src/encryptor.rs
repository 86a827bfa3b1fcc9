// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Encryption view over a [`FhevmContext`] with its own progress flag and
//! last error.

use fhevm_types::EncryptedData;
use tokio::sync::watch;
use tracing::debug;

use crate::context::FhevmContext;
use crate::encryption::PlainValue;
use crate::error::{FhevmError, FhevmResult};
use crate::flag::{ErrorSlot, LoadingFlag};

pub struct Encryptor {
    ctx: FhevmContext,
    encrypting: LoadingFlag,
    error: ErrorSlot,
}

impl Encryptor {
    pub fn new(ctx: FhevmContext) -> Self {
        Self {
            ctx,
            encrypting: LoadingFlag::new(),
            error: ErrorSlot::default(),
        }
    }

    pub fn is_encrypting(&self) -> bool {
        self.encrypting.get()
    }

    pub fn encrypting(&self) -> watch::Receiver<bool> {
        self.encrypting.subscribe()
    }

    pub fn error(&self) -> Option<FhevmError> {
        self.error.get()
    }

    /// Encrypt one byte through the context's instance.
    pub async fn encrypt(&self, value: impl Into<PlainValue>) -> FhevmResult<EncryptedData> {
        self.error.clear();
        if !self.ctx.is_ready() {
            debug!("encrypt requested before instance was ready");
            return self.error.record(Err(FhevmError::NotReady));
        }
        let _busy = self.encrypting.raise();
        let result = self.ctx.encrypt(value).await;
        self.error.record(result)
    }
}
