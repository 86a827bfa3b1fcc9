// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::error::FhevmError;

/// Single in-flight flag. Overlapping operations share it: whichever
/// finishes last writes last.
#[derive(Clone)]
pub(crate) struct LoadingFlag {
    tx: Arc<watch::Sender<bool>>,
}

pub(crate) struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl LoadingFlag {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub(crate) fn get(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Set the flag until the guard is dropped.
    pub(crate) fn raise(&self) -> LoadingGuard<'_> {
        self.tx.send_replace(true);
        LoadingGuard { flag: self }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.tx.send_replace(false);
    }
}

/// Last error recorded by a component.
#[derive(Default)]
pub(crate) struct ErrorSlot(Mutex<Option<FhevmError>>);

impl ErrorSlot {
    fn lock(&self) -> MutexGuard<'_, Option<FhevmError>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self) -> Option<FhevmError> {
        self.lock().clone()
    }

    pub(crate) fn set(&self, e: &FhevmError) {
        *self.lock() = Some(e.clone());
    }

    pub(crate) fn clear(&self) {
        *self.lock() = None;
    }

    /// Record the error of a failed result and pass the result through.
    pub(crate) fn record<T>(&self, result: Result<T, FhevmError>) -> Result<T, FhevmError> {
        if let Err(e) = &result {
            self.set(e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_resets_on_drop() {
        let flag = LoadingFlag::new();
        assert!(!flag.get());
        {
            let _g = flag.raise();
            assert!(flag.get());
        }
        assert!(!flag.get());
    }

    #[test]
    fn slot_records_only_errors() {
        let slot = ErrorSlot::default();
        let ok: Result<u8, FhevmError> = Ok(1);
        assert_eq!(slot.record(ok).unwrap(), 1);
        assert!(slot.get().is_none());
        let _ = slot.record::<u8>(Err(FhevmError::NotReady));
        assert!(matches!(slot.get(), Some(FhevmError::NotReady)));
        slot.clear();
        assert!(slot.get().is_none());
    }
}
