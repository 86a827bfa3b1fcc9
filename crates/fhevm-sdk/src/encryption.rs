// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Encryption adapter over an external FHE library.
//!
//! The library itself is a collaborator behind [`FheLibrary`]; this module
//! only resolves its parameters, builds the instance, and range-checks the
//! single-byte values it is allowed to encrypt.

use std::sync::Arc;

use async_trait::async_trait;
use fhevm_types::FhevmConfig;
use tracing::{error, info};

use crate::error::{FhevmError, FhevmResult};
use crate::host::HostEnvironment;

/// Parameters handed to [`FheLibrary::create_instance`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceParams {
    pub chain_id: u64,
    pub public_key: String,
    pub gateway_url: String,
}

impl InstanceParams {
    pub fn from_config(config: &FhevmConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            public_key: config.resolved_public_key(),
            gateway_url: config.resolved_gateway_url(),
        }
    }
}

#[async_trait]
pub trait FheLibrary: Send + Sync {
    async fn create_instance(&self, params: InstanceParams) -> anyhow::Result<Arc<dyn FheInstance>>;
}

#[async_trait]
pub trait FheInstance: Send + Sync {
    /// Encrypt one byte; returns the raw ciphertext.
    async fn encrypt8(&self, value: u8) -> anyhow::Result<Vec<u8>>;
}

/// Opaque handle to a constructed library instance.
#[derive(Clone)]
pub struct InstanceHandle {
    inner: Arc<dyn FheInstance>,
    params: InstanceParams,
}

impl InstanceHandle {
    pub fn params(&self) -> &InstanceParams {
        &self.params
    }

    pub fn same_as(&self, other: &InstanceHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Integer or text input to [`encrypt_value`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlainValue {
    Int(i128),
    Text(String),
}

macro_rules! plain_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for PlainValue {
            fn from(v: $t) -> Self {
                PlainValue::Int(v as i128)
            }
        })*
    };
}

plain_from_int!(u8, u16, u32, u64, i8, i16, i32, i64, i128);

impl From<&str> for PlainValue {
    fn from(v: &str) -> Self {
        PlainValue::Text(v.to_string())
    }
}

impl From<String> for PlainValue {
    fn from(v: String) -> Self {
        PlainValue::Text(v)
    }
}

impl PlainValue {
    /// The byte to encrypt, or `InvalidRange`.
    pub fn to_u8(&self) -> FhevmResult<u8> {
        let n = match self {
            PlainValue::Int(n) => *n,
            PlainValue::Text(s) => s
                .trim()
                .parse::<i128>()
                .map_err(|_| FhevmError::InvalidRange(s.clone()))?,
        };
        u8::try_from(n).map_err(|_| FhevmError::InvalidRange(n.to_string()))
    }
}

/// Build an instance for `config` from the host's FHE library.
pub async fn create_instance(
    host: &HostEnvironment,
    config: &FhevmConfig,
) -> FhevmResult<InstanceHandle> {
    let library = host.fhe_library().ok_or(FhevmError::LibraryUnavailable)?;
    let params = InstanceParams::from_config(config);
    info!(chain_id = params.chain_id, gateway = %params.gateway_url, "creating fhe instance");

    let inner = library.create_instance(params.clone()).await.map_err(|e| {
        error!("failed to create fhe instance: {e:#}");
        FhevmError::initialization(e)
    })?;
    Ok(InstanceHandle { inner, params })
}

/// Range-check `value` to [0, 255] and encrypt it as a single byte.
pub async fn encrypt_value(
    instance: &InstanceHandle,
    value: impl Into<PlainValue>,
) -> FhevmResult<Vec<u8>> {
    let byte = value.into().to_u8()?;
    instance.inner.encrypt8(byte).await.map_err(|e| {
        error!("encryption failed: {e:#}");
        FhevmError::encryption(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFheLibrary;

    #[test]
    fn plain_value_range() {
        assert_eq!(PlainValue::from(0u8).to_u8().unwrap(), 0);
        assert_eq!(PlainValue::from(255i64).to_u8().unwrap(), 255);
        assert_eq!(PlainValue::from(" 42 ").to_u8().unwrap(), 42);
        for bad in [PlainValue::from(-1i32), PlainValue::from(256u32), PlainValue::from("1000")] {
            assert!(matches!(bad.to_u8(), Err(FhevmError::InvalidRange(_))));
        }
        assert!(matches!(
            PlainValue::from("forty-two").to_u8(),
            Err(FhevmError::InvalidRange(_))
        ));
    }

    #[tokio::test]
    async fn create_instance_requires_library() {
        let host = HostEnvironment::new();
        let err = create_instance(&host, &FhevmConfig::new(11155111))
            .await
            .unwrap_err();
        assert!(matches!(err, FhevmError::LibraryUnavailable));
    }

    #[tokio::test]
    async fn create_instance_resolves_table_params() {
        let lib = Arc::new(MockFheLibrary::new());
        let host = HostEnvironment::new().with_fhe_library(lib.clone());
        let handle = create_instance(&host, &FhevmConfig::new(31337)).await.unwrap();
        assert_eq!(handle.params().public_key, "YOUR_PUBLIC_KEY_FOR_SEPOLIA");
        assert_eq!(handle.params().gateway_url, "https://gateway.sepolia.zama.ai");
        assert_eq!(handle.params().chain_id, 31337);
        assert_eq!(lib.created().len(), 1);
    }

    #[tokio::test]
    async fn create_instance_wraps_library_failure() {
        let lib = Arc::new(MockFheLibrary::failing("key rejected"));
        let host = HostEnvironment::new().with_fhe_library(lib);
        let err = create_instance(&host, &FhevmConfig::new(8009)).await.unwrap_err();
        assert!(matches!(err, FhevmError::InitializationFailed(_)));
        assert!(err.to_string().contains("key rejected"));
    }

    #[tokio::test]
    async fn encrypt_accepts_full_byte_range() {
        let lib = Arc::new(MockFheLibrary::new());
        let host = HostEnvironment::new().with_fhe_library(lib.clone());
        let handle = create_instance(&host, &FhevmConfig::new(8009)).await.unwrap();
        for v in 0u16..=255 {
            let ct = encrypt_value(&handle, v).await.unwrap();
            assert_eq!(ct, MockFheLibrary::ciphertext_for(v as u8));
        }
        assert_eq!(lib.encrypt_calls(), 256);
    }

    #[tokio::test]
    async fn encrypt_rejects_out_of_range_without_delegating() {
        let lib = Arc::new(MockFheLibrary::new());
        let host = HostEnvironment::new().with_fhe_library(lib.clone());
        let handle = create_instance(&host, &FhevmConfig::new(8009)).await.unwrap();
        for v in [-1i64, 256, 1000, i64::MIN, i64::MAX] {
            let err = encrypt_value(&handle, v).await.unwrap_err();
            assert!(matches!(err, FhevmError::InvalidRange(_)));
        }
        assert!(matches!(
            encrypt_value(&handle, "-5").await,
            Err(FhevmError::InvalidRange(_))
        ));
        assert_eq!(lib.encrypt_calls(), 0);
    }
}
