// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuantumError;

/// Qubits used by the demo state encoding.
pub const QUBIT_COUNT: u8 = 3;

/// Algorithm catalogue understood by the contract (`algorithmType`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Algorithm {
    Shor = 0,
    Grover = 1,
    Vqe = 2,
    Qaoa = 3,
    QuantumMl = 4,
    Custom = 5,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Shor,
        Algorithm::Grover,
        Algorithm::Vqe,
        Algorithm::Qaoa,
        Algorithm::QuantumMl,
        Algorithm::Custom,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Shor => "Shor",
            Algorithm::Grover => "Grover",
            Algorithm::Vqe => "VQE",
            Algorithm::Qaoa => "QAOA",
            Algorithm::QuantumMl => "Quantum ML",
            Algorithm::Custom => "Custom",
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = QuantumError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Algorithm::ALL
            .get(id as usize)
            .copied()
            .ok_or(QuantumError::InvalidAlgorithm(id.to_string()))
    }
}

/// Accepts the numeric id or the name, case-insensitively.
impl FromStr for Algorithm {
    type Err = QuantumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return Algorithm::try_from(id);
        }
        let wanted = s.to_ascii_lowercase().replace(['-', '_', ' '], "");
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name().to_ascii_lowercase().replace(' ', "") == wanted)
            .ok_or_else(|| QuantumError::InvalidAlgorithm(s.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Amplitude vector for a 3-qubit state carrying `value` in slot 0.
pub fn encode_amplitudes(value: u64) -> Vec<u8> {
    let mut amplitudes = vec![0u8; 1 << QUBIT_COUNT];
    amplitudes[0] = (value % 256) as u8;
    amplitudes
}
