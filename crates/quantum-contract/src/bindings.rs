// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! ABI of `QuantumPrivacyCompute`.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IQuantumPrivacyCompute {
        function initializeQuantumState(uint8[] calldata amplitudes, uint8 qubitCount) external;
        function submitQuantumJob(uint8 encryptedInput, uint8 algorithmType) external returns (uint256 jobId);
        function executeQuantumAlgorithm(uint256 jobId) external;
        function createEntanglement(address partner) external;
        function compileQuantumCircuit(uint256 circuitId, uint8[] calldata gateTypes, uint8[] calldata targetQubits, uint8[] calldata controlQubits) external;

        function getJobResult(uint256 jobId) external view returns (bytes memory result);
        function getJobInfo(uint256 jobId) external view returns (address submitter, uint8 algorithmType, bool isCompleted, bool isVerified, uint256 submitTime, uint256 completeTime, uint256 gasUsed);
        function getQuantumStateInfo(address user) external view returns (uint8 qubitCount, bool isEntangled, uint256 timestamp);
        function getUserJobHistory(address user) external view returns (uint256[] memory jobIds);
        function getCircuitInfo(uint256 circuitId) external view returns (uint8[] memory gateTypes, uint8[] memory targetQubits, bool isCompiled, uint256 depth);
        function isDecryptionAllowed() external view returns (bool allowed);
        function requestJobDecryption(uint256 jobId) external returns (uint256 requestId);

        event QuantumJobSubmitted(uint256 indexed jobId, address indexed submitter, uint8 algorithmType);
        event QuantumJobCompleted(uint256 indexed jobId, address indexed submitter);
        event QuantumStateInitialized(address indexed user, uint8 qubitCount);
        event EntanglementCreated(address indexed user1, address indexed user2);
        event CircuitCompiled(uint256 indexed circuitId, uint256 depth);
        event QuantumResultDecrypted(uint256 indexed requestId, uint8 decryptedValue);
    }
}

use IQuantumPrivacyCompute as Q;

fhevm_sdk::contract_interface!(
    /// Capability set of the deployed contract.
    pub QuantumAbi {
        calls: [
            Q::initializeQuantumStateCall,
            Q::submitQuantumJobCall,
            Q::executeQuantumAlgorithmCall,
            Q::createEntanglementCall,
            Q::compileQuantumCircuitCall,
            Q::getJobResultCall,
            Q::getJobInfoCall,
            Q::getQuantumStateInfoCall,
            Q::getUserJobHistoryCall,
            Q::getCircuitInfoCall,
            Q::isDecryptionAllowedCall,
            Q::requestJobDecryptionCall,
        ],
        events: [
            Q::QuantumJobSubmitted,
            Q::QuantumJobCompleted,
            Q::QuantumStateInitialized,
            Q::EntanglementCreated,
            Q::CircuitCompiled,
            Q::QuantumResultDecrypted,
        ],
    }
);
