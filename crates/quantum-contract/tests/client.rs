use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use fhevm_sdk::mock::{MockFheLibrary, MockProvider};
use fhevm_sdk::rpc::{Log, RpcProvider, TransactionReceipt};
use fhevm_sdk::{
    DecryptionRequest, FhevmConfig, FhevmContext, FhevmError, HostEnvironment, WalletManager,
};

use quantum_contract::{
    decrypted_from_receipt, job_id_from_receipt, Algorithm, IQuantumPrivacyCompute as Q,
    JobDecryptor, QuantumError, QuantumPrivacyCompute, DEFAULT_ADDRESS,
};

const FAST: Duration = Duration::from_millis(10);

fn contract_address() -> Address {
    DEFAULT_ADDRESS.parse().unwrap()
}

fn setup() -> (Arc<MockProvider>, WalletManager, QuantumPrivacyCompute) {
    let mock = Arc::new(MockProvider::new(8009));
    let wallet = WalletManager::new(Some(RpcProvider::new(mock.clone())));
    let contract = QuantumPrivacyCompute::at_default(wallet.clone())
        .unwrap()
        .with_poll_interval(FAST);
    (mock, wallet, contract)
}

fn log_of<E: SolEvent>(event: &E) -> Log {
    Log {
        address: contract_address(),
        topics: event.encode_topics().into_iter().map(|t| t.0).collect(),
        data: event.encode_data().into(),
        block_number: None,
        transaction_hash: None,
        log_index: None,
    }
}

fn sent_data(mock: &MockProvider, i: usize) -> Bytes {
    serde_json::from_value(mock.sent_transactions()[i]["data"].clone()).unwrap()
}

#[tokio::test]
async fn submit_job_send_and_wait_each_toggle_loading_once() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();

    let mut loading = contract.dispatch().loading();
    let transitions = Arc::new(Mutex::new(Vec::new()));
    let record = transitions.clone();
    let recorder = tokio::spawn(async move {
        while loading.changed().await.is_ok() {
            let value = *loading.borrow_and_update();
            record.lock().unwrap().push(value);
        }
    });

    let during = Arc::new(Mutex::new(Vec::new()));
    let sampled = during.clone();
    let flag = contract.dispatch().loading();
    mock.on_request(move |method| {
        if method == "eth_sendTransaction" || method == "eth_getTransactionReceipt" {
            sampled.lock().unwrap().push((method.to_string(), *flag.borrow()));
        }
    });

    let tx = contract
        .dispatch()
        .send(
            Q::submitQuantumJobCall {
                encryptedInput: 42,
                algorithmType: 0,
            },
            None,
        )
        .await
        .unwrap();
    tokio::task::yield_now().await;
    assert!(!contract.dispatch().is_loading());

    let receipt = contract.dispatch().wait_for_transaction(&tx, 1).await.unwrap();
    tokio::task::yield_now().await;
    assert_eq!(receipt.transaction_hash, tx.hash());
    assert!(!contract.dispatch().is_loading());
    recorder.abort();

    assert_eq!(*transitions.lock().unwrap(), vec![true, false, true, false]);
    let during = during.lock().unwrap();
    assert!(during.iter().any(|(m, _)| m == "eth_sendTransaction"));
    assert!(during.iter().any(|(m, _)| m == "eth_getTransactionReceipt"));
    assert!(during.iter().all(|(_, busy)| *busy));

    let call = Q::submitQuantumJobCall::abi_decode(&sent_data(&mock, 0), true).unwrap();
    assert_eq!(call.encryptedInput, 42);
    assert_eq!(call.algorithmType, 0);
}

#[tokio::test]
async fn send_while_disconnected_dispatches_nothing() {
    let (mock, _wallet, contract) = setup();
    let err = contract.submit_job(42, Algorithm::Shor).await.unwrap_err();
    assert!(matches!(err, QuantumError::Sdk(FhevmError::WalletNotConnected)));
    assert!(mock.sent_transactions().is_empty());
    assert_eq!(mock.request_count("eth_sendTransaction"), 0);
}

#[tokio::test]
async fn submit_job_reads_id_from_receipt_skipping_foreign_logs() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();

    let mut foreign = log_of(&Q::CircuitCompiled {
        circuitId: U256::from(1u64),
        depth: U256::from(3u64),
    });
    foreign.data = Bytes::from(vec![0xff]);
    mock.queue_receipt_logs(vec![
        foreign,
        log_of(&Q::QuantumJobSubmitted {
            jobId: U256::from(7u64),
            submitter: MockProvider::account(0),
            algorithmType: 1,
        }),
    ]);

    let job = contract.submit_job(200, Algorithm::Grover).await.unwrap();
    assert_eq!(job.job_id, Some(U256::from(7u64)));
    assert_eq!(job_id_from_receipt(&job.receipt), job.job_id);
}

#[tokio::test]
async fn submit_without_event_has_no_job_id() {
    let (_mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    let job = contract.submit_job(1, Algorithm::Custom).await.unwrap();
    assert_eq!(job.job_id, None);
}

#[tokio::test]
async fn initialize_state_encodes_three_qubits() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    contract.initialize_state(298).await.unwrap();

    let call = Q::initializeQuantumStateCall::abi_decode(&sent_data(&mock, 0), true).unwrap();
    assert_eq!(call.qubitCount, 3);
    assert_eq!(call.amplitudes, vec![42, 0, 0, 0, 0, 0, 0, 0]);
}

#[tokio::test]
async fn missing_job_is_none() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    mock.respond::<Q::getJobInfoCall>(Q::getJobInfoCall::abi_encode_returns(&(
        Address::ZERO,
        0u8,
        false,
        false,
        U256::ZERO,
        U256::ZERO,
        U256::ZERO,
    )));
    assert_eq!(contract.job_info(U256::from(99u64)).await.unwrap(), None);
}

#[tokio::test]
async fn job_info_decodes_fields() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    mock.respond::<Q::getJobInfoCall>(Q::getJobInfoCall::abi_encode_returns(&(
        MockProvider::account(0),
        4u8,
        true,
        false,
        U256::from(1_700_000_000u64),
        U256::ZERO,
        U256::from(52_000u64),
    )));

    let info = contract.job_info(U256::from(3u64)).await.unwrap().unwrap();
    assert_eq!(info.submitter, MockProvider::account(0));
    assert_eq!(info.algorithm(), Some(Algorithm::QuantumMl));
    assert!(info.is_completed);
    assert!(!info.is_verified);
    assert_eq!(info.submit_time, 1_700_000_000);
    assert_eq!(info.complete_time, None);
    assert_eq!(info.gas_used, U256::from(52_000u64));
}

#[tokio::test]
async fn history_and_state_queries() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    let ids = vec![U256::from(1u64), U256::from(4u64)];
    mock.respond::<Q::getUserJobHistoryCall>(Q::getUserJobHistoryCall::abi_encode_returns(&(
        ids.clone(),
    )));
    mock.respond::<Q::getQuantumStateInfoCall>(Q::getQuantumStateInfoCall::abi_encode_returns(
        &(3u8, true, U256::from(1234u64)),
    ));

    let user = MockProvider::account(0);
    assert_eq!(contract.job_history(user).await.unwrap(), ids);
    let state = contract.state_info(user).await.unwrap();
    assert_eq!(state.qubit_count, 3);
    assert!(state.is_entangled);
    assert_eq!(state.timestamp, 1234);
}

#[tokio::test]
async fn entanglement_and_circuit_transactions_encode_arguments() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();

    let partner = MockProvider::account(1);
    let receipt = contract.create_entanglement(partner).await.unwrap();
    assert!(receipt.succeeded());
    let call = Q::createEntanglementCall::abi_decode(&sent_data(&mock, 0), true).unwrap();
    assert_eq!(call.partner, partner);

    contract
        .compile_circuit(U256::from(11u64), vec![0, 2, 1], vec![0, 1, 2], vec![1])
        .await
        .unwrap();
    let call = Q::compileQuantumCircuitCall::abi_decode(&sent_data(&mock, 1), true).unwrap();
    assert_eq!(call.circuitId, U256::from(11u64));
    assert_eq!(call.gateTypes, vec![0, 2, 1]);
    assert_eq!(call.targetQubits, vec![0, 1, 2]);
    assert_eq!(call.controlQubits, vec![1]);
}

#[tokio::test]
async fn circuit_info_and_job_result_decode() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    mock.respond::<Q::getCircuitInfoCall>(Q::getCircuitInfoCall::abi_encode_returns(&(
        vec![0u8, 3],
        vec![2u8, 1],
        true,
        U256::from(4u64),
    )));
    mock.respond::<Q::getJobResultCall>(Q::getJobResultCall::abi_encode_returns(&(
        Bytes::from(vec![0xca, 0xfe]),
    )));

    let circuit = contract.circuit_info(U256::from(11u64)).await.unwrap();
    assert_eq!(circuit.gate_types, vec![0, 3]);
    assert_eq!(circuit.target_qubits, vec![2, 1]);
    assert!(circuit.is_compiled);
    assert_eq!(circuit.depth, U256::from(4u64));

    let result = contract.job_result(U256::from(3u64)).await.unwrap();
    assert_eq!(result, Bytes::from(vec![0xca, 0xfe]));

    let data: Bytes = serde_json::from_value(mock.calls()[0]["data"].clone()).unwrap();
    let call = Q::getCircuitInfoCall::abi_decode(&data, true).unwrap();
    assert_eq!(call.circuitId, U256::from(11u64));
}

fn allow_decryption(mock: &MockProvider, request_id: u64) {
    mock.respond::<Q::isDecryptionAllowedCall>(true.abi_encode());
    mock.respond::<Q::requestJobDecryptionCall>(U256::from(request_id).abi_encode());
}

#[tokio::test]
async fn decryption_refused_when_not_allowed() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    mock.respond::<Q::isDecryptionAllowedCall>(false.abi_encode());

    let err = contract.decrypt_job(U256::from(1u64)).await.unwrap_err();
    assert!(matches!(err, QuantumError::DecryptionNotAllowed));
    assert!(mock.sent_transactions().is_empty());
}

#[tokio::test]
async fn decryption_answered_in_receipt() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    allow_decryption(&mock, 77);
    mock.queue_receipt_logs(vec![log_of(&Q::QuantumResultDecrypted {
        requestId: U256::from(77u64),
        decryptedValue: 9,
    })]);

    let value = contract.decrypt_job(U256::from(5u64)).await.unwrap();
    assert_eq!(value.request_id, U256::from(77u64));
    assert_eq!(value.value, 9);
}

#[tokio::test]
async fn decryption_uses_request_id_assigned_when_mined() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    // another request is mined between simulation and send
    allow_decryption(&mock, 77);
    mock.queue_receipt_logs(vec![log_of(&Q::QuantumResultDecrypted {
        requestId: U256::from(78u64),
        decryptedValue: 9,
    })]);

    let value = tokio::time::timeout(Duration::from_secs(2), contract.decrypt_job(U256::from(5u64)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(value.request_id, U256::from(78u64));
    assert_eq!(value.value, 9);
}

#[tokio::test]
async fn receipt_answer_from_other_contract_is_ignored() {
    let mut log = log_of(&Q::QuantumResultDecrypted {
        requestId: U256::from(1u64),
        decryptedValue: 1,
    });
    log.address = MockProvider::account(2);
    let receipt = TransactionReceipt {
        transaction_hash: Default::default(),
        block_number: None,
        status: None,
        gas_used: None,
        from: MockProvider::account(0),
        to: Some(contract_address()),
        logs: vec![log],
    };
    assert_eq!(decrypted_from_receipt(&receipt, contract_address()), None);
}

#[tokio::test]
async fn decryption_answered_by_later_event() {
    let (mock, wallet, contract) = setup();
    wallet.connect().await.unwrap();
    allow_decryption(&mock, 78);

    let gateway = mock.clone();
    tokio::spawn(async move {
        while gateway.sent_transactions().is_empty() {
            tokio::time::sleep(FAST).await;
        }
        // an answer for someone else's request first
        gateway.push_log(log_of(&Q::QuantumResultDecrypted {
            requestId: U256::from(1u64),
            decryptedValue: 1,
        }));
        gateway.push_log(log_of(&Q::QuantumResultDecrypted {
            requestId: U256::from(78u64),
            decryptedValue: 13,
        }));
    });

    let value = tokio::time::timeout(Duration::from_secs(5), contract.decrypt_job(U256::from(5u64)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(value.value, 13);
    assert!(!contract.dispatch().is_loading());
}

#[tokio::test]
async fn context_decrypt_runs_job_decryptor() {
    let mock = Arc::new(MockProvider::new(8009));
    let host = HostEnvironment::new()
        .with_wallet(mock.clone())
        .with_fhe_library(Arc::new(MockFheLibrary::new()));
    let ctx = FhevmContext::mount(host, Arc::new(FhevmConfig::new(8009)));
    ctx.settled().await;
    ctx.connect_wallet().await.unwrap();
    ctx.set_decryptor(Arc::new(
        JobDecryptor::new(ctx.wallet_manager().clone()).with_poll_interval(FAST),
    ));

    allow_decryption(&mock, 5);
    mock.queue_receipt_logs(vec![log_of(&Q::QuantumResultDecrypted {
        requestId: U256::from(5u64),
        decryptedValue: 200,
    })]);

    let request = DecryptionRequest {
        ciphertext: U256::from(2u64),
        contract_address: contract_address(),
        user_address: MockProvider::account(0),
    };
    let value = ctx.decrypt(&request).await.unwrap().unwrap();
    assert_eq!(value.value, 200);
    assert_eq!(
        mock.sent_transactions()[0]["from"],
        serde_json::json!(MockProvider::account(0))
    );

    mock.respond::<Q::isDecryptionAllowedCall>(false.abi_encode());
    assert_eq!(ctx.decrypt(&request).await.unwrap(), None);
}
