#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use alloy::{hex, primitives::Bytes};
use async_trait::async_trait;
use axum::{Json, Router, extract::State, routing::get};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::broadcast, task::JoinHandle};
use whitelist_sdk::{
    Address, Amount, Config, ConfigBuilder, ConnectorEvent, ConnectorKind, ContractCallSpec,
    MirrorClient, TransactionReceipt, TransactionRef, WalletConnector, WhitelistEvent,
    error::ConnectorError, event,
};

pub const ACCOUNT: Address = Address::repeat_byte(0xab);
pub const MOCK_TX: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";

pub fn test_config() -> Config {
    ConfigBuilder::default()
        .receipt_poll_interval_ms("10".to_string())
        .max_transport_retries("2".to_string())
        .build()
        .expect("test config")
}

pub fn receipt(success: bool, block: u64) -> TransactionReceipt {
    TransactionReceipt {
        transaction_ref: TransactionRef::new(MOCK_TX),
        success,
        block_number: Some(block),
        gas_used: Some(21_000),
    }
}

/// Scripted wallet connector that counts every call it receives.
pub struct MockConnector {
    pub present: AtomicBool,
    pub ready: AtomicBool,
    pub account: Address,
    pub balance: Mutex<Result<Amount, ConnectorError>>,
    pub connect_error: Mutex<Option<ConnectorError>>,
    pub send_error: Mutex<Option<ConnectorError>>,
    pub read_response: Mutex<Result<Bytes, ConnectorError>>,
    pub receipt_timeout: Duration,
    pub balance_delay: Duration,
    receipts: Mutex<VecDeque<Result<Option<TransactionReceipt>, ConnectorError>>>,
    events: broadcast::Sender<ConnectorEvent>,

    pub connect_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub balance_calls: AtomicUsize,
    pub send_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub receipt_calls: AtomicUsize,
}

impl MockConnector {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            present: AtomicBool::new(true),
            ready: AtomicBool::new(true),
            account: ACCOUNT,
            balance: Mutex::new(Ok(Amount::from_tinybars(1_250_000_000))),
            connect_error: Mutex::new(None),
            send_error: Mutex::new(None),
            read_response: Mutex::new(Ok(Bytes::new())),
            receipt_timeout: Duration::from_secs(5),
            balance_delay: Duration::ZERO,
            receipts: Mutex::new(VecDeque::new()),
            events,
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            read_calls: AtomicUsize::new(0),
            receipt_calls: AtomicUsize::new(0),
        }
    }

    pub fn without_extension() -> Self {
        let mock = Self::new();
        mock.present.store(false, Ordering::SeqCst);
        mock.ready.store(false, Ordering::SeqCst);
        mock
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    /// Makes every balance query take `delay`.
    pub fn with_balance_delay(mut self, delay: Duration) -> Self {
        self.balance_delay = delay;
        self
    }

    /// Queues the next answer of `transaction_receipt`; an empty queue means "still pending".
    pub fn push_receipt(&self, answer: Result<Option<TransactionReceipt>, ConnectorError>) {
        self.receipts.lock().push_back(answer);
    }

    pub fn emit(&self, event: ConnectorEvent) {
        let _ = self.events.send(event);
    }

    /// Total number of calls that would have reached the network.
    pub fn network_calls(&self) -> usize {
        [
            &self.connect_calls,
            &self.disconnect_calls,
            &self.balance_calls,
            &self.send_calls,
            &self.read_calls,
            &self.receipt_calls,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Extension
    }

    fn is_extension_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<Address, ConnectorError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        match self.connect_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(self.account),
        }
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_balance(&self, _account: Address) -> Result<Amount, ConnectorError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        if !self.balance_delay.is_zero() {
            tokio::time::sleep(self.balance_delay).await;
        }
        self.balance.lock().clone()
    }

    async fn sign_and_send(&self, _call: &ContractCallSpec) -> Result<TransactionRef, ConnectorError> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        match self.send_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(TransactionRef::new(MOCK_TX)),
        }
    }

    async fn read_only_call(&self, _call: &ContractCallSpec) -> Result<Bytes, ConnectorError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.read_response.lock().clone()
    }

    async fn transaction_receipt(
        &self,
        _tx: &TransactionRef,
    ) -> Result<Option<TransactionReceipt>, ConnectorError> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        self.receipts.lock().pop_front().unwrap_or(Ok(None))
    }

    fn receipt_timeout(&self) -> Duration {
        self.receipt_timeout
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ConnectorEvent> {
        self.events.subscribe()
    }
}

/// Mirror log entry for a `WhitelistAccount(account)` event mined in `block`.
pub fn whitelist_log(account: Address, block: u64) -> Value {
    let record = event::encode(&WhitelistEvent {
        account_id: account,
    });
    json!({
        "data": hex::encode_prefixed(&record.data),
        "topics": record.topics.iter().map(hex::encode_prefixed).collect::<Vec<_>>(),
        "block_number": block,
        "index": 0,
    })
}

#[derive(Clone, Default)]
pub struct MirrorState {
    logs: Arc<Mutex<Vec<Value>>>,
    latest_block: Arc<Mutex<Option<u64>>>,
    pub log_requests: Arc<AtomicUsize>,
}

async fn contract_logs(State(state): State<MirrorState>) -> Json<Value> {
    state.log_requests.fetch_add(1, Ordering::SeqCst);
    let logs = state.logs.lock().clone();
    Json(json!({ "logs": logs, "links": { "next": null } }))
}

async fn latest_block(State(state): State<MirrorState>) -> Json<Value> {
    let blocks: Vec<Value> = state
        .latest_block
        .lock()
        .iter()
        .map(|number| json!({ "number": number }))
        .collect();
    Json(json!({ "blocks": blocks }))
}

/// In-process mirror node serving contract logs and the latest block.
pub struct MirrorFixture {
    pub base: String,
    pub state: MirrorState,
    handle: JoinHandle<()>,
}

impl MirrorFixture {
    /// `None` when no local port could be bound.
    pub async fn spawn() -> Option<Self> {
        let state = MirrorState::default();
        let router = Router::new()
            .route(
                "/api/v1/contracts/{contract}/results/logs",
                get(contract_logs),
            )
            .route("/api/v1/blocks", get(latest_block))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
        let addr = listener.local_addr().ok()?;
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router.into_make_service()).await {
                eprintln!("test server stopped: {err}");
            }
        });

        Some(Self {
            base: format!("http://{}/api/v1", addr),
            state,
            handle,
        })
    }

    pub fn client(&self) -> MirrorClient {
        MirrorClient::new(&self.base, None).expect("create mirror client")
    }

    pub fn push_log(&self, entry: Value) {
        self.state.logs.lock().push(entry);
    }

    pub fn set_latest_block(&self, block: u64) {
        *self.state.latest_block.lock() = Some(block);
    }

    /// Indexes a whitelist event together with the block it was mined in.
    pub fn publish(&self, account: Address, block: u64) {
        self.push_log(whitelist_log(account, block));
        self.set_latest_block(block);
    }

    pub fn log_requests(&self) -> usize {
        self.state.log_requests.load(Ordering::SeqCst)
    }
}

impl Drop for MirrorFixture {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
