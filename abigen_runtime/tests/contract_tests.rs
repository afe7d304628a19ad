//! Integration tests for `BoundContract` against an in-memory backend

use std::sync::{Arc, Mutex};
use std::time::Duration;

use abigen_runtime::{
    Address, BindError, BoundContract, Bytes, CallOpts, ContractBackend, ContractRef, FilterOpts,
    FromTokens, LogStream, Payload, Result, Subscription, Token, TokenReader, TransactOpts, TxHash,
    U256, WatchOpts, deploy_contract, mpsc,
};
use assert_matches::assert_matches;
use tokio::time::timeout;

const ABI: &str = "[]";

/// Records every request and replays scripted logs
#[derive(Default)]
struct MemoryBackend {
    requests: Mutex<Vec<String>>,
    live_logs: Mutex<Option<mpsc::Receiver<Vec<Token>>>>,
}

impl MemoryBackend {
    fn record(&self, request: String) {
        self.requests.lock().unwrap().push(request);
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn describe(payload: &Payload<'_>) -> String {
        match payload {
            Payload::Method { signature, args } => format!("{signature}/{}", args.len()),
            Payload::Calldata(data) => format!("calldata/{}", data.len()),
            Payload::Transfer => "transfer".to_string(),
        }
    }
}

impl ContractBackend for MemoryBackend {
    async fn call(
        &self,
        _opts: &CallOpts,
        contract: ContractRef<'_>,
        payload: Payload<'_>,
    ) -> Result<Vec<Token>> {
        self.record(format!("call {}", Self::describe(&payload)));
        match payload {
            Payload::Method { args, .. } => {
                Ok(vec![Token::Address(contract.address), Token::Uint(U256::from(args.len()))])
            }
            _ => Err(BindError::Backend("calls need a method".into())),
        }
    }

    async fn transact(
        &self,
        _opts: &TransactOpts,
        _contract: ContractRef<'_>,
        payload: Payload<'_>,
    ) -> Result<TxHash> {
        self.record(format!("transact {}", Self::describe(&payload)));
        Ok(TxHash::repeat_byte(7))
    }

    async fn deploy(
        &self,
        _opts: &TransactOpts,
        _abi: &str,
        bytecode: Bytes,
        args: Vec<Token>,
    ) -> Result<(Address, TxHash)> {
        self.record(format!("deploy {}/{}", bytecode.len(), args.len()));
        Ok((Address::repeat_byte(1), TxHash::repeat_byte(2)))
    }

    async fn filter_logs(
        &self,
        _opts: &FilterOpts,
        _contract: ContractRef<'_>,
        event: &str,
        topics: Vec<Vec<Token>>,
    ) -> Result<Vec<Vec<Token>>> {
        self.record(format!("filter {event}/{}", topics.len()));
        Ok(vec![
            vec![Token::Uint(U256::from(1u64))],
            vec![Token::Uint(U256::from(2u64))],
        ])
    }

    async fn subscribe_logs(
        &self,
        _opts: &WatchOpts,
        _contract: ContractRef<'_>,
        event: &str,
        _topics: Vec<Vec<Token>>,
    ) -> Result<LogStream> {
        self.record(format!("subscribe {event}"));
        let logs = self
            .live_logs
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| BindError::Subscription("no live feed".into()))?;
        Ok(LogStream {
            logs,
            subscription: Subscription::new(|quit| async move {
                quit.await;
                Ok(())
            }),
        })
    }
}

#[derive(Debug, PartialEq)]
struct Tick(u64);

impl FromTokens for Tick {
    fn from_tokens(tokens: Vec<Token>) -> Result<Self> {
        TokenReader::new(tokens).single().map(Tick)
    }
}

fn bound(backend: &Arc<MemoryBackend>) -> BoundContract<MemoryBackend> {
    BoundContract::new(Address::repeat_byte(9), ABI, Arc::clone(backend))
}

#[tokio::test]
async fn test_call_passes_signature_and_args() {
    let backend = Arc::new(MemoryBackend::default());
    let contract = bound(&backend);

    let tokens = contract
        .call(
            &CallOpts::default(),
            "balanceOf(address)",
            vec![Token::Address(Address::ZERO)],
        )
        .await
        .unwrap();

    let mut reader = TokenReader::new(tokens);
    assert_eq!(reader.read::<Address>().unwrap(), contract.address());
    assert_eq!(reader.read::<u64>().unwrap(), 1);
    reader.finish().unwrap();
    assert_eq!(backend.requests(), vec!["call balanceOf(address)/1"]);
}

#[tokio::test]
async fn test_fallback_and_receive_payloads() {
    let backend = Arc::new(MemoryBackend::default());
    let contract = bound(&backend);
    let opts = TransactOpts::default();

    contract
        .raw_transact(&opts, Bytes::from(vec![0xde, 0xad]))
        .await
        .unwrap();
    contract.transfer(&opts).await.unwrap();

    assert_eq!(
        backend.requests(),
        vec!["transact calldata/2", "transact transfer"]
    );
}

#[tokio::test]
async fn test_filter_logs_decodes_each_log() {
    let backend = Arc::new(MemoryBackend::default());
    let contract = bound(&backend);

    let ticks: Vec<Tick> = contract
        .filter_logs(&FilterOpts::default(), "Tick(uint64)", vec![])
        .await
        .unwrap();

    assert_eq!(ticks, vec![Tick(1), Tick(2)]);
}

#[tokio::test]
async fn test_watch_logs_forwards_records() {
    let backend = Arc::new(MemoryBackend::default());
    let (feed, logs) = mpsc::channel(4);
    *backend.live_logs.lock().unwrap() = Some(logs);
    let contract = bound(&backend);
    let (sink, mut ticks) = mpsc::channel(4);

    let mut subscription = contract
        .watch_logs::<Tick>(&WatchOpts::default(), "Tick(uint64)", vec![], sink)
        .await
        .unwrap();

    feed.send(vec![Token::Uint(U256::from(42u64))]).await.unwrap();
    let tick = timeout(Duration::from_secs(5), ticks.recv()).await.unwrap();
    assert_eq!(tick, Some(Tick(42)));

    subscription.unsubscribe().await;
}

#[tokio::test]
async fn test_watch_logs_propagates_subscribe_failure() {
    let backend = Arc::new(MemoryBackend::default());
    let contract = bound(&backend);
    let (sink, _ticks) = mpsc::channel::<Tick>(1);

    let result = contract
        .watch_logs(&WatchOpts::default(), "Tick(uint64)", vec![], sink)
        .await;

    assert_matches!(result, Err(BindError::Subscription(_)));
}

#[tokio::test]
async fn test_deploy_decodes_hex() {
    let backend = MemoryBackend::default();
    let opts = TransactOpts::default();

    let (address, _) = deploy_contract(&backend, &opts, ABI, "0x6080604052", vec![])
        .await
        .unwrap();
    assert_eq!(address, Address::repeat_byte(1));
    assert_eq!(backend.requests(), vec!["deploy 5/0"]);

    let bad = deploy_contract(&backend, &opts, ABI, "0xzz", vec![]).await;
    assert_matches!(bad, Err(BindError::Bytecode(_)));
}
