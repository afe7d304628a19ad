//! The transport seam behind generated bindings
//!
//! A [`ContractBackend`] owns everything the bindings do not: ABI encoding,
//! signing, RPC and log decoding. Bindings hand it [`Token`]s and canonical
//! signatures and get decoded tokens back.

use std::future::Future;

use alloy_primitives::{Address, B256, Bytes, U256};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::subscription::Subscription;
use crate::token::Token;

/// Hash of a submitted transaction
pub type TxHash = B256;

/// Options for read-only calls
#[derive(Debug, Clone, Default)]
pub struct CallOpts {
    pub from: Option<Address>,
    /// Block to execute against, latest when absent
    pub block: Option<u64>,
    pub pending: bool,
}

/// Options for state-changing transactions and deployments
#[derive(Debug, Clone, Default)]
pub struct TransactOpts {
    pub from: Option<Address>,
    pub value: U256,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<U256>,
    pub nonce: Option<u64>,
}

/// Block range for historical log queries
#[derive(Debug, Clone, Default)]
pub struct FilterOpts {
    pub start: u64,
    /// Open ended when absent
    pub end: Option<u64>,
}

/// Options for live log subscriptions
#[derive(Debug, Clone, Default)]
pub struct WatchOpts {
    /// Replay logs from this block before following the head
    pub start: Option<u64>,
}

/// What a call or transaction sends to a contract
#[derive(Debug, Clone)]
pub enum Payload<'a> {
    /// Invoke a declared method by canonical signature
    Method { signature: &'a str, args: Vec<Token> },
    /// Raw calldata, used by fallback wrappers
    Calldata(Bytes),
    /// Plain value transfer with empty calldata
    Transfer,
}

/// The contract an operation targets
#[derive(Debug, Clone, Copy)]
pub struct ContractRef<'a> {
    pub address: Address,
    /// JSON ABI, for backends that need output or event layouts
    pub abi: &'a str,
}

/// A live stream of decoded logs for a single contract and event
///
/// Each item holds the event arguments in declaration order. Indexed
/// arguments of dynamic types arrive as their 32-byte topic hash.
#[derive(Debug)]
pub struct LogStream {
    pub logs: mpsc::Receiver<Vec<Token>>,
    pub subscription: Subscription,
}

/// Transport used by generated bindings
///
/// Events are identified by their canonical signature. `topics` holds one
/// entry per indexed argument; an empty entry matches any value.
pub trait ContractBackend: Send + Sync {
    fn call(
        &self,
        opts: &CallOpts,
        contract: ContractRef<'_>,
        payload: Payload<'_>,
    ) -> impl Future<Output = Result<Vec<Token>>> + Send;

    fn transact(
        &self,
        opts: &TransactOpts,
        contract: ContractRef<'_>,
        payload: Payload<'_>,
    ) -> impl Future<Output = Result<TxHash>> + Send;

    fn deploy(
        &self,
        opts: &TransactOpts,
        abi: &str,
        bytecode: Bytes,
        args: Vec<Token>,
    ) -> impl Future<Output = Result<(Address, TxHash)>> + Send;

    fn filter_logs(
        &self,
        opts: &FilterOpts,
        contract: ContractRef<'_>,
        event: &str,
        topics: Vec<Vec<Token>>,
    ) -> impl Future<Output = Result<Vec<Vec<Token>>>> + Send;

    fn subscribe_logs(
        &self,
        opts: &WatchOpts,
        contract: ContractRef<'_>,
        event: &str,
        topics: Vec<Vec<Token>>,
    ) -> impl Future<Output = Result<LogStream>> + Send;
}
