//! Contract handle wrapped by every generated binding type

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, hex};
use tokio::sync::mpsc;
use tracing::debug;

use crate::backend::{
    CallOpts, ContractBackend, ContractRef, FilterOpts, Payload, TransactOpts, TxHash, WatchOpts,
};
use crate::error::{BindError, Result};
use crate::subscription::Subscription;
use crate::token::{FromTokens, Token};
use crate::watch::forward_logs;

/// A deployed contract bound to a backend
pub struct BoundContract<B> {
    address: Address,
    abi: &'static str,
    backend: Arc<B>,
}

impl<B> Clone for BoundContract<B> {
    fn clone(&self) -> Self {
        Self {
            address: self.address,
            abi: self.abi,
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B> std::fmt::Debug for BoundContract<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundContract")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl<B: ContractBackend> BoundContract<B> {
    pub fn new(address: Address, abi: &'static str, backend: Arc<B>) -> Self {
        Self {
            address,
            abi,
            backend,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    fn target(&self) -> ContractRef<'_> {
        ContractRef {
            address: self.address,
            abi: self.abi,
        }
    }

    /// Execute a read-only method and return its output tokens
    pub async fn call(
        &self,
        opts: &CallOpts,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<Vec<Token>> {
        self.backend
            .call(opts, self.target(), Payload::Method { signature, args })
            .await
    }

    /// Submit a state-changing method invocation
    pub async fn transact(
        &self,
        opts: &TransactOpts,
        signature: &str,
        args: Vec<Token>,
    ) -> Result<TxHash> {
        self.backend
            .transact(opts, self.target(), Payload::Method { signature, args })
            .await
    }

    /// Submit raw calldata, reaching the fallback function
    pub async fn raw_transact(&self, opts: &TransactOpts, calldata: Bytes) -> Result<TxHash> {
        self.backend
            .transact(opts, self.target(), Payload::Calldata(calldata))
            .await
    }

    /// Send value with empty calldata, reaching the receive function
    pub async fn transfer(&self, opts: &TransactOpts) -> Result<TxHash> {
        self.backend
            .transact(opts, self.target(), Payload::Transfer)
            .await
    }

    /// Query historical logs of one event
    pub async fn filter_logs<E: FromTokens>(
        &self,
        opts: &FilterOpts,
        event: &str,
        topics: Vec<Vec<Token>>,
    ) -> Result<Vec<E>> {
        let logs = self
            .backend
            .filter_logs(opts, self.target(), event, topics)
            .await?;
        debug!(event, count = logs.len(), "decoding filtered logs");
        logs.into_iter().map(E::from_tokens).collect()
    }

    /// Subscribe to one event and deliver decoded records into `sink`
    pub async fn watch_logs<E>(
        &self,
        opts: &WatchOpts,
        event: &str,
        topics: Vec<Vec<Token>>,
        sink: mpsc::Sender<E>,
    ) -> Result<Subscription>
    where
        E: FromTokens + Send + 'static,
    {
        let stream = self
            .backend
            .subscribe_logs(opts, self.target(), event, topics)
            .await?;
        Ok(forward_logs(stream, sink))
    }
}

/// Deploy hex-encoded bytecode (with or without `0x`) through `backend`
pub async fn deploy_contract<B: ContractBackend>(
    backend: &B,
    opts: &TransactOpts,
    abi: &str,
    bytecode: &str,
    args: Vec<Token>,
) -> Result<(Address, TxHash)> {
    let code = hex::decode(bytecode.trim_start_matches("0x"))
        .map_err(|err| BindError::Bytecode(err.to_string()))?;
    backend.deploy(opts, abi, Bytes::from(code), args).await
}

/// Replace every occurrence of a library placeholder with `address`
pub fn link_bytecode(bytecode: &str, pattern: &str, address: Address) -> Result<String> {
    if !bytecode.contains(pattern) {
        return Err(BindError::Link {
            pattern: pattern.to_string(),
        });
    }
    Ok(bytecode.replace(pattern, &hex::encode(address)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const PATTERN: &str = "__$0123456789abcdef0123456789abcdef01$__";

    #[test]
    fn link_replaces_every_placeholder() {
        let bytecode = format!("6080{PATTERN}00{PATTERN}");
        let address = Address::repeat_byte(0xab);
        let linked = link_bytecode(&bytecode, PATTERN, address).unwrap();
        assert_eq!(linked, format!("6080{}00{}", "ab".repeat(20), "ab".repeat(20)));
        assert!(hex::decode(&linked).is_ok());
    }

    #[test]
    fn link_requires_placeholder() {
        assert_matches!(
            link_bytecode("6080", PATTERN, Address::ZERO),
            Err(BindError::Link { pattern }) if pattern == PATTERN
        );
    }
}
