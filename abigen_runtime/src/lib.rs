//! Runtime support for generated contract bindings
//!
//! Generated code refers to this crate as `rt`. It provides the token model
//! used to move values across the backend boundary, the backend trait a
//! transport implements, the bound contract handle, and the subscription
//! machinery behind per-contract `watch_*` accessors and the multi-contract
//! watchers.
//!
//! # Example
//!
//! ```no_run
//! use abigen_runtime::{Subscription, mpsc};
//!
//! # async fn example() {
//! let (sink, mut events) = mpsc::channel::<u64>(16);
//! let mut subscription = Subscription::new(move |quit| async move {
//!     let _ = sink.send(1).await;
//!     quit.await;
//!     Ok(())
//! });
//! assert_eq!(events.recv().await, Some(1));
//! subscription.unsubscribe().await;
//! # }
//! ```

pub mod backend;
pub mod contract;
pub mod error;
pub mod subscription;
pub mod token;
pub mod watch;

pub use backend::*;
pub use contract::*;
pub use error::*;
pub use subscription::*;
pub use token::*;
pub use watch::*;

pub use alloy_primitives::{Address, B256, Bytes, FixedBytes, I256, U256};
pub use tokio::sync::mpsc;
