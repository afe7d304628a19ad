//! Cancellable background producers
//!
//! A [`Subscription`] owns a spawned producer task. The producer receives a
//! [`Quit`] future that resolves once the handle asks it to stop (or is
//! dropped) and reports its outcome through the handle's [`Subscription::err`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{BindError, Result};

/// Handle to a running producer
///
/// Dropping the handle signals quit to the producer without waiting for it.
#[derive(Debug)]
pub struct Subscription {
    quit: Option<oneshot::Sender<()>>,
    done: Option<oneshot::Receiver<Result<()>>>,
}

impl Subscription {
    /// Spawn `producer` on the tokio runtime
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(Quit) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let (quit_tx, quit_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        let task = producer(Quit {
            signal: quit_rx,
            fired: false,
        });
        tokio::spawn(async move {
            let _ = done_tx.send(task.await);
        });
        Self {
            quit: Some(quit_tx),
            done: Some(done_rx),
        }
    }

    /// Wait for the producer to finish and return its error, if any.
    ///
    /// Resolves to `None` when the producer exits cleanly and, once the
    /// outcome has been observed, on every later call.
    pub async fn err(&mut self) -> Option<BindError> {
        let done = self.done.as_mut()?;
        let outcome = done.await;
        self.done = None;
        match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(_) => Some(BindError::ProducerGone),
        }
    }

    /// Ask the producer to stop and wait until it has exited. Idempotent.
    pub async fn unsubscribe(&mut self) {
        if let Some(quit) = self.quit.take() {
            let _ = quit.send(());
        }
        if let Some(done) = self.done.take() {
            let _ = done.await;
        }
    }

    pub fn is_active(&self) -> bool {
        self.done.is_some()
    }
}

/// Resolves when the owning [`Subscription`] unsubscribes or is dropped
#[derive(Debug)]
pub struct Quit {
    signal: oneshot::Receiver<()>,
    fired: bool,
}

impl Future for Quit {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.fired {
            return Poll::Ready(());
        }
        match Pin::new(&mut self.signal).poll(cx) {
            Poll::Ready(_) => {
                self.fired = true;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
