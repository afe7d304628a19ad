//! Event forwarding and the multi-contract multiplexer

use std::future::Future;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::backend::LogStream;
use crate::error::{BindError, Result};
use crate::subscription::{Quit, Subscription};
use crate::token::FromTokens;

/// Capacity of the channel shared by the instances of one `watch_all` call
const FORWARD_BUFFER: usize = 64;

/// Decode each log of `stream` into `E` and push it into `sink`.
///
/// The returned subscription fails when the upstream subscription fails, a
/// log does not decode, or `sink` is closed. Stopping it stops the upstream.
pub fn forward_logs<E>(stream: LogStream, sink: mpsc::Sender<E>) -> Subscription
where
    E: FromTokens + Send + 'static,
{
    let LogStream {
        mut logs,
        subscription: mut upstream,
    } = stream;

    Subscription::new(move |mut quit| async move {
        let mut upstream_live = true;
        let outcome = 'forward: loop {
            tokio::select! {
                biased;
                _ = &mut quit => break 'forward Ok(()),
                failure = upstream.err(), if upstream_live => match failure {
                    Some(err) => break 'forward Err(err),
                    None => upstream_live = false,
                },
                log = logs.recv() => {
                    let Some(tokens) = log else {
                        break 'forward Ok(());
                    };
                    let event = match E::from_tokens(tokens) {
                        Ok(event) => event,
                        Err(err) => break 'forward Err(err),
                    };
                    tokio::select! {
                        biased;
                        _ = &mut quit => break 'forward Ok(()),
                        sent = sink.send(event) => {
                            if sent.is_err() {
                                break 'forward Err(BindError::SinkClosed);
                            }
                        }
                    }
                }
            }
        };
        upstream.unsubscribe().await;
        outcome
    })
}

/// Subscribe every instance and merge their events into `sink`.
///
/// `subscribe` is invoked once per instance, in order, with a sender into a
/// channel private to this call. If subscribing instance `i` fails, the
/// subscriptions already opened for earlier instances are torn down before
/// the error is returned and later instances are never subscribed.
///
/// The returned subscription forwards events in arrival order. It stops
/// every underlying subscription when it is unsubscribed, when any of them
/// fails (finishing with that error), or when `sink` closes (finishing with
/// [`BindError::SinkClosed`]).
pub async fn watch_all<'a, C, E, F, Fut>(
    instances: &'a [C],
    sink: mpsc::Sender<E>,
    mut subscribe: F,
) -> Result<Subscription>
where
    E: Send + 'static,
    F: FnMut(&'a C, mpsc::Sender<E>) -> Fut,
    Fut: Future<Output = Result<Subscription>>,
{
    let (forward_tx, forward_rx) = mpsc::channel(FORWARD_BUFFER);
    let mut subscriptions = Vec::with_capacity(instances.len());

    for (index, instance) in instances.iter().enumerate() {
        match subscribe(instance, forward_tx.clone()).await {
            Ok(subscription) => subscriptions.push(subscription),
            Err(err) => {
                debug!(
                    index,
                    opened = subscriptions.len(),
                    "subscribe failed, tearing down opened subscriptions"
                );
                for subscription in &mut subscriptions {
                    subscription.unsubscribe().await;
                }
                return Err(err);
            }
        }
    }
    drop(forward_tx);

    debug!(count = subscriptions.len(), "watching instances");
    Ok(Subscription::new(move |quit| {
        multiplex(quit, subscriptions, forward_rx, sink)
    }))
}

async fn multiplex<E: Send>(
    mut quit: Quit,
    mut subscriptions: Vec<Subscription>,
    mut events: mpsc::Receiver<E>,
    sink: mpsc::Sender<E>,
) -> Result<()> {
    let outcome = {
        let mut failures: FuturesUnordered<_> =
            subscriptions.iter_mut().map(Subscription::err).collect();

        'multiplex: loop {
            tokio::select! {
                biased;
                _ = &mut quit => break 'multiplex Ok(()),
                Some(failure) = failures.next(), if !failures.is_empty() => {
                    if let Some(err) = failure {
                        break 'multiplex Err(err);
                    }
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        break 'multiplex Ok(());
                    };
                    trace!("forwarding event");
                    tokio::select! {
                        biased;
                        _ = &mut quit => break 'multiplex Ok(()),
                        sent = sink.send(event) => {
                            if sent.is_err() {
                                break 'multiplex Err(BindError::SinkClosed);
                            }
                        }
                    }
                }
            }
        }
    };

    debug!(
        count = subscriptions.len(),
        failed = outcome.is_err(),
        "unsubscribing watched instances"
    );
    for subscription in &mut subscriptions {
        subscription.unsubscribe().await;
    }
    outcome
}
