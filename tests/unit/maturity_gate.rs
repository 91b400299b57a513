//! Maturity gate correlation and timing

use futures::channel::mpsc;
use futures::StreamExt;
use std::time::{Duration, Instant};

use krc20_inscribe::maturity::{CancelHandle, CancelToken, MaturityGate, MaturityOutcome};
use krc20_inscribe::types::{ChangeEvent, Outpoint, TransactionId};

fn txid(byte: u8) -> TransactionId {
    TransactionId::from_bytes([byte; 32])
}

fn gate(capacity: usize) -> (MaturityGate, mpsc::UnboundedSender<ChangeEvent>) {
    let (sender, receiver) = mpsc::unbounded();
    (MaturityGate::spawn(receiver.boxed(), capacity), sender)
}

fn added(id: TransactionId) -> ChangeEvent {
    ChangeEvent {
        address: "kaspatest:qqsigner".to_string(),
        added: vec![Outpoint::new(id, 0)],
        removed: vec![],
        transaction_id: None,
    }
}

fn tagged(id: TransactionId) -> ChangeEvent {
    ChangeEvent {
        address: "kaspatest:pqscript".to_string(),
        added: vec![],
        removed: vec![],
        transaction_id: Some(id),
    }
}

/// Let the listener task drain what was sent
async fn wait_until_observed(gate: &MaturityGate, id: &TransactionId) {
    for _ in 0..200 {
        if gate.has_observed(id) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("gate never observed {}", id);
}

#[tokio::test]
async fn test_event_before_wait_is_buffered() {
    let (gate, sender) = gate(8);
    sender.unbounded_send(added(txid(1))).unwrap();
    wait_until_observed(&gate, &txid(1)).await;

    // A zero timeout can only succeed through the buffer
    let outcome = gate
        .await_maturity(&txid(1), Duration::ZERO, &mut CancelToken::never())
        .await;
    assert_eq!(outcome, MaturityOutcome::Matured);
}

#[tokio::test]
async fn test_event_during_wait_releases_waiter() {
    let (gate, sender) = gate(8);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        sender.unbounded_send(tagged(txid(2))).unwrap();
    });

    let started = Instant::now();
    let outcome = gate
        .await_maturity(&txid(2), Duration::from_secs(5), &mut CancelToken::never())
        .await;

    assert_eq!(outcome, MaturityOutcome::Matured);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_timeout_never_fires_early() {
    let (gate, _sender) = gate(8);
    let timeout = Duration::from_millis(150);

    let started = Instant::now();
    let outcome = gate.await_maturity(&txid(3), timeout, &mut CancelToken::never()).await;

    assert_eq!(outcome, MaturityOutcome::TimedOut);
    assert!(started.elapsed() >= timeout);
}

#[tokio::test]
async fn test_closed_stream_does_not_end_wait_early() {
    let (gate, sender) = gate(8);
    drop(sender);
    let timeout = Duration::from_millis(100);

    let started = Instant::now();
    let outcome = gate.await_maturity(&txid(4), timeout, &mut CancelToken::never()).await;

    assert_eq!(outcome, MaturityOutcome::TimedOut);
    assert!(started.elapsed() >= timeout);
}

#[tokio::test]
async fn test_unrelated_events_do_not_match() {
    let (gate, sender) = gate(8);
    sender.unbounded_send(added(txid(10))).unwrap();
    sender.unbounded_send(tagged(txid(11))).unwrap();

    let outcome = gate
        .await_maturity(&txid(12), Duration::from_millis(100), &mut CancelToken::never())
        .await;

    assert_eq!(outcome, MaturityOutcome::TimedOut);
    assert!(gate.has_observed(&txid(10)));
    assert!(gate.has_observed(&txid(11)));
}

#[tokio::test]
async fn test_event_after_timeout_only_updates_buffer() {
    let (gate, sender) = gate(8);

    let outcome = gate
        .await_maturity(&txid(5), Duration::from_millis(50), &mut CancelToken::never())
        .await;
    assert_eq!(outcome, MaturityOutcome::TimedOut);

    sender.unbounded_send(added(txid(5))).unwrap();
    wait_until_observed(&gate, &txid(5)).await;
    assert_eq!(gate.events_seen(), 1);
}

#[tokio::test]
async fn test_cancel_ends_wait() {
    let (gate, _sender) = gate(8);
    let handle = CancelHandle::new();
    let mut token = handle.token();

    tokio::spawn({
        let handle = handle.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            handle.cancel();
        }
    });

    let started = Instant::now();
    let outcome = gate.await_maturity(&txid(6), Duration::from_secs(10), &mut token).await;

    assert_eq!(outcome, MaturityOutcome::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_buffer_evicts_oldest() {
    let (gate, sender) = gate(2);
    for byte in 20..23 {
        sender.unbounded_send(tagged(txid(byte))).unwrap();
    }
    wait_until_observed(&gate, &txid(22)).await;

    assert!(!gate.has_observed(&txid(20)));
    assert!(gate.has_observed(&txid(21)));
}
