//! Subscription Tracking Properties
//!
//! Property tests asserting that any interleaving of subscribe and
//! unsubscribe calls leaves the client's active set equal to the
//! set-theoretic result of the same operations.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;

use market_stream_client::{
    ClientSettings, LatencyTier, PushSession, PushTransport, Quote, SnapshotSource,
    StreamingMarketClient, Symbol, TransportError,
};

// =============================================================================
// Inert transports
// =============================================================================

struct InertPush;

#[async_trait]
impl PushTransport for InertPush {
    async fn open(&self) -> Result<Box<dyn PushSession>, TransportError> {
        Err(TransportError::Unsupported("inert".to_string()))
    }
}

struct InertSnapshots;

#[async_trait]
impl SnapshotSource for InertSnapshots {
    async fn fetch_quotes(
        &self,
        _symbols: &[Symbol],
        _latency: LatencyTier,
    ) -> Result<Vec<Quote>, TransportError> {
        Ok(Vec::new())
    }
}

fn client() -> StreamingMarketClient {
    StreamingMarketClient::new(
        ClientSettings::default(),
        Arc::new(InertPush),
        Arc::new(InertSnapshots),
    )
}

// =============================================================================
// Strategies
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Subscribe(Vec<Symbol>),
    Unsubscribe(Vec<Symbol>),
}

/// Small fixed symbol universe so sequences actually collide.
fn symbol_strategy() -> impl Strategy<Value = Symbol> + Clone {
    prop::sample::select(vec![
        "ZCZ5".to_string(),
        "ZSX5".to_string(),
        "GCZ5".to_string(),
        "CLF6".to_string(),
        "KEU5".to_string(),
    ])
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let symbols = prop::collection::vec(symbol_strategy(), 0..4);
    prop_oneof![
        symbols.clone().prop_map(Op::Subscribe),
        symbols.prop_map(Op::Unsubscribe),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn active_set_matches_set_algebra(ops in prop::collection::vec(op_strategy(), 0..32)) {
        let client = client();
        let mut model: BTreeSet<Symbol> = BTreeSet::new();

        for op in &ops {
            match op {
                Op::Subscribe(symbols) => {
                    client.subscribe(symbols, LatencyTier::Realtime);
                    model.extend(symbols.iter().cloned());
                }
                Op::Unsubscribe(symbols) => {
                    client.unsubscribe(symbols);
                    for symbol in symbols {
                        model.remove(symbol);
                    }
                }
            }
        }

        let expected: Vec<Symbol> = model.into_iter().collect();
        prop_assert_eq!(client.active_subscriptions(), expected);
    }

    #[test]
    fn subscribe_is_idempotent(symbols in prop::collection::vec(symbol_strategy(), 1..5)) {
        let client = client();

        client.subscribe(&symbols, LatencyTier::Realtime);
        let once = client.active_subscriptions();

        client.subscribe(&symbols, LatencyTier::Realtime);
        prop_assert_eq!(client.active_subscriptions(), once);
    }

    #[test]
    fn unsubscribe_unknown_is_noop(
        kept in prop::collection::vec(symbol_strategy(), 1..4),
    ) {
        let client = client();
        client.subscribe(&kept, LatencyTier::Realtime);
        let before = client.active_subscriptions();

        client.unsubscribe(&["NGF6".to_string(), "HOF6".to_string()]);
        prop_assert_eq!(client.active_subscriptions(), before);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn duplicate_symbols_in_one_call_collapse() {
    let client = client();
    client.subscribe(
        &["ZCZ5".to_string(), "ZCZ5".to_string(), "GCZ5".to_string()],
        LatencyTier::Delayed15,
    );

    assert_eq!(
        client.active_subscriptions(),
        vec!["GCZ5".to_string(), "ZCZ5".to_string()]
    );
}

#[test]
fn unsubscribe_everything_leaves_empty_set() {
    let client = client();
    let symbols = vec!["ZCZ5".to_string(), "GCZ5".to_string()];

    client.subscribe(&symbols, LatencyTier::Realtime);
    client.unsubscribe(&symbols);

    assert!(client.active_subscriptions().is_empty());
}
