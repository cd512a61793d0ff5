//! Failure-path scenarios: timeouts, stale replies, dispatch failures,
//! abandoned waiters.

use crate::integration::harness::GatewayHarness;
use shared_types::{EventDomain, EventRequest, Lane, PermutationDomain, PermutationRequest};
use std::time::Duration;
use work_gateway::{DispatchError, GatewayConfig, SubmitError};

fn event(text: &str) -> EventRequest {
    EventRequest {
        text: text.to_string(),
        multiply: 1,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn no_reply_within_ceiling_is_unavailable_and_unrecorded() {
    let mut harness = GatewayHarness::with_defaults();
    harness.spawn_silent_worker("fast.event.rpc");

    let before = harness.gateway.statistics(Lane::Fast);

    let err = harness
        .gateway
        .submit_with_deadline::<EventDomain>(
            Lane::Fast,
            event("abc"),
            None,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Unavailable {
            lane: Lane::Fast,
            ..
        }
    ));

    let after = harness.gateway.statistics(Lane::Fast);
    assert_eq!(after.recorded_total, before.recorded_total);
    assert_eq!(after.histogram.count, before.histogram.count);
    assert_eq!(harness.gateway.pending_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_reply_resolves_exactly_once() {
    let mut harness = GatewayHarness::with_defaults();
    harness.spawn_double_reply_worker("fast.permutation.rpc", vec!["only".to_string()]);

    let result = harness
        .gateway
        .submit::<PermutationDomain>(
            Lane::Fast,
            PermutationRequest {
                text: "abc".to_string(),
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(result, vec!["only"]);

    // Give the second (stale) reply time to flow through the listener.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snap = harness.gateway.statistics(Lane::Fast);
    assert_eq!(snap.recorded_total, 1);
    assert_eq!(harness.gateway.pending_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn publish_with_no_consumer_fails_fast() {
    let harness = GatewayHarness::with_defaults();

    let start = std::time::Instant::now();
    let err = harness
        .gateway
        .submit::<EventDomain>(Lane::Slow, event("abc"), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Dispatch(DispatchError::Bus(_))
    ));
    // Failed before any reply wait began.
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(harness.gateway.pending_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn abandoned_waiter_is_swept_not_leaked() {
    let mut config = GatewayConfig::default();
    config.sweep_interval = Duration::from_millis(50);
    let mut harness = GatewayHarness::new(config);
    harness.spawn_silent_worker("fast.event.rpc");

    let gateway = harness.gateway.clone();
    let waiter = tokio::spawn(async move {
        let _ = gateway
            .submit_with_deadline::<EventDomain>(
                Lane::Fast,
                event("abandoned"),
                None,
                Duration::from_millis(200),
            )
            .await;
    });

    // Let the dispatch land, then abandon the caller outright.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(harness.gateway.pending_count(), 1);
    waiter.abort();

    // The sweep reclaims the entry once its deadline passes.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(harness.gateway.pending_count(), 0);
}
