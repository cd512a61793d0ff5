//! Happy-path round trips: results, truncation, ordering independence.

use crate::integration::harness::GatewayHarness;
use rand::Rng;
use shared_types::{Lane, PermutationDomain, PermutationRequest};
use std::time::Duration;
use tokio::task::JoinSet;
use work_gateway::GatewayConfig;

fn request(text: &str) -> PermutationRequest {
    PermutationRequest {
        text: text.to_string(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_lane_round_trip_returns_result_and_records_latency() {
    let mut harness = GatewayHarness::with_defaults();
    harness.spawn_permutation_worker(
        "slow.permutation.rpc",
        Duration::from_millis(50),
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
    );

    let result = harness
        .gateway
        .submit::<PermutationDomain>(Lane::Slow, request("abc"), None)
        .await
        .unwrap();

    assert_eq!(result, vec!["a", "b", "c"]);

    let snap = harness.gateway.statistics(Lane::Slow);
    assert_eq!(snap.recorded_total, 1);
    assert_eq!(snap.histogram.count, 1);
    // ~50ms of worker delay, generous ceiling for scheduler noise.
    assert!(snap.histogram.sum_ms >= 50, "sum_ms = {}", snap.histogram.sum_ms);
    assert!(snap.histogram.sum_ms < 1_000, "sum_ms = {}", snap.histogram.sum_ms);
    assert!(snap.p95_ms.unwrap() >= 50);

    // The fast lane saw nothing.
    assert_eq!(harness.gateway.statistics(Lane::Fast).recorded_total, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_result_truncates_to_limit_minus_one() {
    let ten: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
    let mut harness = GatewayHarness::with_defaults();
    harness.spawn_permutation_worker("fast.permutation.rpc", Duration::from_millis(5), ten);

    let result = harness
        .gateway
        .submit::<PermutationDomain>(Lane::Fast, request("abcdefghij"), Some(4))
        .await
        .unwrap();

    assert_eq!(result, vec!["p0", "p1", "p2"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn replies_resolve_by_id_not_by_arrival_order() {
    let mut harness = GatewayHarness::with_defaults();
    // The "ahead" submission gets the slower worker, so its reply arrives
    // after the one submitted behind it.
    harness.spawn_permutation_worker(
        "slow.permutation.rpc",
        Duration::from_millis(120),
        vec!["slow-result".to_string()],
    );
    harness.spawn_permutation_worker(
        "fast.permutation.rpc",
        Duration::from_millis(10),
        vec!["fast-result".to_string()],
    );

    let ahead = harness
        .gateway
        .submit::<PermutationDomain>(Lane::Slow, request("first"), None);
    let behind = harness
        .gateway
        .submit::<PermutationDomain>(Lane::Fast, request("second"), None);

    let (ahead, behind) = tokio::join!(ahead, behind);
    assert_eq!(ahead.unwrap(), vec!["slow-result"]);
    assert_eq!(behind.unwrap(), vec!["fast-result"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_submissions_never_cross_wires() {
    let harness = GatewayHarness::with_defaults();

    // Echo worker: replies with the payload text, after a random delay.
    let mut work = harness.broker.attach_worker("fast.permutation.rpc");
    let replies = harness.broker.reply_sender();
    tokio::spawn(async move {
        while let Some(wire) = work.recv().await {
            let replies = replies.clone();
            tokio::spawn(async move {
                let mut item = wire.decode::<PermutationDomain>().unwrap();
                let delay = rand::thread_rng().gen_range(1..40);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                let echo = vec![item.payload.text.clone()];
                item.complete(echo);
                let _ = replies
                    .send(shared_bus::WireMessage {
                        channel: "reply".to_string(),
                        body: serde_json::to_value(&item).unwrap(),
                    })
                    .await;
            });
        }
    });

    let mut set = JoinSet::new();
    for i in 0..20 {
        let gateway = harness.gateway.clone();
        set.spawn(async move {
            let text = format!("job-{i}");
            let result = gateway
                .submit::<PermutationDomain>(Lane::Fast, request(&text), None)
                .await
                .unwrap();
            (text, result)
        });
    }

    while let Some(joined) = set.join_next().await {
        let (text, result) = joined.unwrap();
        assert_eq!(result, vec![text]);
    }

    assert_eq!(harness.gateway.statistics(Lane::Fast).recorded_total, 20);
    assert_eq!(harness.gateway.pending_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn lane_timeouts_come_from_config() {
    let mut config = GatewayConfig::default();
    config.fast.reply_wait = Duration::from_millis(80);
    let mut harness = GatewayHarness::new(config);
    harness.spawn_silent_worker("fast.permutation.rpc");

    let start = std::time::Instant::now();
    let err = harness
        .gateway
        .submit::<PermutationDomain>(Lane::Fast, request("abc"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, work_gateway::SubmitError::Unavailable { .. }));
    // Waited roughly the configured ceiling, not the 120s default.
    assert!(start.elapsed() < Duration::from_secs(5));
}
