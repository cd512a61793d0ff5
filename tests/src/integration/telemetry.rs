//! Telemetry behavior observed through full round trips.

use crate::integration::harness::GatewayHarness;
use shared_types::{EventDomain, EventRequest, Lane};
use std::time::Duration;
use work_gateway::GatewayConfig;

fn event(text: &str) -> EventRequest {
    EventRequest {
        text: text.to_string(),
        multiply: 1,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn histogram_window_resets_after_statistics_expiry() {
    let mut config = GatewayConfig::default();
    config.recorder.statistics_expiry = Duration::from_millis(200);
    let mut harness = GatewayHarness::new(config);
    harness.spawn_event_worker("slow.event.rpc", Duration::from_millis(5));

    for _ in 0..3 {
        harness
            .gateway
            .submit::<EventDomain>(Lane::Slow, event("warm"), None)
            .await
            .unwrap();
    }
    assert_eq!(harness.gateway.statistics(Lane::Slow).histogram.count, 3);

    tokio::time::sleep(Duration::from_millis(300)).await;

    harness
        .gateway
        .submit::<EventDomain>(Lane::Slow, event("fresh"), None)
        .await
        .unwrap();

    let snap = harness.gateway.statistics(Lane::Slow);
    // Old counts decayed; only the post-expiry write remains in the window.
    assert_eq!(snap.histogram.count, 1);
    // Cumulative accounting is unaffected by decay.
    assert_eq!(snap.recorded_total, 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn rolling_timer_reports_p95_over_recent_round_trips() {
    let mut harness = GatewayHarness::with_defaults();
    harness.spawn_event_worker("fast.event.rpc", Duration::from_millis(20));

    for _ in 0..5 {
        harness
            .gateway
            .submit::<EventDomain>(Lane::Fast, event("p"), None)
            .await
            .unwrap();
    }

    let snap = harness.gateway.statistics(Lane::Fast);
    let p95 = snap.p95_ms.unwrap();
    assert!(p95 >= 20, "p95 = {p95}");
    assert!(p95 < 1_000, "p95 = {p95}");
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshot_surface_covers_both_lanes() {
    let mut harness = GatewayHarness::with_defaults();
    harness.spawn_event_worker("fast.event.rpc", Duration::from_millis(5));

    harness
        .gateway
        .submit::<EventDomain>(Lane::Fast, event("x"), None)
        .await
        .unwrap();

    let all = harness.gateway.statistics_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all["fast"].recorded_total, 1);
    assert_eq!(all["slow"].recorded_total, 0);

    // The recorder's registry is mountable for exposition.
    let text = harness.gateway.recorder().encode_prometheus().unwrap();
    assert!(text.contains("lanebridge_round_trips_total"));
}
