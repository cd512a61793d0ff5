//! Shared fixture: gateway over an in-memory broker plus mock workers.

use shared_bus::{InMemoryBroker, WireMessage};
use shared_types::{EventDomain, PermutationDomain};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use work_gateway::{GatewayConfig, WorkGateway};

/// One gateway, one broker, and the handles of everything spawned for a
/// test. Dropping the harness aborts them all.
pub struct GatewayHarness {
    pub broker: Arc<InMemoryBroker>,
    pub gateway: Arc<WorkGateway>,
    tasks: Vec<JoinHandle<()>>,
}

impl GatewayHarness {
    pub fn new(config: GatewayConfig) -> Self {
        let broker = Arc::new(InMemoryBroker::new());
        let gateway = Arc::new(
            WorkGateway::new(config, broker.clone(), broker.clone())
                .expect("gateway construction"),
        );
        let tasks = gateway.spawn_background();
        Self {
            broker,
            gateway,
            tasks,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(GatewayConfig::default())
    }

    /// Worker answering permutation requests on `channel` with `result`
    /// after `delay`.
    pub fn spawn_permutation_worker(
        &mut self,
        channel: &str,
        delay: Duration,
        result: Vec<String>,
    ) {
        let mut work = self.broker.attach_worker(channel);
        let replies = self.broker.reply_sender();
        self.tasks.push(tokio::spawn(async move {
            while let Some(wire) = work.recv().await {
                let mut item = wire.decode::<PermutationDomain>().unwrap();
                item.mark_started();
                tokio::time::sleep(delay).await;
                item.complete(result.clone());
                let _ = replies
                    .send(WireMessage {
                        channel: "reply".to_string(),
                        body: serde_json::to_value(&item).unwrap(),
                    })
                    .await;
            }
        }));
    }

    /// Worker answering event requests on `channel` with status "OK" after
    /// `delay`.
    pub fn spawn_event_worker(&mut self, channel: &str, delay: Duration) {
        let mut work = self.broker.attach_worker(channel);
        let replies = self.broker.reply_sender();
        self.tasks.push(tokio::spawn(async move {
            while let Some(wire) = work.recv().await {
                let mut item = wire.decode::<EventDomain>().unwrap();
                item.mark_started();
                tokio::time::sleep(delay).await;
                item.complete("OK".to_string());
                let _ = replies
                    .send(WireMessage {
                        channel: "reply".to_string(),
                        body: serde_json::to_value(&item).unwrap(),
                    })
                    .await;
            }
        }));
    }

    /// Worker that consumes requests on `channel` and never answers.
    pub fn spawn_silent_worker(&mut self, channel: &str) {
        let mut work = self.broker.attach_worker(channel);
        self.tasks.push(tokio::spawn(async move {
            while work.recv().await.is_some() {}
        }));
    }

    /// Worker that sends every reply twice, for stale-reply scenarios.
    pub fn spawn_double_reply_worker(&mut self, channel: &str, result: Vec<String>) {
        let mut work = self.broker.attach_worker(channel);
        let replies = self.broker.reply_sender();
        self.tasks.push(tokio::spawn(async move {
            while let Some(wire) = work.recv().await {
                let mut item = wire.decode::<PermutationDomain>().unwrap();
                item.complete(result.clone());
                let body = serde_json::to_value(&item).unwrap();
                for _ in 0..2 {
                    let _ = replies
                        .send(WireMessage {
                            channel: "reply".to_string(),
                            body: body.clone(),
                        })
                        .await;
                }
            }
        }));
    }
}

impl Drop for GatewayHarness {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
