//! Gateway composition root and submit surface.

use crate::config::GatewayConfig;
use crate::dispatch::LaneDispatcher;
use crate::error::{InitError, SubmitError};
use crate::listener::ReplyListener;
use crate::pending::{self, PendingReplyTable};
use lane_telemetry::{LaneSnapshot, LatencyRecorder};
use shared_bus::{ReplySource, WorkPublisher};
use shared_types::{Lane, WorkDomain, WorkItem};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// The gateway: one `submit` per (domain, lane) request, backed by the
/// dispatcher, the pending table and the latency recorder.
///
/// All collaborators are constructed once and owned here; nothing is
/// resolved from ambient state. Clone-free sharing goes through `Arc`s
/// handed in by the caller (broker ports) or created in `new` (table,
/// recorder).
pub struct WorkGateway {
    config: GatewayConfig,
    dispatcher: LaneDispatcher,
    pending: Arc<PendingReplyTable>,
    recorder: Arc<LatencyRecorder>,
    reply_source: Arc<dyn ReplySource>,
}

impl WorkGateway {
    /// Build a gateway over the given broker ports.
    pub fn new(
        config: GatewayConfig,
        publisher: Arc<dyn WorkPublisher>,
        reply_source: Arc<dyn ReplySource>,
    ) -> Result<Self, InitError> {
        config.validate()?;
        let recorder = Arc::new(LatencyRecorder::new(&config.recorder)?);
        let pending = Arc::new(PendingReplyTable::new());
        let dispatcher = LaneDispatcher::new(publisher, pending.clone());

        Ok(Self {
            config,
            dispatcher,
            pending,
            recorder,
            reply_source,
        })
    }

    /// Spawn the reply listener and the pending-table sweep.
    ///
    /// Returns the task handles; aborting them shuts the gateway's
    /// background work down.
    pub fn spawn_background(&self) -> Vec<JoinHandle<()>> {
        let listener = ReplyListener::new(self.pending.clone(), self.reply_source.clone());
        let sweep = pending::sweep_task(self.pending.clone(), self.config.sweep_interval);
        vec![tokio::spawn(listener.run()), tokio::spawn(sweep)]
    }

    /// Submit work on a lane and wait for the correlated reply, using the
    /// lane's configured reply-wait ceiling.
    pub async fn submit<D: WorkDomain>(
        &self,
        lane: Lane,
        payload: D::Payload,
        limit: Option<usize>,
    ) -> Result<D::Outcome, SubmitError> {
        self.submit_with_deadline::<D>(lane, payload, limit, self.config.reply_wait(lane))
            .await
    }

    /// Submit work with an explicit reply-wait ceiling.
    ///
    /// On success the round-trip latency (worker completion minus item
    /// creation) is recorded for the lane and the domain's limit rule is
    /// applied to the outcome. A timeout, a swept entry, or a reply missing
    /// its result or completion timestamp all surface as
    /// [`SubmitError::Unavailable`]; none of those record a latency.
    pub async fn submit_with_deadline<D: WorkDomain>(
        &self,
        lane: Lane,
        payload: D::Payload,
        limit: Option<usize>,
        max_wait: Duration,
    ) -> Result<D::Outcome, SubmitError> {
        let item = WorkItem::<D::Payload, D::Outcome>::new(payload);
        let job_id = item.id;

        let rx = self.dispatcher.dispatch::<D>(lane, &item, max_wait).await?;

        let unavailable = || SubmitError::Unavailable {
            lane,
            waited: max_wait,
        };

        let envelope = match tokio::time::timeout(max_wait, rx).await {
            Ok(Ok(envelope)) => envelope,
            Ok(Err(_)) => {
                // Entry swept out from under the waiter.
                warn!(job_id = %job_id, lane = lane.as_str(), "Pending entry vanished while waiting");
                return Err(unavailable());
            }
            Err(_) => {
                self.pending.cancel(job_id);
                warn!(
                    job_id = %job_id,
                    lane = lane.as_str(),
                    domain = D::NAME,
                    waited_s = max_wait.as_secs(),
                    "No reply within the wait ceiling"
                );
                return Err(unavailable());
            }
        };

        let reply: WorkItem<D::Payload, D::Outcome> = match serde_json::from_value(envelope.body) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Reply body does not decode, treating as unavailable");
                return Err(unavailable());
            }
        };

        let (Some(elapsed), Some(outcome)) = (reply.processing_time(), reply.result) else {
            warn!(
                job_id = %job_id,
                lane = lane.as_str(),
                "Reply missing result or completion timestamp, treating as unavailable"
            );
            return Err(unavailable());
        };

        self.recorder.record(lane, elapsed);
        info!(
            job_id = %job_id,
            lane = lane.as_str(),
            domain = D::NAME,
            elapsed_ms = elapsed.num_milliseconds(),
            "Work item resolved"
        );

        Ok(D::apply_limit(outcome, limit))
    }

    /// Telemetry summary for one lane.
    pub fn statistics(&self, lane: Lane) -> LaneSnapshot {
        self.recorder.snapshot(lane)
    }

    /// Telemetry summaries for all lanes, keyed by lane name.
    pub fn statistics_all(&self) -> BTreeMap<&'static str, LaneSnapshot> {
        self.recorder.snapshot_all()
    }

    /// The latency recorder (e.g. to mount its registry on an exposition
    /// endpoint).
    pub fn recorder(&self) -> &Arc<LatencyRecorder> {
        &self.recorder
    }

    /// Requests currently awaiting replies.
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }
}
