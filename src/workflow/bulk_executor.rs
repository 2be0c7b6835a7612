//! Fans one stage action out over many subjects.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::models::{ActionPayload, Stage, StageAction, StageActionRequest, SubjectId};
use super::outcome::{BulkActionReport, BulkCancelled, StageActionOutcome};
use super::transition_executor::StageTransitionExecutor;

/// Default number of subjects processed at the same time.
pub const DEFAULT_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

/// Applies the same action to a batch of subjects.
///
/// At most `concurrency_limit` subjects are in flight at once; the rest wait
/// for a free slot. Every subject is settled independently, so the report
/// always has one outcome per requested subject regardless of how many
/// individual calls fail.
pub struct BulkActionExecutor {
    executor: StageTransitionExecutor,
    concurrency_limit: NonZeroUsize,
}

impl BulkActionExecutor {
    pub fn new(executor: StageTransitionExecutor, concurrency_limit: NonZeroUsize) -> Self {
        Self {
            executor,
            concurrency_limit,
        }
    }

    /// Apply `action` on `stage` to every subject in `subject_ids`.
    ///
    /// Outcomes are reported in completion order.
    pub async fn apply_bulk(
        &self,
        subject_ids: &[SubjectId],
        stage: Stage,
        action: StageAction,
        payload: &ActionPayload,
    ) -> BulkActionReport {
        let never = CancellationToken::new();
        match self
            .apply_bulk_cancellable(subject_ids, stage, action, payload, &never)
            .await
        {
            Ok(report) => report,
            // The token above is never cancelled.
            Err(cancelled) => unreachable!("{}", cancelled),
        }
    }

    /// Like [`apply_bulk`](Self::apply_bulk), but stops dispatching new
    /// subjects once `cancel` fires.
    ///
    /// Calls already dispatched are detached and run to completion against
    /// the backend; their outcomes are discarded.
    pub async fn apply_bulk_cancellable(
        &self,
        subject_ids: &[SubjectId],
        stage: Stage,
        action: StageAction,
        payload: &ActionPayload,
        cancel: &CancellationToken,
    ) -> Result<BulkActionReport, BulkCancelled> {
        let total = subject_ids.len();
        let limit = self.concurrency_limit.get();
        info!(
            "Starting bulk {} on {} for {} subjects (concurrency={})",
            action, stage, total, limit
        );

        let mut tasks: JoinSet<StageActionOutcome> = JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, SubjectId> = HashMap::with_capacity(limit);
        let mut outcomes = Vec::with_capacity(total);
        let mut queue = subject_ids.iter();
        let mut dispatched = 0;

        loop {
            while tasks.len() < limit && !cancel.is_cancelled() {
                let Some(subject_id) = queue.next() else {
                    break;
                };
                let request = StageActionRequest::new(subject_id.clone(), stage, action)
                    .with_payload(payload.clone());
                let executor = self.executor.clone();
                let handle = tasks.spawn(async move { executor.apply(&request).await });
                in_flight.insert(handle.id(), subject_id.clone());
                dispatched += 1;
            }

            if tasks.is_empty() && dispatched == total {
                break;
            }

            if cancel.is_cancelled() {
                return Err(self.cancelled(&mut tasks, dispatched, total));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.cancelled(&mut tasks, dispatched, total));
                }
                joined = tasks.join_next_with_id() => {
                    match joined {
                        Some(Ok((id, outcome))) => {
                            in_flight.remove(&id);
                            debug!(
                                "Subject {} settled (success={})",
                                outcome.subject_id, outcome.success
                            );
                            outcomes.push(outcome);
                        }
                        Some(Err(join_err)) => {
                            let subject_id = in_flight.remove(&join_err.id()).unwrap_or_default();
                            error!("Task for subject {} failed: {}", subject_id, join_err);
                            outcomes.push(StageActionOutcome::remote_failure(
                                subject_id,
                                format!("subject task aborted: {}", join_err),
                            ));
                        }
                        None => {}
                    }
                }
            }
        }

        let report = BulkActionReport::from_outcomes(outcomes);
        info!(
            "Bulk {} on {} finished: {} of {} succeeded",
            action, stage, report.succeeded, report.total
        );
        if report.failed > 0 {
            warn!("Bulk failures: {:?}", report.failure_breakdown());
        }
        Ok(report)
    }

    fn cancelled(
        &self,
        tasks: &mut JoinSet<StageActionOutcome>,
        dispatched: usize,
        total: usize,
    ) -> BulkCancelled {
        let still_running = tasks.len();
        tasks.detach_all();
        warn!(
            "Bulk action cancelled: {} of {} subjects dispatched, {} still running",
            dispatched, total, still_running
        );
        BulkCancelled { dispatched, total }
    }
}
