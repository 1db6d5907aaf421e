//! Teardown: release tracked objects and return to `Idle`.

use tracing::info;

use super::orchestrator::Workflow;
use super::tracker::ReleaseReport;
use crate::error::WorkflowError;

impl Workflow {
    /// Delete every tracked object, then clear messages, agent and tracked
    /// names and move to `Idle`.
    ///
    /// Deletions are best-effort: failures are returned in the report and do
    /// not stop the reset. With nothing tracked no call is made. Rejected with
    /// `Busy` while a run is in flight.
    pub async fn teardown(&self) -> Result<ReleaseReport, WorkflowError> {
        let Ok(_lifecycle) = self.lifecycle.try_lock() else {
            return Err(WorkflowError::Busy);
        };

        let report = self.release_tracked().await;

        self.write().reset("teardown")?;
        info!(
            released = report.released.len(),
            failed = report.failures.len(),
            "Session torn down"
        );
        Ok(report)
    }

    /// Delete every tracked object, dropping each name from the session as
    /// soon as its deletion call returns. If the future is dropped midway,
    /// the names not yet attempted remain tracked.
    pub(crate) async fn release_tracked(&self) -> ReleaseReport {
        let tracked = self.read().tracker.clone();
        tracked
            .release_all(&self.gateway, |name| {
                self.write().tracker.forget(name);
            })
            .await
    }
}
