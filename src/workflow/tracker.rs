//! Resource tracker: names of server-side objects awaiting release.

use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::gateway::GatewayClient;

/// Ordered set of remote object names created during ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTracker {
    names: Vec<String>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a freshly created object.
    pub fn track(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.names.contains(&name) {
            warn!(object = %name, "Object tracked twice");
        }
        debug!(object = %name, "Tracking remote object");
        self.names.push(name);
    }

    /// Tracked names in creation order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Stop tracking the first object called `name`.
    pub fn forget(&mut self, name: &str) -> bool {
        match self.names.iter().position(|n| n == name) {
            Some(index) => {
                self.names.remove(index);
                true
            }
            None => false,
        }
    }

    /// Forget every name without contacting the service.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Delete every tracked object, in creation order.
    ///
    /// A failed deletion is logged and collected; the remaining deletions
    /// still run. Nothing is retried. `settled` is called with each name once
    /// its deletion call has returned, whatever the outcome, so an owner can
    /// stop tracking it; names whose call never returned stay tracked.
    pub async fn release_all(
        &self,
        gateway: &GatewayClient,
        mut settled: impl FnMut(&str),
    ) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        for name in &self.names {
            let result = gateway.delete_object(name).await;
            settled(name);
            match result {
                Ok(()) => {
                    debug!(object = %name, "Released remote object");
                    report.released.push(name.clone());
                }
                Err(error) => {
                    warn!(object = %name, error = %error, "Failed to release remote object");
                    report.failures.push(ReleaseFailure {
                        name: name.clone(),
                        error,
                    });
                }
            }
        }

        if !self.names.is_empty() {
            info!(
                released = report.released.len(),
                failed = report.failures.len(),
                "Release pass complete"
            );
        }
        report
    }
}

/// A deletion that did not go through.
#[derive(Debug)]
pub struct ReleaseFailure {
    pub name: String,
    pub error: GatewayError,
}

/// Outcome of a release pass.
#[derive(Debug, Default)]
pub struct ReleaseReport {
    pub released: Vec<String>,
    pub failures: Vec<ReleaseFailure>,
}

impl ReleaseReport {
    /// True when every deletion succeeded (or there was nothing to delete).
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.released.len() + self.failures.len()
    }
}
