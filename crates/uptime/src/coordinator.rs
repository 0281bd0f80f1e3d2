//! Fan-out over all targets of a run.
//!
//! Each target is resolved on its own tokio task. A panic while resolving one
//! target is caught inside that task and reported as
//! [`TargetOutcome::Faulted`], so siblings always finish and get reported.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::{Id, JoinSet};
use tracing::{debug, error, info};

use crate::resolver::{Resolver, TargetReport};
use crate::target::Target;

/// Result of one target's resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TargetOutcome {
    Resolved(TargetReport),
    Faulted { name: String, url: String, message: String },
}

impl TargetOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Resolved(report) => &report.url,
            Self::Faulted { url, .. } => url,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Resolved(report) if report.healthy)
    }

    pub fn report(&self) -> Option<&TargetReport> {
        match self {
            Self::Resolved(report) => Some(report),
            Self::Faulted { .. } => None,
        }
    }
}

/// Outcomes of a full run, in the order the targets were given
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<TargetOutcome>,
}

impl RunSummary {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn healthy(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_healthy()).count()
    }

    pub fn unhealthy(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, TargetOutcome::Resolved(report) if !report.healthy))
            .count()
    }

    pub fn faulted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, TargetOutcome::Faulted { .. }))
            .count()
    }
}

/// Runs the resolver once per target, concurrently
#[derive(Clone)]
pub struct Coordinator {
    resolver: Arc<Resolver>,
}

impl Coordinator {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver: Arc::new(resolver) }
    }

    /// Resolve every target and wait for all of them
    pub async fn run_all(&self, targets: Vec<Target>) -> RunSummary {
        let total = targets.len();
        info!("Running {} checks", total);

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(total);
        for (index, target) in targets.into_iter().enumerate() {
            let resolver = self.resolver.clone();
            let task = PendingTask { index, name: target.name.clone(), url: target.url.clone() };
            let handle = tasks.spawn(resolve_isolated(resolver, target));
            pending.insert(handle.id(), task);
        }

        let summary = RunSummary { outcomes: join_in_order(tasks, pending, total).await };
        info!(
            healthy = summary.healthy(),
            unhealthy = summary.unhealthy(),
            faulted = summary.faulted(),
            "Finished running {} checks",
            total
        );
        summary
    }

    /// Resolve every target, delivering outcomes as they complete.
    ///
    /// The channel closes once the last target has been reported.
    pub fn stream_all(&self, targets: Vec<Target>) -> mpsc::Receiver<TargetOutcome> {
        let (tx, rx) = mpsc::channel(targets.len().max(1));
        info!("Streaming {} checks", targets.len());

        for target in targets {
            let resolver = self.resolver.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = resolve_isolated(resolver, target).await;
                if tx.send(outcome).await.is_err() {
                    debug!("Outcome receiver dropped");
                }
            });
        }

        rx
    }
}

/// Where a spawned check's outcome belongs, and what to report if the task dies
struct PendingTask {
    index: usize,
    name: String,
    url: String,
}

/// Collect every task's outcome into its input slot. A task that fails to join
/// (cancelled, or a panic outside the resolver) is reported as faulted.
async fn join_in_order(
    mut tasks: JoinSet<TargetOutcome>,
    mut pending: HashMap<Id, PendingTask>,
    total: usize,
) -> Vec<TargetOutcome> {
    let mut slots: Vec<Option<TargetOutcome>> = (0..total).map(|_| None).collect();

    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((id, outcome)) => {
                if let Some(task) = pending.remove(&id) {
                    slots[task.index] = Some(outcome);
                }
            }
            Err(e) => {
                if let Some(task) = pending.remove(&e.id()) {
                    error!(url = %task.url, "Check task did not complete: {}", e);
                    slots[task.index] = Some(TargetOutcome::Faulted {
                        name: task.name,
                        url: task.url,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    slots.into_iter().flatten().collect()
}

async fn resolve_isolated(resolver: Arc<Resolver>, target: Target) -> TargetOutcome {
    debug!(url = %target.url, "Checking {}", target.name);

    match AssertUnwindSafe(resolver.resolve(&target)).catch_unwind().await {
        Ok(report) => TargetOutcome::Resolved(report),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(url = %target.url, "Check panicked: {}", message);
            TargetOutcome::Faulted { name: target.name, url: target.url, message }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn dies() -> TargetOutcome {
        panic!("task died")
    }

    #[tokio::test]
    async fn test_join_in_order_reports_failed_task() {
        let resolved = TargetOutcome::Faulted {
            name: "first".into(),
            url: "https://first".into(),
            message: "kept".into(),
        };

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();

        let outcome = resolved.clone();
        let handle = tasks.spawn(async move { outcome });
        pending.insert(
            handle.id(),
            PendingTask { index: 0, name: "first".into(), url: "https://first".into() },
        );

        let handle = tasks.spawn(dies());
        pending.insert(
            handle.id(),
            PendingTask { index: 1, name: "second".into(), url: "https://second".into() },
        );

        let outcomes = join_in_order(tasks, pending, 2).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], resolved);
        match &outcomes[1] {
            TargetOutcome::Faulted { name, url, message } => {
                assert_eq!(name, "second");
                assert_eq!(url, "https://second");
                assert!(message.contains("panic"));
            }
            other => panic!("expected a faulted outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("boom")), "boom");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }

    #[test]
    fn test_summary_counts() {
        let report = |healthy| TargetReport {
            name: "a".into(),
            url: "https://a".into(),
            healthy,
            healthy_count: if healthy { 3 } else { 0 },
            total: 3,
            evaluated: 3,
            slots: Vec::new(),
        };
        let summary = RunSummary {
            outcomes: vec![
                TargetOutcome::Resolved(report(true)),
                TargetOutcome::Resolved(report(false)),
                TargetOutcome::Faulted {
                    name: "b".into(),
                    url: "https://b".into(),
                    message: "boom".into(),
                },
            ],
        };

        assert_eq!(summary.len(), 3);
        assert_eq!(summary.healthy(), 1);
        assert_eq!(summary.unhealthy(), 1);
        assert_eq!(summary.faulted(), 1);
        assert_eq!(summary.outcomes[2].url(), "https://b");
        assert!(summary.outcomes[2].report().is_none());
    }
}
