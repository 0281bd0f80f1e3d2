//! Target health resolution.
//!
//! A target is sampled up to [`SAMPLE_WINDOW`] times, one probe after the
//! other. Slot 0 is the deciding sample: when it is unhealthy the target is
//! down and the remaining slots are never probed. Otherwise the target is up
//! when at least [`QUORUM`] of the window is healthy. The window is fixed, so a
//! probe that produced no sample counts against the quorum.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CheckError;
use crate::evaluate::{Sample, Verdict, evaluate};
use crate::extract::extract_content;
use crate::probe::Prober;
use crate::target::Target;

/// Number of slots sampled per target
pub const SAMPLE_WINDOW: usize = 3;

/// Healthy slots required, the latest included
pub const QUORUM: usize = 2;

const LATEST: usize = 0;

/// Resolver tuning
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Pause between consecutive probes of the same target
    pub probe_spacing: Duration,
}

/// What happened in one slot of the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotOutcome {
    pub index: usize,

    /// Observed status, `None` when no sample was obtained
    pub status: Option<u16>,

    pub verdict: Verdict,
}

/// Aggregate verdict for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub name: String,
    pub url: String,
    pub healthy: bool,
    pub healthy_count: usize,

    /// Size of the window, always [`SAMPLE_WINDOW`]
    pub total: usize,

    /// Slots actually probed and evaluated
    pub evaluated: usize,

    pub slots: Vec<SlotOutcome>,
}

impl TargetReport {
    pub fn unhealthy_count(&self) -> usize {
        self.total - self.healthy_count
    }

    /// Every diagnostic reason, in slot order
    pub fn reasons(&self) -> impl Iterator<Item = &CheckError> {
        self.slots.iter().flat_map(|slot| slot.verdict.reasons.iter())
    }
}

/// Probes a target and applies the quorum rule
pub struct Resolver {
    prober: Arc<dyn Prober>,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self::with_config(prober, ResolverConfig::default())
    }

    pub fn with_config(prober: Arc<dyn Prober>, config: ResolverConfig) -> Self {
        Self { prober, config }
    }

    /// Sample the target and derive its health
    pub async fn resolve(&self, target: &Target) -> TargetReport {
        let mut slots = Vec::with_capacity(SAMPLE_WINDOW);
        let mut healthy_count = 0;

        for index in 0..SAMPLE_WINDOW {
            if index > 0 && !self.config.probe_spacing.is_zero() {
                tokio::time::sleep(self.config.probe_spacing).await;
            }

            let slot = self.sample(target, index).await;

            if slot.verdict.healthy {
                healthy_count += 1;
            } else {
                for reason in &slot.verdict.reasons {
                    warn!(url = %target.url, slot = index, "{}", reason);
                }
            }

            let gate_failed = index == LATEST && !slot.verdict.healthy;
            slots.push(slot);

            if gate_failed {
                debug!(url = %target.url, "Latest sample is unhealthy, skipping remaining probes");
                break;
            }
        }

        let latest_healthy = slots.first().is_some_and(|slot| slot.verdict.healthy);
        let healthy = latest_healthy && healthy_count >= QUORUM;

        info!(
            url = %target.url,
            healthy,
            total = SAMPLE_WINDOW,
            healthy_count,
            unhealthy_count = SAMPLE_WINDOW - healthy_count,
            "Finished checking {}",
            target.name
        );

        TargetReport {
            name: target.name.clone(),
            url: target.url.clone(),
            healthy,
            healthy_count,
            total: SAMPLE_WINDOW,
            evaluated: slots.len(),
            slots,
        }
    }

    async fn sample(&self, target: &Target, index: usize) -> SlotOutcome {
        match self.prober.probe(target).await {
            Ok(response) => {
                debug!(url = %target.url, slot = index, status = response.status, "Probe completed");

                let sample = Sample::new(response.status, extract_content(&response.body));
                let verdict = evaluate(target, &sample);

                SlotOutcome { index, status: Some(sample.status), verdict }
            }
            Err(e) => SlotOutcome { index, status: None, verdict: Verdict::unhealthy(e) },
        }
    }
}
