//! Uptime - quorum-based HTTP health checks for Uppe
//!
//! Every target is probed up to three times, one request after the other.
//! The first sample decides: if it is unhealthy the target is down and no
//! further probes are sent. Otherwise at least two of the three samples must
//! be healthy.
//!
//! # Data Flow
//! ```text
//! Coordinator (one task per target)
//!     → Resolver (slot 0, then slots 1-2)
//!     → Prober (one HTTP request)
//!     → extract_content (JSON body → key="value" lines)
//!     → evaluate (status range + content substring)
//! ```

pub mod coordinator;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod probe;
pub mod resolver;
pub mod target;

// Re-export main types
pub use coordinator::{Coordinator, RunSummary, TargetOutcome};
pub use error::CheckError;
pub use evaluate::{Sample, Verdict, evaluate};
pub use extract::extract_content;
pub use probe::{HttpProber, ProbeResponse, Prober};
pub use resolver::{QUORUM, Resolver, ResolverConfig, SAMPLE_WINDOW, SlotOutcome, TargetReport};
pub use target::{StatusRange, Target};
