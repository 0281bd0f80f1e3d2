//! Per-sample health evaluation.

use serde::Serialize;

use crate::error::CheckError;
use crate::target::Target;

/// One probe's observed status and extracted content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub status: u16,
    pub content: String,
}

impl Sample {
    pub fn new(status: u16, content: impl Into<String>) -> Self {
        Self { status, content: content.into() }
    }
}

/// Health of a single sample with every reason it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub healthy: bool,
    pub reasons: Vec<CheckError>,
}

impl Verdict {
    pub fn healthy() -> Self {
        Self { healthy: true, reasons: Vec::new() }
    }

    pub fn unhealthy(reason: CheckError) -> Self {
        Self { healthy: false, reasons: vec![reason] }
    }
}

/// Judge a sample against the target's health policy.
///
/// Both the status and the content rule are always checked, so a sample
/// failing both carries both reasons, status first.
pub fn evaluate(target: &Target, sample: &Sample) -> Verdict {
    let mut reasons = Vec::new();

    let range = target.healthy_status;
    if !range.contains(sample.status) {
        reasons.push(CheckError::StatusMismatch {
            status: sample.status,
            min: range.min,
            max: range.max,
        });
    }

    if let Some(expected) = target.content_rule() {
        if !sample.content.contains(expected) {
            reasons.push(CheckError::ContentMismatch { expected: expected.to_string() });
        }
    }

    Verdict { healthy: reasons.is_empty(), reasons }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> Target {
        Target::new("https://example.com").with_status_range(200, 299).with_content("ok")
    }

    #[test]
    fn test_healthy_sample() {
        let verdict = evaluate(&target(), &Sample::new(200, "status=\"ok\"\n"));
        assert_eq!(verdict, Verdict::healthy());
    }

    #[test]
    fn test_status_mismatch() {
        let verdict = evaluate(&target(), &Sample::new(503, "status=\"ok\"\n"));

        assert!(!verdict.healthy);
        assert_eq!(
            verdict.reasons,
            vec![CheckError::StatusMismatch { status: 503, min: 200, max: 299 }]
        );
    }

    #[test]
    fn test_content_mismatch() {
        let verdict = evaluate(&target(), &Sample::new(200, "status=\"degraded\"\n"));

        assert!(!verdict.healthy);
        assert_eq!(verdict.reasons, vec![CheckError::ContentMismatch { expected: "ok".into() }]);
    }

    #[test]
    fn test_both_failures_are_reported() {
        let verdict = evaluate(&target(), &Sample::new(500, ""));

        assert!(!verdict.healthy);
        assert_eq!(verdict.reasons.len(), 2);
        assert!(matches!(verdict.reasons[0], CheckError::StatusMismatch { status: 500, .. }));
        assert!(matches!(verdict.reasons[1], CheckError::ContentMismatch { .. }));
    }

    #[test]
    fn test_no_content_rule_ignores_body() {
        let target = Target::new("https://example.com");
        assert!(evaluate(&target, &Sample::new(204, "")).healthy);

        let target = target.with_content("");
        assert!(evaluate(&target, &Sample::new(204, "")).healthy);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let target = Target::new("https://example.com").with_status_range(200, 201);
        assert!(evaluate(&target, &Sample::new(200, "")).healthy);
        assert!(evaluate(&target, &Sample::new(201, "")).healthy);
        assert!(!evaluate(&target, &Sample::new(202, "")).healthy);
    }
}
