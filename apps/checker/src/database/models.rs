use std::collections::BTreeMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uptime::{StatusRange, Target};
use uuid::Uuid;

/// Stored target definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub id: Option<i64>,
    pub uuid: Uuid,
    pub name: String,
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub healthy_min_status: u16,
    pub healthy_max_status: u16,
    /// Empty when content is not checked
    pub healthy_content: String,
    /// Zero means "use the configured default"
    pub timeout_ms: u64,
    pub enabled: bool,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl TargetRecord {
    /// Create a new enabled GET target with the default health policy
    pub fn new(url: String) -> Self {
        let now = SystemTime::now();
        let range = StatusRange::default();
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: url.clone(),
            url,
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            healthy_min_status: range.min,
            healthy_max_status: range.max,
            healthy_content: String::new(),
            timeout_ms: 0,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the core target, filling in the default timeout
    pub fn to_target(&self, default_timeout: Duration) -> Target {
        let timeout = if self.timeout_ms == 0 {
            default_timeout
        } else {
            Duration::from_millis(self.timeout_ms)
        };

        Target {
            name: self.name.clone(),
            url: self.url.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            healthy_status: StatusRange::new(self.healthy_min_status, self.healthy_max_status),
            healthy_content: Some(self.healthy_content.clone()).filter(|c| !c.is_empty()),
            timeout,
        }
    }

    pub fn headers_json(&self) -> String {
        serde_json::to_string(&self.headers).unwrap_or_else(|_| "{}".to_string())
    }

    /// Stored headers that fail to parse are dropped, not fatal
    pub fn parse_headers(uuid: Uuid, raw: &str) -> BTreeMap<String, String> {
        if raw.trim().is_empty() {
            return BTreeMap::new();
        }

        serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!(%uuid, "Ignoring unparseable headers for target: {}", e);
            BTreeMap::new()
        })
    }

    /// Convert SystemTime to Unix timestamp
    pub fn timestamp_to_i64(time: SystemTime) -> i64 {
        time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
    }

    /// Convert Unix timestamp to SystemTime
    pub fn i64_to_timestamp(timestamp: i64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(timestamp.max(0) as u64)
    }
}
