//! Process-wide atomic counters and the JSON report shape written on exit.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct Metrics {
    pub requests_sent: AtomicU64,
    pub approvals_sent: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }

    pub fn approvals(&self) -> u64 {
        self.approvals_sent.load(Ordering::Relaxed)
    }

    /// Renders the counters plus run metadata into the serializable report shape.
    pub fn snapshot(
        &self,
        algorithm: &str,
        accounts: usize,
        transactions: usize,
        duration_ms: u64,
    ) -> MetricsReport {
        let requests = self.requests();
        let approvals = self.approvals();
        MetricsReport {
            algorithm: algorithm.to_string(),
            accounts,
            transactions,
            requests,
            approvals,
            total_messages: requests + approvals,
            duration_ms,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MetricsReport {
    pub algorithm: String,
    pub accounts: usize,
    pub transactions: usize,
    pub requests: u64,
    pub approvals: u64,
    #[serde(rename = "totalMessages")]
    pub total_messages: u64,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}
