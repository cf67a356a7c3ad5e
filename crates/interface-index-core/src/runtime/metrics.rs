// crates/interface-index-core/src/runtime/metrics.rs
// ============================================================================
// Module: Metrics Recorders
// Description: No-op and gateway-backed metrics recorders.
// Purpose: Record document usage without blocking or failing requests.
// Dependencies: crate::interfaces, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`GatewayMetricsRecorder`] appends each event to the `metrics` collection
//! on a spawned task. Errors are dropped, and events recorded outside a tokio
//! runtime are discarded. Event ids combine the recorder's start time with a
//! sequence number, so one recorder should be shared by every repository
//! writing to the same gateway.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde_json::Value;

use crate::core::record::PRIMARY_KEY_FIELD;
use crate::core::time::Timestamp;
use crate::interfaces::DocumentGateway;
use crate::interfaces::MetricEvent;
use crate::interfaces::MetricsRecorder;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Collection receiving metric events.
pub const METRICS_COLLECTION: &str = "metrics";

// ============================================================================
// SECTION: Recorders
// ============================================================================

/// Metrics recorder that discards events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn record(&self, _event: MetricEvent) {}
}

/// Metrics recorder that appends events to the metrics collection.
///
/// # Invariants
/// - Event ids are `{started_ms}-{sequence}` and never repeat within one
///   recorder. Recorders started in different milliseconds never collide.
pub struct GatewayMetricsRecorder {
    /// Gateway receiving metric records.
    gateway: Arc<dyn DocumentGateway>,
    /// Recorder start time in unix milliseconds.
    started_ms: u64,
    /// Sequence used to build unique event ids.
    sequence: AtomicU64,
}

impl GatewayMetricsRecorder {
    /// Builds a recorder writing through `gateway`.
    #[must_use]
    pub fn new(gateway: Arc<dyn DocumentGateway>) -> Self {
        Self {
            gateway,
            started_ms: Timestamp::now().unix_millis(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Returns the id assigned to the next recorded event.
    fn next_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}", self.started_ms)
    }
}

impl MetricsRecorder for GatewayMetricsRecorder {
    fn record(&self, event: MetricEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let Ok(Value::Object(mut record)) = serde_json::to_value(&event) else {
            return;
        };
        record.insert(PRIMARY_KEY_FIELD.to_string(), Value::String(self.next_id()));
        let gateway = Arc::clone(&self.gateway);
        handle.spawn(async move {
            let _ = gateway.insert(METRICS_COLLECTION, &record).await;
        });
    }
}
