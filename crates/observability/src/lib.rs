use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct SkillMetrics {
    requests_total: AtomicU64,
    launches_total: AtomicU64,
    status_lookups_total: AtomicU64,
    unrecognized_slots_total: AtomicU64,
    fetch_failures_total: AtomicU64,
    deadline_exceeded_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub launches_total: u64,
    pub status_lookups_total: u64,
    pub unrecognized_slots_total: u64,
    pub fetch_failures_total: u64,
    pub deadline_exceeded_total: u64,
    pub avg_latency_millis: f64,
}

impl SkillMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_launch(&self) {
        self.launches_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_status_lookup(&self) {
        self.status_lookups_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_unrecognized_slot(&self) {
        self.unrecognized_slots_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetch_failure(&self) {
        self.fetch_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_deadline_exceeded(&self) {
        self.deadline_exceeded_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            launches_total: self.launches_total.load(Ordering::Relaxed),
            status_lookups_total: self.status_lookups_total.load(Ordering::Relaxed),
            unrecognized_slots_total: self.unrecognized_slots_total.load(Ordering::Relaxed),
            fetch_failures_total: self.fetch_failures_total.load(Ordering::Relaxed),
            deadline_exceeded_total: self.deadline_exceeded_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,subway_skill=info,subway_status=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
