use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing (in microseconds)
    total_extract_time_us: AtomicU64,
    total_store_time_us: AtomicU64,
    total_chat_time_us: AtomicU64,

    // Counts
    uploads: AtomicUsize,
    extractions: AtomicUsize,
    approvals: AtomicUsize,
    chats: AtomicUsize,
    total_triples_extracted: AtomicUsize,
    total_statements_stored: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            total_extract_time_us: AtomicU64::new(0),
            total_store_time_us: AtomicU64::new(0),
            total_chat_time_us: AtomicU64::new(0),
            uploads: AtomicUsize::new(0),
            extractions: AtomicUsize::new(0),
            approvals: AtomicUsize::new(0),
            chats: AtomicUsize::new(0),
            total_triples_extracted: AtomicUsize::new(0),
            total_statements_stored: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_upload(&self) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extract(&self, duration: Duration, triples: usize) {
        self.total_extract_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.extractions.fetch_add(1, Ordering::Relaxed);
        self.total_triples_extracted.fetch_add(triples, Ordering::Relaxed);
    }

    pub fn record_store(&self, duration: Duration, statements: usize) {
        self.total_store_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.approvals.fetch_add(1, Ordering::Relaxed);
        self.total_statements_stored.fetch_add(statements, Ordering::Relaxed);
    }

    pub fn record_chat(&self, duration: Duration) {
        self.total_chat_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.chats.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            uploads: self.uploads.load(Ordering::Relaxed),
            extractions: self.extractions.load(Ordering::Relaxed),
            approvals: self.approvals.load(Ordering::Relaxed),
            chats: self.chats.load(Ordering::Relaxed),
            avg_extract_time_ms: avg_time_ms(&self.total_extract_time_us, &self.extractions),
            avg_store_time_ms: avg_time_ms(&self.total_store_time_us, &self.approvals),
            avg_chat_time_ms: avg_time_ms(&self.total_chat_time_us, &self.chats),
            total_triples_extracted: self.total_triples_extracted.load(Ordering::Relaxed),
            total_statements_stored: self.total_statements_stored.load(Ordering::Relaxed),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    let cnt = count.load(Ordering::Relaxed) as f64;
    if cnt > 0.0 {
        total / cnt / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub uploads: usize,
    pub extractions: usize,
    pub approvals: usize,
    pub chats: usize,
    pub avg_extract_time_ms: f64,
    pub avg_store_time_ms: f64,
    pub avg_chat_time_ms: f64,
    pub total_triples_extracted: usize,
    pub total_statements_stored: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
