use pipeline::{PipelineError, PipelineOutput};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

pub struct Metrics {
    // Counters
    total_runs: AtomicUsize,
    successful_runs: AtomicUsize,
    rejected_inputs: AtomicUsize,
    extraction_failures: AtomicUsize,

    // Timing (in microseconds)
    total_run_time_us: AtomicU64,
    total_extract_time_us: AtomicU64,
    total_build_time_us: AtomicU64,

    // Counts
    total_nodes_extracted: AtomicUsize,
    total_relationships_extracted: AtomicUsize,
    total_relationships_dropped: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_runs: AtomicUsize::new(0),
            successful_runs: AtomicUsize::new(0),
            rejected_inputs: AtomicUsize::new(0),
            extraction_failures: AtomicUsize::new(0),
            total_run_time_us: AtomicU64::new(0),
            total_extract_time_us: AtomicU64::new(0),
            total_build_time_us: AtomicU64::new(0),
            total_nodes_extracted: AtomicUsize::new(0),
            total_relationships_extracted: AtomicUsize::new(0),
            total_relationships_dropped: AtomicUsize::new(0),
        })
    }

    pub fn record_success(&self, output: &PipelineOutput, duration: std::time::Duration) {
        self.total_runs.fetch_add(1, Ordering::Relaxed);
        self.successful_runs.fetch_add(1, Ordering::Relaxed);
        self.total_run_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_extract_time_us
            .fetch_add(output.timings.extract.as_micros() as u64, Ordering::Relaxed);
        self.total_build_time_us.fetch_add(
            (output.timings.validate + output.timings.build).as_micros() as u64,
            Ordering::Relaxed,
        );
        self.total_nodes_extracted
            .fetch_add(output.extraction.nodes.len(), Ordering::Relaxed);
        self.total_relationships_extracted
            .fetch_add(output.extraction.relationships.len(), Ordering::Relaxed);
        self.total_relationships_dropped
            .fetch_add(output.dropped_relationships, Ordering::Relaxed);
    }

    pub fn record_failure(&self, error: &PipelineError) {
        self.total_runs.fetch_add(1, Ordering::Relaxed);
        match error {
            PipelineError::UnsupportedInput(_) => {
                self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
            }
            PipelineError::ExtractionFailure(_) => {
                self.extraction_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_runs: self.total_runs.load(Ordering::Relaxed),
            successful_runs: self.successful_runs.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            avg_run_time_ms: self.avg_time_ms(&self.total_run_time_us),
            avg_extract_time_ms: self.avg_time_ms(&self.total_extract_time_us),
            avg_build_time_ms: self.avg_time_ms(&self.total_build_time_us),
            total_nodes_extracted: self.total_nodes_extracted.load(Ordering::Relaxed),
            total_relationships_extracted: self
                .total_relationships_extracted
                .load(Ordering::Relaxed),
            total_relationships_dropped: self.total_relationships_dropped.load(Ordering::Relaxed),
        }
    }

    // Averaged over successful runs only
    fn avg_time_ms(&self, total_us: &AtomicU64) -> f64 {
        let total = total_us.load(Ordering::Relaxed) as f64;
        let cnt = self.successful_runs.load(Ordering::Relaxed) as f64;
        if cnt > 0.0 {
            total / cnt / 1000.0 // Convert to ms
        } else {
            0.0
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_runs: usize,
    pub successful_runs: usize,
    pub rejected_inputs: usize,
    pub extraction_failures: usize,
    pub avg_run_time_ms: f64,
    pub avg_extract_time_ms: f64,
    pub avg_build_time_ms: f64,
    pub total_nodes_extracted: usize,
    pub total_relationships_extracted: usize,
    pub total_relationships_dropped: usize,
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

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_by_kind() {
        let metrics = Metrics::new();
        metrics.record_failure(&PipelineError::UnsupportedInput("empty".to_string()));
        metrics.record_failure(&PipelineError::ExtractionFailure("down".to_string()));
        metrics.record_failure(&PipelineError::ExtractionFailure("down".to_string()));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_runs, 3);
        assert_eq!(snapshot.successful_runs, 0);
        assert_eq!(snapshot.rejected_inputs, 1);
        assert_eq!(snapshot.extraction_failures, 2);
        assert_eq!(snapshot.avg_run_time_ms, 0.0);
    }
}
