//! Backend call metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record one backend call by operation and outcome.
pub fn record_backend_call(operation: &str, outcome: &str) {
    counter!(
        "backend_calls_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a backend call duration.
pub fn record_backend_call_duration(operation: &str, duration_secs: f64) {
    histogram!(
        "backend_call_duration_seconds",
        "operation" => operation.to_string()
    )
    .record(duration_secs);
}

/// Times one backend call and records both metrics on completion.
pub struct CallTimer {
    operation: &'static str,
    start: Instant,
}

impl CallTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Record the call with the given outcome label.
    pub fn record(self, outcome: &str) {
        record_backend_call(self.operation, outcome);
        record_backend_call_duration(self.operation, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_timer_creation() {
        let timer = CallTimer::new("list_participants");
        assert_eq!(timer.operation, "list_participants");
    }

    #[test]
    fn test_call_timer_record_does_not_panic_without_recorder() {
        let timer = CallTimer::new("delete_participant");
        timer.record("success");
    }
}
