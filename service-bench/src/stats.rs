use crate::types::{EndpointStats, OperationTiming};

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate a latency series into the per-operation summary. Failed requests
/// are expected to already be present in `latencies_ms` as the fixed penalty
/// value, so the series length always equals `successes + failures`.
pub fn summarize(latencies_ms: &[f64], successes: u32, failures: u32) -> EndpointStats {
    let total = successes + failures;

    if latencies_ms.is_empty() {
        return EndpointStats {
            avg_response_time_ms: 0.0,
            min_response_time_ms: 0.0,
            max_response_time_ms: 0.0,
            median_response_time_ms: 0.0,
            success_rate: 0.0,
            total_requests: total,
            successful_requests: successes,
            failed_requests: failures,
        };
    }

    let sum: f64 = latencies_ms.iter().sum();
    let min = latencies_ms.iter().copied().fold(f64::INFINITY, f64::min);
    let max = latencies_ms.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let success_rate = if total > 0 {
        (successes as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    EndpointStats {
        avg_response_time_ms: round2(sum / latencies_ms.len() as f64),
        min_response_time_ms: round2(min),
        max_response_time_ms: round2(max),
        median_response_time_ms: round2(median(latencies_ms)),
        success_rate,
        total_requests: total,
        successful_requests: successes,
        failed_requests: failures,
    }
}

/// Median with even-length interpolation (mean of the two middle values).
fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Aggregate a timing series for a simulated contract operation.
pub fn operation_timing(samples_ms: &[f64]) -> OperationTiming {
    if samples_ms.is_empty() {
        return OperationTiming {
            avg_time_ms: 0.0,
            min_time_ms: 0.0,
            max_time_ms: 0.0,
        };
    }

    let sum: f64 = samples_ms.iter().sum();
    let min = samples_ms.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples_ms.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    OperationTiming {
        avg_time_ms: round2(sum / samples_ms.len() as f64),
        min_time_ms: round2(min),
        max_time_ms: round2(max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_successful_series() {
        let stats = summarize(&[10.0, 20.0, 30.0, 40.0], 4, 0);

        assert_eq!(stats.avg_response_time_ms, 25.0);
        assert_eq!(stats.median_response_time_ms, 25.0);
        assert_eq!(stats.min_response_time_ms, 10.0);
        assert_eq!(stats.max_response_time_ms, 40.0);
        assert_eq!(stats.success_rate, 100.0);
        assert_eq!(stats.total_requests, 4);
    }

    #[test]
    fn test_failures_carry_penalty_latency() {
        // 5 requests, 2 connection errors recorded at the 10s penalty.
        let latencies = [12.0, 15.0, 10_000.0, 18.0, 10_000.0];
        let stats = summarize(&latencies, 3, 2);

        assert_eq!(stats.success_rate, 60.0);
        assert_eq!(stats.failed_requests, 2);
        assert_eq!(stats.max_response_time_ms, 10_000.0);
        assert_eq!(
            stats.total_requests as usize,
            latencies.len(),
            "every failed request must still contribute one latency entry"
        );
    }

    #[test]
    fn test_odd_length_median() {
        let stats = summarize(&[5.0, 1.0, 9.0], 3, 0);
        assert_eq!(stats.median_response_time_ms, 5.0);
    }

    #[test]
    fn test_even_length_median_interpolates() {
        let stats = summarize(&[1.0, 2.0, 100.0, 101.0], 4, 0);
        assert_eq!(stats.median_response_time_ms, 51.0);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        let stats = summarize(&[1.0, 2.0, 2.0], 3, 0);
        assert_eq!(stats.avg_response_time_ms, 1.67);
    }

    #[test]
    fn test_empty_series() {
        let stats = summarize(&[], 0, 0);
        assert_eq!(stats.avg_response_time_ms, 0.0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.total_requests, 0);
    }

    #[test]
    fn test_operation_timing() {
        let timing = operation_timing(&[200.0, 210.0, 220.0]);
        assert_eq!(timing.avg_time_ms, 210.0);
        assert_eq!(timing.min_time_ms, 200.0);
        assert_eq!(timing.max_time_ms, 220.0);
    }
}
