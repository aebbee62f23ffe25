use crate::consts::RECENT_CALLS;
use crate::types::CallAnalytics;

use serde_json::Value;

/// Summarize fetched call documents.  Documents without a numeric `duration` count as zero
/// seconds; `calls` keeps the tail of the fetched order.
pub fn summarize(calls: Vec<Value>) -> CallAnalytics {
    let total_calls = calls.len();
    let total_duration: f64 = calls
        .iter()
        .map(|c| c.get("duration").and_then(Value::as_f64).unwrap_or(0.0))
        .sum();
    let average_duration = if total_calls == 0 {
        0.0
    } else {
        total_duration / total_calls as f64
    };
    let recent = calls
        .into_iter()
        .skip(total_calls.saturating_sub(RECENT_CALLS))
        .collect();

    CallAnalytics {
        total_calls,
        total_duration_minutes: total_duration / 60.0,
        average_duration,
        calls: recent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_history_has_zero_average() {
        let summary = summarize(vec![]);
        assert_eq!(summary.total_calls, 0);
        assert_eq!(summary.total_duration_minutes, 0.0);
        assert_eq!(summary.average_duration, 0.0);
        assert!(summary.calls.is_empty());
    }

    #[test]
    fn sums_and_averages_durations() {
        let calls = vec![
            json!({"duration": 60}),
            json!({"duration": 120.0}),
            json!({"event": "call-started"}),
        ];
        let summary = summarize(calls);
        assert_eq!(summary.total_calls, 3);
        assert_eq!(summary.total_duration_minutes, 3.0);
        assert_eq!(summary.average_duration, 60.0);
        assert_eq!(summary.calls.len(), 3);
    }

    #[test]
    fn keeps_only_the_last_ten_calls() {
        let calls: Vec<Value> = (0..25).map(|i| json!({"n": i, "duration": 6})).collect();
        let summary = summarize(calls);
        assert_eq!(summary.total_calls, 25);
        assert_eq!(summary.total_duration_minutes, 2.5);
        assert_eq!(summary.average_duration, 6.0);
        let kept: Vec<i64> = summary.calls.iter().map(|c| c["n"].as_i64().unwrap()).collect();
        assert_eq!(kept, (15..25).collect::<Vec<i64>>());
    }
}
