//! Step delay policy
//!
//! A pure function of the scheduling inputs, shared by every backend so
//! that local development and the distributed broker pace operations the
//! same way.

use std::time::Duration;

use crate::message::Priority;

/// Base delay per priority tier, in milliseconds.
const BASE_HIGH_MS: u64 = 50;
const BASE_NORMAL_MS: u64 = 100;
const BASE_LOW_MS: u64 = 250;

/// Extra delay when the previous step produced tool calls.
const TOOL_PENALTY_MS: u64 = 50;

/// Error backoff parameters: 50ms doubling per step, capped at 1s.
const BACKOFF_BASE_MS: u64 = 50;
const BACKOFF_CAP_MS: u64 = 1000;

/// Compute the delay before the next step of an operation runs.
///
/// Deterministic: the same inputs always produce the same delay. The error
/// backoff grows exponentially with the step index and is capped, so a
/// persistently failing operation settles at a fixed pace instead of
/// starving the queue or spinning hot.
pub fn calculate_delay(
    priority: Priority,
    step_index: u64,
    has_tool_calls: bool,
    has_errors: bool,
) -> Duration {
    let base = match priority {
        Priority::High => BASE_HIGH_MS,
        Priority::Normal => BASE_NORMAL_MS,
        Priority::Low => BASE_LOW_MS,
    };

    let tool_penalty = if has_tool_calls { TOOL_PENALTY_MS } else { 0 };

    let backoff = if has_errors {
        // Clamp the exponent so the shift cannot overflow; the cap makes
        // anything past 2^5 equivalent anyway.
        let factor = 1u64 << step_index.min(16);
        BACKOFF_BASE_MS.saturating_mul(factor).min(BACKOFF_CAP_MS)
    } else {
        0
    };

    Duration::from_millis(base + tool_penalty + backoff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_delay_per_priority() {
        assert_eq!(
            calculate_delay(Priority::High, 0, false, false),
            Duration::from_millis(50)
        );
        assert_eq!(
            calculate_delay(Priority::Normal, 0, false, false),
            Duration::from_millis(100)
        );
        assert_eq!(
            calculate_delay(Priority::Low, 0, false, false),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_tool_calls_add_penalty() {
        assert_eq!(
            calculate_delay(Priority::Normal, 0, true, false),
            Duration::from_millis(150)
        );
    }

    #[test]
    fn test_error_backoff_doubles_and_caps() {
        let expected = [50u64, 100, 200, 400, 800, 1000, 1000];
        for (step_index, backoff) in expected.iter().enumerate() {
            let delay = calculate_delay(Priority::High, step_index as u64, false, true);
            assert_eq!(
                delay,
                Duration::from_millis(50 + backoff),
                "step {step_index}"
            );
        }
    }

    #[test]
    fn test_error_backoff_never_decreases() {
        let mut previous = Duration::ZERO;
        for step_index in 0..20 {
            let delay = calculate_delay(Priority::Normal, step_index, false, true);
            assert!(delay >= previous, "step {step_index}");
            previous = delay;
        }
    }

    #[test]
    fn test_huge_step_index_does_not_overflow() {
        let delay = calculate_delay(Priority::Low, u64::MAX, true, true);
        assert_eq!(delay, Duration::from_millis(250 + 50 + 1000));
    }

    #[test]
    fn test_penalties_compose() {
        assert_eq!(
            calculate_delay(Priority::Normal, 1, true, true),
            Duration::from_millis(100 + 50 + 100)
        );
    }
}
