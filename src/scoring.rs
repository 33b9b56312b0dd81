//! Time-decayed scoring for correct answers
//!
//! A correct answer earns a bonus proportional to the time left on the clock:
//! answering instantly yields the full bonus, answering at the deadline yields 0.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRules {
    /// Time allotted per question
    pub total_time: Duration,
    /// Award for a correct answer at t=0
    pub bonus_points: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            total_time: Duration::from_secs(30),
            bonus_points: 50,
        }
    }
}

impl ScoringRules {
    /// Points awarded for an answer given `time_answered` seconds into the question.
    ///
    /// Elapsed time is client-reported, so it is clamped to `[0, total_time]`
    /// and the award always lies in `[0, bonus_points]`.
    pub fn score(&self, time_answered: f64, is_correct: bool) -> i64 {
        if !is_correct {
            return 0;
        }

        let total = self.total_time.as_secs_f64();
        if total <= 0.0 {
            return 0;
        }

        // NaN/inf count as an overrun
        let elapsed = if time_answered.is_finite() {
            time_answered.clamp(0.0, total)
        } else {
            total
        };

        let fraction = (total - elapsed) / total;
        (self.bonus_points as f64 * fraction).round() as i64
    }
}
