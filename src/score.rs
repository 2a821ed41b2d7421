//! Results of a finished session.

use crate::generator::PIECE_LENGTH;
use crate::matcher::Matcher;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub correct_presses: u32,
    pub total_presses: u32,
    /// Fraction of presses that were correct, `0.0..=1.0`.
    pub accuracy: f64,
    pub elapsed_ms: f64,
    /// Seconds per beat, truncated to whole milliseconds.
    pub average_beat_time: f64,
    /// `None` when the passage was played in under a millisecond per beat.
    pub score: Option<u64>,
}

impl Summary {
    /// Summarize a finished matcher. Returns `None` while the passage is still in progress.
    pub fn from_matcher(matcher: &Matcher) -> Option<Self> {
        let finished_at = matcher.finished_at()?;
        Some(Self::new(
            matcher.correct_presses(),
            matcher.total_presses(),
            finished_at - matcher.started_at(),
        ))
    }

    /// # Example
    /// ```
    /// use notesy::Summary;
    ///
    /// // 32 beats in 16 seconds, half the presses correct
    /// let summary = Summary::new(20, 40, 16_000.0);
    /// assert_eq!(summary.average_beat_time, 0.5);
    /// assert_eq!(summary.score, Some(333));
    /// ```
    pub fn new(correct_presses: u32, total_presses: u32, elapsed_ms: f64) -> Self {
        let accuracy = if total_presses == 0 {
            0.0
        } else {
            correct_presses as f64 / total_presses as f64
        };
        let average_beat_time = (elapsed_ms / PIECE_LENGTH).floor() / 1000.0;
        let score = if average_beat_time > 0.0 {
            Some(((1.0 / (1.1 - accuracy)) * (1.0 / average_beat_time) * 100.0).floor() as u64)
        } else {
            None
        };

        Self {
            correct_presses,
            total_presses,
            accuracy,
            elapsed_ms,
            average_beat_time,
            score,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Correct presses: {}/{} ({}% accuracy)",
            self.correct_presses,
            self.total_presses,
            (self.accuracy * 100.0).floor()
        )?;
        writeln!(
            f,
            "Time elapsed: {} seconds ({} seconds per beat)",
            (self.elapsed_ms / 1000.0).floor(),
            self.average_beat_time
        )?;
        match self.score {
            Some(score) => write!(f, "Score: {}", score),
            None => write!(f, "Score: -"),
        }
    }
}
