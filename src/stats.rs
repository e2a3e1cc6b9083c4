use std::time::SystemTime;

/// Final score terms. Every field is derived from the raw keystroke
/// counters, so recomputing from the same counters gives the same result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub combo_bonus: u32,
    pub speed_bonus: u32,
    pub accuracy_bonus: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.base + self.combo_bonus + self.speed_bonus + self.accuracy_bonus
    }
}

/// Keystroke bookkeeping for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingStats {
    pub total_keystrokes: u32,
    pub correct_keystrokes: u32,
    pub mistake_keystrokes: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub started_at: Option<SystemTime>,
    pub words_completed: u32,
    /// Percent, 0..=100. A session with no keystrokes counts as 100.
    pub accuracy: u32,
    pub chars_per_minute: u32,
    pub breakdown: ScoreBreakdown,
}

impl Default for TypingStats {
    fn default() -> Self {
        Self {
            total_keystrokes: 0,
            correct_keystrokes: 0,
            mistake_keystrokes: 0,
            combo: 0,
            max_combo: 0,
            started_at: None,
            words_completed: 0,
            accuracy: 100,
            chars_per_minute: 0,
            breakdown: ScoreBreakdown::default(),
        }
    }
}

impl TypingStats {
    pub fn start(now: SystemTime) -> Self {
        Self {
            started_at: Some(now),
            ..Self::default()
        }
    }

    pub fn record_correct(&mut self) {
        self.total_keystrokes += 1;
        self.correct_keystrokes += 1;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.recompute_accuracy();
    }

    /// A mistyped character or a word timeout; either way the combo dies.
    pub fn record_mistake(&mut self) {
        self.total_keystrokes += 1;
        self.mistake_keystrokes += 1;
        self.combo = 0;
        self.recompute_accuracy();
    }

    fn recompute_accuracy(&mut self) {
        self.accuracy = if self.total_keystrokes > 0 {
            ((self.correct_keystrokes as f64 / self.total_keystrokes as f64) * 100.0).round()
                as u32
        } else {
            100
        };
    }

    /// Wall time since the session started, in minutes, clamped away from
    /// zero so the rate math stays finite.
    pub fn elapsed_minutes(&self, now: SystemTime) -> f64 {
        const EPSILON_MINUTES: f64 = 1.0 / 60_000.0;
        let elapsed_ms = self
            .started_at
            .and_then(|t| now.duration_since(t).ok())
            .map_or(0.0, |d| d.as_millis() as f64);
        (elapsed_ms / 60_000.0).max(EPSILON_MINUTES)
    }

    /// Convert the accumulated counters into the final score terms.
    ///
    /// Pure in the counters and `elapsed_minutes`; calling it again with an
    /// unchanged snapshot returns the identical breakdown.
    pub fn finalize(&mut self, elapsed_minutes: f64) -> ScoreBreakdown {
        self.chars_per_minute =
            (self.correct_keystrokes as f64 / elapsed_minutes).round() as u32;
        self.recompute_accuracy();
        self.breakdown = ScoreBreakdown {
            base: self.correct_keystrokes,
            combo_bonus: (self.max_combo / 10) * 100,
            speed_bonus: (self.chars_per_minute / 50) * 200,
            accuracy_bonus: (self.accuracy / 10) * 100,
        };
        self.breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accuracy_is_perfect() {
        let stats = TypingStats::default();

        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.total_keystrokes, 0);
        assert_eq!(stats.breakdown, ScoreBreakdown::default());
    }

    #[test]
    fn test_record_correct_grows_combo() {
        let mut stats = TypingStats::default();

        stats.record_correct();
        stats.record_correct();
        stats.record_correct();

        assert_eq!(stats.total_keystrokes, 3);
        assert_eq!(stats.correct_keystrokes, 3);
        assert_eq!(stats.combo, 3);
        assert_eq!(stats.max_combo, 3);
        assert_eq!(stats.accuracy, 100);
    }

    #[test]
    fn test_record_mistake_resets_combo_only() {
        let mut stats = TypingStats::default();

        stats.record_correct();
        stats.record_correct();
        stats.record_mistake();

        assert_eq!(stats.combo, 0);
        assert_eq!(stats.max_combo, 2);
        assert_eq!(stats.mistake_keystrokes, 1);
        assert_eq!(stats.accuracy, 67); // round(2/3 * 100)
    }

    #[test]
    fn test_max_combo_is_monotonic() {
        let mut stats = TypingStats::default();
        let mut last_max = 0;

        for i in 0..50 {
            if i % 7 == 0 {
                stats.record_mistake();
            } else {
                stats.record_correct();
            }
            assert!(stats.max_combo >= last_max);
            last_max = stats.max_combo;
        }
    }

    #[test]
    fn test_accuracy_stays_in_bounds() {
        let mut stats = TypingStats::default();

        for i in 0..200 {
            if i % 3 == 0 {
                stats.record_mistake();
            } else {
                stats.record_correct();
            }
            assert!(stats.accuracy <= 100);
        }

        let mut all_misses = TypingStats::default();
        for _ in 0..10 {
            all_misses.record_mistake();
        }
        assert_eq!(all_misses.accuracy, 0);
    }

    #[test]
    fn test_finalize_formula() {
        let mut stats = TypingStats::default();
        stats.correct_keystrokes = 120;
        stats.total_keystrokes = 130;
        stats.mistake_keystrokes = 10;
        stats.max_combo = 37;

        let breakdown = stats.finalize(1.0);

        // cpm 120, accuracy round(120/130*100) = 92
        assert_eq!(stats.chars_per_minute, 120);
        assert_eq!(stats.accuracy, 92);
        assert_eq!(breakdown.base, 120);
        assert_eq!(breakdown.combo_bonus, 300); // floor(37/10) * 100
        assert_eq!(breakdown.speed_bonus, 400); // floor(120/50) * 200
        assert_eq!(breakdown.accuracy_bonus, 900); // floor(92/10) * 100
        assert_eq!(breakdown.total(), 120 + 300 + 400 + 900);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut stats = TypingStats::default();
        stats.correct_keystrokes = 55;
        stats.total_keystrokes = 60;
        stats.max_combo = 21;

        let first = stats.finalize(0.5);
        let second = stats.finalize(0.5);

        assert_eq!(first, second);
        assert_eq!(first.total(), second.total());
    }

    #[test]
    fn test_finalize_with_no_keystrokes() {
        let mut stats = TypingStats::default();

        let breakdown = stats.finalize(1.0);

        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.chars_per_minute, 0);
        assert_eq!(breakdown.base, 0);
        assert_eq!(breakdown.accuracy_bonus, 1000);
        assert_eq!(breakdown.total(), 1000);
    }

    #[test]
    fn test_elapsed_minutes_is_clamped() {
        let now = SystemTime::now();
        let stats = TypingStats::start(now);

        // Zero (or negative) wall time still yields a positive divisor.
        assert!(stats.elapsed_minutes(now) > 0.0);

        let unstarted = TypingStats::default();
        assert!(unstarted.elapsed_minutes(now) > 0.0);
    }

    #[test]
    fn test_breakdown_total() {
        let breakdown = ScoreBreakdown {
            base: 10,
            combo_bonus: 100,
            speed_bonus: 200,
            accuracy_bonus: 300,
        };

        assert_eq!(breakdown.total(), 610);
    }
}
