use crate::words::Word;

/// Session knobs; times are in seconds.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Seconds of active play once the countdown ends.
    pub time_limit_secs: u32,
    /// Non-interactive countdown before play begins.
    pub countdown_secs: u32,
    /// Clamp window for the per-word time budget.
    pub min_word_secs: f64,
    pub max_word_secs: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 100,
            countdown_secs: 3,
            min_word_secs: 3.0,
            max_word_secs: 12.0,
        }
    }
}

/// Snapshot of the running game the host renders from.
///
/// `typed` only ever holds validated characters: a rejected keystroke is
/// dropped, never appended. `started` and `over` are never both true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub current_word: Word,
    pub typed: String,
    /// Mistakes registered against the current word so far.
    pub word_mistakes: u32,
    /// Session seconds left, countdown included (starts at limit + countdown).
    pub time_remaining: f64,
    pub word_time_limit: f64,
    pub word_time_remaining: f64,
    pub score: u32,
    pub started: bool,
    pub over: bool,
    pub last_mistake: Option<char>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_pristine() {
        let state = SessionState::default();

        assert!(!state.started);
        assert!(!state.over);
        assert_eq!(state.score, 0);
        assert!(state.typed.is_empty());
        assert!(state.last_mistake.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();

        assert_eq!(config.time_limit_secs, 100);
        assert_eq!(config.countdown_secs, 3);
        assert!(config.min_word_secs < config.max_word_secs);
    }
}
