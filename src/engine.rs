use crate::audio::{Signal, SoundSink};
use crate::session::{SessionConfig, SessionState};
use crate::stats::TypingStats;
use crate::words::{Word, WordSet};
use crate::TICK_RATE_MS;
use chrono::prelude::*;
use directories::ProjectDirs;
use rand::Rng;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::SystemTime;

/// Delay before the next word appears after a completed word.
const COMPLETE_ADVANCE_MS: u64 = 300;
/// Delay before the next word appears after a word timeout.
const TIMEOUT_ADVANCE_MS: u64 = 500;

/// Per-word budget: a linear part that grows with romanization length plus a
/// small uniform jitter, clamped to the configured window.
const WORD_TIME_BASE_SECS: f64 = 1.0;
const WORD_TIME_PER_CHAR_SECS: f64 = 0.55;
const WORD_TIME_JITTER_SECS: f64 = 0.5;

const TICKS_PER_SECOND: u32 = (1000 / TICK_RATE_MS) as u32;

/// The running per-word budget. Engine-owned: cancelling it is dropping the
/// value, and the single slot means two clocks can never run at once.
#[derive(Debug, Clone, Copy)]
struct WordClock {
    limit: f64,
    remaining: f64,
}

/// A deferred word advance. It captures the session epoch at schedule time
/// and is discarded if the epoch has moved on before it fires.
#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    remaining_ms: u64,
    epoch: u64,
}

/// The session engine: owns both clocks, the input validator and the score
/// bookkeeping. The host advances it with `on_tick` every `TICK_RATE_MS`
/// and forwards raw input buffers to `submit_input`; it renders from the
/// `state`/`stats` snapshots and never mutates them.
#[derive(Debug)]
pub struct Engine {
    words: WordSet,
    config: SessionConfig,
    state: SessionState,
    stats: TypingStats,
    word_clock: Option<WordClock>,
    pending: Option<PendingAdvance>,
    /// Bumped on start, reset and every word advance.
    epoch: u64,
    /// Ticks accumulated toward the next whole session second.
    subsecond_ticks: u32,
    sounds: Box<dyn SoundSink>,
}

impl Engine {
    pub fn new(words: WordSet, config: SessionConfig, sounds: Box<dyn SoundSink>) -> Self {
        Self {
            words,
            config,
            state: SessionState::default(),
            stats: TypingStats::default(),
            word_clock: None,
            pending: None,
            epoch: 0,
            subsecond_ticks: 0,
            sounds,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stats(&self) -> &TypingStats {
        &self.stats
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn word_clock_running(&self) -> bool {
        self.word_clock.is_some()
    }

    /// True while a completed or timed-out word waits for its replacement.
    pub fn advance_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn in_countdown(&self) -> bool {
        self.state.started && self.state.time_remaining > self.config.time_limit_secs as f64
    }

    /// Whole countdown seconds left, for the host to render.
    pub fn countdown_remaining(&self) -> u32 {
        (self.state.time_remaining - self.config.time_limit_secs as f64)
            .ceil()
            .max(0.0) as u32
    }

    pub fn start_game(&mut self) {
        self.epoch += 1;
        self.word_clock = None;
        self.pending = None;
        self.subsecond_ticks = 0;
        self.stats = TypingStats::start(SystemTime::now());
        self.state = SessionState {
            current_word: self.words.draw(),
            time_remaining: (self.config.time_limit_secs + self.config.countdown_secs) as f64,
            started: true,
            ..SessionState::default()
        };
        // A zero-length countdown begins play immediately.
        if !self.in_countdown() {
            self.restart_word_clock();
        }
    }

    pub fn reset_game(&mut self) {
        self.epoch += 1;
        self.word_clock = None;
        self.pending = None;
        self.subsecond_ticks = 0;
        self.state = SessionState::default();
        self.stats = TypingStats::default();
    }

    pub fn retry(&mut self) {
        self.reset_game();
        self.start_game();
    }

    /// Advance every engine clock by one host tick (`TICK_RATE_MS`).
    /// Ticks outside a running session are no-ops, so a straggling timer
    /// firing after game over cannot corrupt anything.
    pub fn on_tick(&mut self) {
        if !self.state.started || self.state.over {
            return;
        }
        let advanced = self.tick_pending_advance();
        if !advanced {
            self.tick_word_clock();
        }
        self.tick_session_clock();
    }

    /// Validate one raw input-buffer update against the current word.
    ///
    /// The buffer is the host's whole input field; only the first character
    /// beyond the already validated prefix is considered. Shorter or
    /// unchanged buffers carry no keystroke and are ignored, as is input
    /// during the countdown or while a word advance is pending.
    pub fn submit_input(&mut self, buffer: &str) {
        if !self.state.started
            || self.state.over
            || self.in_countdown()
            || self.pending.is_some()
        {
            return;
        }

        let typed_len = self.state.typed.chars().count();
        let Some(ch) = buffer.chars().nth(typed_len) else {
            return;
        };

        let expected = self.state.current_word.roman.chars().nth(typed_len);
        let matched = expected == Some(ch)
            || self
                .state
                .current_word
                .alternatives
                .iter()
                .any(|alt| alt.chars().nth(typed_len) == Some(ch));

        if matched {
            self.accept_char(ch);
        } else {
            self.reject_char(ch);
        }
    }

    fn accept_char(&mut self, ch: char) {
        self.state.typed.push(ch);
        self.state.last_mistake = None;
        self.stats.record_correct();
        self.sounds.play(Signal::Keystroke);

        let roman_len = self.state.current_word.roman.chars().count();
        if self.state.typed.chars().count() == roman_len {
            self.sounds.play(Signal::Success);
            self.word_clock = None;
            self.stats.words_completed += 1;
            self.pending = Some(PendingAdvance {
                remaining_ms: COMPLETE_ADVANCE_MS,
                epoch: self.epoch,
            });
        }
    }

    fn reject_char(&mut self, ch: char) {
        self.sounds.play(Signal::Mistake);
        self.stats.record_mistake();
        self.state.last_mistake = Some(ch);
        self.state.word_mistakes += 1;
    }

    /// Returns true when a word advance fired this tick.
    fn tick_pending_advance(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        pending.remaining_ms = pending.remaining_ms.saturating_sub(TICK_RATE_MS);
        if pending.remaining_ms > 0 {
            return false;
        }
        let stale = pending.epoch != self.epoch;
        self.pending = None;
        if stale {
            return false;
        }
        self.advance_word();
        true
    }

    fn tick_word_clock(&mut self) {
        if self.in_countdown() || self.pending.is_some() {
            return;
        }
        let Some(clock) = self.word_clock.as_mut() else {
            return;
        };
        clock.remaining = (clock.remaining - TICK_RATE_MS as f64 / 1000.0).max(0.0);
        self.state.word_time_remaining = clock.remaining;
        if clock.remaining <= 0.0 {
            self.word_timed_out();
        }
    }

    fn word_timed_out(&mut self) {
        self.word_clock = None;
        self.sounds.play(Signal::Mistake);
        // A timeout counts as one mistake keystroke.
        self.stats.record_mistake();
        self.state.typed.clear();
        self.state.word_mistakes = 0;
        self.state.last_mistake = None;
        self.pending = Some(PendingAdvance {
            remaining_ms: TIMEOUT_ADVANCE_MS,
            epoch: self.epoch,
        });
    }

    fn tick_session_clock(&mut self) {
        self.subsecond_ticks += 1;
        if self.subsecond_ticks < TICKS_PER_SECOND {
            return;
        }
        self.subsecond_ticks = 0;

        let was_countdown = self.in_countdown();
        self.state.time_remaining = (self.state.time_remaining - 1.0).max(0.0);

        if self.state.time_remaining <= 0.0 {
            self.finish_session();
            return;
        }
        // The second that crosses out of the countdown arms the first word
        // clock, exactly once.
        if was_countdown && !self.in_countdown() && self.word_clock.is_none() {
            self.restart_word_clock();
        }
    }

    fn advance_word(&mut self) {
        self.epoch += 1;
        self.state.current_word = self.words.draw();
        self.state.typed.clear();
        self.state.word_mistakes = 0;
        self.state.last_mistake = None;
        self.restart_word_clock();
    }

    fn restart_word_clock(&mut self) {
        // Drop any previous instance before arming a new one.
        self.word_clock = None;
        let limit = self.word_time_limit_for(&self.state.current_word);
        self.word_clock = Some(WordClock {
            limit,
            remaining: limit,
        });
        self.state.word_time_limit = limit;
        self.state.word_time_remaining = limit;
    }

    fn word_time_limit_for(&self, word: &Word) -> f64 {
        let len = word.roman.chars().count() as f64;
        let jitter = rand::thread_rng().gen_range(0.0..WORD_TIME_JITTER_SECS);
        (WORD_TIME_BASE_SECS + WORD_TIME_PER_CHAR_SECS * len + jitter)
            .clamp(self.config.min_word_secs, self.config.max_word_secs)
    }

    fn finish_session(&mut self) {
        self.epoch += 1;
        self.word_clock = None;
        self.pending = None;
        self.state.started = false;
        self.state.over = true;
        self.state.time_remaining = 0.0;
        self.state.word_time_remaining = 0.0;

        let elapsed = self.stats.elapsed_minutes(SystemTime::now());
        let breakdown = self.stats.finalize(elapsed);
        self.state.score = breakdown.total();

        let _ = self.append_result_log();
    }

    /// One line per finished session, appended under the config dir.
    fn append_result_log(&self) -> io::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "kanatype") {
            let config_dir = proj_dirs.config_dir();
            let log_path = config_dir.join("log.csv");

            std::fs::create_dir_all(config_dir)?;

            let needs_header = !log_path.exists();

            let mut log_file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(log_path)?;

            if needs_header {
                writeln!(
                    log_file,
                    "date,time_limit_secs,words_completed,correct,mistakes,max_combo,cpm,accuracy,score"
                )?;
            }

            writeln!(
                log_file,
                "{},{},{},{},{},{},{},{},{}",
                Local::now().format("%c"),
                self.config.time_limit_secs,
                self.stats.words_completed,
                self.stats.correct_keystrokes,
                self.stats.mistake_keystrokes,
                self.stats.max_combo,
                self.stats.chars_per_minute,
                self.stats.accuracy,
                self.state.score,
            )?;
        }

        Ok(())
    }
}
