use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// Headless integration using the runtime + engine without a TTY.
// Verifies that a minimal session flows through Runner/TestEventSource.

use kanatype::audio::NullSink;
use kanatype::engine::Engine;
use kanatype::runtime::{GameEvent, Runner, TestEventSource};
use kanatype::session::SessionConfig;
use kanatype::words::{Word, WordSet};

fn neko_engine(time_limit_secs: u32) -> Engine {
    Engine::new(
        WordSet::from_words("test", vec![Word::new("ねこ", "neko")]),
        SessionConfig {
            time_limit_secs,
            countdown_secs: 0,
            ..SessionConfig::default()
        },
        Box::new(NullSink),
    )
}

#[test]
fn headless_typing_flow_completes_word() {
    let mut engine = neko_engine(100);
    engine.start_game();

    let (tx, source) = TestEventSource::channel();
    let runner = Runner::new(source, Duration::from_millis(5));

    for c in "neko".chars() {
        tx.send(GameEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )))
        .unwrap();
    }

    // Drive a tiny event loop: keys first, then ticks until the word
    // advance lands.
    for _ in 0..100u32 {
        match runner.step() {
            GameEvent::Tick => engine.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    let mut buffer = engine.state().typed.clone();
                    buffer.push(c);
                    engine.submit_input(&buffer);
                }
            }
        }
        if engine.stats().words_completed == 1 && !engine.advance_pending() {
            break;
        }
    }

    assert_eq!(engine.stats().words_completed, 1);
    assert_eq!(engine.stats().mistake_keystrokes, 0);
    assert!(engine.state().typed.is_empty(), "input cleared for next word");
    assert!(engine.word_clock_running(), "next word's clock is armed");
}

#[test]
fn headless_timed_session_finishes_by_clock() {
    let mut engine = neko_engine(2);
    engine.start_game();

    let (_tx, source) = TestEventSource::channel();
    let runner = Runner::new(source, Duration::from_millis(2));

    for _ in 0..100u32 {
        if let GameEvent::Tick = runner.step() {
            engine.on_tick();
        }
        if engine.state().over {
            break;
        }
    }

    assert!(engine.state().over, "session should end by the clock");
    assert!(!engine.state().started);
    assert_eq!(engine.state().score, engine.stats().breakdown.total());
}

#[test]
fn headless_mixed_keys_and_ticks() {
    let mut engine = neko_engine(100);
    engine.start_game();

    let (tx, source) = TestEventSource::channel();
    let runner = Runner::new(source, Duration::from_millis(5));

    // A wrong key in front of the right sequence.
    for c in "xneko".chars() {
        tx.send(GameEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )))
        .unwrap();
    }

    // Few enough ticks that the next word's clock cannot expire too.
    for _ in 0..20u32 {
        match runner.step() {
            GameEvent::Tick => engine.on_tick(),
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    let mut buffer = engine.state().typed.clone();
                    buffer.push(c);
                    engine.submit_input(&buffer);
                }
            }
        }
    }

    assert_eq!(engine.stats().words_completed, 1);
    assert_eq!(engine.stats().mistake_keystrokes, 1);
    assert_eq!(engine.stats().total_keystrokes, 5);
}
