use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use webbrowser::Browser;

use kanatype::{
    audio::{BellSink, NullSink, SoundSink},
    config::{Config, ConfigStore, FileConfigStore},
    engine::Engine,
    ranking::{RankingDb, RankingEntry},
    runtime::{CrosstermEventSource, GameEvent, Runner},
    session::SessionConfig,
    ui,
    words::WordSet,
    TICK_RATE_MS,
};

const NICKNAME_MAX_CHARS: usize = 12;
const RANKING_TOP_N: usize = 10;

/// terminal typing game for romanized japanese
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing game: transcribe romanized Japanese words against the clock, chain combos, and climb the local ranking."
)]
pub struct Cli {
    /// seconds of active play per session
    #[clap(short = 's', long)]
    seconds: Option<u32>,

    /// countdown seconds before play begins
    #[clap(short = 'c', long)]
    countdown: Option<u32>,

    /// embedded word list to draw prompts from
    #[clap(short = 'l', long, value_enum)]
    word_list: Option<SupportedWordList>,

    /// custom word list file (JSON, same shape as the embedded lists)
    #[clap(short = 'w', long)]
    words_file: Option<PathBuf>,

    /// disable the terminal bell on mistakes
    #[clap(long)]
    no_sound: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SupportedWordList {
    Japanese,
    JapaneseLong,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Title,
    Playing,
    Results,
    Ranking,
}

#[derive(Debug)]
pub struct App {
    pub engine: Engine,
    pub state: AppState,
    pub word_list_name: String,
    pub nickname: String,
    pub submitted: bool,
    pub ranking: Vec<RankingEntry>,
    pub ranking_error: Option<String>,
}

impl App {
    pub fn new(engine: Engine, word_list_name: String) -> Self {
        Self {
            engine,
            state: AppState::Title,
            word_list_name,
            nickname: String::new(),
            submitted: false,
            ranking: Vec::new(),
            ranking_error: None,
        }
    }

    fn begin_session(&mut self) {
        self.nickname.clear();
        self.submitted = false;
        self.ranking_error = None;
        self.engine.retry();
        self.state = AppState::Playing;
    }

    fn return_to_title(&mut self) {
        self.engine.reset_game();
        self.state = AppState::Title;
    }

    fn load_ranking(&mut self) {
        match RankingDb::new().and_then(|db| db.fetch_top(RANKING_TOP_N)) {
            Ok(entries) => {
                self.ranking = entries;
                self.ranking_error = None;
            }
            Err(e) => {
                self.ranking = Vec::new();
                self.ranking_error = Some(format!("ranking unavailable: {}", e));
            }
        }
        self.state = AppState::Ranking;
    }

    fn submit_score(&mut self) {
        if self.submitted {
            self.load_ranking();
            return;
        }
        let stats = self.engine.stats().clone();
        let score = self.engine.state().score;
        match RankingDb::new().and_then(|db| {
            db.submit(&self.nickname, score, stats.accuracy, stats.chars_per_minute)
        }) {
            Ok(_) => {
                self.submitted = true;
                self.load_ranking();
            }
            Err(e) => {
                self.ranking_error = Some(format!("could not save score: {}", e));
            }
        }
    }

    fn share_result(&self) {
        if Browser::is_available() {
            let stats = self.engine.stats();
            webbrowser::open(&format!(
                "https://twitter.com/intent/tweet?text={}%20pts%20%2F%20{}%25%20acc%20%2F%20{}%20cpm%20on%20kanatype",
                self.engine.state().score,
                stats.accuracy,
                stats.chars_per_minute
            ))
            .unwrap_or_default();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    apply_cli_overrides(&mut config, &cli);

    let (words, word_list_name) = load_words(&cli, &config)?;

    let sounds: Box<dyn SoundSink> = if config.sound {
        Box::new(BellSink)
    } else {
        Box::new(NullSink)
    };

    let session_config = SessionConfig {
        time_limit_secs: config.time_limit_secs,
        countdown_secs: config.countdown_secs,
        ..SessionConfig::default()
    };

    let mut app = App::new(Engine::new(words, session_config, sounds), word_list_name);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seconds) = cli.seconds {
        config.time_limit_secs = seconds;
    }
    if let Some(countdown) = cli.countdown {
        config.countdown_secs = countdown;
    }
    if let Some(list) = cli.word_list {
        config.word_list = list.to_string();
    }
    if cli.no_sound {
        config.sound = false;
    }
}

fn load_words(cli: &Cli, config: &Config) -> Result<(WordSet, String), Box<dyn Error>> {
    if let Some(path) = &cli.words_file {
        let set = WordSet::from_file(path)?;
        let name = set.name.clone();
        return Ok((set, name));
    }
    let name = config.word_list.clone();
    Ok((WordSet::load(&name), name))
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| draw(f, app))?;

        match runner.step() {
            GameEvent::Tick => {
                app.engine.on_tick();
                if app.state == AppState::Playing && app.engine.state().over {
                    app.state = AppState::Results;
                }
            }
            GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn draw(f: &mut Frame, app: &App) {
    match app.state {
        AppState::Title => ui::draw_title(f, &app.word_list_name),
        AppState::Playing => ui::draw_play(f, &app.engine),
        AppState::Results => ui::draw_results(
            f,
            &app.engine,
            &app.nickname,
            app.ranking_error.as_deref(),
        ),
        AppState::Ranking => ui::draw_ranking(f, &app.ranking),
    }
}

/// Returns true when the app should quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.state {
        AppState::Title => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.begin_session(),
            KeyCode::Char('r') => app.load_ranking(),
            KeyCode::Esc | KeyCode::Char('q') => return true,
            _ => {}
        },
        AppState::Playing => match key.code {
            KeyCode::Esc => app.return_to_title(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut buffer = app.engine.state().typed.clone();
                buffer.push(c);
                app.engine.submit_input(&buffer);
            }
            _ => {}
        },
        AppState::Results => match key.code {
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.begin_session()
            }
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.share_result()
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if app.nickname.chars().count() < NICKNAME_MAX_CHARS {
                    app.nickname.push(c);
                }
            }
            KeyCode::Backspace => {
                app.nickname.pop();
            }
            KeyCode::Enter => app.submit_score(),
            KeyCode::Esc => app.return_to_title(),
            _ => {}
        },
        AppState::Ranking => match key.code {
            KeyCode::Char('r') => app.begin_session(),
            KeyCode::Esc | KeyCode::Char('b') => app.return_to_title(),
            _ => {}
        },
    }

    false
}
