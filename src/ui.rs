use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::engine::Engine;
use crate::ranking::RankingEntry;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

pub fn draw_title(f: &mut Frame, word_list: &str) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height / 3),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new(Span::styled(
        "かなタイプ kanatype",
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center);
    f.render_widget(title, chunks[1]);

    let list_line = Paragraph::new(Span::styled(
        format!("word list: {}", word_list),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(list_line, chunks[2]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled("(enter)", bold()),
        Span::raw(" play  "),
        Span::styled("(r)", bold()),
        Span::raw(" ranking  "),
        Span::styled("(esc)", bold()),
        Span::raw(" quit"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[3]);
}

pub fn draw_play(f: &mut Frame, engine: &Engine) {
    if engine.in_countdown() {
        draw_countdown(f, engine);
        return;
    }

    let area = f.area();
    let state = engine.state();
    let stats = engine.stats();

    // Long prompts (phrases) may need a second line.
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let display_lines = ((state.current_word.display.width() as f64
        / max_chars_per_line as f64)
        .ceil() as u16)
        .max(1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // session header
            Constraint::Min(1),    // spacer
            Constraint::Length(display_lines),
            Constraint::Length(1), // romanization
            Constraint::Length(1), // spacer
            Constraint::Length(1), // word timer
            Constraint::Min(1),    // spacer
            Constraint::Length(1), // session stats
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!("{:>3.0}s", state.time_remaining), bold()),
        Span::raw("   "),
        Span::styled(format!("combo {}", stats.combo), bold().fg(Color::Yellow)),
        Span::raw("   "),
        Span::raw(format!("max {}", stats.max_combo)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(header, chunks[0]);

    let display = Paragraph::new(Span::styled(
        state.current_word.display.clone(),
        bold().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(display, chunks[2]);

    let mut spans: Vec<Span> = state
        .typed
        .chars()
        .map(|c| Span::styled(c.to_string(), bold().fg(Color::Green)))
        .collect();

    let typed_len = state.typed.chars().count();
    let mut rest = state.current_word.roman.chars().skip(typed_len);
    if let Some(next) = rest.next() {
        let next_style = if state.last_mistake.is_some() {
            bold().fg(Color::Red).add_modifier(Modifier::UNDERLINED)
        } else {
            dim_bold().add_modifier(Modifier::UNDERLINED)
        };
        spans.push(Span::styled(next.to_string(), next_style));
    }
    spans.push(Span::styled(rest.collect::<String>(), dim_bold()));

    let roman = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(roman, chunks[3]);

    if engine.word_clock_running() && state.word_time_limit > 0.0 {
        let ratio = (state.word_time_remaining / state.word_time_limit).clamp(0.0, 1.0);
        let color = if ratio < 0.2 {
            Color::Red
        } else if ratio < 0.5 {
            Color::Yellow
        } else {
            Color::Blue
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .label(format!("{:.1}s", state.word_time_remaining))
            .ratio(ratio);
        f.render_widget(gauge, chunks[5]);
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::raw(format!("words {}", stats.words_completed)),
        Span::raw("   "),
        Span::raw(format!("accuracy {}%", stats.accuracy)),
        Span::raw("   "),
        Span::styled("(esc) title", dim_bold()),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(footer, chunks[7]);
}

fn draw_countdown(f: &mut Frame, engine: &Engine) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height / 2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let number = Paragraph::new(Span::styled(
        format!("{}", engine.countdown_remaining()),
        bold().fg(Color::Yellow),
    ))
    .alignment(Alignment::Center);
    f.render_widget(number, chunks[1]);
}

pub fn draw_results(f: &mut Frame, engine: &Engine, nickname: &str, error: Option<&str>) {
    let area = f.area();
    let state = engine.state();
    let stats = engine.stats();
    let breakdown = &stats.breakdown;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // headline
            Constraint::Length(1),
            Constraint::Length(8), // breakdown table
            Constraint::Length(1),
            Constraint::Length(1), // nickname input
            Constraint::Length(1), // error
            Constraint::Min(0),
            Constraint::Length(1), // key help
        ])
        .split(area);

    let headline = Paragraph::new(Span::styled(
        format!("time's up! score {}", state.score),
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center);
    f.render_widget(headline, chunks[0]);

    let rows = vec![
        Row::new(vec![
            Cell::from("base (correct keystrokes)"),
            Cell::from(breakdown.base.to_string()),
        ]),
        Row::new(vec![
            Cell::from(format!("combo bonus (max {})", stats.max_combo)),
            Cell::from(breakdown.combo_bonus.to_string()),
        ]),
        Row::new(vec![
            Cell::from(format!("speed bonus ({} cpm)", stats.chars_per_minute)),
            Cell::from(breakdown.speed_bonus.to_string()),
        ]),
        Row::new(vec![
            Cell::from(format!("accuracy bonus ({}%)", stats.accuracy)),
            Cell::from(breakdown.accuracy_bonus.to_string()),
        ]),
        Row::new(vec![
            Cell::from(format!("words completed: {}", stats.words_completed)),
            Cell::from(""),
        ]),
        Row::new(vec![
            Cell::from(format!("mistakes: {}", stats.mistake_keystrokes)),
            Cell::from(""),
        ]),
    ];

    let table = Table::new(rows, [Constraint::Min(30), Constraint::Length(8)])
        .block(Block::default().borders(Borders::ALL).title("breakdown"));
    f.render_widget(table, chunks[2]);

    let input = Paragraph::new(Line::from(vec![
        Span::raw("nickname: "),
        Span::styled(nickname, bold().fg(Color::Green)),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(input, chunks[4]);

    if let Some(msg) = error {
        let err = Paragraph::new(Span::styled(msg, Style::default().fg(Color::Red)))
            .alignment(Alignment::Center);
        f.render_widget(err, chunks[5]);
    }

    let help = Paragraph::new(Line::from(vec![
        Span::styled("(enter)", bold()),
        Span::raw(" submit score  "),
        Span::styled("(^r)", bold()),
        Span::raw(" retry  "),
        Span::styled("(^t)", bold()),
        Span::raw(" share  "),
        Span::styled("(esc)", bold()),
        Span::raw(" title"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[7]);
}

pub fn draw_ranking(f: &mut Frame, entries: &[RankingEntry]) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let header = Row::new(vec!["#", "nickname", "score", "acc", "cpm", "when"])
        .style(bold().fg(Color::Cyan));

    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            Row::new(vec![
                Cell::from(format!("{}", idx + 1)),
                Cell::from(e.nickname.clone()),
                Cell::from(e.score.to_string()),
                Cell::from(format!("{}%", e.accuracy)),
                Cell::from(e.typing_speed.to_string()),
                Cell::from(e.created_at.format("%Y-%m-%d %H:%M").to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(17),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("ranking"));
    f.render_widget(table, chunks[0]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled("(r)", bold()),
        Span::raw(" retry  "),
        Span::styled("(esc)", bold()),
        Span::raw(" title"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, chunks[1]);
}
