use lingvo_engine::speech::SpeechHost;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, Focus, ViewLine};

pub fn draw<H: SpeechHost>(f: &mut Frame, app: &mut App<H>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    draw_lessons(f, app, columns[0]);
    draw_lines(f, app, columns[1]);
    draw_status(f, app, rows[1]);
}

fn pane(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_lessons<H: SpeechHost>(f: &mut Frame, app: &mut App<H>, area: ratatui::layout::Rect) {
    let items: Vec<ListItem> = app
        .lessons
        .iter()
        .map(|lesson| ListItem::new(Line::from(lesson.title.clone())))
        .collect();

    let list = List::new(items)
        .block(pane("Lessons", app.focus == Focus::Lessons))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(list, area, &mut app.lesson_state);
}

fn draw_lines<H: SpeechHost>(f: &mut Frame, app: &mut App<H>, area: ratatui::layout::Rect) {
    let items: Vec<ListItem> = app
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let speaking = app.speaking_line == Some(i);
            ListItem::new(render_line(line, speaking, app.show_translations))
        })
        .collect();

    let title = app
        .current_lesson()
        .map_or_else(|| "Lesson".to_string(), |l| l.title.clone());
    let list = List::new(items)
        .block(pane(&title, app.focus == Focus::Lines))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    f.render_stateful_widget(list, area, &mut app.line_state);
}

fn render_line(line: &ViewLine, speaking: bool, show_translations: bool) -> Line<'static> {
    match line {
        ViewLine::Heading { text, level } => Line::from(Span::styled(
            format!("{} {text}", "#".repeat(usize::from(*level))),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        ViewLine::Sentence(sentence) => {
            let marker = if speaking { "▶ " } else { "  " };
            let mut spans = vec![
                Span::raw(marker),
                Span::styled(
                    sentence.spoken.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ];
            for extra in [&sentence.phonetic, &sentence.transcription]
                .into_iter()
                .flatten()
            {
                spans.push(Span::styled(
                    format!("  {extra}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            if let Some(translation) = &sentence.translation {
                spans.push(Span::styled(
                    format!("  {translation}"),
                    Style::default().fg(Color::Green),
                ));
            }
            Line::from(spans)
        }
        ViewLine::Translation(t) => {
            let mut spans = vec![Span::raw(format!("  {}", t.primary))];
            if let Some(secondary) = &t.secondary {
                let text = if show_translations {
                    format!(" / {secondary}")
                } else {
                    " / …".to_string()
                };
                spans.push(Span::styled(text, Style::default().fg(Color::Green)));
            }
            Line::from(spans)
        }
        ViewLine::Text(text) => Line::from(format!("  {text}")),
        ViewLine::Code(code) => Line::from(Span::styled(
            format!("  {code}"),
            Style::default().fg(Color::Magenta),
        )),
        ViewLine::SectionBreak => Line::from(Span::styled(
            "  ────────",
            Style::default().fg(Color::DarkGray),
        )),
    }
}

fn draw_status<H: SpeechHost>(f: &mut Frame, app: &App<H>, area: ratatui::layout::Rect) {
    let message = match (&app.status, app.notice()) {
        (Some(status), _) => status.clone(),
        (None, Some(notice)) => format!("{} (d: dismiss)", notice.message(app.ui_language())),
        (None, None) => String::new(),
    };
    let settings = format!(
        "rate {:.1} | voice {} | ui {}",
        app.rate(),
        app.voice_name().unwrap_or("auto"),
        app.ui_language()
    );
    let help = "q quit | Tab focus | ↑↓ move | Enter open/speak | s stop | n/p lesson | +/- rate | v voice | t translation | l language";

    let text = vec![
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(settings),
        Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), area);
}
