use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use lingvo_config::{Config, Preferences};
use lingvo_engine::speech::{PollPolicy, SpeechEngine, SpeechHost};
use lingvo_engine::{ContentRepository, Segmenter};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{env, fs::File, io::stdout, path::PathBuf, process, time::Duration};

mod app;
mod espeak;
mod ui;

use app::{App, Focus};
use espeak::EspeakHost;

const TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = match (args.len(), Config::load()) {
        (2, Ok(Some(mut config))) => {
            config.content_path = PathBuf::from(&args[1]);
            config
        }
        (2, _) => Config::new(&args[1]),
        (1, Ok(Some(config))) => config,
        (1, Ok(None)) => {
            eprintln!("Error: No content path provided and no config file found");
            eprintln!("Usage: {} <content-folder-path>", args[0]);
            eprintln!("Or create a config file at {}", config_path.display());
            process::exit(1);
        }
        (1, Err(e)) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Usage: {} <content-folder-path>", args[0]);
            process::exit(1);
        }
        _ => {
            eprintln!("Usage: {} [content-folder-path]", args[0]);
            process::exit(1);
        }
    };

    let repo = match ContentRepository::open(&config.content_path) {
        Ok(repo) => repo.with_default_language(config.default_language.clone()),
        Err(e) => {
            eprintln!(
                "Error: Content path '{}' is invalid: {e}",
                config.content_path.display()
            );
            process::exit(1);
        }
    };

    let prefs_path = Preferences::path();
    let prefs = Preferences::load_from_path(&prefs_path).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable preferences: {e}");
        Preferences::default()
    });

    let segmenter =
        Segmenter::new().with_translation_titles(config.translation_titles.iter().cloned());
    let engine = SpeechEngine::new()
        .with_locale(config.speech.preferred_locale.clone())
        .with_max_retries(config.speech.max_retries)
        .with_poll_policy(PollPolicy {
            attempts: config.speech.poll_attempts,
            interval: Duration::from_millis(config.speech.poll_interval_ms),
        });

    let mut app = App::new(
        repo,
        segmenter,
        engine,
        EspeakHost::detect(),
        prefs,
        prefs_path,
    )?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// The terminal belongs to the reader, so logs go to a file.
fn init_logging() {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(log::LevelFilter::Info);
    let log_path = env::temp_dir().join("lingvo-cli.log");
    match File::create(&log_path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn run_app<B, H>(terminal: &mut Terminal<B>, app: &mut App<H>) -> Result<()>
where
    B: ratatui::backend::Backend,
    B::Error: Send + Sync + 'static,
    H: SpeechHost,
{
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(TICK)? {
            app.tick();
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match (app.focus, key.code) {
            (_, KeyCode::Char('q')) => {
                app.stop_speaking();
                return Ok(());
            }
            (_, KeyCode::Tab) => {
                app.focus = match app.focus {
                    Focus::Lessons => Focus::Lines,
                    Focus::Lines => Focus::Lessons,
                };
            }
            (Focus::Lessons, KeyCode::Down | KeyCode::Char('j')) => app.select_next_lesson(),
            (Focus::Lessons, KeyCode::Up | KeyCode::Char('k')) => app.select_previous_lesson(),
            (Focus::Lessons, KeyCode::Enter | KeyCode::Right) => {
                if let Some(index) = app.lesson_state.selected() {
                    app.open_lesson(index);
                    app.focus = Focus::Lines;
                }
            }
            (Focus::Lines, KeyCode::Down | KeyCode::Char('j')) => app.next_line(),
            (Focus::Lines, KeyCode::Up | KeyCode::Char('k')) => app.previous_line(),
            (Focus::Lines, KeyCode::Enter | KeyCode::Char(' ')) => app.speak_selected(),
            (Focus::Lines, KeyCode::Left) => app.focus = Focus::Lessons,
            (_, KeyCode::Char('s')) => app.stop_speaking(),
            (_, KeyCode::Char('n')) => app.go_to_neighbour(true),
            (_, KeyCode::Char('p')) => app.go_to_neighbour(false),
            (_, KeyCode::Char('+') | KeyCode::Char('=')) => app.faster(),
            (_, KeyCode::Char('-')) => app.slower(),
            (_, KeyCode::Char('v')) => app.cycle_voice(),
            (_, KeyCode::Char('t')) => app.toggle_translations(),
            (_, KeyCode::Char('l')) => app.toggle_ui_language(),
            (_, KeyCode::Char('d')) => app.dismiss_notice(),
            _ => {}
        }
        app.tick();
    }
}
