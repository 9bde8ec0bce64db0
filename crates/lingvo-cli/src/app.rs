use anyhow::Result;
use lingvo_config::Preferences;
use lingvo_engine::content::blocks::strip_list_marker;
use lingvo_engine::speech::{
    EventOutcome, Notice, SpeakOutcome, SpeechEngine, SpeechHost, SpeechSession, SpeechState,
};
use lingvo_engine::{
    BlockKind, Catalog, ContentBlock, ContentRepository, LESSONS_FOLDER, LessonItem, Segmenter,
    Sentence, content::TranslationLine,
};
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::Instant;

const LOOKING_FOR_VOICES: &str = "Looking for voices…";

/// One row of the lesson pane.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewLine {
    Heading { text: String, level: u8 },
    Sentence(Sentence),
    Translation(TranslationLine),
    Text(String),
    Code(String),
    SectionBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Lessons,
    Lines,
}

pub struct App<H: SpeechHost> {
    repo: ContentRepository,
    segmenter: Segmenter,
    pub lessons: Vec<LessonItem>,
    pub lesson_state: ListState,
    pub lines: Vec<ViewLine>,
    pub line_state: ListState,
    pub focus: Focus,
    pub show_translations: bool,
    pub speaking_line: Option<usize>,
    pub status: Option<String>,
    engine: SpeechEngine,
    host: H,
    session: SpeechSession,
    prefs: Preferences,
    prefs_path: PathBuf,
}

impl<H: SpeechHost> App<H> {
    pub fn new(
        repo: ContentRepository,
        segmenter: Segmenter,
        engine: SpeechEngine,
        host: H,
        prefs: Preferences,
        prefs_path: PathBuf,
    ) -> Result<Self> {
        let catalog = Catalog::build(&repo, &[prefs.ui_language.as_str()])?;
        let session = SpeechSession::new(prefs.speech_rate, prefs.voice_name.clone());

        let mut app = Self {
            repo,
            segmenter,
            lessons: catalog.lessons,
            lesson_state: ListState::default(),
            lines: Vec::new(),
            line_state: ListState::default(),
            focus: Focus::Lessons,
            show_translations: false,
            speaking_line: None,
            status: None,
            engine,
            host,
            session,
            prefs,
            prefs_path,
        };

        if !app.lessons.is_empty() {
            app.open_lesson(0);
        }
        Ok(app)
    }

    pub fn current_lesson(&self) -> Option<&LessonItem> {
        self.lesson_state.selected().and_then(|i| self.lessons.get(i))
    }

    pub fn open_lesson(&mut self, index: usize) {
        let Some(lesson) = self.lessons.get(index) else {
            return;
        };
        self.lesson_state.select(Some(index));
        self.engine.stop(&mut self.host);
        self.speaking_line = None;

        match self.repo.get_by_alias(LESSONS_FOLDER, &lesson.alias) {
            Ok(Some(doc)) => {
                self.lines = flatten(&self.segmenter.segment_sections(&doc.body));
                self.status = None;
            }
            Ok(None) => {
                self.lines = Vec::new();
                self.status = Some(format!("Lesson {} has disappeared", lesson.alias));
            }
            Err(e) => {
                self.lines = Vec::new();
                self.status = Some(format!("Error reading lesson: {e}"));
            }
        }
        let first_sentence = self
            .lines
            .iter()
            .position(|l| matches!(l, ViewLine::Sentence(_)));
        self.line_state.select(first_sentence.or(Some(0)).filter(|_| !self.lines.is_empty()));
    }

    pub fn select_next_lesson(&mut self) {
        let next = match self.lesson_state.selected() {
            Some(i) => (i + 1) % self.lessons.len().max(1),
            None => 0,
        };
        self.lesson_state.select(Some(next));
    }

    pub fn select_previous_lesson(&mut self) {
        let prev = match self.lesson_state.selected() {
            Some(0) | None => self.lessons.len().saturating_sub(1),
            Some(i) => i - 1,
        };
        self.lesson_state.select(Some(prev));
    }

    /// Follow the lesson navigation links; stays put at either end.
    pub fn go_to_neighbour(&mut self, forward: bool) {
        let Some(current) = self.current_lesson().map(|l| l.alias.clone()) else {
            return;
        };
        let navigation = match self.repo.next_and_prev(LESSONS_FOLDER, &current) {
            Ok(n) => n,
            Err(e) => {
                self.status = Some(format!("Error reading lessons: {e}"));
                return;
            }
        };
        let target = if forward {
            navigation.next
        } else {
            navigation.prev
        };
        if let Some(link) = target
            && let Some(index) = self.lessons.iter().position(|l| l.alias == link.alias)
        {
            self.open_lesson(index);
        }
    }

    pub fn next_line(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let i = self
            .line_state
            .selected()
            .map_or(0, |i| (i + 1).min(self.lines.len() - 1));
        self.line_state.select(Some(i));
    }

    pub fn previous_line(&mut self) {
        let i = self.line_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.line_state.select(Some(i));
    }

    /// Speak the selected line if it is a sentence.
    pub fn speak_selected(&mut self) {
        let Some(index) = self.line_state.selected() else {
            return;
        };
        let Some(ViewLine::Sentence(sentence)) = self.lines.get(index) else {
            return;
        };

        match self
            .engine
            .speak(&mut self.host, sentence.speech_text(), &self.session)
        {
            SpeakOutcome::Submitted { .. } => {
                self.speaking_line = Some(index);
                self.status = None;
            }
            SpeakOutcome::Unavailable => self.status = self.notice_message(),
            SpeakOutcome::Checking => self.status = Some(LOOKING_FOR_VOICES.to_string()),
            SpeakOutcome::Empty => {}
            SpeakOutcome::Rejected => self.status = Some("Could not start speech".to_string()),
        }
    }

    pub fn stop_speaking(&mut self) {
        self.engine.stop(&mut self.host);
        self.speaking_line = None;
    }

    /// Advance voice polling and apply pending speech events; called on
    /// every UI tick.
    pub fn tick(&mut self) {
        if self.engine.state() == SpeechState::Checking
            && self.engine.poll_voices(&mut self.host, Instant::now()) != SpeechState::Checking
        {
            self.status = self.notice_message();
        }
        for outcome in self.engine.pump(&mut self.host) {
            match outcome {
                EventOutcome::Completed | EventOutcome::Interrupted => {
                    if !self.engine.is_speaking() {
                        self.speaking_line = None;
                    }
                }
                EventOutcome::Failed(cause) => {
                    self.speaking_line = None;
                    self.status = Some(format!("Speech failed: {cause:?}"));
                }
                EventOutcome::Started | EventOutcome::Retried(_) | EventOutcome::Stale => {}
            }
        }
    }

    pub fn rate(&self) -> f32 {
        self.session.rate()
    }

    pub fn faster(&mut self) {
        self.prefs.speech_rate = self.session.faster();
        self.save_preferences();
    }

    pub fn slower(&mut self) {
        self.prefs.speech_rate = self.session.slower();
        self.save_preferences();
    }

    /// Name of the voice the next sentence would be spoken with.
    pub fn voice_name(&self) -> Option<&str> {
        self.engine
            .resolve_voice(&self.session)
            .map(|v| v.name.as_str())
    }

    /// Step through the English voices, checking availability first if needed.
    pub fn cycle_voice(&mut self) {
        if self.engine.check_availability(&mut self.host) == SpeechState::Checking {
            self.status = Some(LOOKING_FOR_VOICES.to_string());
            return;
        }
        let voices = self.engine.english_voices();
        if voices.is_empty() {
            self.status = self.notice_message();
            return;
        }

        let current = self.voice_name();
        let next = match voices.iter().position(|v| Some(v.name.as_str()) == current) {
            Some(i) => voices[(i + 1) % voices.len()],
            None => voices[0],
        };
        let name = next.name.clone();

        self.status = Some(format!("Voice: {name}"));
        self.session.set_voice(Some(name.clone()));
        self.prefs.voice_name = Some(name);
        self.save_preferences();
    }

    pub fn toggle_translations(&mut self) {
        self.show_translations = !self.show_translations;
    }

    pub fn ui_language(&self) -> &str {
        &self.prefs.ui_language
    }

    pub fn toggle_ui_language(&mut self) {
        self.prefs.ui_language = if self.prefs.ui_language.starts_with("ru") {
            "en".to_string()
        } else {
            "ru".to_string()
        };
        self.save_preferences();
    }

    /// The speech notice unless the reader dismissed it.
    pub fn notice(&self) -> Option<Notice> {
        self.engine
            .notice()
            .filter(|n| !self.prefs.is_dismissed(notice_key(*n)))
    }

    pub fn dismiss_notice(&mut self) {
        if let Some(notice) = self.notice() {
            self.prefs.dismiss(notice_key(notice));
            self.status = None;
            self.save_preferences();
        }
    }

    fn notice_message(&self) -> Option<String> {
        self.notice().map(|n| n.message(&self.prefs.ui_language))
    }

    fn save_preferences(&self) {
        if let Err(e) = self.prefs.save_to_path(&self.prefs_path) {
            log::warn!("Failed to save preferences: {e}");
        }
    }
}

fn notice_key(notice: Notice) -> &'static str {
    match notice {
        Notice::EmbeddedBrowser(_) => "embedded-browser",
        Notice::Unsupported => "speech-unsupported",
        Notice::NoVoices => "no-voices",
    }
}

/// Lay out segmented sections as display rows.
pub fn flatten(sections: &[Vec<ContentBlock>]) -> Vec<ViewLine> {
    let mut out = Vec::new();
    for (i, blocks) in sections.iter().enumerate() {
        if i > 0 {
            out.push(ViewLine::SectionBreak);
        }
        for block in blocks {
            if let Some(title) = &block.title {
                out.push(ViewLine::Heading {
                    text: title.clone(),
                    level: block.level.unwrap_or(1),
                });
            }
            out.extend(block_lines(block));
        }
    }
    out
}

fn block_lines(block: &ContentBlock) -> Vec<ViewLine> {
    let lines = block.lines.iter();
    match block.kind {
        BlockKind::Heading => Vec::new(),
        BlockKind::Audio => lines.map(|l| ViewLine::Sentence(Sentence::parse(l))).collect(),
        BlockKind::Translation => lines
            .map(|l| ViewLine::Translation(TranslationLine::parse(l)))
            .collect(),
        BlockKind::List => lines
            .map(|l| ViewLine::Text(format!("• {}", strip_list_marker(l))))
            .collect(),
        BlockKind::Quote => lines
            .map(|l| ViewLine::Text(format!("│ {}", l.trim_start().trim_start_matches('>').trim())))
            .collect(),
        BlockKind::Code => lines.map(|l| ViewLine::Code(l.clone())).collect(),
        BlockKind::Paragraph => lines.map(|l| ViewLine::Text(l.clone())).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingvo_engine::speech::mock::MockHost;
    use lingvo_engine::speech::{ErrorCause, PollPolicy, Voice};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write(dir: &TempDir, relative: &str, content: &str) {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn content() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "lessons/a.md",
            "---\nalias: first\norder: 1\n---\n# First\n\nHello / həˈləʊ / хэллоу / Привет\nBye / baɪ / бай / Пока\n\n## Translation\nHello / Привет\n",
        );
        write(
            &dir,
            "lessons/b.md",
            "---\nalias: second\norder: 2\n---\n# Second\n\n- a note\n",
        );
        dir
    }

    fn app(dir: &TempDir, host: MockHost) -> App<MockHost> {
        app_polling(dir, host, 1)
    }

    fn app_polling(dir: &TempDir, host: MockHost, attempts: u32) -> App<MockHost> {
        let repo = ContentRepository::open(dir.path()).unwrap();
        let engine = SpeechEngine::new().with_poll_policy(PollPolicy {
            attempts,
            interval: Duration::ZERO,
        });
        App::new(
            repo,
            Segmenter::new(),
            engine,
            host,
            Preferences::default(),
            dir.path().join("prefs/preferences.toml"),
        )
        .unwrap()
    }

    fn voiced() -> MockHost {
        MockHost::new().with_voices(vec![
            Voice::new("Alex", "en-US"),
            Voice::new("Daniel", "en-GB"),
            Voice::new("Milena", "ru-RU"),
        ])
    }

    #[test]
    fn opens_first_lesson_on_first_sentence() {
        let dir = content();
        let app = app(&dir, voiced());

        assert_eq!(app.current_lesson().unwrap().alias, "first");
        assert_eq!(
            app.lines[0],
            ViewLine::Heading {
                text: "First".into(),
                level: 1
            }
        );
        assert_eq!(app.line_state.selected(), Some(1));
    }

    #[test]
    fn flatten_marks_sections_and_translations() {
        let sections = Segmenter::new().segment_sections("Hi / хай\n\n## Перевод\nHi / Привет\n---\n- item\n");
        let lines = flatten(&sections);

        assert_eq!(
            lines,
            vec![
                ViewLine::Sentence(Sentence::parse("Hi / хай")),
                ViewLine::Heading {
                    text: "Перевод".into(),
                    level: 2
                },
                ViewLine::Translation(TranslationLine::parse("Hi / Привет")),
                ViewLine::SectionBreak,
                ViewLine::Text("• item".into()),
            ]
        );
    }

    #[test]
    fn speaking_tracks_the_sentence_until_it_ends() {
        let dir = content();
        let mut app = app(&dir, voiced());

        app.speak_selected();
        assert_eq!(app.speaking_line, Some(1));
        assert_eq!(app.host.last_spoken().unwrap().text, "Hello");

        let id = app.host.last_spoken().unwrap().id;
        app.host.finish(id);
        app.tick();
        assert_eq!(app.speaking_line, None);
    }

    #[test]
    fn new_sentence_replaces_the_old_one() {
        let dir = content();
        let mut app = app(&dir, voiced());

        app.speak_selected();
        let first = app.host.last_spoken().unwrap().id;
        app.next_line();
        app.speak_selected();
        app.host.fail(first, ErrorCause::Interrupted);
        app.tick();

        assert_eq!(app.speaking_line, Some(2));
        assert_eq!(app.host.last_spoken().unwrap().text, "Bye");
    }

    #[test]
    fn voices_loading_late_are_found_on_a_later_tick() {
        let dir = content();
        let host = MockHost::new().with_voices_after(2, vec![Voice::new("Alex", "en-US")]);
        let mut app = app_polling(&dir, host, 3);

        app.speak_selected();
        assert_eq!(app.status.as_deref(), Some(LOOKING_FOR_VOICES));
        assert!(app.host.spoken().is_empty());

        app.tick();
        assert_eq!(app.status, None);

        app.speak_selected();
        assert_eq!(app.host.last_spoken().unwrap().text, "Hello");
    }

    #[test]
    fn voices_that_never_load_end_in_a_notice() {
        let dir = content();
        let mut app = app_polling(&dir, MockHost::new(), 3);

        app.speak_selected();
        app.tick();
        assert_eq!(app.status.as_deref(), Some(LOOKING_FOR_VOICES));

        app.tick();
        assert_eq!(app.notice(), Some(Notice::NoVoices));
        assert!(app.status.is_some());
        assert_ne!(app.status.as_deref(), Some(LOOKING_FOR_VOICES));
    }

    #[test]
    fn unavailable_speech_shows_notice() {
        let dir = content();
        let mut app = app(&dir, MockHost::new().without_synthesis());

        app.speak_selected();

        assert_eq!(app.speaking_line, None);
        assert_eq!(
            app.status.as_deref(),
            Some("Speech is not available. Open this page in another browser.")
        );

        app.dismiss_notice();
        assert!(app.notice().is_none());
        assert!(app.prefs.is_dismissed("speech-unsupported"));
    }

    #[test]
    fn rate_changes_are_persisted() {
        let dir = content();
        let mut app = app(&dir, voiced());

        app.slower();
        app.slower();

        let saved = Preferences::load_from_path(dir.path().join("prefs/preferences.toml")).unwrap();
        assert!((saved.speech_rate - 0.8).abs() < 1e-6);
        assert!((app.rate() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn voice_cycles_through_english_voices() {
        let dir = content();
        let mut app = app(&dir, voiced());

        app.cycle_voice();
        assert_eq!(app.voice_name(), Some("Daniel"));
        app.cycle_voice();
        assert_eq!(app.voice_name(), Some("Alex"));
        assert_eq!(app.prefs.voice_name.as_deref(), Some("Alex"));
    }

    #[test]
    fn navigation_moves_between_lessons() {
        let dir = content();
        let mut app = app(&dir, voiced());

        app.go_to_neighbour(false);
        assert_eq!(app.current_lesson().unwrap().alias, "first");

        app.go_to_neighbour(true);
        assert_eq!(app.current_lesson().unwrap().alias, "second");
        assert_eq!(app.lines[1], ViewLine::Text("• a note".into()));
        assert_eq!(app.line_state.selected(), Some(0));
    }
}
