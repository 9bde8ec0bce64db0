use lingvo_engine::content::{BlockKind, RenderedBlock, Segmenter, render_blocks};
use lingvo_engine::speech::mock::MockHost;
use lingvo_engine::speech::{PollPolicy, SpeakOutcome, SpeechEngine, SpeechSession, Voice};
use lingvo_engine::{Catalog, ContentRepository, LESSONS_FOLDER};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::time::Duration;

fn fixture_repo() -> ContentRepository {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/content");
    ContentRepository::open(root).unwrap()
}

#[test]
fn lessons_are_listed_in_order() {
    let repo = fixture_repo();
    let aliases: Vec<_> = repo
        .list_documents(LESSONS_FOLDER)
        .unwrap()
        .into_iter()
        .map(|e| e.alias)
        .collect();
    assert_eq!(aliases, vec!["greetings", "to-be", "numbers"]);
}

#[test]
fn lesson_sections_segment_into_typed_blocks() {
    let repo = fixture_repo();
    let doc = repo.get_by_alias(LESSONS_FOLDER, "greetings").unwrap().unwrap();
    assert_eq!(doc.meta.title(), Some("Greetings"));

    let sections = Segmenter::new().segment_sections(&doc.body);
    assert_eq!(sections.len(), 2);

    let kinds: Vec<_> = sections[0].iter().map(|b| b.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Heading,
            BlockKind::Audio,
            BlockKind::Audio,
            BlockKind::Translation,
        ]
    );
    assert_eq!(sections[0][1].title.as_deref(), Some("Hello"));
    assert_eq!(sections[0][1].lines.len(), 2);
}

#[test]
fn mixed_lesson_renders_lists_and_quotes() {
    let repo = fixture_repo();
    let doc = repo.get_by_alias(LESSONS_FOLDER, "to-be").unwrap().unwrap();
    let rendered = render_blocks(&Segmenter::new().segment(&doc.body));

    assert!(matches!(rendered[0], RenderedBlock::Heading { .. }));
    assert!(matches!(&rendered[1], RenderedBlock::Audio { sentences, .. } if sentences.len() == 2));
    assert_eq!(
        rendered[2],
        RenderedBlock::List {
            title: Some("Notes".to_string()),
            items: vec![
                "<em>am</em> goes with <strong>I</strong>".to_string(),
                "<em>are</em> goes with <strong>you</strong>".to_string(),
            ],
        }
    );
    assert!(matches!(rendered[3], RenderedBlock::Quote { .. }));
}

#[test]
fn navigation_walks_lesson_order() {
    let repo = fixture_repo();

    let first = repo.next_and_prev(LESSONS_FOLDER, "greetings").unwrap();
    assert_eq!(first.prev, None);
    assert_eq!(first.next.unwrap().alias, "to-be");

    let last = repo.next_and_prev(LESSONS_FOLDER, "numbers").unwrap();
    assert_eq!(last.next, None);
    assert_eq!(last.prev.unwrap().alias, "to-be");
}

#[test]
fn catalog_titles_follow_language() {
    let repo = fixture_repo();
    let catalog = Catalog::build(&repo, &["ru"]).unwrap();

    let titles: Vec<_> = catalog.lessons.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Greetings", "The verb \"to be\"", "Numbers"]);

    let info: Vec<_> = catalog.info.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(info, vec!["О проекте", "How to use"]);
}

#[test]
fn clicking_a_sentence_speaks_its_english_part() {
    let repo = fixture_repo();
    let doc = repo.get_by_alias(LESSONS_FOLDER, "numbers").unwrap().unwrap();
    let blocks = Segmenter::new().segment(&doc.body);
    let line = &blocks[1].lines[1];

    let mut host = MockHost::new().with_voices(vec![Voice::new("Samantha", "en-US")]);
    let mut engine = SpeechEngine::new().with_poll_policy(PollPolicy {
        attempts: 1,
        interval: Duration::ZERO,
    });

    let outcome = engine.speak(&mut host, line, &SpeechSession::default());

    assert!(matches!(outcome, SpeakOutcome::Submitted { .. }));
    assert_eq!(host.last_spoken().unwrap().text, "Two");
}
