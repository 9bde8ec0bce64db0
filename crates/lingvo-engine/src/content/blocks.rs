use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Headings whose following lines are a translation rather than sentences to speak.
pub const DEFAULT_TRANSLATION_TITLES: &[&str] = &["Translation", "Перевод"];

/// Line that separates the sections of a document body.
pub const SECTION_BREAK: &str = "---";

const HEADING_MARKER: char = '#';
const QUOTE_MARKER: char = '>';
const FENCE_BACKTICKS: &str = "```";
const FENCE_TILDES: &str = "~~~";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// A heading with no lines of its own.
    Heading,
    /// Sentences to be spoken, one per line.
    Audio,
    /// Lines under a reserved translation heading.
    Translation,
    List,
    Quote,
    Code,
    Paragraph,
}

/// A contiguous, classified run of body lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    pub kind: BlockKind,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Number of `#` markers on the heading that produced `title`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

/// Line-oriented body segmenter.
///
/// A heading line closes the open block and titles the next one; a blank
/// line closes the open block. Blocks are classified once closed.
#[derive(Debug, Clone)]
pub struct Segmenter {
    default_kind: BlockKind,
    translation_titles: Vec<String>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            default_kind: BlockKind::Audio,
            translation_titles: DEFAULT_TRANSLATION_TITLES
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind assigned to blocks no other rule claims. Lessons use `Audio`,
    /// info pages `Paragraph`.
    pub fn with_default_kind(mut self, kind: BlockKind) -> Self {
        self.default_kind = kind;
        self
    }

    pub fn with_translation_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.translation_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_kind(&self) -> BlockKind {
        self.default_kind
    }

    pub fn segment(&self, body: &str) -> Vec<ContentBlock> {
        let mut builder = BlockBuilder::new(self);
        for line in body.lines() {
            builder.push(line);
        }
        builder.finish()
    }

    /// Segment every `---`-separated section of the body independently.
    pub fn segment_sections(&self, body: &str) -> Vec<Vec<ContentBlock>> {
        split_sections(body)
            .into_iter()
            .map(|section| self.segment(&section))
            .collect()
    }

    /// Classify accumulated lines. Code, list and quote markers take
    /// precedence over the title-based and default kinds.
    pub fn classify(&self, title: Option<&str>, lines: &[String]) -> BlockKind {
        if lines.is_empty() {
            return BlockKind::Heading;
        }
        if lines.iter().any(|l| is_fence(l)) {
            return BlockKind::Code;
        }
        if lines.iter().any(|l| is_list_item(l)) {
            return BlockKind::List;
        }
        if lines.iter().any(|l| l.trim_start().starts_with(QUOTE_MARKER)) {
            return BlockKind::Quote;
        }
        if let Some(title) = title
            && self.is_translation_title(title)
        {
            return BlockKind::Translation;
        }
        self.default_kind
    }

    fn is_translation_title(&self, title: &str) -> bool {
        let title = title.trim();
        self.translation_titles
            .iter()
            .any(|t| t.trim().to_lowercase() == title.to_lowercase())
    }
}

/// Segment a lesson body with the default rules.
pub fn segment(body: &str) -> Vec<ContentBlock> {
    Segmenter::default().segment(body)
}

/// Split a body on lines consisting solely of `---`, dropping empty sections.
pub fn split_sections(body: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.lines() {
        if line.trim_end() == SECTION_BREAK {
            push_section(&mut sections, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }
    push_section(&mut sections, &current);
    sections
}

fn push_section(sections: &mut Vec<String>, lines: &[&str]) {
    let text = lines.join("\n");
    if !text.trim().is_empty() {
        sections.push(text);
    }
}

/// Splits a heading line into its level and trimmed text.
pub fn parse_heading(line: &str) -> Option<(u8, &str)> {
    if !line.starts_with(HEADING_MARKER) {
        return None;
    }
    let text = line.trim_start_matches(HEADING_MARKER);
    let level = (line.len() - text.len()).min(u8::MAX as usize) as u8;
    Some((level, text.trim()))
}

pub fn is_fence(line: &str) -> bool {
    let t = line.trim();
    t.starts_with(FENCE_BACKTICKS) || t.starts_with(FENCE_TILDES)
}

pub fn is_list_item(line: &str) -> bool {
    list_item_regex().is_match(line)
}

/// Returns the item text with its bullet or number stripped.
pub fn strip_list_marker(line: &str) -> &str {
    match list_item_regex().find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

fn list_item_regex() -> &'static Regex {
    static LIST_ITEM: OnceLock<Regex> = OnceLock::new();
    LIST_ITEM.get_or_init(|| {
        Regex::new(r"^(?:[\s-]*[-*+]|\s*\d+[.)])\s").expect("Invalid list item regex")
    })
}

struct BlockBuilder<'a> {
    segmenter: &'a Segmenter,
    title: Option<String>,
    level: Option<u8>,
    lines: Vec<String>,
    out: Vec<ContentBlock>,
}

impl<'a> BlockBuilder<'a> {
    fn new(segmenter: &'a Segmenter) -> Self {
        Self {
            segmenter,
            title: None,
            level: None,
            lines: vec![],
            out: vec![],
        }
    }

    fn push(&mut self, line: &str) {
        if let Some((level, text)) = parse_heading(line) {
            self.flush();
            self.title = Some(text.to_string());
            self.level = Some(level);
            return;
        }

        if line.trim().is_empty() {
            self.flush();
            return;
        }

        self.lines.push(line.to_string());
    }

    fn flush(&mut self) {
        if self.title.is_none() && self.lines.is_empty() {
            return;
        }
        let lines = std::mem::take(&mut self.lines);
        let title = self.title.take();
        let kind = self.segmenter.classify(title.as_deref(), &lines);
        self.out.push(ContentBlock {
            kind,
            lines,
            title,
            level: self.level.take(),
        });
    }

    fn finish(mut self) -> Vec<ContentBlock> {
        self.flush();
        self.out
    }
}
