use serde::Serialize;

/// Separator between the segments of a speakable line.
pub const SEGMENT_SEPARATOR: &str = " / ";

/// A speakable line: `spoken / phonetic / transcription / translation`.
///
/// Only `spoken` is ever sent to the speech engine. Lines with more than four
/// segments keep the surplus in `translation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub spoken: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Sentence {
    pub fn parse(line: &str) -> Self {
        let mut parts = line.splitn(4, SEGMENT_SEPARATOR).map(str::trim);
        let spoken = parts.next().unwrap_or_default().to_string();
        let mut next = || {
            parts
                .next()
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
        };
        let phonetic = next();
        let transcription = next();
        let translation = next();

        Self {
            spoken,
            phonetic,
            transcription,
            translation,
        }
    }

    /// Text handed to the speech engine.
    pub fn speech_text(&self) -> &str {
        &self.spoken
    }
}

/// A line of a translation block, split once into its two halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationLine {
    pub primary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

impl TranslationLine {
    pub fn parse(line: &str) -> Self {
        match line.split_once(SEGMENT_SEPARATOR) {
            Some((primary, secondary)) => Self {
                primary: primary.to_string(),
                secondary: Some(secondary.to_string()),
            },
            None => Self {
                primary: line.to_string(),
                secondary: None,
            },
        }
    }
}
