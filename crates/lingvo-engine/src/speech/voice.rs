use serde::{Deserialize, Serialize};

/// Locale tried first when no voice has been chosen.
pub const PREFERRED_LOCALE: &str = "en-US";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 tag as reported by the engine, e.g. `en-GB`.
    pub lang: String,
    /// Synthesised on the device rather than by a network service.
    pub local_service: bool,
    pub default: bool,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            local_service: true,
            default: false,
        }
    }

    pub fn remote(mut self) -> Self {
        self.local_service = false;
        self
    }

    pub fn is_english(&self) -> bool {
        normalize_locale(&self.lang).starts_with("en")
    }

    fn has_locale(&self, locale: &str) -> bool {
        normalize_locale(&self.lang) == normalize_locale(locale)
    }
}

/// `en_US`, `EN-us` and `en-US` compare equal.
fn normalize_locale(lang: &str) -> String {
    lang.replace('_', "-").to_ascii_lowercase()
}

/// Voices offered in the voice picker.
pub fn english_voices(voices: &[Voice]) -> Vec<&Voice> {
    voices.iter().filter(|v| v.is_english()).collect()
}

/// Best voice when the user has not chosen one: a network voice in the
/// preferred locale, then any voice in that locale, then any English voice,
/// then whatever is first.
pub fn best_match<'a>(voices: &'a [Voice], locale: &str) -> Option<&'a Voice> {
    voices
        .iter()
        .find(|v| v.has_locale(locale) && !v.local_service)
        .or_else(|| voices.iter().find(|v| v.has_locale(locale)))
        .or_else(|| voices.iter().find(|v| v.is_english()))
        .or_else(|| voices.first())
}

/// The voice named by the user if it still exists, otherwise [`best_match`].
pub fn select_voice<'a>(
    voices: &'a [Voice],
    chosen: Option<&str>,
    locale: &str,
) -> Option<&'a Voice> {
    chosen
        .and_then(|name| voices.iter().find(|v| v.name == name))
        .or_else(|| best_match(voices, locale))
}
