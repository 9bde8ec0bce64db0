use serde::Serialize;

use super::capability::{Capability, EmbeddedBrowser, UnsupportedReason};

/// Passive, user-visible explanation of why sentences cannot be played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// Speech is broken inside an in-app browser.
    EmbeddedBrowser(EmbeddedBrowser),
    /// The platform has no usable speech engine.
    Unsupported,
    /// The engine never listed a voice.
    NoVoices,
}

impl Notice {
    pub fn for_capability(capability: Capability) -> Option<Self> {
        match capability {
            Capability::Supported | Capability::SupportedWithQuirks(_) => None,
            Capability::Unsupported(UnsupportedReason::BrokenEmbedded(browser)) => {
                Some(Self::EmbeddedBrowser(browser))
            }
            Capability::Unsupported(_) => Some(Self::Unsupported),
        }
    }

    /// Message in the reader's UI language; anything but Russian gets English.
    pub fn message(self, ui_language: &str) -> String {
        let russian = ui_language.starts_with("ru");
        match (self, russian) {
            (Self::EmbeddedBrowser(b), false) => format!(
                "Speech does not work in the {} browser. Open this page in Chrome or another browser.",
                b.name()
            ),
            (Self::EmbeddedBrowser(b), true) => format!(
                "В браузере {} озвучивание не работает. Откройте в Chrome или другом браузере.",
                b.name()
            ),
            (Self::Unsupported, false) => {
                "Speech is not available. Open this page in another browser.".to_string()
            }
            (Self::Unsupported, true) => {
                "Озвучивание не работает. Откройте страницу в другом браузере.".to_string()
            }
            (Self::NoVoices, false) => "No voices are available for speech.".to_string(),
            (Self::NoVoices, true) => "Нет доступных голосов.".to_string(),
        }
    }
}
