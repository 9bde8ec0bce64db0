use serde::Serialize;

use super::host::{HostEnvironment, SpeechHost};

/// In-app browsers known to ship speech stubs that accept calls and stay silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmbeddedBrowser {
    Telegram,
    Facebook,
    Instagram,
    Line,
}

impl EmbeddedBrowser {
    pub fn detect(env: &HostEnvironment) -> Option<Self> {
        let ua = env.user_agent.as_str();
        if env.telegram_webapp || ua.contains("Telegram") {
            Some(Self::Telegram)
        } else if ua.contains("FBAN") || ua.contains("FBAV") {
            Some(Self::Facebook)
        } else if ua.contains("Instagram") {
            Some(Self::Instagram)
        } else if ua.contains(" Line/") {
            Some(Self::Line)
        } else {
            None
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Telegram => "Telegram",
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::Line => "LINE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnsupportedReason {
    MissingSynthesis,
    MissingUtterance,
    /// Embedded browser whose speech API failed the trial probe.
    BrokenEmbedded(EmbeddedBrowser),
    /// Reading the voice list failed.
    ProbeFailed,
}

/// Outcome of probing a host, decided once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Capability {
    Supported,
    SupportedWithQuirks(EmbeddedBrowser),
    Unsupported(UnsupportedReason),
}

impl Capability {
    pub fn is_usable(self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Probe a host.
    ///
    /// The API being present is enough for ordinary browsers, whose voice
    /// list may still be loading. Embedded browsers must also build a trial
    /// utterance and list at least one voice.
    pub fn negotiate<H: SpeechHost + ?Sized>(host: &mut H) -> Self {
        let env = host.environment();
        if !env.has_synthesis {
            return Self::Unsupported(UnsupportedReason::MissingSynthesis);
        }
        if !env.has_utterance {
            return Self::Unsupported(UnsupportedReason::MissingUtterance);
        }

        if let Some(embedded) = EmbeddedBrowser::detect(&env) {
            log::info!("{} in-app browser detected, probing speech", embedded.name());
            if let Err(e) = host.trial_utterance() {
                log::warn!("trial utterance failed in {}: {e}", embedded.name());
                return Self::Unsupported(UnsupportedReason::BrokenEmbedded(embedded));
            }
            return match host.voices() {
                Ok(voices) if !voices.is_empty() => Self::SupportedWithQuirks(embedded),
                Ok(_) => {
                    log::warn!("{} exposes speech but lists no voices", embedded.name());
                    Self::Unsupported(UnsupportedReason::BrokenEmbedded(embedded))
                }
                Err(e) => {
                    log::warn!("voice probe failed in {}: {e}", embedded.name());
                    Self::Unsupported(UnsupportedReason::BrokenEmbedded(embedded))
                }
            };
        }

        match host.voices() {
            Ok(voices) => {
                if voices.is_empty() {
                    log::debug!("no voices yet, they may load later");
                }
                Self::Supported
            }
            Err(e) => {
                log::warn!("error checking voice availability: {e}");
                Self::Unsupported(UnsupportedReason::ProbeFailed)
            }
        }
    }
}
