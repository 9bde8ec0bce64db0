//! Platform-independent text-to-speech adapter.
//!
//! A [`SpeechHost`] wraps whatever engine the platform provides. The
//! [`SpeechEngine`] decides once whether that host is usable, picks a voice,
//! replaces in-flight requests and retries genuine failures once.

pub mod capability;
pub mod engine;
pub mod host;
pub mod mock;
pub mod notice;
pub mod session;
pub mod voice;

pub use capability::{Capability, EmbeddedBrowser, UnsupportedReason};
pub use engine::{EventOutcome, PollPolicy, SpeakOutcome, SpeechEngine, SpeechState};
pub use host::{
    ErrorCause, HostEnvironment, HostError, SpeechHost, Utterance, UtteranceEvent,
    UtteranceEventKind,
};
pub use notice::Notice;
pub use session::SpeechSession;
pub use voice::{PREFERRED_LOCALE, Voice, best_match, english_voices, select_voice};
