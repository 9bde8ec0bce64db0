use super::voice::Voice;

/// What a platform reports about its speech support before anything is spoken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnvironment {
    pub user_agent: String,
    /// The synthesis engine object exists.
    pub has_synthesis: bool,
    /// Utterances can be constructed.
    pub has_utterance: bool,
    /// The host declared itself a Telegram web app.
    pub telegram_webapp: bool,
}

/// One request to the synthesis engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Identifies the request in lifecycle events.
    pub id: u64,
    pub text: String,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// Why an utterance stopped early, mirroring the error codes speech engines report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCause {
    Interrupted,
    Canceled,
    AudioBusy,
    AudioHardware,
    Network,
    SynthesisUnavailable,
    SynthesisFailed,
    LanguageUnavailable,
    VoiceUnavailable,
    TextTooLong,
    InvalidArgument,
    NotAllowed,
}

impl ErrorCause {
    /// Map an engine error code; unknown codes count as a synthesis failure.
    pub fn from_code(code: &str) -> Self {
        match code {
            "interrupted" => Self::Interrupted,
            "canceled" => Self::Canceled,
            "audio-busy" => Self::AudioBusy,
            "audio-hardware" => Self::AudioHardware,
            "network" => Self::Network,
            "synthesis-unavailable" => Self::SynthesisUnavailable,
            "language-unavailable" => Self::LanguageUnavailable,
            "voice-unavailable" => Self::VoiceUnavailable,
            "text-too-long" => Self::TextTooLong,
            "invalid-argument" => Self::InvalidArgument,
            "not-allowed" => Self::NotAllowed,
            _ => Self::SynthesisFailed,
        }
    }

    /// Interruption and cancellation happen whenever a newer request replaces
    /// the current one and are never retried.
    pub fn is_benign(self) -> bool {
        matches!(self, Self::Interrupted | Self::Canceled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtteranceEventKind {
    Started,
    Ended,
    Failed(ErrorCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtteranceEvent {
    pub utterance_id: u64,
    pub kind: UtteranceEventKind,
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("speech synthesis unavailable: {0}")]
    Unavailable(String),
    #[error("speech host failed: {0}")]
    Failed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Platform speech engine.
///
/// The engine is a singleton owned by the platform: `speak` replaces rather
/// than queues, and completion is reported later through `poll_event`.
pub trait SpeechHost {
    fn environment(&self) -> HostEnvironment;

    /// Voices currently known to the engine. May be empty while they load.
    fn voices(&mut self) -> Result<Vec<Voice>, HostError>;

    /// Construct an utterance without speaking it.
    fn trial_utterance(&mut self) -> Result<(), HostError>;

    /// Stop whatever is being spoken.
    fn cancel(&mut self);

    fn speak(&mut self, utterance: &Utterance) -> Result<(), HostError>;

    /// Next lifecycle event of a submitted utterance, if one is pending.
    fn poll_event(&mut self) -> Option<UtteranceEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("interrupted", ErrorCause::Interrupted, true)]
    #[case("canceled", ErrorCause::Canceled, true)]
    #[case("network", ErrorCause::Network, false)]
    #[case("audio-busy", ErrorCause::AudioBusy, false)]
    #[case("something-new", ErrorCause::SynthesisFailed, false)]
    fn maps_error_codes(#[case] code: &str, #[case] cause: ErrorCause, #[case] benign: bool) {
        assert_eq!(ErrorCause::from_code(code), cause);
        assert_eq!(cause.is_benign(), benign);
    }
}
