//! In-memory [`SpeechHost`] for tests and headless runs.
//!
//! Nothing is spoken. Submitted utterances are recorded and lifecycle events
//! are queued by the caller with [`MockHost::finish`] and [`MockHost::fail`].

use std::collections::VecDeque;

use super::host::{
    ErrorCause, HostEnvironment, HostError, SpeechHost, Utterance, UtteranceEvent,
    UtteranceEventKind,
};
use super::voice::Voice;

#[derive(Debug, Default)]
pub struct MockHost {
    env: HostEnvironment,
    voices: Vec<Voice>,
    /// Number of voice-list reads that come back empty before `voices` shows up.
    voices_delay: u32,
    fail_voice_list: bool,
    fail_trial: bool,
    fail_speak: bool,
    voice_reads: u32,
    cancels: u32,
    spoken: Vec<Utterance>,
    events: VecDeque<UtteranceEvent>,
}

impl MockHost {
    /// A desktop browser with the API present and no voices loaded.
    pub fn new() -> Self {
        Self {
            env: HostEnvironment {
                user_agent: "Mozilla/5.0 (X11; Linux x86_64) Firefox/130.0".to_string(),
                has_synthesis: true,
                has_utterance: true,
                telegram_webapp: false,
            },
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.env.user_agent = ua.into();
        self
    }

    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    /// Voices only appear after `reads` empty reads of the voice list.
    pub fn with_voices_after(mut self, reads: u32, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self.voices_delay = reads;
        self
    }

    pub fn without_synthesis(mut self) -> Self {
        self.env.has_synthesis = false;
        self
    }

    pub fn without_utterance(mut self) -> Self {
        self.env.has_utterance = false;
        self
    }

    pub fn failing_voice_list(mut self) -> Self {
        self.fail_voice_list = true;
        self
    }

    pub fn failing_trial(mut self) -> Self {
        self.fail_trial = true;
        self
    }

    pub fn failing_speak(mut self) -> Self {
        self.fail_speak = true;
        self
    }

    pub fn spoken(&self) -> &[Utterance] {
        &self.spoken
    }

    pub fn last_spoken(&self) -> Option<&Utterance> {
        self.spoken.last()
    }

    pub fn cancels(&self) -> u32 {
        self.cancels
    }

    pub fn voice_reads(&self) -> u32 {
        self.voice_reads
    }

    pub fn start(&mut self, utterance_id: u64) {
        self.push(utterance_id, UtteranceEventKind::Started);
    }

    pub fn finish(&mut self, utterance_id: u64) {
        self.push(utterance_id, UtteranceEventKind::Ended);
    }

    pub fn fail(&mut self, utterance_id: u64, cause: ErrorCause) {
        self.push(utterance_id, UtteranceEventKind::Failed(cause));
    }

    fn push(&mut self, utterance_id: u64, kind: UtteranceEventKind) {
        self.events.push_back(UtteranceEvent { utterance_id, kind });
    }
}

impl SpeechHost for MockHost {
    fn environment(&self) -> HostEnvironment {
        self.env.clone()
    }

    fn voices(&mut self) -> Result<Vec<Voice>, HostError> {
        self.voice_reads += 1;
        if self.fail_voice_list {
            return Err(HostError::Failed("getVoices threw".to_string()));
        }
        if self.voice_reads <= self.voices_delay {
            return Ok(Vec::new());
        }
        Ok(self.voices.clone())
    }

    fn trial_utterance(&mut self) -> Result<(), HostError> {
        if self.fail_trial {
            return Err(HostError::Unavailable("utterance constructor is a stub".to_string()));
        }
        Ok(())
    }

    fn cancel(&mut self) {
        self.cancels += 1;
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), HostError> {
        if self.fail_speak {
            return Err(HostError::Failed("speak rejected".to_string()));
        }
        self.spoken.push(utterance.clone());
        Ok(())
    }

    fn poll_event(&mut self) -> Option<UtteranceEvent> {
        self.events.pop_front()
    }
}
