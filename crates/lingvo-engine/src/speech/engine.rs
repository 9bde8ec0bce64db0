use std::time::{Duration, Instant};

use super::capability::Capability;
use super::host::{ErrorCause, SpeechHost, Utterance, UtteranceEvent, UtteranceEventKind};
use super::notice::Notice;
use super::session::SpeechSession;
use super::voice::{PREFERRED_LOCALE, Voice, english_voices, select_voice};
use crate::content::Sentence;

/// How long to wait for a voice list that loads late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            interval: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    Checking,
    Ready,
    Speaking,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    Submitted { utterance_id: u64 },
    /// Speech cannot be used; see [`SpeechEngine::notice`].
    Unavailable,
    /// Voices are still loading; [`SpeechEngine::poll_voices`] settles it.
    Checking,
    /// The line has nothing to say.
    Empty,
    /// The host refused the utterance.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Started,
    Completed,
    /// A newer request replaced this one.
    Interrupted,
    Retried(ErrorCause),
    Failed(ErrorCause),
    /// The event belongs to an utterance that is no longer current.
    Stale,
}

/// Next scheduled read of an empty voice list.
#[derive(Debug, Clone, Copy)]
struct VoicePoll {
    reads: u32,
    due: Instant,
}

#[derive(Debug, Clone)]
struct InFlight {
    utterance: Utterance,
    retries: u32,
}

/// Drives one platform speech engine: availability check, voice choice,
/// cancel-then-speak submission and bounded retry on failure.
#[derive(Debug)]
pub struct SpeechEngine {
    state: SpeechState,
    capability: Option<Capability>,
    voices: Vec<Voice>,
    voice_poll: Option<VoicePoll>,
    notice: Option<Notice>,
    poll: PollPolicy,
    locale: String,
    max_retries: u32,
    next_id: u64,
    in_flight: Option<InFlight>,
}

impl Default for SpeechEngine {
    fn default() -> Self {
        Self {
            state: SpeechState::Idle,
            capability: None,
            voices: Vec::new(),
            voice_poll: None,
            notice: None,
            poll: PollPolicy::default(),
            locale: PREFERRED_LOCALE.to_string(),
            max_retries: 1,
            next_id: 1,
            in_flight: None,
        }
    }
}

impl SpeechEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn capability(&self) -> Option<Capability> {
        self.capability
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Voices worth offering in a picker.
    pub fn english_voices(&self) -> Vec<&Voice> {
        english_voices(&self.voices)
    }

    /// Voice a request would use under `session`.
    pub fn resolve_voice(&self, session: &SpeechSession) -> Option<&Voice> {
        select_voice(&self.voices, session.voice_name(), &self.locale)
    }

    /// Negotiate capability once, then read the voice list.
    ///
    /// Never blocks and never fails. An empty list leaves the engine
    /// `Checking` until [`SpeechEngine::poll_voices`] has made the remaining
    /// reads; an unusable host leaves it `Unavailable` with a notice.
    pub fn check_availability<H: SpeechHost + ?Sized>(&mut self, host: &mut H) -> SpeechState {
        let capability = match self.capability {
            Some(c) => c,
            None => {
                self.state = SpeechState::Checking;
                let c = Capability::negotiate(host);
                log::info!("speech capability: {c:?}");
                self.capability = Some(c);
                c
            }
        };

        if !capability.is_usable() {
            self.notice = Notice::for_capability(capability);
            self.state = SpeechState::Unavailable;
            return self.state;
        }

        if !self.voices.is_empty() {
            if self.state != SpeechState::Speaking {
                self.state = SpeechState::Ready;
            }
            return self.state;
        }

        if self.voice_poll.is_some() {
            return self.state;
        }
        self.state = SpeechState::Checking;
        self.read_voices(host, 0, Instant::now())
    }

    /// Make the next scheduled voice-list read once its interval has passed.
    ///
    /// Does nothing unless a check is waiting on voices; call it on every tick.
    pub fn poll_voices<H: SpeechHost + ?Sized>(
        &mut self,
        host: &mut H,
        now: Instant,
    ) -> SpeechState {
        if let Some(poll) = self.voice_poll
            && now >= poll.due
        {
            return self.read_voices(host, poll.reads, now);
        }
        self.state
    }

    fn read_voices<H: SpeechHost + ?Sized>(
        &mut self,
        host: &mut H,
        previous_reads: u32,
        now: Instant,
    ) -> SpeechState {
        self.voice_poll = None;
        let reads = previous_reads + 1;
        match host.voices() {
            Ok(voices) if !voices.is_empty() => {
                log::debug!("{} voices after {reads} reads", voices.len());
                self.voices = voices;
                self.notice = None;
                self.state = SpeechState::Ready;
                return self.state;
            }
            Ok(_) => {}
            Err(e) => log::warn!("reading voices failed: {e}"),
        }

        if reads >= self.poll.attempts {
            log::warn!("no voices after {reads} reads, speech unavailable");
            self.notice = Some(Notice::NoVoices);
            self.state = SpeechState::Unavailable;
        } else {
            self.voice_poll = Some(VoicePoll {
                reads,
                due: now + self.poll.interval,
            });
        }
        self.state
    }

    /// Feed a voices-changed notification from the host.
    ///
    /// An empty list outside a running check means the voices went away.
    pub fn voices_changed(&mut self, voices: Vec<Voice>) {
        if !self.capability.is_some_and(Capability::is_usable) {
            return;
        }
        if voices.is_empty() {
            if self.state == SpeechState::Checking {
                return;
            }
            log::warn!("voice list emptied, speech unavailable");
            self.voices.clear();
            self.notice = Some(Notice::NoVoices);
            self.state = SpeechState::Unavailable;
            return;
        }

        let arrived = self.voices.is_empty();
        self.voices = voices;
        self.voice_poll = None;
        if arrived && matches!(self.state, SpeechState::Checking | SpeechState::Unavailable) {
            log::info!("voices arrived, speech ready");
            self.notice = None;
            self.state = SpeechState::Ready;
        }
    }

    /// Speak the first segment of a sentence line, replacing anything in flight.
    pub fn speak<H: SpeechHost + ?Sized>(
        &mut self,
        host: &mut H,
        line: &str,
        session: &SpeechSession,
    ) -> SpeakOutcome {
        if matches!(self.state, SpeechState::Idle | SpeechState::Unavailable) {
            self.check_availability(host);
        }
        match self.state {
            SpeechState::Ready | SpeechState::Speaking => {}
            SpeechState::Checking => return SpeakOutcome::Checking,
            SpeechState::Idle | SpeechState::Unavailable => return SpeakOutcome::Unavailable,
        }

        let sentence = Sentence::parse(line);
        let text = sentence.speech_text().trim();
        if text.is_empty() {
            return SpeakOutcome::Empty;
        }

        host.cancel();
        let utterance = Utterance {
            id: self.take_id(),
            text: text.to_string(),
            voice: self.resolve_voice(session).cloned(),
            rate: session.rate(),
            pitch: 1.0,
            volume: 1.0,
        };

        match host.speak(&utterance) {
            Ok(()) => {
                let utterance_id = utterance.id;
                self.in_flight = Some(InFlight {
                    utterance,
                    retries: 0,
                });
                self.state = SpeechState::Speaking;
                SpeakOutcome::Submitted { utterance_id }
            }
            Err(e) => {
                log::warn!("speech request rejected: {e}");
                self.in_flight = None;
                self.state = SpeechState::Ready;
                SpeakOutcome::Rejected
            }
        }
    }

    /// Apply one lifecycle event reported by the host.
    pub fn handle_event<H: SpeechHost + ?Sized>(
        &mut self,
        host: &mut H,
        event: UtteranceEvent,
    ) -> EventOutcome {
        let current = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.utterance.id == event.utterance_id);
        if !current {
            return EventOutcome::Stale;
        }

        match event.kind {
            UtteranceEventKind::Started => EventOutcome::Started,
            UtteranceEventKind::Ended => {
                self.finish();
                EventOutcome::Completed
            }
            UtteranceEventKind::Failed(cause) if cause.is_benign() => {
                log::debug!("utterance {} {cause:?}", event.utterance_id);
                self.finish();
                EventOutcome::Interrupted
            }
            UtteranceEventKind::Failed(cause) => self.retry(host, cause),
        }
    }

    /// Drain and apply every pending host event.
    pub fn pump<H: SpeechHost + ?Sized>(&mut self, host: &mut H) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();
        while let Some(event) = host.poll_event() {
            outcomes.push(self.handle_event(host, event));
        }
        outcomes
    }

    /// Stop speaking without starting anything new.
    pub fn stop<H: SpeechHost + ?Sized>(&mut self, host: &mut H) {
        host.cancel();
        if self.in_flight.is_some() {
            self.finish();
        }
    }

    pub fn is_speaking(&self) -> bool {
        self.state == SpeechState::Speaking
    }

    fn retry<H: SpeechHost + ?Sized>(&mut self, host: &mut H, cause: ErrorCause) -> EventOutcome {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return EventOutcome::Stale;
        };
        log::warn!("utterance {} failed: {cause:?}", in_flight.utterance.id);

        if in_flight.retries >= self.max_retries {
            self.finish();
            return EventOutcome::Failed(cause);
        }
        in_flight.retries += 1;

        match host.speak(&in_flight.utterance) {
            Ok(()) => {
                log::info!("retrying utterance {}", in_flight.utterance.id);
                EventOutcome::Retried(cause)
            }
            Err(e) => {
                log::warn!("retry rejected: {e}");
                self.finish();
                EventOutcome::Failed(cause)
            }
        }
    }

    fn finish(&mut self) {
        self.in_flight = None;
        if self.state == SpeechState::Speaking {
            self.state = SpeechState::Ready;
        }
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::capability::{EmbeddedBrowser, UnsupportedReason};
    use crate::speech::mock::MockHost;
    use pretty_assertions::assert_eq;

    fn instant() -> PollPolicy {
        PollPolicy {
            attempts: 5,
            interval: Duration::ZERO,
        }
    }

    fn engine() -> SpeechEngine {
        SpeechEngine::new().with_poll_policy(instant())
    }

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("Daniel", "en-GB"),
            Voice::new("Samantha", "en-US"),
        ]
    }

    fn ready_host() -> MockHost {
        MockHost::new().with_voices(voices())
    }

    fn submitted(outcome: SpeakOutcome) -> u64 {
        match outcome {
            SpeakOutcome::Submitted { utterance_id } => utterance_id,
            other => panic!("expected submission, got {other:?}"),
        }
    }

    #[test]
    fn zero_voices_stay_checking_until_polls_run_out() {
        let mut host = MockHost::new();
        let mut engine = engine();

        let outcome = engine.speak(&mut host, "Hello / HH3LOW", &SpeechSession::default());
        assert_eq!(outcome, SpeakOutcome::Checking);
        assert_eq!(engine.notice(), None);

        let now = Instant::now();
        for _ in 2..instant().attempts {
            assert_eq!(engine.poll_voices(&mut host, now), SpeechState::Checking);
        }
        assert_eq!(engine.poll_voices(&mut host, now), SpeechState::Unavailable);
        assert_eq!(engine.notice(), Some(Notice::NoVoices));
        assert!(host.spoken().is_empty());
        // one read while negotiating, then one per attempt
        assert_eq!(host.voice_reads(), 1 + instant().attempts);
    }

    #[test]
    fn polling_waits_for_the_interval() {
        let mut host = MockHost::new();
        let mut engine = SpeechEngine::new().with_poll_policy(PollPolicy {
            attempts: 2,
            interval: Duration::from_secs(60),
        });
        let start = Instant::now();

        assert_eq!(engine.check_availability(&mut host), SpeechState::Checking);
        let reads = host.voice_reads();

        assert_eq!(engine.poll_voices(&mut host, start), SpeechState::Checking);
        assert_eq!(host.voice_reads(), reads);

        let later = start + Duration::from_secs(120);
        assert_eq!(engine.poll_voices(&mut host, later), SpeechState::Unavailable);
        assert_eq!(host.voice_reads(), reads + 1);
    }

    #[test]
    fn repeated_checks_do_not_restart_polling() {
        let mut host = MockHost::new();
        let mut engine = engine();

        engine.check_availability(&mut host);
        let reads = host.voice_reads();
        assert_eq!(engine.check_availability(&mut host), SpeechState::Checking);

        assert_eq!(host.voice_reads(), reads);
    }

    #[test]
    fn late_voices_are_picked_up_by_polling() {
        // empty for the negotiation read, the first check and one poll
        let mut host = MockHost::new().with_voices_after(3, voices());
        let mut engine = engine();
        let now = Instant::now();

        assert_eq!(engine.check_availability(&mut host), SpeechState::Checking);
        assert_eq!(engine.poll_voices(&mut host, now), SpeechState::Checking);
        assert_eq!(engine.poll_voices(&mut host, now), SpeechState::Ready);
        assert_eq!(engine.voices().len(), 2);
    }

    #[test]
    fn voices_changed_recovers_from_no_voices() {
        let mut host = MockHost::new();
        let mut engine = SpeechEngine::new().with_poll_policy(PollPolicy {
            attempts: 1,
            interval: Duration::ZERO,
        });
        engine.check_availability(&mut host);
        assert_eq!(engine.state(), SpeechState::Unavailable);

        engine.voices_changed(voices());

        assert_eq!(engine.state(), SpeechState::Ready);
        assert_eq!(engine.notice(), None);
    }

    #[test]
    fn emptied_voice_list_makes_speech_unavailable() {
        let mut host = ready_host();
        let mut engine = engine();
        let id = submitted(engine.speak(&mut host, "Hello", &SpeechSession::default()));

        engine.voices_changed(Vec::new());

        assert_eq!(engine.state(), SpeechState::Unavailable);
        assert_eq!(engine.notice(), Some(Notice::NoVoices));
        assert!(engine.voices().is_empty());

        host.finish(id);
        assert_eq!(engine.pump(&mut host), vec![EventOutcome::Completed]);
        assert_eq!(engine.state(), SpeechState::Unavailable);
    }

    #[test]
    fn voices_changed_ignored_when_unsupported() {
        let mut host = MockHost::new().without_synthesis();
        let mut engine = engine();
        engine.check_availability(&mut host);

        engine.voices_changed(voices());

        assert_eq!(engine.state(), SpeechState::Unavailable);
        assert_eq!(engine.notice(), Some(Notice::Unsupported));
    }

    #[test]
    fn capability_is_negotiated_once() {
        let mut host = MockHost::new()
            .with_user_agent("Telegram")
            .failing_trial();
        let mut engine = engine();
        engine.check_availability(&mut host);
        engine.check_availability(&mut host);

        assert_eq!(
            engine.capability(),
            Some(Capability::Unsupported(UnsupportedReason::BrokenEmbedded(
                EmbeddedBrowser::Telegram
            )))
        );
        assert_eq!(host.voice_reads(), 0);
    }

    #[test]
    fn speaks_first_segment_with_best_voice() {
        let mut host = ready_host();
        let mut engine = engine();
        let session = SpeechSession::new(0.7, None);

        submitted(engine.speak(&mut host, "Hello / HH3LOW / Хэллоу / Привет", &session));

        let utterance = host.last_spoken().unwrap();
        assert_eq!(utterance.text, "Hello");
        assert_eq!(utterance.voice.as_ref().unwrap().name, "Samantha");
        assert!((utterance.rate - 0.7).abs() < f32::EPSILON);
        assert_eq!(engine.state(), SpeechState::Speaking);
    }

    #[test]
    fn session_voice_is_used() {
        let mut host = ready_host();
        let mut engine = engine();
        let session = SpeechSession::new(1.0, Some("Daniel".into()));

        submitted(engine.speak(&mut host, "Hi", &session));

        assert_eq!(host.last_spoken().unwrap().voice.as_ref().unwrap().name, "Daniel");
    }

    #[test]
    fn each_request_cancels_the_previous() {
        let mut host = ready_host();
        let mut engine = engine();
        let session = SpeechSession::default();

        let first = submitted(engine.speak(&mut host, "One", &session));
        let second = submitted(engine.speak(&mut host, "Two", &session));

        assert_eq!(host.cancels(), 2);
        assert_ne!(first, second);

        // the old utterance reports its interruption after the new one started
        host.fail(first, ErrorCause::Interrupted);
        assert_eq!(engine.pump(&mut host), vec![EventOutcome::Stale]);
        assert_eq!(engine.state(), SpeechState::Speaking);

        host.finish(second);
        assert_eq!(engine.pump(&mut host), vec![EventOutcome::Completed]);
        assert_eq!(engine.state(), SpeechState::Ready);
    }

    #[test]
    fn interruption_is_not_retried() {
        let mut host = ready_host();
        let mut engine = engine();
        let id = submitted(engine.speak(&mut host, "Hello", &SpeechSession::default()));

        host.fail(id, ErrorCause::Interrupted);

        assert_eq!(engine.pump(&mut host), vec![EventOutcome::Interrupted]);
        assert_eq!(host.spoken().len(), 1);
        assert_eq!(engine.state(), SpeechState::Ready);
    }

    #[test]
    fn real_failure_is_retried_once() {
        let mut host = ready_host();
        let mut engine = engine();
        let id = submitted(engine.speak(&mut host, "Hello", &SpeechSession::default()));

        host.fail(id, ErrorCause::Network);
        assert_eq!(
            engine.pump(&mut host),
            vec![EventOutcome::Retried(ErrorCause::Network)]
        );
        assert_eq!(host.spoken().len(), 2);
        assert_eq!(engine.state(), SpeechState::Speaking);

        host.fail(id, ErrorCause::Network);
        assert_eq!(
            engine.pump(&mut host),
            vec![EventOutcome::Failed(ErrorCause::Network)]
        );
        assert_eq!(host.spoken().len(), 2);
        assert_eq!(engine.state(), SpeechState::Ready);
    }

    #[test]
    fn started_event_keeps_speaking() {
        let mut host = ready_host();
        let mut engine = engine();
        let id = submitted(engine.speak(&mut host, "Hello", &SpeechSession::default()));

        host.start(id);
        assert_eq!(engine.pump(&mut host), vec![EventOutcome::Started]);
        assert!(engine.is_speaking());
    }

    #[test]
    fn rejected_speak_returns_to_ready() {
        let mut host = ready_host().failing_speak();
        let mut engine = engine();

        assert_eq!(
            engine.speak(&mut host, "Hello", &SpeechSession::default()),
            SpeakOutcome::Rejected
        );
        assert_eq!(engine.state(), SpeechState::Ready);
    }

    #[test]
    fn blank_sentence_is_not_spoken() {
        let mut host = ready_host();
        let mut engine = engine();

        assert_eq!(
            engine.speak(&mut host, "   / phonetic only", &SpeechSession::default()),
            SpeakOutcome::Empty
        );
        assert!(host.spoken().is_empty());
    }

    #[test]
    fn stop_cancels_and_returns_to_ready() {
        let mut host = ready_host();
        let mut engine = engine();
        let id = submitted(engine.speak(&mut host, "Hello", &SpeechSession::default()));

        engine.stop(&mut host);
        assert_eq!(engine.state(), SpeechState::Ready);

        host.finish(id);
        assert_eq!(engine.pump(&mut host), vec![EventOutcome::Stale]);
    }
}
