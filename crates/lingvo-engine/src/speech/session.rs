/// Slowest selectable playback rate.
pub const MIN_RATE: f32 = 0.1;
/// Fastest selectable playback rate; also the default.
pub const MAX_RATE: f32 = 1.0;
pub const RATE_STEP: f32 = 0.1;

/// Per-reader playback settings handed to the speak path.
///
/// Built from persisted preferences when a reader starts and written back
/// whenever the user changes them.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSession {
    rate: f32,
    voice_name: Option<String>,
}

impl Default for SpeechSession {
    fn default() -> Self {
        Self {
            rate: MAX_RATE,
            voice_name: None,
        }
    }
}

impl SpeechSession {
    pub fn new(rate: f32, voice_name: Option<String>) -> Self {
        let mut session = Self {
            rate: MAX_RATE,
            voice_name: voice_name.filter(|n| !n.trim().is_empty()),
        };
        session.set_rate(rate);
        session
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Clamp to the selectable range and snap to one decimal place.
    /// Non-finite input resets to the default.
    pub fn set_rate(&mut self, rate: f32) -> f32 {
        self.rate = if rate.is_finite() {
            ((rate.clamp(MIN_RATE, MAX_RATE)) * 10.0).round() / 10.0
        } else {
            MAX_RATE
        };
        self.rate
    }

    pub fn faster(&mut self) -> f32 {
        self.set_rate(self.rate + RATE_STEP)
    }

    pub fn slower(&mut self) -> f32 {
        self.set_rate(self.rate - RATE_STEP)
    }

    pub fn voice_name(&self) -> Option<&str> {
        self.voice_name.as_deref()
    }

    pub fn set_voice(&mut self, name: Option<String>) {
        self.voice_name = name;
    }
}
