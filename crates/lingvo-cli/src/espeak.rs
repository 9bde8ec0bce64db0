//! [`SpeechHost`] backed by the `espeak-ng` (or `espeak`) command.
//!
//! Each utterance is one child process fed through stdin. Lifecycle events
//! are produced by polling the child, so the reader's tick loop drives them.

use lingvo_engine::speech::{
    ErrorCause, HostEnvironment, HostError, SpeechHost, Utterance, UtteranceEvent,
    UtteranceEventKind, Voice,
};
use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

const BINARIES: [&str; 2] = ["espeak-ng", "espeak"];

/// eSpeak's default speaking rate in words per minute.
const DEFAULT_WPM: f32 = 175.0;
const MIN_WPM: f32 = 80.0;

struct Playing {
    id: u64,
    child: Child,
}

pub struct EspeakHost {
    binary: Option<PathBuf>,
    playing: Option<Playing>,
    events: VecDeque<UtteranceEvent>,
}

impl EspeakHost {
    /// Look for `espeak-ng`, then `espeak`, on the `PATH`.
    pub fn detect() -> Self {
        let binary = BINARIES.iter().find_map(|name| which::which(name).ok());
        match &binary {
            Some(path) => log::info!("using speech binary {}", path.display()),
            None => log::warn!("neither espeak-ng nor espeak found on PATH"),
        }
        Self::with_binary(binary)
    }

    pub fn with_binary(binary: Option<PathBuf>) -> Self {
        Self {
            binary,
            playing: None,
            events: VecDeque::new(),
        }
    }

    fn binary(&self) -> Result<&PathBuf, HostError> {
        self.binary
            .as_ref()
            .ok_or_else(|| HostError::Unavailable("espeak is not installed".to_string()))
    }

    /// Turn a finished child into an `Ended` or `Failed` event.
    fn reap(&mut self) {
        let Some(playing) = self.playing.as_mut() else {
            return;
        };
        let kind = match playing.child.try_wait() {
            Ok(None) => return,
            Ok(Some(status)) if status.success() => UtteranceEventKind::Ended,
            Ok(Some(status)) => {
                log::warn!("espeak exited with {status}");
                UtteranceEventKind::Failed(ErrorCause::SynthesisFailed)
            }
            Err(e) => {
                log::warn!("waiting on espeak failed: {e}");
                UtteranceEventKind::Failed(ErrorCause::AudioHardware)
            }
        };
        let id = playing.id;
        self.playing = None;
        self.events.push_back(UtteranceEvent {
            utterance_id: id,
            kind,
        });
    }
}

impl SpeechHost for EspeakHost {
    fn environment(&self) -> HostEnvironment {
        let available = self.binary.is_some();
        HostEnvironment {
            user_agent: format!("lingvo-cli/{}", env!("CARGO_PKG_VERSION")),
            has_synthesis: available,
            has_utterance: available,
            telegram_webapp: false,
        }
    }

    fn voices(&mut self) -> Result<Vec<Voice>, HostError> {
        let output = Command::new(self.binary()?).arg("--voices=en").output()?;
        if !output.status.success() {
            return Err(HostError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn trial_utterance(&mut self) -> Result<(), HostError> {
        let status = Command::new(self.binary()?)
            .args(["-q", "test"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(HostError::Failed(format!("trial utterance exited with {status}")))
        }
    }

    fn cancel(&mut self) {
        if let Some(mut playing) = self.playing.take() {
            if let Err(e) = playing.child.kill() {
                log::debug!("espeak already gone: {e}");
            }
            let _ = playing.child.wait();
            self.events.push_back(UtteranceEvent {
                utterance_id: playing.id,
                kind: UtteranceEventKind::Failed(ErrorCause::Interrupted),
            });
        }
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), HostError> {
        let mut cmd = Command::new(self.binary()?);
        if let Some(voice) = &utterance.voice {
            cmd.arg("-v").arg(&voice.lang);
        }
        cmd.arg("-s")
            .arg(words_per_minute(utterance.rate).to_string())
            .arg("-p")
            .arg(pitch(utterance.pitch).to_string())
            .arg("-a")
            .arg(amplitude(utterance.volume).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = cmd.spawn()?;
        if let Err(e) = feed_text(&mut child, &utterance.text) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }

        log::debug!("speaking utterance {}", utterance.id);
        self.playing = Some(Playing {
            id: utterance.id,
            child,
        });
        self.events.push_back(UtteranceEvent {
            utterance_id: utterance.id,
            kind: UtteranceEventKind::Started,
        });
        Ok(())
    }

    fn poll_event(&mut self) -> Option<UtteranceEvent> {
        if self.events.is_empty() {
            self.reap();
        }
        self.events.pop_front()
    }
}

impl Drop for EspeakHost {
    fn drop(&mut self) {
        if let Some(mut playing) = self.playing.take() {
            let _ = playing.child.kill();
            let _ = playing.child.wait();
        }
    }
}

/// Write `text` to the child's stdin and close it; EOF starts synthesis.
fn feed_text(child: &mut Child, text: &str) -> Result<(), HostError> {
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| HostError::Failed("espeak stdin not captured".to_string()))?;
    stdin.write_all(text.as_bytes())?;
    Ok(())
}

/// Parse `espeak-ng --voices` output, one voice per data row:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File          Other Languages
///  2  en-gb              M  English_(Great_Britain) gmw/en
/// ```
fn parse_voices(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 5 || parts[0].parse::<u32>().is_err() {
                return None;
            }
            let name = parts[3].replace('_', " ");
            Some(Voice::new(name, parts[1]))
        })
        .collect()
}

fn words_per_minute(rate: f32) -> u32 {
    (DEFAULT_WPM * rate).max(MIN_WPM).round() as u32
}

/// eSpeak pitch runs 0..=99 with 50 as normal.
fn pitch(pitch: f32) -> u32 {
    (pitch * 50.0).clamp(0.0, 99.0).round() as u32
}

/// eSpeak amplitude runs 0..=200 with 100 as normal.
fn amplitude(volume: f32) -> u32 {
    (volume * 100.0).clamp(0.0, 200.0).round() as u32
}
