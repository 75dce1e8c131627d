//! `espeak-ng` process backend for the speech controller.
//!
//! Each utterance is one child process reading its text from stdin. Pause and
//! resume stop and continue that process with `SIGSTOP`/`SIGCONT`.

use std::io::Write;
use std::process::{Child, Command, Stdio};
use std::thread;

use zenread_core::{SpeechBackend, SpeechError, SpeechEvent, Utterance, Voice};
use zenread_logging::{reader_debug, reader_warn};

/// espeak-ng's own default speed, words per minute, used for rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const MIN_WORDS_PER_MINUTE: u32 = 80;
const MAX_WORDS_PER_MINUTE: u32 = 450;

pub struct EspeakBackend {
    program: String,
    available: bool,
    child: Option<Child>,
}

impl EspeakBackend {
    /// Probes `program --version` once; an absent binary makes the backend
    /// report itself as unsupported.
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        let available = Command::new(&program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);
        reader_debug!("speech program {} available={}", program, available);
        Self {
            program,
            available,
            child: None,
        }
    }

    fn signal(&self, signal: &str) -> Result<(), SpeechError> {
        let Some(child) = &self.child else {
            return Ok(());
        };
        send_signal(child.id(), signal)
    }
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: &str) -> Result<(), SpeechError> {
    let status = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(pid.to_string())
        .status()
        .map_err(|err| SpeechError::Backend(format!("kill -{signal}: {err}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(SpeechError::Backend(format!(
            "kill -{signal} {pid} exited with {status}"
        )))
    }
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, signal: &str) -> Result<(), SpeechError> {
    Err(SpeechError::Backend(format!(
        "{signal} is not supported on this platform"
    )))
}

pub fn words_per_minute(rate: f32) -> u32 {
    let wpm = (BASE_WORDS_PER_MINUTE * rate).round();
    (wpm.max(0.0) as u32).clamp(MIN_WORDS_PER_MINUTE, MAX_WORDS_PER_MINUTE)
}

/// Parses the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
pub fn parse_voice_table(table: &str) -> Vec<Voice> {
    let mut voices: Vec<Voice> = Vec::new();
    for line in table.lines().skip(1) {
        let columns: Vec<&str> = line.split_whitespace().collect();
        let [_, lang, _, name, ..] = columns.as_slice() else {
            continue;
        };
        if voices.iter().any(|v| v.id == *lang) {
            continue;
        }
        voices.push(Voice {
            id: lang.to_string(),
            name: name.replace('_', " "),
            lang: lang.to_string(),
        });
    }
    voices
}

impl SpeechBackend for EspeakBackend {
    fn is_supported(&self) -> bool {
        self.available
    }

    fn voices(&self) -> Vec<Voice> {
        if !self.available {
            return Vec::new();
        }
        match Command::new(&self.program).arg("--voices").output() {
            Ok(output) if output.status.success() => {
                parse_voice_table(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                reader_warn!("{} --voices exited with {}", self.program, output.status);
                Vec::new()
            }
            Err(err) => {
                reader_warn!("{} --voices failed: {}", self.program, err);
                Vec::new()
            }
        }
    }

    fn start(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.cancel();
        let mut command = Command::new(&self.program);
        command
            .arg("-s")
            .arg(words_per_minute(utterance.rate).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(voice) = &utterance.voice {
            command.arg("-v").arg(voice);
        }
        let mut child = command
            .spawn()
            .map_err(|err| SpeechError::Backend(format!("{}: {err}", self.program)))?;

        // Feed stdin from a thread: long articles overflow the pipe buffer.
        if let Some(mut stdin) = child.stdin.take() {
            let text = utterance.text.clone();
            thread::spawn(move || {
                if let Err(err) = stdin.write_all(text.as_bytes()) {
                    reader_debug!("speech stdin closed early: {}", err);
                }
            });
        }
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            // A stopped process still dies on SIGKILL.
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn pause(&mut self) -> Result<(), SpeechError> {
        self.signal("STOP")
    }

    fn resume(&mut self) -> Result<(), SpeechError> {
        self.signal("CONT")
    }

    fn set_rate(&mut self, rate: f32) -> Result<(), SpeechError> {
        // espeak-ng fixes its speed at launch.
        reader_debug!(
            "rate {} ({} wpm) applies from the next utterance",
            rate,
            words_per_minute(rate)
        );
        Ok(())
    }

    fn poll(&mut self) -> Option<SpeechEvent> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(None) => None,
            Ok(Some(status)) => {
                self.child = None;
                if status.success() {
                    Some(SpeechEvent::Finished)
                } else {
                    Some(SpeechEvent::Failed(format!(
                        "{} exited with {status}",
                        self.program
                    )))
                }
            }
            Err(err) => {
                self.child = None;
                Some(SpeechEvent::Failed(err.to_string()))
            }
        }
    }
}

impl Drop for EspeakBackend {
    fn drop(&mut self) {
        self.cancel();
    }
}
