//! Console front end.
//!
//! # Architecture
//!
//! [`ConsoleApp`] owns the [`Interviewer`] and the [`SpeechGateway`] and runs
//! one session to completion against any `BufRead` / `Write` pair (stdin and
//! stdout in the binary, in-memory buffers in tests).
//!
//! Each turn:
//!
//! 1. print the current [`Step`] and, with voice output on, write the
//!    synthesized prompt to `<audio_dir>/prompt.<ext>`;
//! 2. save the session;
//! 3. read one line: typed answer (`--text`) or a path to a recorded WAV;
//! 4. hand the transcript to [`Interviewer::advance`].
//!
//! Commands accepted at any prompt:
//!
//! | Input | Effect |
//! |-------|--------|
//! | `:reset` | discard the session and restart the warmup |
//! | `:quit`  | save and exit |

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::interview::{Interviewer, Session, SessionStore, Step};
use crate::llm::FeedbackPayload;
use crate::speech::{SpeechAudio, SpeechGateway};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How the candidate's answers arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Each line is the path to a recorded answer, transcribed by the gateway.
    Voice,
    /// Each line is the answer itself.
    Text,
}

#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    pub input: InputMode,
    /// Synthesize each prompt into `audio_dir`.
    pub voice_output: bool,
    pub audio_dir: PathBuf,
}

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Answer(String),
    Reset,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    match line.trim() {
        "" => None,
        ":reset" => Some(Input::Reset),
        ":quit" | ":q" => Some(Input::Quit),
        text => Some(Input::Answer(text.to_string())),
    }
}

// ---------------------------------------------------------------------------
// ConsoleApp
// ---------------------------------------------------------------------------

pub struct ConsoleApp {
    interviewer: Interviewer,
    speech: SpeechGateway,
    store: Option<SessionStore>,
    options: ConsoleOptions,
}

impl ConsoleApp {
    pub fn new(interviewer: Interviewer, speech: SpeechGateway, options: ConsoleOptions) -> Self {
        Self {
            interviewer,
            speech,
            store: None,
            options,
        }
    }

    /// Persist the session to `store` after every turn.
    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Run `session` until the candidate quits or input ends.
    ///
    /// A fresh session starts with the opening warmup question; a resumed one
    /// continues from its pending question.
    pub async fn run<R: BufRead, W: Write>(
        &self,
        session: &mut Session,
        mut input: R,
        out: &mut W,
    ) -> Result<()> {
        writeln!(
            out,
            "Mock interview: {} ({}, {}). Type :reset to restart, :quit to exit.",
            session.config().role,
            session.config().experience,
            session.config().difficulty
        )?;
        if self.options.input == InputMode::Voice {
            writeln!(out, "Answer each question with the path to a recorded WAV file.")?;
        }

        let mut step = if session.is_fresh() {
            self.interviewer.start(session).await
        } else {
            self.interviewer.current(session).await
        };

        loop {
            self.present(&step, out).await?;
            self.save(session);

            let line = match self.read_input(&mut input, out, &step)? {
                Some(line) => line,
                None => break,
            };

            let answer = match line {
                Input::Quit => break,
                Input::Reset => {
                    log::info!("session reset by user");
                    step = self.interviewer.start(session).await;
                    continue;
                }
                Input::Answer(answer) => answer,
            };

            if matches!(step, Step::Feedback(_)) {
                writeln!(out, "The interview is over. Type :reset to practise again or :quit to exit.")?;
                continue;
            }

            let transcript = match self.transcript(&answer, out).await? {
                Some(transcript) => transcript,
                None => continue,
            };
            step = self.interviewer.advance(session, &transcript).await;
        }

        self.save(session);
        writeln!(out, "Goodbye.")?;
        Ok(())
    }

    /// Read until a non-blank line.  `None` on end of input.
    fn read_input<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        out: &mut W,
        step: &Step,
    ) -> Result<Option<Input>> {
        let marker = match (step, self.options.input) {
            (Step::Feedback(_), _) => ":",
            (_, InputMode::Voice) => "wav>",
            (_, InputMode::Text) => ">",
        };
        loop {
            write!(out, "{marker} ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            if let Some(parsed) = parse_input(&line) {
                return Ok(Some(parsed));
            }
        }
    }

    /// The transcript for one answer line, or `None` when the recording
    /// cannot be read (the question is asked again).
    async fn transcript<W: Write>(&self, answer: &str, out: &mut W) -> Result<Option<String>> {
        if self.options.input == InputMode::Text {
            return Ok(Some(answer.to_string()));
        }

        let path = Path::new(answer);
        let audio = match tokio::fs::read(path).await {
            Ok(audio) => audio,
            Err(e) => {
                writeln!(out, "Could not read {}: {e}", path.display())?;
                return Ok(None);
            }
        };
        let transcript = self.speech.transcribe(&audio).await;
        writeln!(out, "You said: {transcript}")?;
        Ok(Some(transcript))
    }

    async fn present<W: Write>(&self, step: &Step, out: &mut W) -> Result<()> {
        match step {
            Step::Question(prompt) => {
                writeln!(out)?;
                writeln!(out, "[{}] Interviewer: {}", prompt.phase, prompt.text)?;
            }
            Step::Feedback(payload) => {
                writeln!(out)?;
                write!(out, "{}", render_feedback(payload))?;
            }
        }

        if self.options.voice_output {
            if let Some(audio) = self.speech.synthesize(&step.spoken_text()).await {
                match write_prompt_audio(&self.options.audio_dir, &audio) {
                    Ok(path) => writeln!(out, "(audio: {})", path.display())?,
                    Err(e) => log::warn!("could not write prompt audio: {e}"),
                }
            }
        }
        Ok(())
    }

    fn save(&self, session: &Session) {
        if let Some(store) = self.store.as_ref() {
            if let Err(e) = store.save(session) {
                log::warn!("could not save session: {e}");
            }
        }
    }
}

/// Write `audio` to `<dir>/prompt.<ext>`, replacing the previous prompt.
pub fn write_prompt_audio(dir: &Path, audio: &SpeechAudio) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("prompt.{}", audio.format.extension()));
    std::fs::write(&path, &audio.bytes)?;
    Ok(path)
}

/// Multi-line console rendering of the final feedback.
pub fn render_feedback(payload: &FeedbackPayload) -> String {
    let mut text = String::from("Final feedback\n");
    for (metric, score) in payload.scores.entries() {
        text.push_str(&format!("  {:<20} {score}/5\n", metric.replace('_', " ")));
    }

    for (title, items) in [
        ("Strengths", &payload.strengths),
        ("Improvements", &payload.improvements),
    ] {
        text.push_str(&format!("{title}:\n"));
        for item in items {
            text.push_str(&format!("  - {item}\n"));
        }
    }

    if !payload.sample_answer.is_empty() {
        text.push_str(&format!("Sample answer:\n  {}\n", payload.sample_answer));
    }
    if !payload.summary.is_empty() {
        text.push_str(&format!("Summary:\n  {}\n", payload.summary));
    }
    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
