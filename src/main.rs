//! Application entry point: console mock-interview partner.
//!
//! # Startup sequence
//!
//! 1. Parse the command line and initialise logging.
//! 2. Load `.env`, then [`AppConfig`] from disk (default on first run).
//! 3. Apply command-line overrides.
//! 4. Load the question bank (built-in questions when missing).
//! 5. Build the decision client and the speech gateway from config.
//! 6. Restore or create the [`Session`].
//! 7. Run the console loop on a current-thread tokio runtime.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use interview_partner::{
    app::{ConsoleApp, ConsoleOptions, InputMode},
    config::{AppConfig, AppPaths, Difficulty, Experience},
    interview::{Interviewer, QuestionBank, Session, SessionConfig, SessionStore},
    llm::ApiChatClient,
    speech::SpeechGateway,
};

#[derive(Debug, Parser)]
#[command(name = "interview-partner", version, about = "Voice-driven mock interview partner")]
struct Cli {
    /// Settings file (default: platform config dir / settings.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Question bank JSON (overrides the configured one).
    #[arg(long)]
    roles: Option<PathBuf>,

    /// Role key to practise, e.g. `software_engineer`.
    #[arg(long)]
    role: Option<String>,

    /// fresher | "1-2 years" | "3-5 years" | senior
    #[arg(long)]
    experience: Option<Experience>,

    /// easy | medium | hard
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Type answers instead of passing recorded WAV files.
    #[arg(long)]
    text: bool,

    /// Do not synthesize interviewer prompts.
    #[arg(long)]
    no_voice: bool,

    /// Continue the last saved session.
    #[arg(long)]
    resume: bool,

    /// Debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // 2. Environment + config
    if let Err(e) = dotenvy::dotenv() {
        log::debug!(".env not loaded: {e}");
    }

    let loaded = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}), using defaults");
        AppConfig::default()
    });

    // 3. Overrides
    if let Some(role) = cli.role {
        config.interview.role = role;
    }
    if let Some(experience) = cli.experience {
        config.interview.experience = experience;
    }
    if let Some(difficulty) = cli.difficulty {
        config.interview.difficulty = difficulty;
    }
    if cli.roles.is_some() {
        config.interview.question_bank = cli.roles;
    }
    if cli.no_voice {
        config.speech.voice_output = false;
    }

    // 4. Question bank
    let bank = QuestionBank::load_from(&config.interview.question_bank_path());
    if !bank.contains(&config.interview.role) {
        log::warn!(
            "role `{}` not in the question bank; using a generic question",
            config.interview.role
        );
    }

    // 5. Collaborators
    if config.llm.resolved_api_key().is_none() {
        log::warn!("No API key configured; decisions will fall back to defaults");
    }
    let client = Arc::new(ApiChatClient::from_config(&config.llm));
    let interviewer = Interviewer::new(
        client,
        bank,
        config.interview.limits,
        config.llm.temperature,
    );
    let speech = SpeechGateway::from_config(&config.speech);
    if !cli.text && !speech.can_transcribe() {
        log::warn!("Recorded answers cannot be transcribed without an API key; try --text");
    }

    // 6. Session
    let paths = AppPaths::new();
    let store = SessionStore::new(paths.session_file.clone());
    let session_config = SessionConfig::from(&config.interview);
    let mut session = match cli.resume.then(|| store.load()).flatten() {
        Some(session) => {
            log::info!(
                "Resuming {} session ({} answers so far)",
                session.phase(),
                session.history().len()
            );
            session
        }
        None => Session::new(session_config),
    };

    let options = ConsoleOptions {
        input: if cli.text { InputMode::Text } else { InputMode::Voice },
        voice_output: config.speech.voice_output,
        audio_dir: paths.audio_dir,
    };
    let app = ConsoleApp::new(interviewer, speech, options).with_store(store);

    // 7. Run
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    rt.block_on(app.run(&mut session, stdin.lock(), &mut stdout))
}
