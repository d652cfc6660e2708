//! The `parley` binary: a readline REPL over the session service.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use parley_application::{NewSessionParams, SessionService, TtlRateLimiter};
use parley_core::ParleyError;
use parley_core::generate::{PersonaPrompter, PromptContext, TextGenerator};
use parley_core::persona::{Roster, builtin_cast, interview_panel};
use parley_core::sanitize::ResponseSanitizer;
use parley_core::select::ChaosLevel;
use parley_core::session::{DEFAULT_TOTAL_ROUNDS, INITIAL_STRESS, SessionMode};
use parley_interaction::prompt::{CastPrompter, Position, opening_request};
use parley_interaction::{ChatApiGenerator, GeneratorConfig, ScriptedGenerator};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use std::time::Duration;

mod render;

/// Local play should never trip the limiter under normal typing speed.
const LOCAL_RATE_LIMIT: u32 = 30;
const LOCAL_CALLER: &str = "local";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Stress interview against a fixed panel
    Gauntlet,
    /// Free-form chaotic meeting
    Roundtable,
}

impl From<ModeArg> for SessionMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Gauntlet => SessionMode::Gauntlet,
            ModeArg::Roundtable => SessionMode::Roundtable,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PositionArg {
    Frontend,
    Backend,
    Product,
    Design,
}

impl From<PositionArg> for Position {
    fn from(value: PositionArg) -> Self {
        match value {
            PositionArg::Frontend => Position::Frontend,
            PositionArg::Backend => Position::Backend,
            PositionArg::Product => Position::Product,
            PositionArg::Design => Position::Design,
        }
    }
}

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Parley - turn-based multi-persona workplace simulator", long_about = None)]
struct Cli {
    /// Simulation mode (defaults to gauntlet)
    #[arg(value_enum)]
    mode: Option<ModeArg>,

    /// Intensity dial, 1-3
    #[arg(long, default_value_t = 2)]
    chaos: u32,

    /// Rounds before the session completes
    #[arg(long)]
    rounds: Option<u32>,

    /// Fixed RNG seed for reproducible sessions
    #[arg(long)]
    seed: Option<u64>,

    /// Use the built-in scripted backend instead of a live API
    #[arg(long)]
    offline: bool,

    /// Position the panel is hiring for (gauntlet only)
    #[arg(long, value_enum)]
    position: Option<PositionArg>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mode: SessionMode = cli.mode.unwrap_or(ModeArg::Gauntlet).into();
    let chaos = ChaosLevel::try_from_dial(cli.chaos)
        .ok_or_else(|| anyhow::anyhow!("--chaos must be 1-3"))?;

    let generator: Arc<dyn TextGenerator> = if cli.offline {
        Arc::new(ScriptedGenerator::offline_bank())
    } else {
        let config = GeneratorConfig::load()?;
        Arc::new(ChatApiGenerator::from_config(config))
    };

    let mut prompter = CastPrompter::new();
    if let Some(position) = cli.position {
        prompter = prompter.with_position(position.into());
    }
    let prompter: Arc<dyn PersonaPrompter> = Arc::new(prompter);

    let service = SessionService::new(
        generator.clone(),
        prompter.clone(),
        TtlRateLimiter::new(LOCAL_RATE_LIMIT, Duration::from_secs(60)),
    );

    let roster = match mode {
        SessionMode::Gauntlet => interview_panel(),
        SessionMode::Roundtable => builtin_cast(),
    };

    let mut params = NewSessionParams::new(mode, chaos);
    if let Some(rounds) = cli.rounds {
        params = params.with_total_rounds(rounds);
    }
    if let Some(seed) = cli.seed {
        params = params.with_seed(seed);
    }
    let session = service.create_session(params).await?;

    banner(mode, &roster);

    if mode == SessionMode::Gauntlet {
        open_interview(
            generator.as_ref(),
            prompter.as_ref(),
            &roster,
            chaos,
            cli.rounds.unwrap_or(DEFAULT_TOTAL_ROUNDS),
            cli.position.map(Into::into),
        )
        .await;
    }

    repl(&service, &session.id, mode, &roster).await
}

fn banner(mode: SessionMode, roster: &Roster) {
    let title = match mode {
        SessionMode::Gauntlet => "=== the gauntlet begins ===",
        SessionMode::Roundtable => "=== the meeting convenes ===",
    };
    println!();
    println!("{}", title.bright_magenta().bold());
    let cast: Vec<String> = roster
        .iter()
        .map(|p| format!("{} ({})", p.name, p.title))
        .collect();
    println!("{}", format!("present: {}", cast.join(", ")).bright_black());
    println!(
        "{}",
        "type your words, or /status, /quit, /help".bright_black()
    );
    println!();
}

/// First-round opening: the panel lead asks before the candidate speaks.
/// Display-only; the engine's transcript starts with the first answer.
async fn open_interview(
    generator: &dyn TextGenerator,
    prompter: &dyn PersonaPrompter,
    roster: &Roster,
    chaos: ChaosLevel,
    total_rounds: u32,
    position: Option<Position>,
) {
    let lead = roster.iter().next().expect("roster is never empty");
    let ctx = PromptContext {
        mode: SessionMode::Gauntlet,
        chaos,
        round: 1,
        total_rounds,
        stress: INITIAL_STRESS,
        roster,
    };
    let system_prompt = prompter.system_prompt(lead, &ctx);
    let request = parley_core::generate::ChatMessage::user(opening_request(position));

    let opening = match generator.generate(&system_prompt, &[request]).await {
        Ok(raw) => ResponseSanitizer::for_roster(roster).sanitize(&raw, &lead.name),
        Err(err) => {
            tracing::warn!(error = %err, "opening question generation failed");
            "Let's start simple: introduce yourself.".to_string()
        }
    };
    println!("{} {}", format!("[{}]", lead.name).blue().bold(), opening);
    println!();
}

async fn repl(
    service: &SessionService,
    session_id: &str,
    mode: SessionMode,
    roster: &Roster,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline(&"you ❯ ".green().to_string()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "/quit" | "/exit" => {
                        let result = service.abort(session_id).await?;
                        if let Some(ending) = &result.ending {
                            render::ending(ending);
                        }
                        finish(service, session_id, mode, roster).await;
                        return Ok(());
                    }
                    "/status" => {
                        for summary in service.list_sessions().await {
                            if summary.id == session_id {
                                println!(
                                    "{}",
                                    format!(
                                        "  round {}/{} ({:?})",
                                        summary.round, summary.total_rounds, summary.phase
                                    )
                                    .bright_black()
                                );
                            }
                        }
                        continue;
                    }
                    "/help" => {
                        render::help();
                        continue;
                    }
                    _ => {}
                }

                match service.run_turn(LOCAL_CALLER, session_id, trimmed).await {
                    Ok(result) => {
                        if let Some(event) = &result.event {
                            render::event(event);
                        }
                        if mode == SessionMode::Gauntlet {
                            render::status(&result.state);
                        }
                        for reply in &result.replies {
                            render::reply(reply);
                        }
                        if let Some(ending) = &result.ending {
                            render::ending(ending);
                            finish(service, session_id, mode, roster).await;
                            return Ok(());
                        }
                    }
                    Err(ParleyError::NoRespondents) => {
                        println!(
                            "{}",
                            "  nobody answered — check the backend, then try again"
                                .red()
                        );
                    }
                    Err(ParleyError::RateLimited { retry_after_secs }) => {
                        println!(
                            "{}",
                            format!("  slow down — try again in {retry_after_secs}s").yellow()
                        );
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C — type /quit to walk out".yellow());
            }
            Err(ReadlineError::Eof) => {
                let result = service.abort(session_id).await?;
                if let Some(ending) = &result.ending {
                    render::ending(ending);
                }
                finish(service, session_id, mode, roster).await;
                return Ok(());
            }
            Err(err) => {
                eprintln!("{}", format!("readline error: {err:?}").red());
                return Ok(());
            }
        }
    }
}

async fn finish(service: &SessionService, session_id: &str, mode: SessionMode, roster: &Roster) {
    if mode == SessionMode::Roundtable {
        match service.scorecard(session_id).await {
            Ok(card) => render::scorecard(&card, roster),
            Err(err) => tracing::warn!(error = %err, "scorecard unavailable"),
        }
    }
}
