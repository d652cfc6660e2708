//! Multi-session service.
//!
//! Owns the in-memory session registry and the request-level guards
//! (validation, rate limiting, terminal checks) so the engine's invariants
//! can stay invariants. One service instance is shared across callers;
//! individual sessions serialize their turns behind their own lock.

use crate::dto::{NewSessionParams, SessionSummary};
use crate::throttle::TtlRateLimiter;
use crate::validate::{validate_chaos_dial, validate_message, validate_roster_size};
use parley_core::generate::{PersonaPrompter, TextGenerator};
use parley_core::persona::{Roster, builtin_cast, interview_panel};
use parley_core::scorecard::ScoreCard;
use parley_core::session::{SessionConfig, SessionEngine, SessionMode, TurnResult};
use parley_core::{ParleyError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Creates, looks up, and drives sessions.
pub struct SessionService {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionEngine>>>>,
    limiter: Mutex<TtlRateLimiter>,
    generator: Arc<dyn TextGenerator>,
    prompter: Arc<dyn PersonaPrompter>,
}

impl SessionService {
    /// Builds a service over a generation backend, a prompt builder, and an
    /// injected rate-limit store.
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        prompter: Arc<dyn PersonaPrompter>,
        limiter: TtlRateLimiter,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            limiter: Mutex::new(limiter),
            generator,
            prompter,
        }
    }

    /// Creates a session with the built-in roster for its mode.
    pub async fn create_session(&self, params: NewSessionParams) -> Result<SessionSummary> {
        let roster = match params.mode {
            SessionMode::Gauntlet => interview_panel(),
            SessionMode::Roundtable => builtin_cast(),
        };
        self.create_session_with_roster(params, roster).await
    }

    /// Creates a session with a caller-supplied roster.
    pub async fn create_session_with_roster(
        &self,
        params: NewSessionParams,
        roster: Roster,
    ) -> Result<SessionSummary> {
        let chaos = validate_chaos_dial(params.chaos_dial)?;
        validate_roster_size(params.mode, roster.len())?;

        let mut config = SessionConfig::new(params.mode, chaos);
        if let Some(total_rounds) = params.total_rounds {
            config = config.with_total_rounds(total_rounds);
        }

        let engine = match params.seed {
            Some(seed) => SessionEngine::with_seed(
                config,
                roster,
                self.generator.clone(),
                self.prompter.clone(),
                seed,
            ),
            None => SessionEngine::new(
                config,
                roster,
                self.generator.clone(),
                self.prompter.clone(),
            ),
        };

        let id = uuid::Uuid::new_v4().to_string();
        let summary = SessionSummary::from_state(&id, params.mode, engine.state());

        let mut sessions = self.sessions.write().await;
        sessions.insert(id.clone(), Arc::new(Mutex::new(engine)));
        tracing::info!(session_id = %id, mode = ?params.mode, "session created");

        Ok(summary)
    }

    /// Runs one turn. All guards fire before any state mutation.
    pub async fn run_turn(
        &self,
        caller: &str,
        session_id: &str,
        message: &str,
    ) -> Result<TurnResult> {
        validate_message(message)?;
        self.limiter.lock().await.check(caller)?;

        let engine = self.get(session_id).await?;
        let mut engine = engine.lock().await;
        if engine.is_terminal() {
            return Err(ParleyError::validation("session", "already finished"));
        }
        engine.run_turn(message).await
    }

    /// Aborts a session, yielding the abandonment ending.
    pub async fn abort(&self, session_id: &str) -> Result<TurnResult> {
        let engine = self.get(session_id).await?;
        let mut engine = engine.lock().await;
        if engine.is_terminal() {
            return Err(ParleyError::validation("session", "already finished"));
        }
        Ok(engine.abort())
    }

    /// Builds the scorecard for a finished session.
    pub async fn scorecard(&self, session_id: &str) -> Result<ScoreCard> {
        let engine = self.get(session_id).await?;
        let mut engine = engine.lock().await;
        engine.scorecard()
    }

    /// Current registry contents.
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        let sessions = self.sessions.read().await;
        let mut summaries = Vec::with_capacity(sessions.len());
        for (id, engine) in sessions.iter() {
            let engine = engine.lock().await;
            summaries.push(SessionSummary::from_state(
                id,
                engine.config().mode,
                engine.state(),
            ));
        }
        summaries
    }

    /// Drops a session from the registry.
    pub async fn remove_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| ParleyError::SessionNotFound(session_id.to_string()))
    }

    async fn get(&self, session_id: &str) -> Result<Arc<Mutex<SessionEngine>>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| ParleyError::SessionNotFound(session_id.to_string()))
    }
}
