//! The per-turn state machine.
//!
//! One engine owns one session: its state, transcript, and collaborators.
//! All mutation flows through [`SessionEngine::run_turn`] and
//! [`SessionEngine::abort`], invoked once per turn, never concurrently.
//! Generation calls are the only suspension points and run strictly
//! sequentially within a turn — each persona's context depends on the
//! sanitized output of the personas before it.

use super::answer::assess_answer;
use super::config::{SessionConfig, SessionMode};
use super::ending::{Ending, derive_ending};
use super::state::{SessionPhase, SessionState};
use crate::error::{ParleyError, Result};
use crate::event::EventInjector;
use crate::generate::{ChatMessage, PersonaPrompter, PromptContext, TextGenerator};
use crate::mood::{self, Mood};
use crate::persona::{PersonaRole, Roster};
use crate::sanitize::ResponseSanitizer;
use crate::scorecard::{ScoreCard, generate_scorecard};
use crate::select::RespondentSelector;
use crate::transcript::{Transcript, Turn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::timeout;

/// How many prior turns each generation call sees.
const CONTEXT_WINDOW: usize = 8;

/// One persona's contribution to a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondentReply {
    pub role: PersonaRole,
    pub name: String,
    pub text: String,
    pub mood: Mood,
}

/// Everything the caller learns from one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    /// Replies in speaking order; empty only on collapse/abort turns
    pub replies: Vec<RespondentReply>,
    /// State snapshot after the turn
    pub state: SessionState,
    /// Narration of the event that fired this turn, if any
    pub event: Option<String>,
    /// Present exactly when this turn terminated the session
    pub ending: Option<Ending>,
}

/// Orchestrates one session from first answer to ending.
pub struct SessionEngine {
    config: SessionConfig,
    roster: Roster,
    state: SessionState,
    transcript: Transcript,
    last_respondents: Vec<PersonaRole>,
    selector: RespondentSelector,
    sanitizer: ResponseSanitizer,
    injector: EventInjector,
    generator: Arc<dyn TextGenerator>,
    prompter: Arc<dyn PersonaPrompter>,
    rng: StdRng,
}

impl SessionEngine {
    /// Creates an engine with entropy-seeded randomness.
    pub fn new(
        config: SessionConfig,
        roster: Roster,
        generator: Arc<dyn TextGenerator>,
        prompter: Arc<dyn PersonaPrompter>,
    ) -> Self {
        Self::with_rng(config, roster, generator, prompter, StdRng::from_entropy())
    }

    /// Creates an engine with a fixed seed, for deterministic replay.
    pub fn with_seed(
        config: SessionConfig,
        roster: Roster,
        generator: Arc<dyn TextGenerator>,
        prompter: Arc<dyn PersonaPrompter>,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            config,
            roster,
            generator,
            prompter,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        config: SessionConfig,
        roster: Roster,
        generator: Arc<dyn TextGenerator>,
        prompter: Arc<dyn PersonaPrompter>,
        rng: StdRng,
    ) -> Self {
        let sanitizer = ResponseSanitizer::for_roster(&roster);
        let injector = match config.mode {
            SessionMode::Gauntlet => EventInjector::gauntlet(),
            SessionMode::Roundtable => EventInjector::roundtable(),
        };
        let state = SessionState::new(config.total_rounds);
        Self {
            config,
            roster,
            state,
            transcript: Transcript::new(),
            last_respondents: Vec::new(),
            selector: RespondentSelector::new(),
            sanitizer,
            injector,
            generator,
            prompter,
            rng,
        }
    }

    /// Replaces the event pool, mainly to pin probabilities in tests.
    pub fn with_event_injector(mut self, injector: EventInjector) -> Self {
        self.injector = injector;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Runs one full turn on the participant's message.
    ///
    /// # Errors
    ///
    /// [`ParleyError::NoRespondents`] when every selected persona failed to
    /// generate. The answer-quality delta (and any event delta) stays
    /// applied, the round does not advance, and the turn may be retried.
    ///
    /// # Panics
    ///
    /// Panics if the session is already terminal — that is a caller bug,
    /// not a runtime condition.
    pub async fn run_turn(&mut self, input: &str) -> Result<TurnResult> {
        assert!(
            !self.state.is_terminal(),
            "turn submitted to a terminal session"
        );

        self.transcript.push(Turn::user(input));

        // Answer quality moves the counters only under interview pressure.
        if self.config.mode == SessionMode::Gauntlet {
            let assessment = assess_answer(input);
            tracing::debug!(quality = ?assessment.quality, "answer assessed");
            self.state.apply_stress(assessment.stress_delta);
            self.state.apply_confidence(assessment.confidence_delta);

            if self.state.collapsed() {
                return Ok(self.finish(SessionPhase::Collapsed, Vec::new(), None));
            }
        }

        let event = self
            .injector
            .maybe_fire(&self.roster, &mut self.rng)
            .cloned();
        if let Some(ev) = &event {
            tracing::debug!(event = %ev.text, "session event fired");
            self.state.apply_stress(ev.stress_delta);
            self.state.apply_confidence(ev.confidence_delta);
            if self.state.collapsed() {
                return Ok(self.finish(
                    SessionPhase::Collapsed,
                    Vec::new(),
                    Some(ev.text.clone()),
                ));
            }
        }
        let event_text = event.map(|e| e.text);

        self.state.round += 1;

        let respondents = match self.config.mode {
            SessionMode::Gauntlet => self.selector.select_panel(
                &self.roster,
                self.state.round,
                self.config.chaos,
                &mut self.rng,
            ),
            SessionMode::Roundtable => self.selector.select_group(
                &self.roster,
                input,
                self.config.chaos,
                &self.last_respondents,
                &mut self.rng,
            ),
        };
        assert!(!respondents.is_empty(), "selector returned no respondents");

        let replies = self.collect_replies(&respondents).await;

        if replies.is_empty() {
            // Recoverable: keep the deltas that already happened, but give
            // the round back so a retry does not skip ahead.
            self.state.round -= 1;
            return Err(ParleyError::NoRespondents);
        }

        for reply in &replies {
            self.transcript
                .push(Turn::persona(reply.role, reply.text.clone(), reply.mood));
        }
        self.last_respondents = replies.iter().map(|r| r.role).collect();

        if self.config.mode == SessionMode::Gauntlet && self.state.collapsed() {
            return Ok(self.finish(SessionPhase::Collapsed, replies, event_text));
        }
        if self.state.round >= self.state.total_rounds {
            return Ok(self.finish(SessionPhase::Completed, replies, event_text));
        }

        Ok(TurnResult {
            replies,
            state: self.state.clone(),
            event: event_text,
            ending: None,
        })
    }

    /// Ends the session immediately with the abandonment ending.
    ///
    /// # Panics
    ///
    /// Panics if the session is already terminal.
    pub fn abort(&mut self) -> TurnResult {
        assert!(
            !self.state.is_terminal(),
            "abort submitted to a terminal session"
        );
        self.finish(SessionPhase::Abandoned, Vec::new(), None)
    }

    /// Builds the scorecard for a finished session.
    ///
    /// # Errors
    ///
    /// Returns an internal error while the session is still in progress.
    pub fn scorecard(&mut self) -> Result<ScoreCard> {
        if !self.state.is_terminal() {
            return Err(ParleyError::internal(
                "scorecard requested before the session ended",
            ));
        }
        Ok(generate_scorecard(
            &self.transcript,
            &self.roster,
            &mut self.rng,
        ))
    }

    /// Invokes generation for each respondent in speaking order, chaining
    /// each sanitized reply into the next persona's context. Failures are
    /// logged and the persona skipped; they never abort the turn.
    async fn collect_replies(&mut self, respondents: &[PersonaRole]) -> Vec<RespondentReply> {
        let mut replies: Vec<RespondentReply> = Vec::with_capacity(respondents.len());

        for role in respondents {
            let persona = self
                .roster
                .get(*role)
                .expect("selector only returns roster members");

            let ctx = PromptContext {
                mode: self.config.mode,
                chaos: self.config.chaos,
                round: self.state.round,
                total_rounds: self.state.total_rounds,
                stress: self.state.stress,
                roster: &self.roster,
            };
            let system_prompt = self.prompter.system_prompt(persona, &ctx);

            let mut messages = self.context_messages();
            if !replies.is_empty() {
                messages.push(ChatMessage::user(same_turn_block(&replies)));
            }

            let outcome = timeout(
                self.config.generation_timeout,
                self.generator.generate(&system_prompt, &messages),
            )
            .await;

            let raw = match outcome {
                Err(_) => {
                    tracing::warn!(
                        persona = %role,
                        timeout_secs = self.config.generation_timeout.as_secs(),
                        "generation timed out; skipping persona"
                    );
                    continue;
                }
                Ok(Err(err)) => {
                    tracing::warn!(persona = %role, error = %err, "generation failed; skipping persona");
                    continue;
                }
                Ok(Ok(raw)) => raw,
            };

            let text = self.sanitizer.sanitize(&raw, &persona.name);
            let mood = mood::classify(&text);
            if self.config.mode == SessionMode::Gauntlet {
                self.state.apply_stress(mood.stress_delta());
            }

            replies.push(RespondentReply {
                role: *role,
                name: persona.name.clone(),
                text,
                mood,
            });
        }

        replies
    }

    /// Renders the recent transcript as generation context. Persona turns
    /// are narrated so that a single-voice model can track a multi-party
    /// conversation.
    fn context_messages(&self) -> Vec<ChatMessage> {
        self.transcript
            .tail(CONTEXT_WINDOW)
            .iter()
            .map(|turn| match turn.speaker {
                crate::transcript::Speaker::User => ChatMessage::user(turn.text.clone()),
                crate::transcript::Speaker::Persona(role) => {
                    let name = self
                        .roster
                        .get(role)
                        .map(|p| p.name.as_str())
                        .unwrap_or("someone");
                    ChatMessage::user(format!("({name} said: \"{}\")", turn.text))
                }
            })
            .collect()
    }

    fn finish(
        &mut self,
        phase: SessionPhase,
        replies: Vec<RespondentReply>,
        event: Option<String>,
    ) -> TurnResult {
        self.state.phase = phase;
        let ending = derive_ending(&self.state);
        tracing::info!(?phase, category = ?ending.category, "session ended");
        TurnResult {
            replies,
            state: self.state.clone(),
            event,
            ending: Some(ending),
        }
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }
}

/// Same-turn context block: what earlier respondents already said this turn.
fn same_turn_block(replies: &[RespondentReply]) -> String {
    let lines: Vec<String> = replies
        .iter()
        .map(|r| format!("{} said: \"{}\"", r.name, r.text))
        .collect();
    format!("(Other participants' remarks:\n{})", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GenerationError;
    use crate::persona::{PersonaRole::*, builtin_cast};
    use crate::select::ChaosLevel;
    use crate::session::ending::EndingCategory;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct PlainPrompter;

    impl PersonaPrompter for PlainPrompter {
        fn system_prompt(&self, persona: &crate::persona::Persona, _ctx: &PromptContext<'_>) -> String {
            format!("You are {}.", persona.name)
        }
    }

    /// Pops canned outcomes in order; exhausted means failure.
    struct QueueGenerator {
        replies: Mutex<VecDeque<std::result::Result<String, GenerationError>>>,
    }

    impl QueueGenerator {
        fn new<I>(replies: I) -> Arc<Self>
        where
            I: IntoIterator<Item = std::result::Result<String, GenerationError>>,
        {
            Arc::new(Self {
                replies: Mutex::new(replies.into_iter().collect()),
            })
        }

        fn endless(reply: &str) -> Arc<EndlessGenerator> {
            Arc::new(EndlessGenerator {
                reply: reply.to_string(),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for QueueGenerator {
        async fn generate(
            &self,
            _system_prompt: &str,
            _messages: &[ChatMessage],
        ) -> std::result::Result<String, GenerationError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::Exhausted))
        }
    }

    struct EndlessGenerator {
        reply: String,
    }

    #[async_trait]
    impl TextGenerator for EndlessGenerator {
        async fn generate(
            &self,
            _system_prompt: &str,
            _messages: &[ChatMessage],
        ) -> std::result::Result<String, GenerationError> {
            Ok(self.reply.clone())
        }
    }

    fn panel_roster() -> Roster {
        let cast = builtin_cast();
        Roster::new(vec![
            cast.get(TechLead).unwrap().clone(),
            cast.get(Executive).unwrap().clone(),
            cast.get(Hr).unwrap().clone(),
        ])
    }

    fn gauntlet_engine(generator: Arc<dyn TextGenerator>) -> SessionEngine {
        let config = SessionConfig::new(SessionMode::Gauntlet, ChaosLevel::Mild);
        SessionEngine::with_seed(config, panel_roster(), generator, Arc::new(PlainPrompter), 7)
            .with_event_injector(EventInjector::new(Vec::new(), 0.0))
    }

    #[tokio::test]
    async fn weak_answer_at_high_stress_collapses_before_generation() {
        let mut engine = gauntlet_engine(QueueGenerator::endless("Next question."));
        engine.state_mut().stress = 95;

        let result = engine.run_turn("um, maybe").await.unwrap();

        assert_eq!(result.state.stress, 100);
        assert!(result.replies.is_empty());
        let ending = result.ending.unwrap();
        assert_eq!(ending.category, EndingCategory::Collapse);
        assert!(engine.is_terminal());
        // Collapse before selection: the round did not advance.
        assert_eq!(result.state.round, 1);
    }

    #[tokio::test]
    async fn completing_the_final_round_with_high_confidence_succeeds() {
        let mut engine = gauntlet_engine(QueueGenerator::endless("Noted. Continue."));
        engine.state_mut().round = 9;
        engine.state_mut().confidence = 75;

        let result = engine
            .run_turn("In my experience the fix was simple: I built it, specifically.")
            .await
            .unwrap();

        assert_eq!(result.state.round, 10);
        let ending = result.ending.unwrap();
        assert_eq!(ending.category, EndingCategory::Success);
    }

    #[tokio::test]
    async fn round_advances_by_exactly_one_per_turn() {
        let mut engine = gauntlet_engine(QueueGenerator::endless("Go on."));
        let mut last_round = engine.state().round;
        for _ in 0..4 {
            let result = engine
                .run_turn("I led the migration and we shipped it, for example.")
                .await
                .unwrap();
            assert_eq!(result.state.round, last_round + 1);
            last_round = result.state.round;
            if result.ending.is_some() {
                break;
            }
        }
    }

    #[tokio::test]
    async fn single_persona_failure_is_isolated() {
        let cast = builtin_cast();
        let duo = Roster::new(vec![
            cast.get(TechLead).unwrap().clone(),
            cast.get(Product).unwrap().clone(),
        ]);
        // Roundtable at Mild selects min(2, 2) = 2 respondents; first fails.
        let generator = QueueGenerator::new([
            Err(GenerationError::Transport("connection reset".into())),
            Ok("Ship it next sprint.".to_string()),
        ]);
        let config = SessionConfig::new(SessionMode::Roundtable, ChaosLevel::Mild);
        let mut engine = SessionEngine::with_seed(config, duo, generator, Arc::new(PlainPrompter), 3)
            .with_event_injector(EventInjector::new(Vec::new(), 0.0));

        let result = engine.run_turn("what about the deadline?").await.unwrap();

        assert_eq!(result.replies.len(), 1);
        assert_eq!(result.replies[0].text, "Ship it next sprint.");
        assert!(result.ending.is_none());
    }

    #[tokio::test]
    async fn all_failures_leave_a_retryable_session() {
        let generator = QueueGenerator::new([]);
        let mut engine = gauntlet_engine(generator);
        let round_before = engine.state().round;

        let err = engine.run_turn("um, maybe").await.unwrap_err();
        assert!(matches!(err, ParleyError::NoRespondents));
        assert!(err.is_retryable());

        // Answer delta stayed, round did not advance.
        assert_eq!(engine.state().round, round_before);
        assert_eq!(engine.state().stress, 35);
        assert!(!engine.is_terminal());

        // A retry against a healthy backend completes normally.
        let healthy = QueueGenerator::endless("Try answering properly.");
        engine.generator = healthy;
        let result = engine.run_turn("um, maybe").await.unwrap();
        assert_eq!(result.replies.len(), 1);
        assert_eq!(engine.state().round, round_before + 1);
    }

    #[tokio::test]
    async fn abort_abandons_regardless_of_counters() {
        let mut engine = gauntlet_engine(QueueGenerator::endless("..."));
        engine.state_mut().confidence = 100;

        let result = engine.abort();
        assert_eq!(result.ending.unwrap().category, EndingCategory::Abandoned);
        assert!(engine.is_terminal());
    }

    #[tokio::test]
    #[should_panic(expected = "terminal session")]
    async fn terminal_sessions_reject_further_turns() {
        let mut engine = gauntlet_engine(QueueGenerator::endless("..."));
        engine.abort();
        let _ = engine.run_turn("hello?").await;
    }

    #[tokio::test]
    async fn event_deltas_apply_and_can_collapse() {
        let events = vec![crate::event::SessionEvent {
            text: "The panel exchanges a long glance...".to_string(),
            stress_delta: 40,
            confidence_delta: -10,
            target: None,
        }];
        let generator = QueueGenerator::endless("Well?");
        let config = SessionConfig::new(SessionMode::Gauntlet, ChaosLevel::Mild);
        let mut engine =
            SessionEngine::with_seed(config, panel_roster(), generator, Arc::new(PlainPrompter), 5)
                .with_event_injector(EventInjector::new(events, 1.0));
        engine.state_mut().stress = 70;

        // Normal answer: +5 stress -> 75, event +40 -> clamps at 100.
        let result = engine
            .run_turn("I worked on the billing service last year.")
            .await
            .unwrap();
        assert_eq!(result.state.stress, 100);
        assert!(result.event.is_some());
        assert_eq!(result.ending.unwrap().category, EndingCategory::Collapse);
    }

    #[tokio::test]
    async fn replies_are_sanitized_and_tagged() {
        let generator = QueueGenerator::new([Ok(
            r#"(Ray said: "Are you sure about that? Walk me through it.")"#.to_string(),
        )]);
        let mut engine = gauntlet_engine(generator);

        let result = engine
            .run_turn("I built the pipeline from scratch, specifically for this.")
            .await
            .unwrap();

        let reply = &result.replies[0];
        assert_eq!(reply.text, "Are you sure about that? Walk me through it.");
        assert_eq!(reply.mood, Mood::Sarcastic);
    }

    #[tokio::test]
    async fn scorecard_only_after_termination() {
        let mut engine = gauntlet_engine(QueueGenerator::endless("Fine."));
        assert!(engine.scorecard().is_err());
        engine.abort();
        let card = engine.scorecard().unwrap();
        assert_eq!(card.total_messages, 0);
    }

    #[tokio::test]
    async fn timeout_counts_as_a_failed_persona() {
        struct StallingGenerator;

        #[async_trait]
        impl TextGenerator for StallingGenerator {
            async fn generate(
                &self,
                _system_prompt: &str,
                _messages: &[ChatMessage],
            ) -> std::result::Result<String, GenerationError> {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                Ok("too late".to_string())
            }
        }

        let config = SessionConfig::new(SessionMode::Gauntlet, ChaosLevel::Mild)
            .with_generation_timeout(std::time::Duration::from_millis(10));
        let mut engine = SessionEngine::with_seed(
            config,
            panel_roster(),
            Arc::new(StallingGenerator),
            Arc::new(PlainPrompter),
            1,
        )
        .with_event_injector(EventInjector::new(Vec::new(), 0.0));

        let err = engine.run_turn("hello panel").await.unwrap_err();
        assert!(matches!(err, ParleyError::NoRespondents));
    }
}
