//! Scripted random occurrences that perturb session state.
//!
//! Events come from a fixed curated pool, fire with a small per-turn
//! probability, and carry stress/confidence deltas the state machine
//! applies. Events naming a persona are skipped when that persona is not in
//! the roster.

use crate::persona::{PersonaRole, Roster};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A scripted occurrence drawn mid-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Narration shown to the participant
    pub text: String,
    pub stress_delta: i32,
    pub confidence_delta: i32,
    /// Persona this event is about, if any
    #[serde(default)]
    pub target: Option<PersonaRole>,
}

impl SessionEvent {
    fn new(
        text: &str,
        stress_delta: i32,
        confidence_delta: i32,
        target: Option<PersonaRole>,
    ) -> Self {
        Self {
            text: text.to_string(),
            stress_delta,
            confidence_delta,
            target,
        }
    }
}

/// Draws events from a pool with a fixed per-turn probability.
#[derive(Debug, Clone)]
pub struct EventInjector {
    pool: Vec<SessionEvent>,
    probability: f64,
}

impl EventInjector {
    pub fn new(pool: Vec<SessionEvent>, probability: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&probability));
        Self { pool, probability }
    }

    /// The curated interview-panel pool, firing at the gauntlet rate.
    pub fn gauntlet() -> Self {
        Self::new(gauntlet_pool(), 0.15)
    }

    /// The curated meeting pool, firing at the roundtable rate.
    pub fn roundtable() -> Self {
        Self::new(roundtable_pool(), 0.10)
    }

    /// Rolls the dice for this turn.
    ///
    /// Returns an event from the pool (pre-filtered to events whose target,
    /// if any, sits in `roster`), or `None` — the common case. The caller
    /// applies the deltas; drawing has no side effect.
    pub fn maybe_fire<R: Rng>(&self, roster: &Roster, rng: &mut R) -> Option<&SessionEvent> {
        if !rng.gen_bool(self.probability) {
            return None;
        }
        let eligible: Vec<&SessionEvent> = self
            .pool
            .iter()
            .filter(|e| e.target.is_none_or(|t| roster.contains(t)))
            .collect();
        eligible.choose(rng).copied()
    }
}

fn gauntlet_pool() -> Vec<SessionEvent> {
    use PersonaRole::*;
    vec![
        SessionEvent::new(
            "The panel flips through your resume and frowns...",
            10,
            -5,
            None,
        ),
        SessionEvent::new(
            "Victor steps out to take a call. Thirty seconds to breathe.",
            -5,
            5,
            Some(Executive),
        ),
        SessionEvent::new("\"Come up to the whiteboard and code it.\"", 15, -10, None),
        SessionEvent::new(
            "Claire pours you a glass of water. \"Relax, take your time.\"",
            -5,
            5,
            Some(Hr),
        ),
        SessionEvent::new(
            "Ray writes a question mark on his pad, then crosses it out.",
            8,
            -5,
            Some(TechLead),
        ),
        SessionEvent::new("The interviewers exchange a long glance...", 10, -8, None),
        SessionEvent::new(
            "\"Open your GitHub. Let's look at your actual code.\"",
            12,
            -5,
            Some(TechLead),
        ),
        SessionEvent::new(
            "\"We're almost out of time. One last question.\"",
            5,
            0,
            None,
        ),
        SessionEvent::new(
            "Dana slides a product mockup across the table: \"Critique this, live.\"",
            12,
            -8,
            Some(Product),
        ),
        SessionEvent::new("Ten full seconds of silence...", 8, -5, None),
        SessionEvent::new(
            "You catch someone drawing an X on the scoring sheet.",
            15,
            -10,
            None,
        ),
        SessionEvent::new(
            "A slow nod from the panel. \"Mm. That answer was fine.\"",
            -8,
            10,
            None,
        ),
    ]
}

fn roundtable_pool() -> Vec<SessionEvent> {
    use PersonaRole::*;
    vec![
        SessionEvent::new(
            "Victor's phone rings and he walks out mid-sentence...",
            0,
            0,
            Some(Executive),
        ),
        SessionEvent::new(
            "Petra knocks over a coffee. \"Sorry! Sorry!\"",
            0,
            0,
            Some(Intern),
        ),
        SessionEvent::new("...awkward silence. Everyone looks at everyone...", 0, 0, None),
        SessionEvent::new(
            "Dana suddenly says: \"Hold on, the requirements changed.\"",
            0,
            0,
            Some(Product),
        ),
        SessionEvent::new(
            "Victor launches into a story: \"Back when I founded this company...\"",
            0,
            0,
            Some(Executive),
        ),
        SessionEvent::new("Sam is visibly fighting sleep...", 0, 0, Some(Employee)),
        SessionEvent::new(
            "Ray and Dana are suddenly shouting over each other!",
            0,
            0,
            Some(TechLead),
        ),
        SessionEvent::new(
            "Claire floats an idea: \"What about a team-building retreat?\"",
            0,
            0,
            Some(Hr),
        ),
        SessionEvent::new(
            "Ray opens his IDE and starts refactoring during the meeting...",
            0,
            0,
            Some(TechLead),
        ),
        SessionEvent::new(
            "Someone's food delivery arrives. The whole room smells of noodles...",
            0,
            0,
            None,
        ),
        SessionEvent::new(
            "Dana produces a forty-page slide deck...",
            0,
            0,
            Some(Product),
        ),
        SessionEvent::new(
            "The meeting is already over time, but Victor keeps talking...",
            0,
            0,
            Some(Executive),
        ),
    ]
}
