//! Post-hoc session scorecard.
//!
//! A derived-only view over a finished transcript: message counts, buzzword
//! and jargon tallies, a normalized jargon-density metric, interruption
//! flags, the most quotable line, and a star rating. Recomputed on demand,
//! never stored.

use crate::persona::{PersonaRole, Roster};
use crate::transcript::{Speaker, Transcript};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hollow-reassurance vocabulary: the sound of a promise with nothing in it.
const REASSURANCE_LEXICON: &[&str] = &[
    "equity",
    "stock options",
    "growth opportunity",
    "huge potential",
    "big picture",
    "exposure",
    "when we ipo",
    "back when i",
    "we're a family",
    "long-term vision",
    "next level",
];

/// Generic corporate jargon.
const JARGON_LEXICON: &[&str] = &[
    "synergy",
    "alignment",
    "close the loop",
    "granularity",
    "leverage",
    "deep dive",
    "low-hanging fruit",
    "bandwidth",
    "circle back",
    "touch base",
    "north star",
    "first principles",
    "end to end",
    "mvp",
    "roi",
    "okr",
    "kpi",
];

/// Phrases that read as cutting someone off.
const INTERRUPTION_PHRASES: &[&str] = &["hold on", "wait,", "let me stop you", "if i may cut in"];

/// Stock closing verdicts, drawn uniformly at random.
const CLOSING_LINES: &[&str] = &[
    "Another meeting that could have been an email.",
    "A very successful meeting: nothing was decided.",
    "A gathering of time-management masters.",
    "Jargon levels exceeded safe limits; please ventilate the room.",
    "Effective information density: approximately zero.",
    "A spectacular episode of workplace theater.",
];

/// Normalization window: one jargon hit per this many chars counts as 100%.
const DENSITY_CHARS_PER_HIT: f64 = 20.0;

/// The longest non-user utterance, attributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotableLine {
    pub speaker: String,
    pub text: String,
}

/// Aggregated summary of a finished session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Non-user messages in the transcript
    pub total_messages: usize,
    /// Message counts per persona
    pub messages_per_persona: HashMap<PersonaRole, usize>,
    /// Hollow-reassurance lexicon hits across all non-user turns
    pub reassurance_count: usize,
    /// Jargon hits normalized by transcript length, clamped to [0,100]
    pub jargon_density: u32,
    /// Always zero. Working as intended.
    pub effective_decisions: usize,
    /// Turns that read as interruptions
    pub interruption_count: usize,
    /// Persona with the most messages, roster order breaking ties
    pub top_contributor: Option<PersonaRole>,
    pub quotable_line: Option<QuotableLine>,
    /// 1-5 stars, docked for buzzwords and interruptions
    pub rating: u8,
    pub closing_line: String,
}

/// Builds the scorecard for a finished transcript. Pure over its inputs;
/// only the closing-line draw touches the RNG.
pub fn generate_scorecard<R: Rng>(
    transcript: &Transcript,
    roster: &Roster,
    rng: &mut R,
) -> ScoreCard {
    let mut messages_per_persona: HashMap<PersonaRole, usize> = HashMap::new();
    let mut reassurance_count = 0usize;
    let mut jargon_count = 0usize;
    let mut interruption_count = 0usize;
    let mut total_chars = 0usize;
    let mut quotable: Option<(usize, QuotableLine)> = None;

    for turn in transcript.turns() {
        let role = match turn.speaker {
            Speaker::User => continue,
            Speaker::Persona(role) => role,
        };

        *messages_per_persona.entry(role).or_insert(0) += 1;
        let chars = turn.text.chars().count();
        total_chars += chars;

        let lowered = turn.text.to_lowercase();
        reassurance_count += REASSURANCE_LEXICON
            .iter()
            .filter(|kw| lowered.contains(**kw))
            .count();
        jargon_count += JARGON_LEXICON
            .iter()
            .filter(|kw| lowered.contains(**kw))
            .count();
        if INTERRUPTION_PHRASES.iter().any(|p| lowered.contains(*p)) {
            interruption_count += 1;
        }

        if quotable.as_ref().is_none_or(|(len, _)| chars > *len) {
            let speaker = roster
                .get(role)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| role.to_string());
            quotable = Some((
                chars,
                QuotableLine {
                    speaker,
                    text: turn.text.clone(),
                },
            ));
        }
    }

    let total_messages: usize = messages_per_persona.values().sum();

    let jargon_density = if total_chars > 0 {
        let density =
            (jargon_count as f64 / (total_chars as f64 / DENSITY_CHARS_PER_HIT)) * 100.0;
        (density.round() as u32).min(100)
    } else {
        0
    };

    // Earliest roster member wins ties, so the result is deterministic.
    let mut top: Option<(PersonaRole, usize)> = None;
    for role in roster.roles() {
        let Some(&count) = messages_per_persona.get(&role) else {
            continue;
        };
        if top.is_none_or(|(_, best)| count > best) {
            top = Some((role, count));
        }
    }
    let top_contributor = top.map(|(role, _)| role);

    let rating = (5i64 - (reassurance_count / 3) as i64 - (interruption_count / 2) as i64)
        .clamp(1, 5) as u8;

    let closing_line = CLOSING_LINES
        .choose(rng)
        .copied()
        .unwrap_or(CLOSING_LINES[0])
        .to_string();

    ScoreCard {
        total_messages,
        messages_per_persona,
        reassurance_count,
        jargon_density,
        effective_decisions: 0,
        interruption_count,
        top_contributor,
        quotable_line: quotable.map(|(_, q)| q),
        rating,
        closing_line,
    }
}
