//! Mood classification of generated utterances.
//!
//! Classification is a pure function: curated keyword lists per mood,
//! strictly-highest substring-hit count wins, ties broken by the fixed
//! priority order of [`MOOD_LEXICONS`], zero hits is [`Mood::Neutral`].
//! The word lists are domain content and freely replaceable; the mechanism
//! is the contract.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// The closed, exhaustive set of utterance moods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mood {
    Sarcastic,
    Pressing,
    Irritated,
    Smug,
    Anxious,
    Submissive,
    Upbeat,
    Neutral,
}

impl Mood {
    /// Stress delta fed back into the session state.
    ///
    /// Only the two hostile interviewer moods move the needle.
    pub fn stress_delta(self) -> i32 {
        match self {
            Mood::Sarcastic => 5,
            Mood::Pressing => 3,
            Mood::Irritated
            | Mood::Smug
            | Mood::Anxious
            | Mood::Submissive
            | Mood::Upbeat
            | Mood::Neutral => 0,
        }
    }
}

/// Keyword lexicons in priority order: on a tied hit count, the mood listed
/// earlier wins.
const MOOD_LEXICONS: &[(Mood, &[&str])] = &[
    (
        Mood::Sarcastic,
        &[
            "oh really",
            "interesting...",
            "are you sure",
            "is that it",
            "never mind",
            "next question",
            "if you say so",
        ],
    ),
    (
        Mood::Pressing,
        &[
            "tell me more",
            "walk me through",
            "go deeper",
            "under the hood",
            "be specific",
            "why exactly",
            "elaborate",
        ],
    ),
    (
        Mood::Irritated,
        &[
            "unacceptable",
            "not good enough",
            "how did this happen",
            "disappointing",
            "too slow",
            "sloppy",
            "what is this",
        ],
    ),
    (
        Mood::Smug,
        &[
            "told you",
            "called it",
            "as expected",
            "knew it",
            "no surprise",
            "all along",
        ],
    ),
    (
        Mood::Anxious,
        &[
            "worried",
            "risky",
            "slipping",
            "won't make it",
            "not sure we can",
            "what if",
            "running out of time",
        ],
    ),
    (
        Mood::Submissive,
        &[
            "yes of course",
            "got it",
            "sorry",
            "my fault",
            "apologies",
            "i'll fix it",
            "right away",
        ],
    ),
    (
        Mood::Upbeat,
        &[
            "great",
            "love it",
            "well done",
            "impressive",
            "learned a lot",
            "nice work",
        ],
    ),
];

/// Labels an utterance with exactly one mood tag.
///
/// Deterministic and stateless: the same text always yields the same tag.
pub fn classify(text: &str) -> Mood {
    let lowered = text.to_lowercase();

    let mut best = Mood::Neutral;
    let mut best_hits = 0usize;

    for (mood, keywords) in MOOD_LEXICONS {
        let hits = keywords.iter().filter(|kw| lowered.contains(**kw)).count();
        if hits > best_hits {
            best_hits = hits;
            best = *mood;
        }
    }

    best
}
