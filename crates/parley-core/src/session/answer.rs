//! Answer-quality assessment for gauntlet sessions.
//!
//! Counts hits against a "weak" and a "strong" lexicon, adjusts for answer
//! length, and maps the verdict to fixed stress/confidence deltas. The word
//! lists are domain content and freely replaceable.

use serde::{Deserialize, Serialize};

/// Hedging and filler phrases that mark an answer as weak.
const WEAK_LEXICON: &[&str] = &[
    "i don't know",
    "not sure",
    "no experience",
    "maybe",
    "probably",
    "i guess",
    "i think so",
    "haven't done",
    "never learned",
    "can't remember",
    "kind of",
    "sort of",
    "um",
    "let me think",
];

/// Concrete, ownership-signaling phrases that mark an answer as strong.
const STRONG_LEXICON: &[&str] = &[
    "in my experience",
    "i built",
    "i led",
    "i designed",
    "i implemented",
    "i solved",
    "i was responsible",
    "for example",
    "specifically",
    "the data showed",
    "we improved",
    "we shipped",
    "from scratch",
    "measured",
];

/// Answers shorter than this many chars get a weak-count penalty.
const SHORT_ANSWER_CHARS: usize = 10;
/// Answers longer than this many chars get a strong-count bonus.
const LONG_ANSWER_CHARS: usize = 80;

const SHORT_ANSWER_PENALTY: usize = 2;
const LONG_ANSWER_BONUS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerQuality {
    Weak,
    Normal,
    Strong,
}

/// Verdict plus the state deltas it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerAssessment {
    pub quality: AnswerQuality,
    pub stress_delta: i32,
    pub confidence_delta: i32,
}

/// Classifies one user answer. Pure function of the text.
pub fn assess_answer(answer: &str) -> AnswerAssessment {
    let lowered = answer.to_lowercase();

    let mut weak = WEAK_LEXICON.iter().filter(|kw| lowered.contains(**kw)).count();
    let mut strong = STRONG_LEXICON
        .iter()
        .filter(|kw| lowered.contains(**kw))
        .count();

    let chars = answer.chars().count();
    if chars < SHORT_ANSWER_CHARS {
        weak += SHORT_ANSWER_PENALTY;
    }
    if chars > LONG_ANSWER_CHARS {
        strong += LONG_ANSWER_BONUS;
    }

    if weak > strong + 1 {
        AnswerAssessment {
            quality: AnswerQuality::Weak,
            stress_delta: 15,
            confidence_delta: -10,
        }
    } else if strong > weak + 1 {
        AnswerAssessment {
            quality: AnswerQuality::Strong,
            stress_delta: -5,
            confidence_delta: 10,
        }
    } else {
        AnswerAssessment {
            quality: AnswerQuality::Normal,
            stress_delta: 5,
            confidence_delta: -3,
        }
    }
}
