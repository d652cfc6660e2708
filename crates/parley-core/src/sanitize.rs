//! Cleanup of structural artifacts in generated utterances.
//!
//! Generation is conditioned on prior turns rendered as narrated text
//! (`(Name said: "...")`) so every persona sees the whole conversation. The
//! model sometimes echoes that narration style back, prefixes its own name,
//! duplicates its line after the narration, or injects other personas'
//! lines. All of that must be stripped before the text re-enters the
//! transcript, or it compounds across turns.
//!
//! The transform is a bounded fixed point: one pass applies every stripping
//! rule once, and passes repeat until the text stops changing or
//! [`MAX_PASSES`] is reached. Running the sanitizer on its own output is a
//! no-op for any input whose artifacts nest no deeper than the pass limit.

use crate::persona::Roster;
use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on stripping passes.
pub const MAX_PASSES: usize = 5;

/// Minimum surviving length (in chars) before the fallback kicks in.
const MIN_LEN: usize = 2;

/// Substitute utterance when sanitation leaves nothing usable.
const FALLBACK: &str = "Take a moment and think that one over.";

/// `(other participants: "...")` style wrapper, any known label.
static GENERIC_NARRATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)[（(](?:[Oo]ther (?:participants|interviewers|panelists))(?:' (?:speech|remarks))?\s*[:：]?\s*["“「]?(.+?)["”」]?[）)]"#,
    )
    .expect("generic narration pattern")
});

/// A single layer of quotes wrapping the entire text.
static WRAPPING_QUOTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)^["“「](.+)["”」]$"#).expect("wrapping quote pattern"));

struct NameRules {
    name: String,
    narrated: Regex,
    bracket_prefix: Regex,
    bare_prefix: Regex,
    inline_fragment: Regex,
}

impl NameRules {
    fn compile(name: &str) -> Self {
        let n = regex::escape(name);
        Self {
            name: name.to_string(),
            narrated: Regex::new(&format!(
                r#"(?s)[（(]{n}(?:\s*(?:said|says)|说)\s*[:：]\s*["“「](.+?)["”」][）)]"#
            ))
            .expect("narrated pattern"),
            bracket_prefix: Regex::new(&format!(r#"^\s*\[{n}\]\s*[:：]\s*"#))
                .expect("bracket prefix pattern"),
            bare_prefix: Regex::new(&format!(r#"^\s*{n}\s*[:：]\s*"#))
                .expect("bare prefix pattern"),
            inline_fragment: Regex::new(&format!(r#"\s*\[{n}\]\s*[:：][^\n]*"#))
                .expect("inline fragment pattern"),
        }
    }
}

/// Strips narration wrappers, name prefixes, and foreign speech fragments
/// from generated text. Built once per roster; patterns are precompiled.
pub struct ResponseSanitizer {
    rules: Vec<NameRules>,
}

impl ResponseSanitizer {
    /// Builds a sanitizer aware of the given display names.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            rules: names.iter().map(|n| NameRules::compile(n.as_ref())).collect(),
        }
    }

    /// Builds a sanitizer for every display name in the roster.
    pub fn for_roster(roster: &Roster) -> Self {
        Self::new(&roster.names())
    }

    /// Cleans `raw` as spoken by `speaker` (a display name known to the
    /// sanitizer). Returns display- and transcript-ready text; never empty.
    pub fn sanitize(&self, raw: &str, speaker: &str) -> String {
        let mut text = raw.trim().to_string();

        for _ in 0..MAX_PASSES {
            let next = self.pass(&text, speaker);
            if next == text {
                break;
            }
            text = next;
        }

        if text.chars().count() < MIN_LEN || is_ellipsis(&text) {
            return FALLBACK.to_string();
        }
        text
    }

    /// One application of every stripping rule, in a fixed order.
    fn pass(&self, input: &str, speaker: &str) -> String {
        let mut text = input.to_string();

        // Nested narrated-quote wrappers, per known name, then the generic
        // "other participants" wrapper.
        for rules in &self.rules {
            text = rules.narrated.replace_all(&text, "$1").into_owned();
        }
        text = GENERIC_NARRATION.replace_all(&text, "$1").into_owned();
        let narration_stripped = text != input;

        // Leading "Name:" / "[Name]:" labels, any known name including the
        // speaker's own.
        for rules in &self.rules {
            text = rules.bracket_prefix.replace(&text, "").into_owned();
            text = rules.bare_prefix.replace(&text, "").into_owned();
        }

        // Injected lines attributed to personas other than the speaker. The
        // speaker's own inline content is never stripped.
        for rules in &self.rules {
            if rules.name == speaker {
                continue;
            }
            text = rules.inline_fragment.replace_all(&text, "").into_owned();
        }

        // A single layer of quotes around the whole remainder.
        text = WRAPPING_QUOTES.replace(&text, "$1").into_owned();

        // Echo collapse only follows a narration strip; legitimate doubled
        // text must survive untouched.
        let trimmed = text.trim();
        if narration_stripped {
            collapse_echo(trimmed).to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Collapses an utterance duplicated verbatim (`XX` -> `X`), the residue of
/// a narrated wrapper followed by the same line again.
fn collapse_echo(text: &str) -> &str {
    let mid = text.len() / 2;
    if !text.is_empty()
        && text.len() % 2 == 0
        && text.is_char_boundary(mid)
        && text[..mid] == text[mid..]
    {
        &text[..mid]
    } else {
        text
    }
}

fn is_ellipsis(text: &str) -> bool {
    matches!(text, "..." | "……" | "…")
}
