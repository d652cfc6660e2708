//! System-prompt construction.
//!
//! Each generation call gets a persona profile, a situation block (mode,
//! round, pressure hints, co-participants, relationship leanings, chaos
//! modifier), and a fixed set of output rules that keep a single-voice model
//! from narrating the whole room. Prior turns are rendered by the engine as
//! narrated context; this module only builds the system side.

use parley_core::generate::{PersonaPrompter, PromptContext};
use parley_core::persona::{Persona, Stance};
use parley_core::select::ChaosLevel;
use parley_core::session::SessionMode;
use serde::{Deserialize, Serialize};

/// The role the candidate is interviewing for. Steers what the panel digs
/// into; gauntlet sessions only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Frontend,
    Backend,
    Product,
    Design,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::Frontend => "frontend engineer",
            Position::Backend => "backend engineer",
            Position::Product => "product manager",
            Position::Design => "UI/UX designer",
        }
    }

    fn focus(self) -> &'static str {
        match self {
            Position::Frontend => {
                "Dig into: framework internals, rendering performance, browser \
                 behavior, type safety, build tooling."
            }
            Position::Backend => {
                "Dig into: schema design, distributed systems, API contracts, \
                 concurrency, caching strategy, failure handling."
            }
            Position::Product => {
                "Dig into: requirement analysis, user research, metrics-driven \
                 decisions, competitive landscape, trade-off reasoning."
            }
            Position::Design => {
                "Dig into: design systems, interaction logic, accessibility, \
                 user testing, tooling fluency."
            }
        }
    }
}

fn chaos_modifier(chaos: ChaosLevel) -> &'static str {
    match chaos {
        ChaosLevel::Mild => "Keep it civil. Apply pressure sparingly and briefly.",
        ChaosLevel::Standard => "Stay sharp and skeptical. Give no easy outs.",
        ChaosLevel::Chaotic => {
            "Maximum pressure. Rapid-fire follow-ups, open disdain, talk over people."
        }
    }
}

fn stress_hint(stress: i32) -> &'static str {
    if stress > 70 {
        "The candidate is visibly rattled. Keep the pressure on with harder follow-ups."
    } else if stress > 40 {
        "The candidate is tense. Maintain normal interview pressure."
    } else {
        "The candidate still looks composed. Feel free to throw something difficult."
    }
}

/// Default prompt builder over a persona roster.
pub struct CastPrompter {
    position: Option<Position>,
}

impl CastPrompter {
    pub fn new() -> Self {
        Self { position: None }
    }

    /// Sets the position the gauntlet panel is hiring for.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

impl Default for CastPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaPrompter for CastPrompter {
    fn system_prompt(&self, persona: &Persona, ctx: &PromptContext<'_>) -> String {
        let mut sections = Vec::new();

        sections.push(format!(
            "You are {name}, {title}. Disposition: {tag}.",
            name = persona.name,
            title = persona.title,
            tag = persona.tag,
        ));

        let others: Vec<String> = ctx
            .roster
            .iter()
            .filter(|p| p.role != persona.role)
            .map(|p| format!("{} ({})", p.name, p.title))
            .collect();

        match ctx.mode {
            SessionMode::Gauntlet => {
                let mut block = format!(
                    "[Interview] You are on a panel interviewing a candidate. \
                     Round {}/{}.",
                    ctx.round, ctx.total_rounds
                );
                if !others.is_empty() {
                    block.push_str(&format!(" Co-panelists: {}.", others.join(", ")));
                }
                if let Some(position) = self.position {
                    block.push_str(&format!(
                        " The candidate applied for a {} role. {}",
                        position.label(),
                        position.focus()
                    ));
                }
                sections.push(block);
                sections.push(stress_hint(ctx.stress).to_string());
            }
            SessionMode::Roundtable => {
                let mut block = "[Meeting] You are in a team meeting with a colleague \
                                 (the user)."
                    .to_string();
                if !others.is_empty() {
                    block.push_str(&format!(" Also present: {}.", others.join(", ")));
                }
                sections.push(block);
            }
        }

        let leanings: Vec<String> = ctx
            .roster
            .iter()
            .filter(|p| p.role != persona.role)
            .filter_map(|p| match persona.stance_toward(p.role) {
                Stance::Friendly => Some(format!("You tend to side with {}.", p.name)),
                Stance::Adversarial => Some(format!("You frequently clash with {}.", p.name)),
                Stance::Neutral => None,
            })
            .collect();
        if !leanings.is_empty() {
            sections.push(leanings.join(" "));
        }

        sections.push(chaos_modifier(ctx.chaos).to_string());

        sections.push(
            "Output rules, non-negotiable:\n\
             1. Ask exactly one question or make one remark.\n\
             2. Speak directly; never use a \"[Name]:\" label or narrate.\n\
             3. One or two sentences, like a real person in the room.\n\
             4. Stay in character; never mention being an AI.\n\
             5. Only your own words — never quote or invent other \
             participants' lines.\n\
             6. If others spoke before you this turn, you may react to them."
                .to_string(),
        );

        sections.join("\n\n")
    }
}

/// Kick-off request for the opening round: the panel lead asks the first
/// question before the candidate has said anything.
pub fn opening_request(position: Option<Position>) -> String {
    match position {
        Some(p) => format!(
            "(This is the first round of the interview. Ask the candidate, \
             who applied for a {} role, your opening question.)",
            p.label()
        ),
        None => "(This is the first round of the interview. Ask the candidate \
                 your opening question.)"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::persona::{PersonaRole, builtin_cast};

    fn ctx(roster: &parley_core::persona::Roster, mode: SessionMode, stress: i32) -> PromptContext<'_> {
        PromptContext {
            mode,
            chaos: ChaosLevel::Standard,
            round: 3,
            total_rounds: 10,
            stress,
            roster,
        }
    }

    #[test]
    fn gauntlet_prompt_names_copanelists_and_round() {
        let roster = builtin_cast();
        let prompter = CastPrompter::new().with_position(Position::Backend);
        let exec = roster.get(PersonaRole::Executive).unwrap();
        let prompt = prompter.system_prompt(exec, &ctx(&roster, SessionMode::Gauntlet, 50));

        assert!(prompt.contains("You are Victor, Chief Executive."));
        assert!(prompt.contains("Round 3/10"));
        assert!(prompt.contains("Ray (Engineering Director)"));
        assert!(!prompt.contains("Victor (Chief Executive)"), "listed itself as co-panelist");
        assert!(prompt.contains("backend engineer"));
        assert!(prompt.contains("candidate is tense"));
    }

    #[test]
    fn stress_hint_bands_switch_at_40_and_70() {
        let roster = builtin_cast();
        let prompter = CastPrompter::new();
        let exec = roster.get(PersonaRole::Executive).unwrap();

        let low = prompter.system_prompt(exec, &ctx(&roster, SessionMode::Gauntlet, 40));
        assert!(low.contains("still looks composed"));
        let mid = prompter.system_prompt(exec, &ctx(&roster, SessionMode::Gauntlet, 41));
        assert!(mid.contains("candidate is tense"));
        let high = prompter.system_prompt(exec, &ctx(&roster, SessionMode::Gauntlet, 71));
        assert!(high.contains("visibly rattled"));
    }

    #[test]
    fn stance_hints_appear_only_for_configured_pairs() {
        let roster = builtin_cast();
        let prompter = CastPrompter::new();
        let exec = roster.get(PersonaRole::Executive).unwrap();
        let prompt = prompter.system_prompt(exec, &ctx(&roster, SessionMode::Roundtable, 0));

        // Executive sides with HR and clashes with the tech lead.
        assert!(prompt.contains("side with Claire"));
        assert!(prompt.contains("clash with Ray"));
        // No stance configured toward Dana, so no leaning line about her.
        assert!(!prompt.contains("side with Dana"));
        assert!(!prompt.contains("clash with Dana"));
    }

    #[test]
    fn roundtable_prompt_omits_interview_trappings() {
        let roster = builtin_cast();
        let prompter = CastPrompter::new().with_position(Position::Frontend);
        let intern = roster.get(PersonaRole::Intern).unwrap();
        let prompt = prompter.system_prompt(intern, &ctx(&roster, SessionMode::Roundtable, 90));

        assert!(prompt.contains("[Meeting]"));
        assert!(!prompt.contains("candidate"));
        assert!(!prompt.contains("Round"));
    }

    #[test]
    fn opening_request_mentions_the_position() {
        assert!(opening_request(Some(Position::Design)).contains("UI/UX designer"));
        assert!(opening_request(None).contains("opening question"));
    }
}
