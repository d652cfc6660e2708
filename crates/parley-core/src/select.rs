//! Per-turn respondent selection.
//!
//! Two settings share one scoring core. Free-form group sessions score every
//! roster member (keyword affinity, anti-repetition penalty, chaos-scaled
//! jitter) and take the top `chaos + 1`. Fixed-cast panels rotate
//! round-robin and add a probabilistic second interrogator only at the
//! highest chaos level.
//!
//! The selector never returns an empty list for a non-empty roster; that is
//! a programming invariant, asserted rather than surfaced as an error.

use crate::persona::{PersonaRole, Roster};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Ordinal intensity dial: how many personas respond per turn and how much
/// randomness influences selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaosLevel {
    /// Orderly, one extra voice at most
    Mild,
    /// Normal friction
    Standard,
    /// Everyone talks over everyone
    Chaotic,
}

impl ChaosLevel {
    /// Numeric dial value (1..=3).
    pub fn dial(self) -> u32 {
        match self {
            ChaosLevel::Mild => 1,
            ChaosLevel::Standard => 2,
            ChaosLevel::Chaotic => 3,
        }
    }

    pub fn try_from_dial(dial: u32) -> Option<Self> {
        match dial {
            1 => Some(ChaosLevel::Mild),
            2 => Some(ChaosLevel::Standard),
            3 => Some(ChaosLevel::Chaotic),
            _ => None,
        }
    }
}

/// Base score every persona starts from.
const BASE_SCORE: f64 = 1.0;
/// Penalty for having spoken in the immediately preceding turn.
const REPEAT_PENALTY: f64 = 2.0;
/// Scores never drop below this, so everyone stays eligible.
const SCORE_FLOOR: f64 = 0.1;
/// Chance of a second panelist piling on at [`ChaosLevel::Chaotic`].
const SECOND_VOICE_CHANCE: f64 = 0.5;

/// Keyword-to-role affinity table. Literal substrings of the user message;
/// negative weights model topics a persona avoids. Domain content,
/// replaceable without touching the mechanism.
const KEYWORD_WEIGHTS: &[(&str, &[(PersonaRole, i32)])] = &[
    // Engineering territory
    ("code", &[(PersonaRole::TechLead, 3), (PersonaRole::Intern, 1), (PersonaRole::Employee, 1)]),
    ("architecture", &[(PersonaRole::TechLead, 3), (PersonaRole::Executive, 1)]),
    ("bug", &[(PersonaRole::TechLead, 3), (PersonaRole::Employee, 2), (PersonaRole::Intern, 1)]),
    ("refactor", &[(PersonaRole::TechLead, 3), (PersonaRole::Product, -1)]),
    ("deploy", &[(PersonaRole::TechLead, 2), (PersonaRole::Product, 2), (PersonaRole::Executive, 1)]),
    ("test", &[(PersonaRole::TechLead, 2), (PersonaRole::Intern, 1)]),
    // Product territory
    ("requirement", &[(PersonaRole::Product, 3), (PersonaRole::TechLead, 1), (PersonaRole::Executive, 1)]),
    ("feature", &[(PersonaRole::Product, 3), (PersonaRole::TechLead, 1)]),
    ("user", &[(PersonaRole::Product, 3), (PersonaRole::Hr, 1)]),
    ("roadmap", &[(PersonaRole::Product, 2), (PersonaRole::TechLead, 1)]),
    ("sprint", &[(PersonaRole::Product, 2), (PersonaRole::Executive, 1), (PersonaRole::Employee, 1)]),
    // Management territory
    ("performance review", &[(PersonaRole::Executive, 3), (PersonaRole::Hr, 2), (PersonaRole::Employee, 1)]),
    ("overtime", &[(PersonaRole::Executive, 2), (PersonaRole::Employee, 3), (PersonaRole::Hr, 1), (PersonaRole::Intern, 1)]),
    ("efficiency", &[(PersonaRole::Executive, 3), (PersonaRole::TechLead, 1)]),
    ("budget", &[(PersonaRole::Executive, 3), (PersonaRole::Hr, 1)]),
    ("strategy", &[(PersonaRole::Executive, 3), (PersonaRole::Hr, 1)]),
    // People territory
    ("team", &[(PersonaRole::Hr, 3), (PersonaRole::Executive, 1)]),
    ("culture", &[(PersonaRole::Hr, 3)]),
    ("training", &[(PersonaRole::Hr, 3), (PersonaRole::Intern, 2)]),
    ("salary", &[(PersonaRole::Employee, 3), (PersonaRole::Hr, 2), (PersonaRole::Executive, 1)]),
    ("resign", &[(PersonaRole::Hr, 3), (PersonaRole::Executive, 2), (PersonaRole::Employee, 1)]),
    // Rank and file
    ("vacation", &[(PersonaRole::Employee, 3), (PersonaRole::Intern, 2), (PersonaRole::Hr, 1)]),
    ("learn", &[(PersonaRole::Intern, 3), (PersonaRole::Employee, 1), (PersonaRole::TechLead, 1)]),
    // Project pressure
    ("deadline", &[(PersonaRole::Executive, 3), (PersonaRole::Product, 2), (PersonaRole::TechLead, 1), (PersonaRole::Employee, 1)]),
    ("delay", &[(PersonaRole::Executive, 3), (PersonaRole::Product, 2), (PersonaRole::Employee, 1)]),
    ("progress", &[(PersonaRole::Executive, 2), (PersonaRole::Product, 2), (PersonaRole::Employee, 1)]),
];

/// Chooses which personas act each turn.
#[derive(Debug, Clone, Default)]
pub struct RespondentSelector;

impl RespondentSelector {
    pub fn new() -> Self {
        Self
    }

    /// Free-form group selection: ordered speaking sequence for this turn,
    /// at most `chaos + 1` personas, never empty.
    pub fn select_group<R: Rng>(
        &self,
        roster: &Roster,
        message: &str,
        chaos: ChaosLevel,
        last_respondents: &[PersonaRole],
        rng: &mut R,
    ) -> Vec<PersonaRole> {
        assert!(!roster.is_empty(), "selector invoked on an empty roster");

        let count = usize::min(chaos.dial() as usize + 1, roster.len());
        let lowered = message.to_lowercase();

        let mut scored: Vec<(PersonaRole, f64)> = roster
            .roles()
            .map(|role| {
                let score = self.score(role, &lowered, chaos, last_respondents, rng);
                (role, score)
            })
            .collect();

        // Stable sort keeps roster order on ties, which makes selection
        // deterministic for a fixed RNG draw.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).expect("scores are finite"));

        let picked: Vec<PersonaRole> = scored.into_iter().take(count).map(|(r, _)| r).collect();
        assert!(!picked.is_empty(), "selector produced no respondents");
        picked
    }

    /// Fixed-cast panel selection: round-robin interrogator, with a second
    /// voice joining only at the highest chaos level.
    pub fn select_panel<R: Rng>(
        &self,
        roster: &Roster,
        round: u32,
        chaos: ChaosLevel,
        rng: &mut R,
    ) -> Vec<PersonaRole> {
        assert!(!roster.is_empty(), "selector invoked on an empty roster");
        assert!(round >= 1, "rounds are 1-based");

        let roles: Vec<PersonaRole> = roster.roles().collect();

        // The opening round always belongs to the panel lead.
        if round == 1 || roles.len() == 1 {
            return vec![roles[0]];
        }

        let base = ((round - 1) as usize) % roles.len();
        let mut picked = vec![roles[base]];

        if chaos == ChaosLevel::Chaotic && rng.gen_bool(SECOND_VOICE_CHANCE) {
            let others: Vec<PersonaRole> = roles
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != base)
                .map(|(_, r)| *r)
                .collect();
            if let Some(second) = others.choose(rng) {
                picked.push(*second);
            }
        }

        picked
    }

    fn score<R: Rng>(
        &self,
        role: PersonaRole,
        lowered_message: &str,
        chaos: ChaosLevel,
        last_respondents: &[PersonaRole],
        rng: &mut R,
    ) -> f64 {
        let mut score = BASE_SCORE;

        for (keyword, weights) in KEYWORD_WEIGHTS {
            if !lowered_message.contains(keyword) {
                continue;
            }
            if let Some((_, w)) = weights.iter().find(|(r, _)| *r == role) {
                score += f64::from(*w);
            }
        }

        if last_respondents.contains(&role) {
            score -= REPEAT_PENALTY;
        }

        score += rng.r#gen::<f64>() * f64::from(chaos.dial());
        score.max(SCORE_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{PersonaRole::*, builtin_cast};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn trio() -> Roster {
        let cast = builtin_cast();
        Roster::new(vec![
            cast.get(TechLead).unwrap().clone(),
            cast.get(Product).unwrap().clone(),
            cast.get(Hr).unwrap().clone(),
        ])
    }

    #[test]
    fn group_selection_is_bounded_and_nonempty() {
        let selector = RespondentSelector::new();
        let roster = builtin_cast();
        let mut rng = StdRng::seed_from_u64(1);
        for chaos in [ChaosLevel::Mild, ChaosLevel::Standard, ChaosLevel::Chaotic] {
            for msg in ["", "code review", "deadline deadline deadline", "完全无关"] {
                let picked = selector.select_group(&roster, msg, chaos, &[], &mut rng);
                assert!(!picked.is_empty());
                assert!(picked.len() <= (chaos.dial() as usize + 1).min(roster.len()));
            }
        }
    }

    #[test]
    fn keyword_affinity_pulls_the_owner_forward() {
        let selector = RespondentSelector::new();
        let roster = trio();
        // Mild chaos keeps jitter small; "architecture" is TechLead turf.
        let mut wins = 0;
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = selector.select_group(
                &roster,
                "the architecture is falling apart",
                ChaosLevel::Mild,
                &[],
                &mut rng,
            );
            if picked[0] == TechLead {
                wins += 1;
            }
        }
        assert!(wins > 180, "TechLead led only {wins}/200 draws");
    }

    #[test]
    fn previous_respondents_are_penalized() {
        let selector = RespondentSelector::new();
        let roster = trio();
        let mut with_penalty = 0;
        let mut without_penalty = 0;
        for seed in 0..300 {
            let mut rng = StdRng::seed_from_u64(seed);
            if selector
                .select_group(&roster, "status?", ChaosLevel::Mild, &[TechLead], &mut rng)
                .contains(&TechLead)
            {
                with_penalty += 1;
            }
            let mut rng = StdRng::seed_from_u64(seed);
            if selector
                .select_group(&roster, "status?", ChaosLevel::Mild, &[], &mut rng)
                .contains(&TechLead)
            {
                without_penalty += 1;
            }
        }
        assert!(
            with_penalty < without_penalty,
            "penalty had no effect: {with_penalty} vs {without_penalty}"
        );
    }

    #[test]
    fn singleton_roster_is_always_selected() {
        let selector = RespondentSelector::new();
        let cast = builtin_cast();
        let solo = Roster::new(vec![cast.get(Hr).unwrap().clone()]);
        let mut rng = StdRng::seed_from_u64(3);
        for chaos in [ChaosLevel::Mild, ChaosLevel::Chaotic] {
            assert_eq!(
                selector.select_group(&solo, "anything", chaos, &[Hr], &mut rng),
                vec![Hr]
            );
            assert_eq!(selector.select_panel(&solo, 5, chaos, &mut rng), vec![Hr]);
        }
    }

    #[test]
    fn panel_round_one_is_the_lead_alone() {
        let selector = RespondentSelector::new();
        let roster = trio();
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(
            selector.select_panel(&roster, 1, ChaosLevel::Chaotic, &mut rng),
            vec![TechLead]
        );
    }

    #[test]
    fn panel_below_max_chaos_selects_exactly_one() {
        let selector = RespondentSelector::new();
        let roster = trio();
        let mut rng = StdRng::seed_from_u64(4);
        for round in 2..40 {
            for chaos in [ChaosLevel::Mild, ChaosLevel::Standard] {
                let picked = selector.select_panel(&roster, round, chaos, &mut rng);
                assert_eq!(picked.len(), 1);
            }
        }
    }

    #[test]
    fn panel_rotates_round_robin() {
        let selector = RespondentSelector::new();
        let roster = trio();
        let mut rng = StdRng::seed_from_u64(4);
        let leads: Vec<PersonaRole> = (2..5)
            .map(|round| selector.select_panel(&roster, round, ChaosLevel::Mild, &mut rng)[0])
            .collect();
        assert_eq!(leads, vec![Product, Hr, TechLead]);
    }

    #[test]
    fn panel_max_chaos_sometimes_adds_a_second_voice() {
        let selector = RespondentSelector::new();
        let roster = trio();
        let mut rng = StdRng::seed_from_u64(21);
        let mut doubles = 0;
        for round in 2..202 {
            let picked = selector.select_panel(&roster, round, ChaosLevel::Chaotic, &mut rng);
            assert!(picked.len() <= 2);
            assert!(!picked.is_empty());
            if picked.len() == 2 {
                assert_ne!(picked[0], picked[1]);
                doubles += 1;
            }
        }
        assert!(doubles > 50, "second voice joined only {doubles}/200 rounds");
    }

    #[test]
    fn dial_round_trips() {
        for chaos in [ChaosLevel::Mild, ChaosLevel::Standard, ChaosLevel::Chaotic] {
            assert_eq!(ChaosLevel::try_from_dial(chaos.dial()), Some(chaos));
        }
        assert_eq!(ChaosLevel::try_from_dial(0), None);
        assert_eq!(ChaosLevel::try_from_dial(4), None);
    }
}
