use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum_macros::{Display, EnumIter, EnumString};

/// The closed set of persona roles.
///
/// Dispatch over roles is always an exhaustive `match`: adding a cast member
/// is a compile-time-checked change, never a stringly-typed lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PersonaRole {
    Executive,
    TechLead,
    Hr,
    Product,
    Employee,
    Intern,
}

/// Directional relationship label between two personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Friendly,
    Adversarial,
    Neutral,
}

/// A configured simulated participant.
///
/// Immutable once the session is created. The `stances` map is sparse:
/// unlisted pairs are implicitly [`Stance::Neutral`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Role identifier, unique within a roster
    pub role: PersonaRole,
    /// Display name used in transcripts and narration
    pub name: String,
    /// Job title shown alongside the name
    pub title: String,
    /// One-line personality tag
    pub tag: String,
    /// Directional stances toward other roles
    #[serde(default)]
    pub stances: HashMap<PersonaRole, Stance>,
}

impl Persona {
    /// Stance of this persona toward `other`, defaulting to neutral.
    pub fn stance_toward(&self, other: PersonaRole) -> Stance {
        self.stances.get(&other).copied().unwrap_or(Stance::Neutral)
    }
}

/// The ordered persona pool for one session.
///
/// Roster order is meaningful: it is the deterministic tie-break for
/// respondent selection and the round-robin base order in gauntlet mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    personas: Vec<Persona>,
}

impl Roster {
    /// Builds a roster from an ordered persona list.
    ///
    /// # Panics
    ///
    /// Panics if `personas` is empty or contains a duplicate role — both
    /// indicate a configuration bug, not a runtime condition.
    pub fn new(personas: Vec<Persona>) -> Self {
        assert!(!personas.is_empty(), "roster must not be empty");
        for (i, p) in personas.iter().enumerate() {
            assert!(
                !personas[..i].iter().any(|q| q.role == p.role),
                "duplicate role in roster: {}",
                p.role
            );
        }
        Self { personas }
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn roles(&self) -> impl Iterator<Item = PersonaRole> + '_ {
        self.personas.iter().map(|p| p.role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn get(&self, role: PersonaRole) -> Option<&Persona> {
        self.personas.iter().find(|p| p.role == role)
    }

    /// Display names of every roster member, in roster order.
    pub fn names(&self) -> Vec<&str> {
        self.personas.iter().map(|p| p.name.as_str()).collect()
    }

    /// Position of `role` in the roster, if present.
    pub fn position(&self, role: PersonaRole) -> Option<usize> {
        self.personas.iter().position(|p| p.role == role)
    }

    pub fn contains(&self, role: PersonaRole) -> bool {
        self.position(role).is_some()
    }
}
