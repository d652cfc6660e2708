//! Built-in cast profiles.
//!
//! The default workplace cast. Personality content here is placeholder
//! domain data: sessions may supply any roster, these profiles just make
//! the simulator playable out of the box.

use super::{Persona, PersonaRole, Roster, Stance};
use std::collections::HashMap;

fn stances(pairs: &[(PersonaRole, Stance)]) -> HashMap<PersonaRole, Stance> {
    pairs.iter().copied().collect()
}

/// The default four-member interview panel, in questioning order.
pub fn interview_panel() -> Roster {
    use PersonaRole::*;
    let cast = builtin_cast();
    Roster::new(
        [TechLead, Executive, Hr, Product]
            .into_iter()
            .map(|role| cast.get(role).expect("built-in cast covers every role").clone())
            .collect(),
    )
}

/// The full built-in cast, in canonical roster order.
pub fn builtin_cast() -> Roster {
    use PersonaRole::*;
    use Stance::*;

    Roster::new(vec![
        Persona {
            role: Executive,
            name: "Victor".to_string(),
            title: "Chief Executive".to_string(),
            tag: "grand promises / relentless pressure".to_string(),
            stances: stances(&[
                (Hr, Friendly),
                (Employee, Adversarial),
                (TechLead, Adversarial),
                (Intern, Adversarial),
            ]),
        },
        Persona {
            role: TechLead,
            name: "Ray".to_string(),
            title: "Engineering Director".to_string(),
            tag: "interrogates details / distrusts resumes".to_string(),
            stances: stances(&[
                (Product, Adversarial),
                (Executive, Adversarial),
                (Intern, Friendly),
            ]),
        },
        Persona {
            role: Hr,
            name: "Claire".to_string(),
            title: "Head of People".to_string(),
            tag: "smiling interrogation / salary anchoring".to_string(),
            stances: stances(&[(Executive, Friendly), (Intern, Friendly)]),
        },
        Persona {
            role: Product,
            name: "Dana".to_string(),
            title: "Product Lead".to_string(),
            tag: "curveball scenarios / scope creep".to_string(),
            stances: stances(&[(TechLead, Adversarial), (Executive, Friendly)]),
        },
        Persona {
            role: Employee,
            name: "Sam".to_string(),
            title: "Senior Staffer".to_string(),
            tag: "weary survivor / reflexive apologies".to_string(),
            stances: stances(&[
                (Executive, Adversarial),
                (Intern, Friendly),
                (Hr, Adversarial),
            ]),
        },
        Persona {
            role: Intern,
            name: "Petra".to_string(),
            title: "Intern".to_string(),
            tag: "eager / terrified / takes notes on everything".to_string(),
            stances: stances(&[
                (TechLead, Friendly),
                (Employee, Friendly),
                (Executive, Adversarial),
            ]),
        },
    ])
}
