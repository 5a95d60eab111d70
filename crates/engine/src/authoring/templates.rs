//! Narrative templates the structure generator draws from.
//!
//! Each template fixes the cast of roles, the room graph, and the weapon and
//! motive pools for one setting. Room graphs are authored symmetric and
//! connected; the generator relies on both properties.

/// A static case template.
pub struct CaseTemplate {
    pub name: &'static str,
    pub theme: &'static str,
    pub victim_name: &'static str,
    pub victim_role: &'static str,
    /// Candidate suspect roles, in authored order. Before shuffling, the
    /// first role is the killer.
    pub suspect_roles: &'static [&'static str],
    /// room id -> connected room ids. Symmetric and fully connected.
    pub rooms: &'static [(&'static str, &'static [&'static str])],
    pub weapons: &'static [&'static str],
    pub motives: &'static [&'static str],
}

pub const TEMPLATES: &[CaseTemplate] = &[
    CaseTemplate {
        name: "country_manor",
        theme: "manor",
        victim_name: "Lord Edmund Blackwood",
        victim_role: "the estate's patriarch",
        suspect_roles: &[
            "the butler",
            "the estranged daughter",
            "the business partner",
            "the groundskeeper",
            "the visiting doctor",
        ],
        rooms: &[
            ("foyer", &["study", "dining_room", "garden"]),
            ("study", &["foyer", "library"]),
            ("library", &["study", "dining_room"]),
            ("dining_room", &["foyer", "library", "kitchen"]),
            ("kitchen", &["dining_room", "garden"]),
            ("garden", &["foyer", "kitchen"]),
        ],
        weapons: &[
            "letter opener",
            "antique revolver",
            "fireplace poker",
            "poisoned brandy",
        ],
        motives: &[
            "a rewritten will",
            "a buried affair",
            "decades of quiet humiliation",
            "a debt called in",
        ],
    },
    CaseTemplate {
        name: "midnight_yacht",
        theme: "yacht",
        victim_name: "Marina Castellane",
        victim_role: "the shipping magnate",
        suspect_roles: &[
            "the first mate",
            "the jilted fiancee",
            "the rival investor",
            "the ship's chef",
        ],
        rooms: &[
            ("main_deck", &["bridge", "salon"]),
            ("bridge", &["main_deck"]),
            ("salon", &["main_deck", "galley", "cabin"]),
            ("galley", &["salon"]),
            ("cabin", &["salon", "engine_room"]),
            ("engine_room", &["cabin"]),
        ],
        weapons: &["winch handle", "flare gun", "mooring line", "spiked champagne"],
        motives: &[
            "a sunken insurance fraud",
            "a broken engagement",
            "a hostile takeover gone personal",
            "blackmail over forged manifests",
        ],
    },
    CaseTemplate {
        name: "gallery_opening",
        theme: "gallery",
        victim_name: "Viktor Hale",
        victim_role: "the celebrated art dealer",
        suspect_roles: &[
            "the forger",
            "the security chief",
            "the spurned artist",
            "the anonymous collector",
            "the gallery assistant",
        ],
        rooms: &[
            ("atrium", &["east_wing", "west_wing"]),
            ("east_wing", &["atrium", "restoration_lab"]),
            ("west_wing", &["atrium", "vault"]),
            ("restoration_lab", &["east_wing", "office"]),
            ("vault", &["west_wing"]),
            ("office", &["restoration_lab"]),
        ],
        weapons: &[
            "bronze maquette",
            "framing wire",
            "solvent-laced wine",
            "marble bust",
        ],
        motives: &[
            "an authentication about to be revoked",
            "a catalogue of stolen provenance",
            "a career destroyed by one review",
            "a forgery about to be exposed",
        ],
    },
];

/// Generic labels for planted red herrings.
pub const RED_HERRING_LABELS: &[&str] = &[
    "torn glove",
    "burnt letter",
    "muddy boot print",
    "broken wine glass",
    "dropped cufflink",
    "crumpled receipt",
];

/// Look a template up by its name.
pub fn by_name(name: &str) -> Option<&'static CaseTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Pick the templates matching a theme, or all of them for an unknown theme.
pub fn templates_for_theme(theme: &str) -> Vec<&'static CaseTemplate> {
    let matched: Vec<_> = TEMPLATES
        .iter()
        .filter(|t| t.theme.eq_ignore_ascii_case(theme))
        .collect();
    if matched.is_empty() {
        TEMPLATES.iter().collect()
    } else {
        matched
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet, VecDeque};

    use super::*;

    fn adjacency(template: &CaseTemplate) -> BTreeMap<&str, BTreeSet<&str>> {
        template
            .rooms
            .iter()
            .map(|(room, connected)| (*room, connected.iter().copied().collect()))
            .collect()
    }

    #[test]
    fn every_template_graph_is_symmetric() {
        for template in TEMPLATES {
            let adj = adjacency(template);
            for (room, connected) in &adj {
                for target in connected {
                    assert!(
                        adj.get(target).is_some_and(|back| back.contains(room)),
                        "{}: {room} -> {target} has no return connection",
                        template.name
                    );
                }
            }
        }
    }

    #[test]
    fn every_template_graph_is_connected() {
        for template in TEMPLATES {
            let adj = adjacency(template);
            let start = template.rooms[0].0;
            let mut seen = BTreeSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some(room) = queue.pop_front() {
                for next in &adj[room] {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            assert_eq!(
                seen.len(),
                template.rooms.len(),
                "{}: unreachable rooms",
                template.name
            );
        }
    }

    #[test]
    fn templates_have_enough_material() {
        for template in TEMPLATES {
            assert!(template.suspect_roles.len() >= 4, "{}", template.name);
            assert!(template.rooms.len() >= 3, "{}", template.name);
            assert!(!template.weapons.is_empty());
            assert!(!template.motives.is_empty());
        }
    }

    #[test]
    fn unknown_theme_falls_back_to_all_templates() {
        assert_eq!(templates_for_theme("moon base").len(), TEMPLATES.len());
        assert_eq!(templates_for_theme("yacht").len(), 1);
    }
}
