//! Hand-built fixture case used across engine tests.

use std::collections::BTreeMap;

use gumshoe_domain::{
    CaseDefinition, CaseId, CaseSettings, EvidenceBundle, Interactable, Room, RoomId, Secret,
    SecretId, SecretTrigger, Solution, SuspectDefinition, SuspectId, Victim,
};

/// A small, fully consistent case: three rooms, a guilty butler with a
/// two-secret chain, and one innocent maid. Passes the validator with no
/// errors.
pub fn sample_case() -> CaseDefinition {
    let study = RoomId::new("study");
    let hall = RoomId::new("hall");
    let kitchen = RoomId::new("kitchen");

    let mut map = BTreeMap::new();
    map.insert(
        study.clone(),
        Room {
            description: "Book-lined and smelling of pipe smoke.".into(),
            connects_to: vec![hall.clone()],
            interactables: vec![Interactable {
                name: "writing desk".into(),
                description: "Papers are scattered as if searched in a hurry.".into(),
                evidence_id: Some("torn_ledger".into()),
            }],
        },
    );
    map.insert(
        hall.clone(),
        Room {
            description: "A long gallery of disapproving portraits.".into(),
            connects_to: vec![study.clone(), kitchen.clone()],
            interactables: vec![],
        },
    );
    map.insert(
        kitchen.clone(),
        Room {
            description: "Copper pots, still warm.".into(),
            connects_to: vec![hall.clone()],
            interactables: vec![],
        },
    );

    let butler = SuspectId::new("butler");
    let maid = SuspectId::new("maid");

    let suspects = vec![
        SuspectDefinition {
            id: butler.clone(),
            name: "Mr. Jenkins".into(),
            aliases: vec!["the butler".into()],
            avatar: None,
            is_guilty: true,
            is_accomplice: false,
            is_silent_witness: false,
            alibi: "Polishing silver in the kitchen, he says.".into(),
            motive: "Thirty years of service, cut out of the will last week.".into(),
            traits: vec!["formal".into(), "evasive".into()],
            current_location: study.clone(),
            resistance: "high".parse().expect("resistance"),
            secrets: vec![
                Secret {
                    id: SecretId::new("butler_seen"),
                    text: "Very well. I was in the study after the master retired.".into(),
                    trigger: SecretTrigger {
                        requires_evidence: vec!["dna_study".into()],
                        requires_secrets: vec![],
                        keywords: vec!["study".into()],
                        min_pressure: 80,
                    },
                },
                Secret {
                    id: SecretId::new("butler_confession"),
                    text: "The knife was meant for the roast. And then it wasn't.".into(),
                    trigger: SecretTrigger {
                        requires_evidence: vec!["bloody_knife".into()],
                        requires_secrets: vec![SecretId::new("butler_seen")],
                        keywords: vec!["knife".into()],
                        min_pressure: 50,
                    },
                },
            ],
        },
        SuspectDefinition {
            id: maid.clone(),
            name: "Daisy Mills".into(),
            aliases: vec!["the maid".into()],
            avatar: None,
            is_guilty: false,
            is_accomplice: false,
            is_silent_witness: false,
            alibi: "Turning down the beds upstairs.".into(),
            motive: "None anyone can name.".into(),
            traits: vec!["nervous".into()],
            current_location: kitchen.clone(),
            resistance: "low".parse().expect("resistance"),
            secrets: vec![Secret {
                id: SecretId::new("maid_heard_row"),
                text: "I heard the master shouting at someone after supper.".into(),
                trigger: SecretTrigger {
                    requires_evidence: vec!["logs_21:30".into()],
                    requires_secrets: vec![],
                    keywords: vec!["shouting".into(), "argument".into()],
                    min_pressure: 75,
                },
            }],
        },
    ];

    let mut evidence = EvidenceBundle::default();
    evidence.dna.insert(
        study.clone(),
        vec!["butler".to_string(), "victim".to_string()],
    );
    evidence.dna.insert(hall.clone(), vec!["maid".to_string()]);
    evidence
        .digital_logs
        .insert("21:30".into(), "Door sensor: study opened from the hall.".into());
    evidence.footage.insert(
        "22:05".into(),
        "A figure in livery crosses the hall, walking quickly.".into(),
    );
    let mut butler_locations = BTreeMap::new();
    butler_locations.insert("21:30".to_string(), study.clone());
    evidence.locations.insert(butler.clone(), butler_locations);
    evidence.physical_evidence.insert(
        "bloody_knife".into(),
        "A kitchen knife, wiped badly. The handle still shows prints.".into(),
    );
    evidence.physical_evidence.insert(
        "torn_ledger".into(),
        "A household ledger with last week's page torn out.".into(),
    );
    evidence
        .physical_discovery
        .insert(study.clone(), vec!["bloody_knife".into()]);
    evidence
        .initial_police_statements
        .insert(butler.clone(), "I retired at ten, as always.".into());
    evidence
        .initial_police_statements
        .insert(maid.clone(), "I saw nothing, I swear it.".into());

    CaseDefinition {
        id: CaseId::new("blackwood_manor"),
        name: "The Blackwood Manor Affair".into(),
        description: "Lord Blackwood found dead in his study; the house was locked.".into(),
        victim: Victim {
            name: "Lord Edmund Blackwood".into(),
            id: Some("blackwood".into()),
            cause: "a single knife wound".into(),
            description: "The estate's patriarch, recently given to rewriting his will.".into(),
            avatar: None,
        },
        murder_time: "22:00".into(),
        murder_location: study,
        map,
        suspects,
        evidence,
        solution: Solution {
            killer: butler,
            accomplice: None,
            silent_witness: None,
            motive: Some("Cut out of the will after thirty years.".into()),
            weapon: Some("bloody_knife".into()),
            key_evidence: vec!["bloody_knife".into()],
        },
        settings: CaseSettings::default(),
    }
}
