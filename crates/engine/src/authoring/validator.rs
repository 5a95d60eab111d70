//! Deep referential-integrity validation for case documents.
//!
//! Unlike the verifier, this runs offline over the case corpus and its
//! contract is "find every defect": after the structural gate it keeps
//! accumulating issues instead of stopping at the first. Errors make a case
//! unplayable; warnings flag authoring smells worth a look.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use gumshoe_domain::{CaseDefinition, EvidenceRef, RoomId, SecretId, SuspectId, VICTIM_ACTOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// True if any accumulated issue is an error.
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Error messages only, for surfacing to players and build rejection.
pub fn error_messages(issues: &[ValidationIssue]) -> Vec<String> {
    issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(|i| i.message.clone())
        .collect()
}

/// Validate a raw case document. A structural violation (malformed JSON,
/// wrong types) short-circuits into a single Structure Error issue; a
/// structurally sound document gets the full referential pass.
pub fn validate_json(raw: &str, folder: &str) -> Vec<ValidationIssue> {
    match serde_json::from_str::<CaseDefinition>(raw) {
        Ok(case) => validate(&case, folder),
        Err(e) => vec![ValidationIssue::error(format!("Structure Error: {e}"))],
    }
}

/// Run every referential check over a typed case, accumulating all issues.
pub fn validate(case: &CaseDefinition, folder: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if case.id.as_str() != folder {
        issues.push(ValidationIssue::warning(format!(
            "Case id '{}' does not match its folder '{folder}'",
            case.id
        )));
    }

    check_map(case, &mut issues);
    check_suspects_and_solution(case, &mut issues);
    check_evidence(case, &mut issues);
    check_secret_triggers(case, &mut issues);

    issues
}

fn check_map(case: &CaseDefinition, issues: &mut Vec<ValidationIssue>) {
    if !case.has_room(&case.murder_location) {
        issues.push(ValidationIssue::error(format!(
            "murderLocation '{}' not found in map",
            case.murder_location
        )));
    }

    // Connection targets must exist, and every link must be two-way.
    for (room, info) in &case.map {
        for target in &info.connects_to {
            match case.map.get(target) {
                None => issues.push(ValidationIssue::error(format!(
                    "Room '{room}' connects_to non-existent room '{target}'"
                ))),
                Some(back) => {
                    if !back.connects_to.contains(room) {
                        issues.push(ValidationIssue::error(format!(
                            "Link mismatch: '{room}' -> '{target}' has no return connection"
                        )));
                    }
                }
            }
        }
    }

    // Every room must be reachable from an arbitrary start room. The map is
    // a BTreeMap, so "arbitrary" is reproducibly the first key.
    if let Some(start) = case.map.keys().next() {
        let mut seen: BTreeSet<&RoomId> = BTreeSet::from([start]);
        let mut queue: VecDeque<&RoomId> = VecDeque::from([start]);
        while let Some(room) = queue.pop_front() {
            if let Some(info) = case.map.get(room) {
                for target in &info.connects_to {
                    if case.map.contains_key(target) && seen.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
        for room in case.map.keys() {
            if !seen.contains(room) {
                issues.push(ValidationIssue::error(format!(
                    "Room '{room}' is unreachable from '{start}'"
                )));
            }
        }
    }
}

fn check_suspects_and_solution(case: &CaseDefinition, issues: &mut Vec<ValidationIssue>) {
    let mut seen: BTreeSet<&SuspectId> = BTreeSet::new();
    for suspect in &case.suspects {
        if !seen.insert(&suspect.id) {
            issues.push(ValidationIssue::error(format!(
                "Duplicate suspect id '{}'",
                suspect.id
            )));
        }
    }

    let killer = &case.solution.killer;
    match case.suspect(killer) {
        None => issues.push(ValidationIssue::error(format!(
            "Solution killer '{killer}' not found in suspects list"
        ))),
        Some(suspect) => {
            if !suspect.is_guilty {
                issues.push(ValidationIssue::error(format!(
                    "Suspect '{killer}' is the solution killer but isGuilty is not true"
                )));
            }
        }
    }

    for role in [&case.solution.accomplice, &case.solution.silent_witness] {
        if let Some(id) = role {
            if case.suspect(id).is_none() {
                issues.push(ValidationIssue::error(format!(
                    "Solution references unknown suspect '{id}'"
                )));
            }
        }
    }

    for suspect in &case.suspects {
        let id = &suspect.id;

        if suspect.is_guilty && id != killer {
            issues.push(ValidationIssue::error(format!(
                "Suspect '{id}' has isGuilty set but is not the solution killer"
            )));
        }
        let is_accomplice = case.solution.accomplice.as_ref() == Some(id);
        if suspect.is_accomplice != is_accomplice {
            issues.push(ValidationIssue::error(format!(
                "Suspect '{id}': isAccomplice flag disagrees with the solution"
            )));
        }
        let is_witness = case.solution.silent_witness.as_ref() == Some(id);
        if suspect.is_silent_witness != is_witness {
            issues.push(ValidationIssue::error(format!(
                "Suspect '{id}': isSilentWitness flag disagrees with the solution"
            )));
        }

        if !case.has_room(&suspect.current_location) {
            issues.push(ValidationIssue::error(format!(
                "Suspect '{id}': currentLocation '{}' not in map",
                suspect.current_location
            )));
        }

        if suspect.alibi.trim().is_empty() {
            issues.push(ValidationIssue::warning(format!(
                "Suspect '{id}': missing alibi"
            )));
        }
        if suspect.secrets.is_empty() {
            issues.push(ValidationIssue::warning(format!(
                "Suspect '{id}': has no secrets, may be a dead end for players"
            )));
        }
        if !case.evidence.initial_police_statements.contains_key(id) {
            issues.push(ValidationIssue::warning(format!(
                "Suspect '{id}': has no initial police statement"
            )));
        }
    }
}

fn check_evidence(case: &CaseDefinition, issues: &mut Vec<ValidationIssue>) {
    let declared = &case.evidence.physical_evidence;

    let mut discoverable: BTreeSet<&str> = BTreeSet::new();
    for (room, items) in &case.evidence.physical_discovery {
        if !case.has_room(room) {
            issues.push(ValidationIssue::error(format!(
                "physical_discovery references non-existent room '{room}'"
            )));
        }
        for item in items {
            discoverable.insert(item.as_str());
            if !declared.contains_key(item) {
                issues.push(ValidationIssue::error(format!(
                    "physical_discovery room '{room}' references undeclared evidence '{item}'"
                )));
            }
        }
    }

    for (room, info) in &case.map {
        for interactable in &info.interactables {
            if let Some(item) = &interactable.evidence_id {
                discoverable.insert(item.as_str());
                if !declared.contains_key(item) {
                    issues.push(ValidationIssue::error(format!(
                        "Interactable '{}' in '{room}' grants undeclared evidence '{item}'",
                        interactable.name
                    )));
                }
            }
        }
    }

    for item in declared.keys() {
        if !discoverable.contains(item.as_str()) {
            issues.push(ValidationIssue::warning(format!(
                "Physical evidence '{item}' is declared but not discoverable in any room"
            )));
        }
    }

    for item in &case.solution.key_evidence {
        if !declared.contains_key(item) {
            issues.push(ValidationIssue::error(format!(
                "Solution key_evidence '{item}' not declared in physical_evidence"
            )));
        }
    }

    // DNA rooms and profiles
    let mut known_profiles: BTreeSet<String> = case
        .suspects
        .iter()
        .map(|s| s.id.to_string())
        .collect();
    known_profiles.insert(VICTIM_ACTOR.to_string());
    if let Some(id) = &case.victim.id {
        known_profiles.insert(id.to_lowercase());
    }
    if let Some(first_name) = case.victim.name.split_whitespace().next() {
        known_profiles.insert(first_name.to_lowercase());
    }

    for (room, profiles) in &case.evidence.dna {
        if !case.has_room(room) {
            issues.push(ValidationIssue::error(format!(
                "DNA references non-existent room '{room}'"
            )));
        }
        for profile in profiles {
            if !known_profiles.contains(&profile.to_lowercase()) {
                issues.push(ValidationIssue::warning(format!(
                    "Unknown DNA profile '{profile}' in room '{room}'"
                )));
            }
        }
    }

    let killer_left_traces = case
        .evidence
        .dna
        .get(&case.murder_location)
        .is_some_and(|profiles| {
            profiles
                .iter()
                .any(|p| p == case.solution.killer.as_str())
        });
    if !killer_left_traces {
        issues.push(ValidationIssue::warning(format!(
            "Killer '{}' has no DNA at murder location '{}'",
            case.solution.killer, case.murder_location
        )));
    }
}

fn check_secret_triggers(case: &CaseDefinition, issues: &mut Vec<ValidationIssue>) {
    let suspect_ids = case.suspect_ids();
    let all_secret_ids: BTreeSet<&SecretId> = case
        .suspects
        .iter()
        .flat_map(|s| s.secrets.iter().map(|sec| &sec.id))
        .collect();

    // Evidence ids every secret trigger may legitimately require.
    let mut required_anywhere: BTreeSet<String> = BTreeSet::new();

    for suspect in &case.suspects {
        let pressure_of: BTreeMap<&SecretId, u8> = suspect
            .secrets
            .iter()
            .map(|s| (&s.id, s.trigger.min_pressure))
            .collect();

        for secret in &suspect.secrets {
            let ctx = format!("Suspect '{}' secret '{}'", suspect.id, secret.id);

            for raw in &secret.trigger.requires_evidence {
                required_anywhere.insert(raw.clone());
                match EvidenceRef::parse(raw, &suspect_ids) {
                    Err(e) => issues.push(ValidationIssue::error(format!("{ctx}: {e}"))),
                    Ok(evidence_ref) => {
                        if !evidence_ref.resolves_in(case) {
                            issues.push(ValidationIssue::error(format!(
                                "{ctx}: requiresEvidence '{raw}' does not resolve to any declared evidence"
                            )));
                        }
                    }
                }
            }

            for required in &secret.trigger.requires_secrets {
                if required == &secret.id {
                    issues.push(ValidationIssue::error(format!(
                        "{ctx}: requiresSecrets references itself, circular dependency"
                    )));
                    continue;
                }
                if !all_secret_ids.contains(required) {
                    issues.push(ValidationIssue::error(format!(
                        "{ctx}: requiresSecrets references unknown secret '{required}'"
                    )));
                    continue;
                }
                // Prerequisites with a lower pressure threshold unlock later
                // than their dependents, so the chain can never fire in order.
                if let Some(&required_pressure) = pressure_of.get(required) {
                    if required_pressure < secret.trigger.min_pressure {
                        issues.push(ValidationIssue::warning(format!(
                            "{ctx}: prerequisite secret '{required}' (minPressure={required_pressure}) unlocks later than this secret (minPressure={})",
                            secret.trigger.min_pressure
                        )));
                    }
                }
            }

            if secret.trigger.min_pressure > 80 && secret.trigger.min_pressure < 100 {
                issues.push(ValidationIssue::warning(format!(
                    "{ctx}: minPressure={} is very high and may be unreachable within the point budget",
                    secret.trigger.min_pressure
                )));
            }
        }
    }

    for item in &case.solution.key_evidence {
        let as_physical = format!("physical_{item}");
        if !required_anywhere.contains(item) && !required_anywhere.contains(&as_physical) {
            issues.push(ValidationIssue::warning(format!(
                "key_evidence '{item}' is never required by any secret trigger"
            )));
        }
    }
}
