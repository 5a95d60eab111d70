//! Mechanical solvability scorer.
//!
//! Advisory tooling for human case review, not a gameplay gate: the score is
//! a quick smell test, the [`crate::authoring::validator`] is the exhaustive
//! check.

use gumshoe_domain::CaseDefinition;

/// Result of a solvability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub is_solvable: bool,
    /// 0-100, reduced by fixed deductions per failed check.
    pub score: u8,
    pub issues: Vec<String>,
}

const NO_PHYSICAL_EVIDENCE_PENALTY: i32 = 50;
const UNKNOWN_DNA_ROOM_PENALTY: i32 = 10;
const MISSING_MOTIVE_PENALTY: i32 = 20;

/// Score a case for basic solvability.
pub fn verify(case: &CaseDefinition) -> VerifyReport {
    let mut score: i32 = 100;
    let mut issues = Vec::new();

    if case.solution.killer.as_str().is_empty() {
        issues.push("Solution names no killer".to_string());
        return VerifyReport {
            is_solvable: false,
            score: 0,
            issues,
        };
    }

    if case.evidence.physical_evidence.is_empty() {
        score -= NO_PHYSICAL_EVIDENCE_PENALTY;
        issues.push("No physical evidence declared".to_string());
    }

    for room in case.evidence.dna.keys() {
        if !case.has_room(room) {
            score -= UNKNOWN_DNA_ROOM_PENALTY;
            issues.push(format!("DNA references unknown room '{room}'"));
        }
    }

    match case.killer() {
        None => {
            score = 0;
            issues.push(format!(
                "Killer '{}' not found among suspects",
                case.solution.killer
            ));
        }
        Some(killer) => {
            let motive = killer.motive.trim();
            if motive.is_empty() || motive.eq_ignore_ascii_case("n/a") {
                score -= MISSING_MOTIVE_PENALTY;
                issues.push(format!("Killer '{}' has no motive", killer.id));
            }
        }
    }

    let score = score.clamp(0, 100) as u8;
    VerifyReport {
        is_solvable: score > 0,
        score,
        issues,
    }
}
