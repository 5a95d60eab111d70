//! Typed evidence references.
//!
//! Case documents refer to evidence with prefixed string ids
//! (`logs_22:15`, `dna_study`, `locations_butler_21:00`, ...). Those strings
//! are parsed exactly once, at case-load time, into this tagged union; the
//! rest of the engine dispatches on the variant instead of re-splitting
//! strings on every lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::case::CaseDefinition;
use crate::error::DomainError;
use crate::ids::{RoomId, SecretId, SuspectId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ref", rename_all = "snake_case")]
pub enum EvidenceRef {
    /// `logs_<time>`: a digital log entry.
    Log(String),
    /// `footage_<time>`: a camera footage entry.
    Footage(String),
    /// `dna_<room>`: the DNA profile list of a room.
    Dna(RoomId),
    /// `physical_<item>`: a declared physical evidence item.
    Physical(String),
    /// `locations_<suspect>_<time>`: a suspect's tracked location.
    Location { suspect: SuspectId, key: String },
    /// `secret_<suspect>_<id>`: another suspect's revealed secret.
    Secret {
        suspect: SuspectId,
        secret: SecretId,
    },
    /// No recognized prefix. Accepted as shorthand for a physical evidence
    /// item when it matches a declared item id.
    Bare(String),
}

impl EvidenceRef {
    /// Parse a raw reference string from a case document.
    ///
    /// `suspects` is the declared suspect id list, needed to split the
    /// `locations_` and `secret_` forms (suspect ids may themselves contain
    /// underscores, so the split matches declared ids rather than guessing).
    pub fn parse(raw: &str, suspects: &[SuspectId]) -> Result<Self, DomainError> {
        if let Some(rest) = raw.strip_prefix("logs_") {
            return Ok(Self::Log(rest.to_string()));
        }
        if let Some(rest) = raw.strip_prefix("footage_") {
            return Ok(Self::Footage(rest.to_string()));
        }
        if let Some(rest) = raw.strip_prefix("dna_") {
            return Ok(Self::Dna(RoomId::new(rest)));
        }
        if let Some(rest) = raw.strip_prefix("physical_") {
            return Ok(Self::Physical(rest.to_string()));
        }
        if let Some(rest) = raw.strip_prefix("locations_") {
            let (suspect, key) = split_by_suspect(rest, suspects).ok_or_else(|| {
                DomainError::parse(format!(
                    "locations reference '{raw}' names no declared suspect"
                ))
            })?;
            return Ok(Self::Location {
                suspect,
                key: key.to_string(),
            });
        }
        if let Some(rest) = raw.strip_prefix("secret_") {
            let (suspect, id) = split_by_suspect(rest, suspects).ok_or_else(|| {
                DomainError::parse(format!(
                    "secret reference '{raw}' names no declared suspect"
                ))
            })?;
            return Ok(Self::Secret {
                suspect,
                secret: SecretId::new(id),
            });
        }
        Ok(Self::Bare(raw.to_string()))
    }

    /// The id under which this evidence appears in a game's discovered set.
    pub fn canonical_id(&self) -> String {
        match self {
            Self::Log(key) => format!("logs_{key}"),
            Self::Footage(key) => format!("footage_{key}"),
            Self::Dna(room) => format!("dna_{room}"),
            Self::Physical(item) => item.clone(),
            Self::Location { suspect, key } => format!("locations_{suspect}_{key}"),
            Self::Secret { suspect, secret } => format!("secret_{suspect}_{secret}"),
            Self::Bare(id) => id.clone(),
        }
    }

    /// Whether this reference points at something the case actually declares.
    pub fn resolves_in(&self, case: &CaseDefinition) -> bool {
        match self {
            Self::Log(key) => case.evidence.digital_logs.contains_key(key),
            Self::Footage(key) => case.evidence.footage.contains_key(key),
            Self::Dna(room) => case.evidence.dna.contains_key(room),
            Self::Physical(item) => case.evidence.physical_evidence.contains_key(item),
            Self::Location { suspect, key } => case
                .evidence
                .locations
                .get(suspect)
                .is_some_and(|times| times.contains_key(key)),
            Self::Secret { suspect, secret } => case
                .suspect(suspect)
                .is_some_and(|s| s.secrets.iter().any(|sec| &sec.id == secret)),
            Self::Bare(id) => case.evidence.physical_evidence.contains_key(id),
        }
    }
}

impl fmt::Display for EvidenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_id())
    }
}

/// Split `<suspect>_<rest>` against the declared suspect ids, preferring the
/// longest matching id so `lady_ashworth_21:00` resolves to `lady_ashworth`.
fn split_by_suspect<'a>(rest: &'a str, suspects: &[SuspectId]) -> Option<(SuspectId, &'a str)> {
    let mut best: Option<(&SuspectId, &'a str)> = None;
    for suspect in suspects {
        if let Some(tail) = rest.strip_prefix(suspect.as_str()) {
            if let Some(tail) = tail.strip_prefix('_') {
                if best.is_none_or(|(b, _)| suspect.as_str().len() > b.as_str().len()) {
                    best = Some((suspect, tail));
                }
            }
        }
    }
    best.map(|(s, tail)| (s.clone(), tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suspects() -> Vec<SuspectId> {
        vec![
            SuspectId::new("butler"),
            SuspectId::new("lady_ashworth"),
        ]
    }

    #[test]
    fn parses_prefixed_forms() {
        let s = suspects();
        assert_eq!(
            EvidenceRef::parse("logs_22:15", &s),
            Ok(EvidenceRef::Log("22:15".into()))
        );
        assert_eq!(
            EvidenceRef::parse("dna_study", &s),
            Ok(EvidenceRef::Dna(RoomId::new("study")))
        );
        assert_eq!(
            EvidenceRef::parse("physical_bloody_knife", &s),
            Ok(EvidenceRef::Physical("bloody_knife".into()))
        );
    }

    #[test]
    fn location_split_prefers_longest_suspect_id() {
        let s = suspects();
        assert_eq!(
            EvidenceRef::parse("locations_lady_ashworth_21:00", &s),
            Ok(EvidenceRef::Location {
                suspect: SuspectId::new("lady_ashworth"),
                key: "21:00".into(),
            })
        );
    }

    #[test]
    fn unknown_suspect_in_location_is_a_parse_error() {
        assert!(EvidenceRef::parse("locations_ghost_21:00", &suspects()).is_err());
    }

    #[test]
    fn bare_ids_pass_through() {
        assert_eq!(
            EvidenceRef::parse("bloody_knife", &suspects()),
            Ok(EvidenceRef::Bare("bloody_knife".into()))
        );
    }

    #[test]
    fn canonical_id_round_trips_discovery_keys() {
        let s = suspects();
        for raw in ["logs_22:15", "footage_21:30", "dna_study"] {
            let parsed = EvidenceRef::parse(raw, &s).expect("parse");
            assert_eq!(parsed.canonical_id(), raw);
        }
    }
}
