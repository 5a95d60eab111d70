//! Per-suspect runtime state: composure, revealed secrets, and the prompt
//! that voices the persona.

use std::collections::BTreeSet;

use gumshoe_domain::{
    CaseDefinition, Composure, EvidenceRef, Secret, SecretId, SuspectDefinition, SuspectId,
};

use crate::game::hints::normalize;

/// Pressure before resistance scaling for evidence a secret directly requires.
const DIRECT_MATCH_PRESSURE: u8 = 30;

/// Pressure before resistance scaling for a keyword graze.
const KEYWORD_MATCH_PRESSURE: u8 = 15;

/// Conversation turns kept as LLM context.
const MEMORY_TURNS: usize = 8;

/// A suspect instance inside one running game.
pub struct Suspect {
    definition: SuspectDefinition,
    /// Canonical evidence ids per secret, parsed once at game start and
    /// index-aligned with `definition.secrets`.
    requirements: Vec<Vec<String>>,
    composure: Composure,
    revealed: BTreeSet<SecretId>,
    busy: bool,
    /// (player line, suspect reply) pairs, oldest first.
    memory: Vec<(String, String)>,
}

impl Suspect {
    pub fn new(definition: SuspectDefinition, all_suspects: &[SuspectId]) -> Self {
        let requirements = definition
            .secrets
            .iter()
            .map(|secret| {
                secret
                    .trigger
                    .requires_evidence
                    .iter()
                    .filter_map(|raw| {
                        EvidenceRef::parse(raw, all_suspects)
                            .map(|r| r.canonical_id())
                            .map_err(|e| {
                                tracing::warn!(
                                    suspect = %definition.id,
                                    secret = %secret.id,
                                    error = %e,
                                    "Dropping unparseable trigger reference"
                                );
                            })
                            .ok()
                    })
                    .collect()
            })
            .collect();
        Self {
            definition,
            requirements,
            composure: Composure::FULL,
            revealed: BTreeSet::new(),
            busy: false,
            memory: Vec::new(),
        }
    }

    pub fn id(&self) -> &SuspectId {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &SuspectDefinition {
        &self.definition
    }

    pub fn composure(&self) -> u8 {
        self.composure.value()
    }

    /// Defensiveness rises from the resistance baseline as composure falls;
    /// a cornered suspect stonewalls harder.
    pub fn defensiveness(&self) -> u8 {
        let baseline = self.definition.resistance.baseline_defensiveness();
        let rattled = (100 - self.composure.value()) / 2;
        baseline.saturating_add(rattled).min(100)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Claim the suspect for an in-flight interrogation. Returns false if
    /// someone else already has them.
    pub fn begin_questioning(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn end_questioning(&mut self) {
        self.busy = false;
    }

    pub fn revealed_ids(&self) -> &BTreeSet<SecretId> {
        &self.revealed
    }

    pub fn revealed_secrets(&self) -> impl Iterator<Item = &Secret> {
        self.definition
            .secrets
            .iter()
            .filter(|s| self.revealed.contains(&s.id))
    }

    pub fn secrets_total(&self) -> usize {
        self.definition.secrets.len()
    }

    pub fn secrets_revealed(&self) -> usize {
        self.revealed.len()
    }

    /// Composure loss for presenting `evidence_id`, after resistance scaling.
    /// Evidence a still-hidden secret requires hits hardest; a keyword graze
    /// still stings; irrelevant evidence does nothing.
    pub fn pressure_for(&self, evidence_id: &str) -> u8 {
        let normalized = normalize(evidence_id);
        let mut raw = 0u8;
        for (idx, secret) in self.definition.secrets.iter().enumerate() {
            if self.revealed.contains(&secret.id) {
                continue;
            }
            if self.requirements[idx]
                .iter()
                .any(|req| normalize(req) == normalized)
            {
                raw = raw.max(DIRECT_MATCH_PRESSURE);
            } else if secret
                .trigger
                .keywords
                .iter()
                .any(|kw| normalized.contains(&normalize(kw)))
            {
                raw = raw.max(KEYWORD_MATCH_PRESSURE);
            }
        }
        raw / self.definition.resistance.pressure_divisor()
    }

    /// Apply composure loss. Monotonic; nothing ever restores composure.
    pub fn apply_pressure(&mut self, loss: u8) {
        self.composure = self.composure.lose(loss);
    }

    /// Reveal every secret whose gate now passes: composure below the
    /// threshold, required evidence discovered, prerequisite secrets already
    /// out (own or anyone's). Loops so a reveal can unlock its dependent in
    /// the same confrontation.
    pub fn collect_reveals(
        &mut self,
        discovered: &BTreeSet<String>,
        revealed_anywhere: &BTreeSet<SecretId>,
    ) -> Vec<Secret> {
        let mut newly = Vec::new();
        loop {
            let mut progressed = false;
            for (idx, secret) in self.definition.secrets.iter().enumerate() {
                if self.revealed.contains(&secret.id) {
                    continue;
                }
                if !self.composure.broken_below(secret.trigger.min_pressure) {
                    continue;
                }
                let evidence_met = self.requirements[idx]
                    .iter()
                    .all(|req| discovered.contains(req));
                if !evidence_met {
                    continue;
                }
                let prerequisites_met = secret.trigger.requires_secrets.iter().all(|id| {
                    self.revealed.contains(id) || revealed_anywhere.contains(id)
                });
                if !prerequisites_met {
                    continue;
                }
                self.revealed.insert(secret.id.clone());
                newly.push(secret.clone());
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
        newly
    }

    pub fn remember(&mut self, question: String, answer: String) {
        self.memory.push((question, answer));
        if self.memory.len() > MEMORY_TURNS {
            let excess = self.memory.len() - MEMORY_TURNS;
            self.memory.drain(..excess);
        }
    }

    pub fn memory(&self) -> &[(String, String)] {
        &self.memory
    }

    /// System prompt for the persona voice call.
    pub fn persona_prompt(&self, case: &CaseDefinition, newly_revealed: &[Secret]) -> String {
        let mut prompt = format!(
            "You are {name}, a suspect in the murder of {victim}. Stay in character and answer \
             in one or two sentences.\n\
             Your alibi: {alibi}\n\
             Your temperament: {traits}\n\
             Composure: {composure}/100. Defensiveness: {defensiveness}/100. The lower your \
             composure, the more your answers fray at the edges.",
            name = self.definition.name,
            victim = case.victim.name,
            alibi = self.definition.alibi,
            traits = if self.definition.traits.is_empty() {
                "guarded".to_string()
            } else {
                self.definition.traits.join(", ")
            },
            composure = self.composure.value(),
            defensiveness = self.defensiveness(),
        );
        if newly_revealed.is_empty() {
            prompt.push_str("\nYou admit nothing new. Deflect without volunteering anything.");
        } else {
            prompt.push_str("\nThe pressure has worked. Work the following admission into your reply, in your own words:");
            for secret in newly_revealed {
                prompt.push('\n');
                prompt.push_str(&secret.text);
            }
        }
        prompt
    }
}
