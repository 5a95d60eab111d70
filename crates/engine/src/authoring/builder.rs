//! Case builder: skeleton -> enriched, schema-valid case document.
//!
//! The pipeline runs the structure generator and then a sequence of
//! independently-failable enrichment stages. Any stage failing fails the
//! whole build; a partially built case is never returned, let alone
//! persisted. The LLM only ever polishes prose: structural facts all come
//! from the skeleton, so a dead LLM degrades wording, not correctness.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use gumshoe_domain::{
    CaseDefinition, CaseId, CaseSettings, CaseSkeleton, Difficulty, EvidenceBundle, PointCosts,
    Room, RoomId, Secret, SecretId, SecretTrigger, Solution, SuspectDefinition, Victim,
};

use crate::authoring::generator::{clock_time, generate, slug};
use crate::authoring::templates;
use crate::authoring::validator;
use crate::infrastructure::ports::{LlmPort, LlmRequest};

/// Minutes before the kill that the door log fires.
const DOOR_LOG_LEAD: u32 = 15;

/// Build configuration.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub seed: String,
    pub difficulty: Difficulty,
    pub theme: Option<String>,
    /// Let the LLM polish prose. Structural content is unaffected.
    pub use_llm: bool,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Skeleton,
    Narrative,
    Dossiers,
    Evidence,
    Assembly,
}

impl BuildStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Skeleton => "skeleton",
            Self::Narrative => "narrative",
            Self::Dossiers => "dossiers",
            Self::Evidence => "evidence",
            Self::Assembly => "assembly",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build stage '{stage}' failed: {detail}")]
    Stage {
        stage: BuildStage,
        detail: String,
    },
    #[error("Generated case failed validation: {0:?}")]
    Invalid(Vec<String>),
}

/// Rate-limits progress callbacks to one per second so a slow consumer is
/// never flooded.
struct ProgressThrottle<'a> {
    callback: &'a mut dyn FnMut(BuildStage, &str),
    last_emit: Option<Instant>,
}

impl<'a> ProgressThrottle<'a> {
    const MIN_INTERVAL: Duration = Duration::from_secs(1);

    fn new(callback: &'a mut dyn FnMut(BuildStage, &str)) -> Self {
        Self {
            callback,
            last_emit: None,
        }
    }

    fn report(&mut self, stage: BuildStage, detail: &str) {
        let due = self
            .last_emit
            .is_none_or(|last| last.elapsed() >= Self::MIN_INTERVAL);
        if due {
            (self.callback)(stage, detail);
            self.last_emit = Some(Instant::now());
        }
    }
}

pub struct CaseBuilder {
    llm: Option<Arc<dyn LlmPort>>,
}

impl CaseBuilder {
    pub fn new(llm: Option<Arc<dyn LlmPort>>) -> Self {
        Self { llm }
    }

    /// Run the full pipeline. The returned case has passed the validator
    /// with zero errors.
    pub async fn build(
        &self,
        config: &BuildConfig,
        mut progress: impl FnMut(BuildStage, &str),
    ) -> Result<CaseDefinition, BuildError> {
        let mut progress = ProgressThrottle::new(&mut progress);

        progress.report(BuildStage::Skeleton, "Rolling the structure");
        let theme = config.theme.as_deref().unwrap_or("any");
        let skeleton = generate(&config.seed, config.difficulty, theme);
        let template = templates::by_name(&skeleton.template_name).ok_or_else(|| {
            BuildError::Stage {
                stage: BuildStage::Skeleton,
                detail: format!("skeleton names unknown template '{}'", skeleton.template_name),
            }
        })?;

        progress.report(BuildStage::Narrative, "Writing the synopsis");
        let (name, description) = self.narrative(&skeleton, template, config.use_llm).await;

        progress.report(BuildStage::Dossiers, "Drafting suspect dossiers");
        let suspects = dossiers(&skeleton, config.difficulty)?;

        progress.report(BuildStage::Evidence, "Placing the evidence");
        let evidence = evidence_tables(&skeleton, &suspects)?;

        progress.report(BuildStage::Assembly, "Assembling the case file");
        let case = assemble(&skeleton, template, name, description, suspects, evidence)?;

        let issues = validator::validate(&case, case.id.as_str());
        if validator::has_errors(&issues) {
            return Err(BuildError::Invalid(validator::error_messages(&issues)));
        }
        Ok(case)
    }

    /// Case title and synopsis. With an LLM, the synopsis gets a polish pass;
    /// any failure falls back to the template text.
    async fn narrative(
        &self,
        skeleton: &CaseSkeleton,
        template: &templates::CaseTemplate,
        use_llm: bool,
    ) -> (String, String) {
        let name = format!("The {} Affair", title_words(&skeleton.template_name));
        let fallback = format!(
            "At {}, {}, {}, was found dead in the {}. Everyone else is still on the grounds, \
             and one of them is lying.",
            skeleton.murder_time,
            template.victim_name,
            skeleton.victim_role,
            title_words(skeleton.murder_room.as_str()),
        );

        if !use_llm {
            return (name, fallback);
        }
        let Some(llm) = &self.llm else {
            return (name, fallback);
        };

        let request = LlmRequest {
            system_prompt: "You write terse, atmospheric murder mystery synopses. \
                            Two sentences, no spoilers, no names beyond those given."
                .to_string(),
            messages: vec![crate::infrastructure::ports::LlmMessage {
                role: crate::infrastructure::ports::MessageRole::User,
                content: format!(
                    "Victim: {} ({}). Found in the {} at {}. Setting: {}.",
                    template.victim_name,
                    skeleton.victim_role,
                    title_words(skeleton.murder_room.as_str()),
                    skeleton.murder_time,
                    title_words(&skeleton.template_name),
                ),
            }],
            temperature: Some(0.8),
            max_tokens: Some(160),
        };
        match llm.generate(request).await {
            Ok(response) if !response.content.trim().is_empty() => {
                (name, response.content.trim().to_string())
            }
            Ok(_) => (name, fallback),
            Err(e) => {
                tracing::warn!(error = %e, "LLM synopsis failed, using template text");
                (name, fallback)
            }
        }
    }
}

fn dossiers(
    skeleton: &CaseSkeleton,
    difficulty: Difficulty,
) -> Result<Vec<SuspectDefinition>, BuildError> {
    if skeleton.killer().is_none() {
        return Err(BuildError::Stage {
            stage: BuildStage::Dossiers,
            detail: "skeleton has no killer".to_string(),
        });
    }
    let weapon_item = slug(&skeleton.weapon);
    let flee_clock = clock_time(flee_minute(skeleton)?);

    let innocent_motives = [
        "Owed the victim money, like half the county.",
        "Quarrelled with the victim last season and never made up.",
        "Stood to inherit a trifle, nothing worth this.",
        "Disliked the victim's manner, and said so often.",
    ];
    let killer_resistance = match difficulty {
        Difficulty::Easy => "moderate",
        Difficulty::Medium => "high",
        Difficulty::Hard => "expert",
    };

    let mut suspects = Vec::with_capacity(skeleton.suspects.len());
    let mut innocent_index = 0usize;
    for slot in &skeleton.suspects {
        let display_name = title_words(slot.role.trim_start_matches("the "));
        let room_name = title_words(slot.starting_room.as_str());

        let (motive, resistance, secrets) = if slot.is_killer {
            let slip_id = SecretId::new(format!("{}_slip", slot.id));
            let secrets = vec![
                Secret {
                    id: slip_id.clone(),
                    text: format!(
                        "Fine. I passed the {} that night. I touched nothing.",
                        title_words(skeleton.murder_room.as_str())
                    ),
                    trigger: SecretTrigger {
                        requires_evidence: vec![format!("dna_{}", skeleton.murder_room)],
                        requires_secrets: vec![],
                        keywords: vec![skeleton.murder_room.to_string()],
                        min_pressure: 70,
                    },
                },
                Secret {
                    id: SecretId::new(format!("{}_confession", slot.id)),
                    text: format!(
                        "You already know. The {} was in my hand before I understood what I meant to do.",
                        skeleton.weapon
                    ),
                    trigger: SecretTrigger {
                        requires_evidence: vec![weapon_item.clone()],
                        requires_secrets: vec![slip_id],
                        keywords: vec![skeleton.weapon.clone()],
                        min_pressure: 40,
                    },
                },
            ];
            (skeleton.motive.clone(), killer_resistance, secrets)
        } else {
            let motive = innocent_motives[innocent_index % innocent_motives.len()].to_string();
            // rotate witnesses across the three evidence channels
            let trigger = match innocent_index % 3 {
                0 => SecretTrigger {
                    requires_evidence: vec![format!("footage_{flee_clock}")],
                    requires_secrets: vec![],
                    keywords: vec!["footage".into(), "camera".into()],
                    min_pressure: 60,
                },
                1 => SecretTrigger {
                    requires_evidence: vec![format!("dna_{}", skeleton.murder_room)],
                    requires_secrets: vec![],
                    keywords: vec![skeleton.murder_room.to_string()],
                    min_pressure: 65,
                },
                _ => SecretTrigger {
                    requires_evidence: vec![format!(
                        "logs_{}",
                        clock_time(door_log_minute(skeleton)?)
                    )],
                    requires_secrets: vec![],
                    keywords: vec!["door".into(), "logs".into()],
                    min_pressure: 65,
                },
            };
            let secrets = vec![Secret {
                id: SecretId::new(format!("{}_witnessed", slot.id)),
                text: format!(
                    "I didn't want trouble. I saw someone hurrying toward the {} after the noise.",
                    title_words(skeleton.flee_room.as_str())
                ),
                trigger,
            }];
            innocent_index += 1;
            (motive, "moderate", secrets)
        };

        suspects.push(SuspectDefinition {
            id: slot.id.clone(),
            name: display_name,
            aliases: vec![slot.role.clone()],
            avatar: None,
            is_guilty: slot.is_killer,
            is_accomplice: false,
            is_silent_witness: false,
            alibi: format!("Claims to have spent the evening in the {room_name}."),
            motive,
            traits: vec![],
            current_location: slot.starting_room.clone(),
            resistance: resistance.parse().map_err(|e| BuildError::Stage {
                stage: BuildStage::Dossiers,
                detail: format!("bad resistance level: {e}"),
            })?,
            secrets,
        });
    }
    Ok(suspects)
}

fn evidence_tables(
    skeleton: &CaseSkeleton,
    suspects: &[SuspectDefinition],
) -> Result<EvidenceBundle, BuildError> {
    let mut evidence = EvidenceBundle::default();

    for (room, profiles) in &skeleton.dna {
        evidence
            .dna
            .insert(room.clone(), profiles.iter().cloned().collect());
    }

    evidence.digital_logs.insert(
        clock_time(door_log_minute(skeleton)?),
        format!(
            "Door sensor: the {} opened from the corridor side.",
            title_words(skeleton.murder_room.as_str())
        ),
    );
    evidence.footage.insert(
        clock_time(flee_minute(skeleton)?),
        format!(
            "A figure hurries out of the {} toward the {}.",
            title_words(skeleton.murder_room.as_str()),
            title_words(skeleton.flee_room.as_str())
        ),
    );

    for event in &skeleton.timeline {
        if event.actor == gumshoe_domain::VICTIM_ACTOR {
            continue;
        }
        evidence
            .locations
            .entry(gumshoe_domain::SuspectId::new(event.actor.clone()))
            .or_default()
            .insert(clock_time(event.at), event.room.clone());
    }

    for placed in &skeleton.evidence {
        let description = match placed.kind {
            gumshoe_domain::PlacedEvidenceKind::Weapon => format!(
                "The {}. Recently handled, and not carefully cleaned.",
                placed.label
            ),
            gumshoe_domain::PlacedEvidenceKind::RedHerring => {
                format!("A {}. It may mean nothing at all.", placed.label)
            }
        };
        evidence
            .physical_evidence
            .insert(placed.id.clone(), description);
        evidence
            .physical_discovery
            .entry(placed.room.clone())
            .or_default()
            .push(placed.id.clone());
    }

    for suspect in suspects {
        let statement = if suspect.is_guilty {
            format!(
                "I retired early and heard nothing. {} can confirm it, I'm sure.",
                suspects
                    .iter()
                    .find(|s| s.id != suspect.id)
                    .map(|s| s.name.as_str())
                    .unwrap_or("Someone")
            )
        } else {
            format!("{} I'll answer anything you like.", suspect.alibi)
        };
        evidence
            .initial_police_statements
            .insert(suspect.id.clone(), statement);
    }

    Ok(evidence)
}

fn assemble(
    skeleton: &CaseSkeleton,
    template: &templates::CaseTemplate,
    name: String,
    description: String,
    suspects: Vec<SuspectDefinition>,
    evidence: EvidenceBundle,
) -> Result<CaseDefinition, BuildError> {
    let killer = skeleton.killer().ok_or_else(|| BuildError::Stage {
        stage: BuildStage::Assembly,
        detail: "skeleton has no killer".to_string(),
    })?;

    let map: BTreeMap<RoomId, Room> = skeleton
        .rooms
        .iter()
        .map(|(room, connected)| {
            (
                room.clone(),
                Room {
                    description: format!("The {}.", title_words(room.as_str())),
                    connects_to: connected.clone(),
                    interactables: vec![],
                },
            )
        })
        .collect();

    let time_limit_minutes = match skeleton.difficulty {
        Difficulty::Easy => 30,
        Difficulty::Medium => 45,
        Difficulty::Hard => 60,
    };

    Ok(CaseDefinition {
        id: CaseId::new(format!("{}_{}", skeleton.template_name, slug(&skeleton.seed))),
        name,
        description,
        victim: Victim {
            name: template.victim_name.to_string(),
            id: Some(slug(template.victim_name)),
            cause: format!("struck down with a {}", skeleton.weapon),
            description: format!("{}, {}.", template.victim_name, skeleton.victim_role),
            avatar: None,
        },
        murder_time: skeleton.murder_time.clone(),
        murder_location: skeleton.murder_room.clone(),
        map,
        suspects,
        evidence,
        solution: Solution {
            killer: killer.id.clone(),
            accomplice: None,
            silent_witness: None,
            motive: Some(skeleton.motive.clone()),
            weapon: Some(skeleton.weapon.clone()),
            key_evidence: vec![slug(&skeleton.weapon)],
        },
        settings: CaseSettings {
            time_limit_minutes,
            starting_points: 100,
            difficulty: skeleton.difficulty,
            point_costs: PointCosts::default(),
        },
    })
}

fn flee_minute(skeleton: &CaseSkeleton) -> Result<u32, BuildError> {
    skeleton
        .timeline
        .iter()
        .find(|e| matches!(e.kind, gumshoe_domain::EventKind::Flee))
        .map(|e| e.at)
        .ok_or_else(|| BuildError::Stage {
            stage: BuildStage::Evidence,
            detail: "skeleton timeline has no flee event".to_string(),
        })
}

fn door_log_minute(skeleton: &CaseSkeleton) -> Result<u32, BuildError> {
    skeleton
        .timeline
        .iter()
        .find(|e| matches!(e.kind, gumshoe_domain::EventKind::Kill { .. }))
        .map(|e| e.at.saturating_sub(DOOR_LOG_LEAD))
        .ok_or_else(|| BuildError::Stage {
            stage: BuildStage::Evidence,
            detail: "skeleton timeline has no kill event".to_string(),
        })
}

fn title_words(snake: &str) -> String {
    snake
        .split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
