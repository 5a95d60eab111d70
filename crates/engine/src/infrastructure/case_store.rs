//! Filesystem case library.
//!
//! Cases live one per directory under the store root:
//! `<root>/<case_id>/case.json`, with an optional `hints.json` beside it.
//! The authoring pipeline writes here; the game manager and the offline
//! validator read.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use gumshoe_domain::{CaseDefinition, CaseId};

use crate::game::hints::HintRule;

#[derive(Debug, Error)]
pub enum CaseStoreError {
    #[error("Case '{case_id}' not found")]
    NotFound { case_id: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Case '{case_id}' is malformed: {source}")]
    Parse {
        case_id: String,
        source: serde_json::Error,
    },
}

pub struct CaseStore {
    root: PathBuf,
}

impl CaseStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn case_file(&self, case_id: &CaseId) -> PathBuf {
        self.root.join(case_id.as_str()).join("case.json")
    }

    /// All case ids with a case file present, sorted.
    pub fn list(&self) -> Result<Vec<CaseId>, CaseStoreError> {
        let mut ids = Vec::new();
        if !self.root.exists() {
            return Ok(ids);
        }
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.path().join("case.json").is_file() {
                ids.push(CaseId::new(name));
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn load(&self, case_id: &CaseId) -> Result<CaseDefinition, CaseStoreError> {
        let path = self.case_file(case_id);
        if !path.is_file() {
            return Err(CaseStoreError::NotFound {
                case_id: case_id.to_string(),
            });
        }
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|source| CaseStoreError::Parse {
            case_id: case_id.to_string(),
            source,
        })
    }

    /// Write a case under its own id directory. Overwrites any previous
    /// version of the same case.
    pub fn save(&self, case: &CaseDefinition) -> Result<PathBuf, CaseStoreError> {
        let dir = self.root.join(case.id.as_str());
        fs::create_dir_all(&dir)?;
        let path = dir.join("case.json");
        let text = serde_json::to_string_pretty(case).map_err(|source| CaseStoreError::Parse {
            case_id: case.id.to_string(),
            source,
        })?;
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Optional authored hint rules for a case. Missing file means no hints.
    pub fn load_hints(&self, case_id: &CaseId) -> Result<Vec<HintRule>, CaseStoreError> {
        let path = self.root.join(case_id.as_str()).join("hints.json");
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|source| CaseStoreError::Parse {
            case_id: case_id.to_string(),
            source,
        })
    }
}
