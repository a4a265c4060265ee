//! Persisted translations.
//!
//! An [`Artifact`] records the actions every step of a scenario resolved to.
//! It is replayed verbatim as long as the scenario's step descriptions are
//! unchanged; any edit invalidates the whole file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::action::Step;
use crate::result::ArtifactError;

/// Current artifact format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

const ARTIFACT_EXTENSION: &str = "json";
const NAME_HASH_LEN: usize = 8;

fn default_version() -> u32 {
    ARTIFACT_FORMAT_VERSION
}

/// Saved translation of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Scenario name
    pub test_name: String,
    /// When the translations were produced
    pub created_at: DateTime<Utc>,
    /// Backend that produced the translations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// One entry per scenario step, in order
    pub steps: Vec<Step>,
}

impl Artifact {
    /// Create an artifact stamped with the current time
    #[must_use]
    pub fn new(test_name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            version: ARTIFACT_FORMAT_VERSION,
            test_name: test_name.into(),
            created_at: Utc::now(),
            provider: None,
            steps,
        }
    }

    /// Record the producing backend
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Total number of stored actions
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.steps.iter().map(|s| s.actions.len()).sum()
    }

    /// Whether this artifact still matches `descriptions`.
    ///
    /// Step counts must agree and every stored description, trimmed, must
    /// equal the corresponding input exactly. Comparison is case-sensitive.
    #[must_use]
    pub fn is_valid<S: AsRef<str>>(&self, descriptions: &[S]) -> bool {
        self.steps.len() == descriptions.len()
            && self
                .steps
                .iter()
                .zip(descriptions)
                .all(|(stored, current)| stored.description.trim() == current.as_ref())
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Directory of artifact files, one per scenario
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `root`; the directory is created on first save
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a scenario name; distinct names never share a file
    #[must_use]
    pub fn path_for(&self, test_name: &str) -> PathBuf {
        self.root
            .join(format!("{}.{ARTIFACT_EXTENSION}", file_stem(test_name)))
    }

    /// Load an artifact.
    ///
    /// A missing file, or one recorded under another scenario name, is
    /// `Ok(None)`; an unreadable or corrupt one is
    /// [`ArtifactError::LoadFailed`].
    pub fn load(&self, test_name: &str) -> Result<Option<Artifact>, ArtifactError> {
        let Some(artifact) = Self::read(&self.path_for(test_name))? else {
            return Ok(None);
        };
        if artifact.test_name != test_name {
            tracing::warn!(
                test_name,
                stored = %artifact.test_name,
                "artifact belongs to another scenario"
            );
            return Ok(None);
        }
        Ok(Some(artifact))
    }

    fn read(path: &Path) -> Result<Option<Artifact>, ArtifactError> {
        let path = path.to_path_buf();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ArtifactError::LoadFailed {
                    path,
                    message: e.to_string(),
                })
            }
        };
        Artifact::from_json(&json)
            .map(Some)
            .map_err(|e| ArtifactError::LoadFailed {
                path,
                message: e.to_string(),
            })
    }

    /// Load an artifact only if it still matches `descriptions`.
    ///
    /// Load failures are logged and treated as a miss.
    #[must_use]
    pub fn load_valid<S: AsRef<str>>(&self, test_name: &str, descriptions: &[S]) -> Option<Artifact> {
        match self.load(test_name) {
            Ok(Some(artifact)) if artifact.is_valid(descriptions) => Some(artifact),
            Ok(Some(_)) => {
                tracing::info!(test_name, "artifact is stale");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable artifact");
                None
            }
        }
    }

    /// Write an artifact atomically (temp file in the same directory, then rename).
    ///
    /// The artifact must be recorded under `test_name`.
    pub fn save(&self, test_name: &str, artifact: &Artifact) -> Result<PathBuf, ArtifactError> {
        let path = self.path_for(test_name);
        let save_failed = |message: String| ArtifactError::SaveFailed {
            path: path.clone(),
            message,
        };

        if artifact.test_name != test_name {
            return Err(save_failed(format!(
                "artifact is recorded as '{}', not '{test_name}'",
                artifact.test_name
            )));
        }

        fs::create_dir_all(&self.root).map_err(|e| save_failed(e.to_string()))?;
        let json = artifact.to_json().map_err(|e| save_failed(e.to_string()))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.root).map_err(|e| save_failed(e.to_string()))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.write_all(b"\n"))
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| save_failed(e.to_string()))?;
        tmp.persist(&path)
            .map_err(|e| save_failed(e.error.to_string()))?;

        tracing::info!(
            test_name,
            steps = artifact.steps.len(),
            path = %path.display(),
            "artifact saved"
        );
        Ok(path)
    }

    /// Remove an artifact; returns whether a file existed
    pub fn delete(&self, test_name: &str) -> Result<bool, ArtifactError> {
        let path = self.path_for(test_name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ArtifactError::SaveFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Scenario names of the stored artifacts, sorted.
    ///
    /// Unreadable files are logged and skipped.
    pub fn list(&self) -> Result<Vec<String>, ArtifactError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ArtifactError::LoadFailed {
                    path: self.root.clone(),
                    message: e.to_string(),
                })
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(ARTIFACT_EXTENSION)
            })
            .filter_map(|path| match Self::read(&path) {
                Ok(artifact) => artifact.map(|a| a.test_name),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable artifact");
                    None
                }
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Map a scenario name to a safe file stem
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "scenario".to_string()
    } else {
        cleaned.to_string()
    }
}

/// File stem for a scenario name.
///
/// The sanitized name, suffixed with a short SHA-256 of the raw name
/// whenever sanitizing changed it.
#[must_use]
pub fn file_stem(name: &str) -> String {
    let cleaned = sanitize_name(name);
    if cleaned == name {
        return cleaned;
    }
    let digest = format!("{:x}", Sha256::digest(name.as_bytes()));
    format!("{cleaned}-{}", &digest[..NAME_HASH_LEN])
}
