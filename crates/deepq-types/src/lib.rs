//! Shared types for the deepq pipeline.
//!
//! This crate provides the foundational types used across all other deepq crates:
//! - `DeepqError` — unified error taxonomy
//! - `RunState` — the state record threaded through every stage
//! - `StatePatch` — a stage's partial update, one variant per owning stage
//! - `Stage` — the pipeline's finite set of stages

use serde::{Deserialize, Serialize};

/// Unified error type for all deepq subsystems.
#[derive(Debug, thiserror::Error)]
pub enum DeepqError {
    // === Collaborator errors (recovered inside nodes) ===
    #[error("Provider {provider} returned HTTP {status}: {message}")]
    Provider {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Missing credentials for provider {provider}")]
    Auth { provider: String },

    #[error("Malformed {expected} response: {message}")]
    Parse { expected: String, message: String },

    // === Engine errors (fatal) ===
    #[error("Step ceiling of {ceiling} node invocations exceeded at stage '{stage}'")]
    StepCeilingExceeded { ceiling: u64, stage: String },

    #[error("No node registered for stage '{stage}'")]
    UnregisteredStage { stage: String },

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl DeepqError {
    /// Returns `true` if the error signals an engine defect rather than a
    /// domain failure. Fatal errors abort the run; everything else is
    /// recovered inside the node that hit it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DeepqError::StepCeilingExceeded { .. } | DeepqError::UnregisteredStage { .. }
        )
    }
}

/// A convenience alias for `Result<T, DeepqError>`.
pub type Result<T> = std::result::Result<T, DeepqError>;

// ---------------------------------------------------------------------------
// Stage — the pipeline's finite set of stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Plan,
    Research,
    Select,
    Generate,
    Review,
    Publish,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::Research => "research",
            Stage::Select => "select",
            Stage::Generate => "generate",
            Stage::Review => "review",
            Stage::Publish => "publish",
            Stage::Done => "done",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain records
// ---------------------------------------------------------------------------

/// A research result returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub summary: String,
}

/// The candidate chosen for question generation, optionally enriched by the
/// reasoning service with authors and a selection rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCandidate {
    pub title: String,
    #[serde(default)]
    pub authors: Option<String>,
    pub summary: String,
    pub url: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl From<Candidate> for SelectedCandidate {
    fn from(c: Candidate) -> Self {
        Self {
            title: c.title,
            authors: None,
            summary: c.summary,
            url: c.url,
            reason: None,
        }
    }
}

/// The generated interview-question object. Either fully populated or absent
/// from the state, never partial: `question`, `wrong_answer`, and
/// `explanation` are required for a parse to succeed, and the generator
/// rewrites `citation` whenever it lacks the source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub question: String,
    pub wrong_answer: String,
    pub explanation: String,
    #[serde(default)]
    pub citation: String,
}

// ---------------------------------------------------------------------------
// RunState — the state record threaded through every stage
// ---------------------------------------------------------------------------

/// The mutable document a run is built up in. Created once per run with all
/// optional fields empty; each stage writes only the fields it owns, via
/// [`StatePatch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub topic: String,
    pub queries: Vec<String>,
    pub candidates: Vec<Candidate>,
    pub selected: Option<SelectedCandidate>,
    pub artifact: Option<Artifact>,
    pub feedback: Option<String>,
    pub iteration: u32,
    pub post: Option<String>,
}

impl RunState {
    /// Create the initial state for a run on `topic`.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            queries: Vec::new(),
            candidates: Vec::new(),
            selected: None,
            artifact: None,
            feedback: None,
            iteration: 0,
            post: None,
        }
    }

    /// Merge a stage's patch into the state. Only the fields carried by the
    /// patch variant are overwritten; everything else is left untouched.
    pub fn apply(&mut self, patch: StatePatch) {
        match patch {
            StatePatch::Planned { queries } => self.queries = queries,
            StatePatch::Researched { candidates } => self.candidates = candidates,
            StatePatch::Selected { selected } => self.selected = selected,
            StatePatch::Generated { artifact } => self.artifact = artifact,
            StatePatch::Reviewed {
                feedback,
                iteration,
            } => {
                self.feedback = feedback;
                self.iteration = iteration;
            }
            StatePatch::Published { post } => self.post = post,
        }
    }
}

// ---------------------------------------------------------------------------
// StatePatch — a stage's partial update
// ---------------------------------------------------------------------------

/// Output of a single stage node. One variant per owning stage, so a node
/// cannot write fields it does not own — the ownership contract is enforced
/// by the type system rather than by runtime policing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatePatch {
    Planned { queries: Vec<String> },
    Researched { candidates: Vec<Candidate> },
    Selected { selected: Option<SelectedCandidate> },
    Generated { artifact: Option<Artifact> },
    Reviewed { feedback: Option<String>, iteration: u32 },
    Published { post: Option<String> },
}

// ---------------------------------------------------------------------------
// RunSummary — per-run metadata
// ---------------------------------------------------------------------------

/// Metadata describing one completed run: identity, timing, and how many
/// node invocations it took.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: uuid::Uuid,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub steps: u64,
}
