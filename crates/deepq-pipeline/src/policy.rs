//! Continuation policy — decides where the pipeline goes after a review.
//!
//! Pure functions only, so the branch selection is testable without an
//! engine or any collaborator.

/// Maximum number of completed review judgments before the pipeline
/// publishes regardless of feedback content.
pub const MAX_REVIEW_ROUNDS: u32 = 3;

/// The stage to run after the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Loop back for another generation pass.
    Generate,
    /// Stop refining and publish.
    Publish,
}

/// Classify free-text reviewer feedback as an approval.
///
/// The feedback is trimmed and uppercased; it approves when it equals
/// `APPROVE`, starts with `APPROVE`, or carries the whitespace-delimited
/// token `APPROVE` within its first two tokens. Token-position heuristics
/// like this can misclassify negated approvals near the start of a
/// sentence; the classification is kept exactly as shipped for
/// compatibility with existing reviewer prompts.
pub fn is_approval(feedback: &str) -> bool {
    let normalized = feedback.trim().to_uppercase();
    if normalized == "APPROVE" || normalized.starts_with("APPROVE") {
        return true;
    }
    normalized.split_whitespace().take(2).any(|t| t == "APPROVE")
}

/// Select the next stage after a reviewer execution.
///
/// Precedence is load-bearing: the iteration cap wins unconditionally, then
/// an approval, then the defensive stop for a run with no artifact and no
/// approval to act on. Only when all three decline does the pipeline loop
/// back to the generator.
pub fn decide(feedback: Option<&str>, iteration: u32, has_artifact: bool) -> Decision {
    if iteration >= MAX_REVIEW_ROUNDS {
        return Decision::Publish;
    }
    if let Some(feedback) = feedback {
        if !feedback.trim().is_empty() && is_approval(feedback) {
            return Decision::Publish;
        }
    }
    if !has_artifact {
        // Never loop on a known-failed generation.
        return Decision::Publish;
    }
    Decision::Generate
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
