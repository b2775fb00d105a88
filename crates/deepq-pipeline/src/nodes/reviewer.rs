use std::sync::Arc;

use async_trait::async_trait;

use deepq_llm::DynCompletion;
use deepq_types::{Result, RunState, Stage, StatePatch};

use crate::node::StageNode;

const REVIEWER_SYSTEM: &str = "\
You are a Bar Raiser at a top tech company reviewing an interview question.
Critique the following question for depth, clarity, and correctness.

Is it a \"Senior/Staff\" level question?
Does the \"Common Wrong Answer\" sound realistic?
Is the \"How It Actually Works\" section technically accurate based on general knowledge?

If it is good, return \"APPROVE\".
If it needs improvement, provide specific feedback on what to change.";

/// Feedback emitted on the short-circuit path when there is no artifact to
/// review. The iteration counter is not advanced on that path.
pub const MISSING_ARTIFACT_FEEDBACK: &str = "Failed to generate question.";

// ---------------------------------------------------------------------------
// Reviewer — artifact to feedback, advancing the iteration counter
// ---------------------------------------------------------------------------

pub struct Reviewer {
    llm: Arc<DynCompletion>,
}

impl Reviewer {
    pub fn new(llm: Arc<DynCompletion>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StageNode for Reviewer {
    fn stage(&self) -> Stage {
        Stage::Review
    }

    async fn run(&self, state: &RunState) -> Result<StatePatch> {
        let Some(artifact) = &state.artifact else {
            tracing::info!("No artifact to review");
            return Ok(StatePatch::Reviewed {
                feedback: Some(MISSING_ARTIFACT_FEEDBACK.to_string()),
                iteration: state.iteration,
            });
        };

        let user = format!(
            "Question: {}\nWrong Answer: {}\nExplanation: {}",
            artifact.question, artifact.wrong_answer, artifact.explanation
        );

        let (feedback, iteration) = match self.llm.complete(REVIEWER_SYSTEM, &user).await {
            Ok(text) => {
                let iteration = state.iteration + 1;
                tracing::info!(
                    iteration,
                    feedback_preview = %text.chars().take(200).collect::<String>(),
                    "Review complete"
                );
                (Some(text), iteration)
            }
            Err(e) => {
                // Count the round even though the judgment is lost, so the
                // generate/review loop stays bounded by the iteration cap
                // instead of running into the step ceiling.
                tracing::warn!(error = %e, "Reviewer completion failed; counting the round");
                (None, state.iteration + 1)
            }
        };

        Ok(StatePatch::Reviewed {
            feedback,
            iteration,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
