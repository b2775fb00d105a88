use std::sync::Arc;

use async_trait::async_trait;

use deepq_llm::{parse_json_response, DynCompletion};
use deepq_types::{Artifact, Result, RunState, SelectedCandidate, Stage, StatePatch};

use crate::node::StageNode;

const CREATION_SYSTEM: &str = "\
You are a Staff GenAI Engineer creating a system design interview question.
Based on the provided research paper, create a question in the following specific format:

1. **The Interview Question**: A scenario-based question that tests deep understanding.
2. **The Common Wrong Answer**: A plausible but flawed response that strong engineers might give.
3. **How It Actually Works**: A concise technical breakdown of the solution based on the paper.
4. **Key Paper**: The citation for the paper.

The question should be difficult and reveal whether the candidate understands the nuances of the topic.

Return the output as a JSON object with keys: \"question\", \"wrong_answer\", \"explanation\", \"citation\".";

// ---------------------------------------------------------------------------
// Generator — selected candidate to artifact
// ---------------------------------------------------------------------------

pub struct Generator {
    llm: Arc<DynCompletion>,
}

impl Generator {
    pub fn new(llm: Arc<DynCompletion>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StageNode for Generator {
    fn stage(&self) -> Stage {
        Stage::Generate
    }

    async fn run(&self, state: &RunState) -> Result<StatePatch> {
        let Some(selected) = &state.selected else {
            tracing::info!("No selected candidate; skipping generation");
            return Ok(StatePatch::Generated { artifact: None });
        };

        // Refinement mode needs both a prior artifact and actual feedback.
        let prior = match (&state.artifact, state.feedback.as_deref()) {
            (Some(artifact), Some(feedback)) if !feedback.is_empty() => {
                Some((artifact, feedback))
            }
            _ => None,
        };

        let (system, user) = match prior {
            Some((artifact, feedback)) => (refinement_prompt(artifact, feedback), "Refine the question.".to_string()),
            None => (
                CREATION_SYSTEM.to_string(),
                format!(
                    "Topic: {}\n\nPaper Title: {}\nSummary: {}\nURL: {}",
                    state.topic, selected.title, selected.summary, selected.url
                ),
            ),
        };

        let artifact = match self.llm.complete(&system, &user).await {
            Ok(text) => match parse_json_response::<Artifact>(&text, "artifact") {
                Ok(mut artifact) => {
                    ensure_citation(&mut artifact, selected);
                    Some(artifact)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Generator output unparsable; dropping artifact");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Generator completion failed; dropping artifact");
                None
            }
        };

        tracing::info!(generated = artifact.is_some(), "Generation finished");
        Ok(StatePatch::Generated { artifact })
    }
}

fn refinement_prompt(artifact: &Artifact, feedback: &str) -> String {
    format!(
        "You are a Staff GenAI Engineer refining an interview question based on feedback.\n\n\
         Original Question: {}\n\
         Original Wrong Answer: {}\n\
         Original Explanation: {}\n\n\
         Feedback: {}\n\n\
         Refine the question to address the feedback while maintaining the required format.\n\
         Return the output as a JSON object with keys: \"question\", \"wrong_answer\", \"explanation\", \"citation\".",
        artifact.question, artifact.wrong_answer, artifact.explanation, feedback
    )
}

/// Citation invariant: whatever the service returned, the citation must carry
/// the selected candidate's URL. Rewrite it deterministically when it does not.
fn ensure_citation(artifact: &mut Artifact, selected: &SelectedCandidate) {
    if !artifact.citation.contains(&selected.url) {
        let authors = selected.authors.as_deref().unwrap_or("Unknown");
        artifact.citation = format!("{} - {} ({})", selected.title, authors, selected.url);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
