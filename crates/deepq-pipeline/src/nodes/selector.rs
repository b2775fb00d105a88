use std::sync::Arc;

use async_trait::async_trait;

use deepq_llm::{parse_json_response, DynCompletion};
use deepq_types::{Result, RunState, SelectedCandidate, Stage, StatePatch};

use crate::node::StageNode;

const SELECTOR_SYSTEM: &str = "\
You are an expert researcher selecting a key paper for a technical interview question.
Review the following list of search results (papers/articles).
Select the one that is most suitable for creating a \"Senior/Staff\" level system design interview question.
The paper should ideally discuss a specific failure mode, optimization technique, or architectural pattern.

Return the output as a JSON object with the following keys:
- title: The title of the paper/article
- authors: The authors (if available in the summary, otherwise \"Unknown\")
- summary: A brief summary of the key technical insight
- url: The URL
- reason: Why you selected this paper";

// ---------------------------------------------------------------------------
// Selector — candidates to one selected candidate
// ---------------------------------------------------------------------------

pub struct Selector {
    llm: Arc<DynCompletion>,
}

impl Selector {
    pub fn new(llm: Arc<DynCompletion>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StageNode for Selector {
    fn stage(&self) -> Stage {
        Stage::Select
    }

    async fn run(&self, state: &RunState) -> Result<StatePatch> {
        if state.candidates.is_empty() {
            tracing::info!("No candidates to select from");
            return Ok(StatePatch::Selected { selected: None });
        }

        let listing = state
            .candidates
            .iter()
            .map(|c| format!("Title: {}\nURL: {}\nSummary: {}", c.title, c.url, c.summary))
            .collect::<Vec<_>>()
            .join("\n\n");
        let user = format!("Topic: {}\n\nPapers:\n{}", state.topic, listing);

        // Selection is never silently None when candidates exist: any
        // provider or parse failure falls back to the first candidate in
        // original order.
        let selected: SelectedCandidate = match self.llm.complete(SELECTOR_SYSTEM, &user).await {
            Ok(text) => match parse_json_response(&text, "selection") {
                Ok(selected) => selected,
                Err(e) => {
                    tracing::warn!(error = %e, "Selection unparsable; falling back to first candidate");
                    state.candidates[0].clone().into()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Selector completion failed; falling back to first candidate");
                state.candidates[0].clone().into()
            }
        };

        tracing::info!(title = %selected.title, "Candidate selected");
        Ok(StatePatch::Selected {
            selected: Some(selected),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
