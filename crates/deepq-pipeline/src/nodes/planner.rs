use std::sync::Arc;

use async_trait::async_trait;

use deepq_llm::DynCompletion;
use deepq_types::{Result, RunState, Stage, StatePatch};

use crate::node::StageNode;

const PLANNER_SYSTEM: &str = "\
You are a senior technical interviewer planning to create a deep dive interview question.
Given a high-level topic, generate 3 specific search queries to find recent (2023-2025) research papers
that discuss system design patterns, failure modes, or architectural choices related to that topic.
Focus on \"Deep Learning\", \"LLM Systems\", \"Generative AI Infrastructure\".
Return only the queries, separated by commas.";

// ---------------------------------------------------------------------------
// Planner — topic to search queries
// ---------------------------------------------------------------------------

pub struct Planner {
    llm: Arc<DynCompletion>,
}

impl Planner {
    pub fn new(llm: Arc<DynCompletion>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StageNode for Planner {
    fn stage(&self) -> Stage {
        Stage::Plan
    }

    async fn run(&self, state: &RunState) -> Result<StatePatch> {
        let user = format!("Topic: {}", state.topic);
        let queries = match self.llm.complete(PLANNER_SYSTEM, &user).await {
            Ok(text) => parse_query_list(&text),
            Err(e) => {
                tracing::warn!(error = %e, "Planner completion failed; continuing with no queries");
                Vec::new()
            }
        };
        // An empty set is a valid degenerate result and must propagate.
        tracing::info!(count = queries.len(), "Planned research queries");
        Ok(StatePatch::Planned { queries })
    }
}

/// Split a comma-separated service response into trimmed, non-empty queries.
fn parse_query_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use deepq_llm::Completion;
    use deepq_types::DeepqError;

    struct FixedClient(&'static str);

    #[async_trait]
    impl Completion for FixedClient {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingClient;

    #[async_trait]
    impl Completion for FailingClient {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            Err(DeepqError::Provider {
                provider: "openai".into(),
                status: 503,
                message: "unavailable".into(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn parses_comma_separated_queries() {
        let queries = parse_query_list("kv cache eviction, paged attention, vllm scheduling");
        assert_eq!(
            queries,
            vec!["kv cache eviction", "paged attention", "vllm scheduling"]
        );
    }

    #[test]
    fn drops_empty_segments() {
        let queries = parse_query_list("a, , b,");
        assert_eq!(queries, vec!["a", "b"]);
        assert!(parse_query_list("").is_empty());
    }

    #[tokio::test]
    async fn planner_writes_queries_patch() {
        let planner = Planner::new(Arc::new(DynCompletion::new(FixedClient("q1, q2, q3"))));
        let patch = planner.run(&RunState::new("KV Cache")).await.unwrap();
        match patch {
            StatePatch::Planned { queries } => assert_eq!(queries.len(), 3),
            other => panic!("Expected Planned patch, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_no_queries() {
        let planner = Planner::new(Arc::new(DynCompletion::new(FailingClient)));
        let patch = planner.run(&RunState::new("KV Cache")).await.unwrap();
        match patch {
            StatePatch::Planned { queries } => assert!(queries.is_empty()),
            other => panic!("Expected Planned patch, got: {other:?}"),
        }
    }
}
