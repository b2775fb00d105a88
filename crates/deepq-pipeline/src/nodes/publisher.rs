use std::sync::Arc;

use async_trait::async_trait;

use deepq_llm::DynCompletion;
use deepq_types::{Result, RunState, Stage, StatePatch};

use crate::node::StageNode;

const PUBLISHER_SYSTEM: &str = "\
You are a viral tech influencer on LinkedIn.
Create a LinkedIn post based on the following interview question.

The post MUST follow this specific structure:
1.  **Hook**: A catchy opening line setting the scene (e.g., \"You're in an ML Engineer interview at OpenAI...\").
2.  **The Scenario**: Briefly state the interview question.
3.  **The Trap**: \"Don't answer: [Common Wrong Answer]\". Explain why it's shallow.
4.  **The Insight**: \"The real bottleneck is...\" or \"Here's the deep dive...\". Explain the core tradeoff or mechanism.
5.  **The Hired Answer**: \"The answer that gets you hired: [The Solution]\".

Keep it punchy, use bolding for key terms (like **Recall**, **Precision**), and use emojis sparingly but effectively.";

// ---------------------------------------------------------------------------
// Publisher — artifact to a published post
// ---------------------------------------------------------------------------

pub struct Publisher {
    llm: Arc<DynCompletion>,
}

impl Publisher {
    pub fn new(llm: Arc<DynCompletion>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StageNode for Publisher {
    fn stage(&self) -> Stage {
        Stage::Publish
    }

    async fn run(&self, state: &RunState) -> Result<StatePatch> {
        let Some(artifact) = &state.artifact else {
            tracing::info!("No artifact to publish");
            return Ok(StatePatch::Published { post: None });
        };

        let user = format!(
            "Question: {}\nWrong Answer: {}\nExplanation: {}",
            artifact.question, artifact.wrong_answer, artifact.explanation
        );

        let post = match self.llm.complete(PUBLISHER_SYSTEM, &user).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "Publisher completion failed; no post produced");
                None
            }
        };

        tracing::info!(published = post.is_some(), "Publish finished");
        Ok(StatePatch::Published { post })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use deepq_llm::Completion;
    use deepq_types::{Artifact, DeepqError};

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
                status: 500,
                message: "boom".into(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn missing_artifact_publishes_nothing() {
        let publisher = Publisher::new(Arc::new(DynCompletion::new(FailingClient)));
        let patch = publisher.run(&RunState::new("topic")).await.unwrap();
        match patch {
            StatePatch::Published { post } => assert!(post.is_none()),
            other => panic!("Expected Published patch, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn artifact_yields_the_service_response() {
        let publisher = Publisher::new(Arc::new(DynCompletion::new(FixedClient(
            "You're in an ML Engineer interview...",
        ))));
        let mut state = RunState::new("topic");
        state.artifact = Some(Artifact {
            question: "q".into(),
            wrong_answer: "w".into(),
            explanation: "e".into(),
            citation: "c".into(),
        });
        let patch = publisher.run(&state).await.unwrap();
        match patch {
            StatePatch::Published { post } => {
                assert_eq!(post.as_deref(), Some("You're in an ML Engineer interview..."));
            }
            other => panic!("Expected Published patch, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_none() {
        let publisher = Publisher::new(Arc::new(DynCompletion::new(FailingClient)));
        let mut state = RunState::new("topic");
        state.artifact = Some(Artifact {
            question: "q".into(),
            wrong_answer: "w".into(),
            explanation: "e".into(),
            citation: "c".into(),
        });
        let patch = publisher.run(&state).await.unwrap();
        match patch {
            StatePatch::Published { post } => assert!(post.is_none()),
            other => panic!("Expected Published patch, got: {other:?}"),
        }
    }
}
