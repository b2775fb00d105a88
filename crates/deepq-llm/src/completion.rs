use async_trait::async_trait;

use deepq_types::Result;

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// A reasoning-service collaborator: one system-instructed completion call.
///
/// Every pipeline node except the researcher talks to the service through
/// this trait, so tests can substitute a scripted implementation.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// DynCompletion
// ---------------------------------------------------------------------------

pub struct DynCompletion(Box<dyn Completion>);

impl DynCompletion {
    pub fn new(client: impl Completion + 'static) -> Self {
        Self(Box::new(client))
    }

    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.0.complete(system, user).await
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct MockClient;

    #[async_trait]
    impl Completion for MockClient {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            Ok(format!("echo: {user}"))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn dyn_completion_forwards_calls() {
        let client = DynCompletion::new(MockClient);
        assert_eq!(client.name(), "mock");
        let text = client.complete("sys", "hi").await.unwrap();
        assert_eq!(text, "echo: hi");
    }
}
