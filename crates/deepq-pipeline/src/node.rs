//! Stage node trait, dynamic dispatch wrapper, and node registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use deepq_llm::DynCompletion;
use deepq_search::DynSearch;
use deepq_types::{Result, RunState, Stage, StatePatch};

// ---------------------------------------------------------------------------
// StageNode trait
// ---------------------------------------------------------------------------

/// A pipeline stage: reads the current state, returns a patch for the
/// fields it owns.
///
/// Built-in nodes recover every collaborator failure internally and emit a
/// degenerate patch instead; an `Err` from a node is treated as fatal by the
/// engine.
#[async_trait]
pub trait StageNode: Send + Sync {
    /// The stage this node implements.
    fn stage(&self) -> Stage;

    /// Execute this node against the current state.
    async fn run(&self, state: &RunState) -> Result<StatePatch>;
}

// ---------------------------------------------------------------------------
// DynNode — object-safe wrapper
// ---------------------------------------------------------------------------

pub struct DynNode(Box<dyn StageNode>);

impl DynNode {
    pub fn new(node: impl StageNode + 'static) -> Self {
        Self(Box::new(node))
    }

    pub fn stage(&self) -> Stage {
        self.0.stage()
    }

    pub async fn run(&self, state: &RunState) -> Result<StatePatch> {
        self.0.run(state).await
    }
}

// ---------------------------------------------------------------------------
// NodeRegistry
// ---------------------------------------------------------------------------

pub struct NodeRegistry {
    nodes: HashMap<Stage, DynNode>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Register a node under its stage, replacing any previous registration.
    pub fn register(&mut self, node: impl StageNode + 'static) {
        self.nodes.insert(node.stage(), DynNode::new(node));
    }

    pub fn get(&self, stage: Stage) -> Option<&DynNode> {
        self.nodes.get(&stage)
    }

    pub fn has(&self, stage: Stage) -> bool {
        self.nodes.contains_key(&stage)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Default registry factory
// ---------------------------------------------------------------------------

/// Create a registry with the six built-in nodes wired to the given
/// collaborators.
pub fn default_registry(llm: Arc<DynCompletion>, search: Arc<DynSearch>) -> NodeRegistry {
    let mut reg = NodeRegistry::new();
    reg.register(crate::nodes::Planner::new(llm.clone()));
    reg.register(crate::nodes::Researcher::new(search));
    reg.register(crate::nodes::Selector::new(llm.clone()));
    reg.register(crate::nodes::Generator::new(llm.clone()));
    reg.register(crate::nodes::Reviewer::new(llm.clone()));
    reg.register(crate::nodes::Publisher::new(llm));
    reg
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
