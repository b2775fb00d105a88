//! Pipeline execution engine — the core stage-dispatch loop.
//!
//! A run is an explicit finite state machine over [`Stage`]: a linear chain
//! from plan to review, with the reviewer's outgoing edge resolved by the
//! continuation policy, and a hard step ceiling guarding against policy
//! bugs that would otherwise loop forever.

use deepq_types::{DeepqError, Result, RunState, RunSummary, Stage};

use crate::node::NodeRegistry;
use crate::policy::{self, Decision};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum total node invocations per run. This is defense in depth,
    /// independent of the domain iteration cap: exceeding it means the
    /// continuation policy or a node is defective, and is the only fatal
    /// error a run can produce.
    pub max_steps: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_steps: 100 }
    }
}

/// The pipeline engine. Owns a node registry; stateless between runs, so a
/// single engine value can serve any number of sequential or concurrent
/// runs (each run owns its own state record).
pub struct Engine {
    registry: NodeRegistry,
    config: EngineConfig,
}

/// A report for one executed step in observable mode.
#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    /// The stage that just executed.
    pub stage: Stage,
    /// The stage the engine will execute next (`Done` when terminal).
    pub next: Stage,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

impl Engine {
    pub fn new(registry: NodeRegistry) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(registry: NodeRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// Begin an observable run on `topic`. Drive it with [`Run::step`].
    pub fn start(&self, topic: impl Into<String>) -> Run<'_> {
        let run_id = uuid::Uuid::new_v4();
        let started_at = chrono::Utc::now();
        tracing::info!(%run_id, "Run started");
        Run {
            engine: self,
            state: RunState::new(topic),
            stage: Stage::Plan,
            steps: 0,
            run_id,
            started_at,
        }
    }

    /// Blocking run-to-completion call: execute every stage and return the
    /// final state record with the run's summary.
    pub async fn run(&self, topic: impl Into<String>) -> Result<(RunState, RunSummary)> {
        self.start(topic).run_to_completion().await
    }
}

/// Resolve the edge out of `stage`. Everything is linear except the
/// reviewer, whose edge the continuation policy selects.
fn next_stage(stage: Stage, state: &RunState) -> Stage {
    match stage {
        Stage::Plan => Stage::Research,
        Stage::Research => Stage::Select,
        Stage::Select => Stage::Generate,
        Stage::Generate => Stage::Review,
        Stage::Review => match policy::decide(
            state.feedback.as_deref(),
            state.iteration,
            state.artifact.is_some(),
        ) {
            Decision::Generate => Stage::Generate,
            Decision::Publish => Stage::Publish,
        },
        Stage::Publish | Stage::Done => Stage::Done,
    }
}

// ---------------------------------------------------------------------------
// Run — one in-flight execution
// ---------------------------------------------------------------------------

pub struct Run<'a> {
    engine: &'a Engine,
    state: RunState,
    stage: Stage,
    steps: u64,
    run_id: uuid::Uuid,
    started_at: chrono::DateTime<chrono::Utc>,
}

impl Run<'_> {
    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            steps: self.steps,
        }
    }

    /// Execute the current stage, merge its patch, and advance. Returns
    /// `None` once the run is terminal.
    pub async fn step(&mut self) -> Result<Option<StepReport>> {
        if self.stage == Stage::Done {
            return Ok(None);
        }
        if self.steps >= self.engine.config.max_steps {
            return Err(DeepqError::StepCeilingExceeded {
                ceiling: self.engine.config.max_steps,
                stage: self.stage.to_string(),
            });
        }

        let node = self
            .engine
            .registry
            .get(self.stage)
            .ok_or_else(|| DeepqError::UnregisteredStage {
                stage: self.stage.to_string(),
            })?;

        let patch = node.run(&self.state).await?;
        self.state.apply(patch);
        self.steps += 1;

        let next = next_stage(self.stage, &self.state);
        tracing::info!(
            run_id = %self.run_id,
            stage = %self.stage,
            next = %next,
            iteration = self.state.iteration,
            steps = self.steps,
            "Stage completed"
        );

        let report = StepReport {
            stage: self.stage,
            next,
        };
        self.stage = next;
        Ok(Some(report))
    }

    /// Drive [`step`](Run::step) until the run is terminal.
    pub async fn run_to_completion(mut self) -> Result<(RunState, RunSummary)> {
        while self.step().await?.is_some() {}
        let summary = self.summary();
        tracing::info!(
            run_id = %self.run_id,
            steps = summary.steps,
            iteration = self.state.iteration,
            has_artifact = self.state.artifact.is_some(),
            has_post = self.state.post.is_some(),
            "Run finished"
        );
        Ok((self.state, summary))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
