//! Orchestration engine, stage nodes, and continuation policy for deepq.
//!
//! This crate implements the core run loop: an explicit finite state machine
//! over the six content-generation stages, with one conditional back-edge
//! from review to generate, a bounded refinement loop, and a hard step
//! ceiling as defense in depth.

pub mod engine;
pub mod node;
pub mod nodes;
pub mod policy;

pub use engine::{Engine, EngineConfig, Run, StepReport};
pub use node::{default_registry, DynNode, NodeRegistry, StageNode};
pub use nodes::{Generator, Planner, Publisher, Researcher, Reviewer, Selector};
pub use policy::{decide, is_approval, Decision, MAX_REVIEW_ROUNDS};
