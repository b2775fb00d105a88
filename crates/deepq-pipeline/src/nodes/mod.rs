//! The six built-in stage nodes.

mod generator;
mod planner;
mod publisher;
mod researcher;
mod reviewer;
mod selector;

pub use generator::Generator;
pub use planner::Planner;
pub use publisher::Publisher;
pub use researcher::Researcher;
pub use reviewer::Reviewer;
pub use selector::Selector;
