//! Reasoning-service client for the deepq pipeline.
//!
//! Provides the `Completion` trait, the `DynCompletion` wrapper, an OpenAI
//! chat-completions adapter, and response post-processing helpers
//! (code-fence stripping, JSON extraction).

mod completion;
mod openai;
mod response;

pub use completion::{Completion, DynCompletion};
pub use openai::OpenAiClient;
pub use response::{parse_json_response, strip_code_fences};
