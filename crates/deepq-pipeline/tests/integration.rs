//! End-to-end runs of the full pipeline with scripted collaborators.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use deepq_llm::{Completion, DynCompletion};
use deepq_pipeline::{default_registry, Engine};
use deepq_search::{DynSearch, SearchHit, SearchProvider};
use deepq_types::Result;

// ---------------------------------------------------------------------------
// Scripted collaborators
// ---------------------------------------------------------------------------

/// Replays a fixed sequence of completions, one per call.
struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedClient {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
        }
    }
}

#[async_trait]
impl Completion for ScriptedClient {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| deepq_types::DeepqError::Other("script exhausted".into()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Replays a fixed sequence of search result batches, one per query.
struct ScriptedSearch {
    batches: Mutex<VecDeque<Vec<SearchHit>>>,
}

impl ScriptedSearch {
    fn new(batches: Vec<Vec<SearchHit>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
        }
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// An unconfigured provider: every search degrades to no results.
struct OfflineSearch;

#[async_trait]
impl SearchProvider for OfflineSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "offline"
    }
}

fn hit(title: &str, link: &str) -> SearchHit {
    SearchHit {
        title: title.into(),
        link: link.into(),
        snippet: format!("snippet for {title}"),
    }
}

fn engine_with(client: ScriptedClient, search: impl SearchProvider + 'static) -> Engine {
    let llm = Arc::new(DynCompletion::new(client));
    let search = Arc::new(DynSearch::new(search));
    Engine::new(default_registry(llm, search))
}

const SELECTION: &str = r#"```json
{"title": "Paged Attention", "authors": "Kwon et al.", "summary": "Block-level KV cache paging", "url": "https://arxiv.org/abs/2309.06180", "reason": "Concrete optimization with a sharp tradeoff"}
```"#;

const ARTIFACT: &str = r#"```json
{"question": "Your vLLM deployment thrashes under long prompts...", "wrong_answer": "Just increase gpu_memory_utilization", "explanation": "Paged KV blocks decouple logical and physical cache layout", "citation": "Paged Attention (https://arxiv.org/abs/2309.06180)"}
```"#;

// ---------------------------------------------------------------------------
// Scenario A — happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_a_happy_path_publishes_at_iteration_one() {
    let client = ScriptedClient::new(&[
        // planner
        "kv cache eviction policies, paged attention tradeoffs, vllm scheduling failures",
        // selector
        SELECTION,
        // generator
        ARTIFACT,
        // reviewer
        "APPROVE",
        // publisher
        "You're in an ML Engineer interview at OpenAI... **KV Cache** deep dive.",
    ]);
    // 3 + 3 hits with one duplicate URL across queries: 5 unique candidates.
    let search = ScriptedSearch::new(vec![
        vec![
            hit("A", "https://a.example"),
            hit("B", "https://b.example"),
            hit("C", "https://c.example"),
        ],
        vec![
            hit("A dup", "https://a.example"),
            hit("D", "https://d.example"),
            hit("E", "https://e.example"),
        ],
        vec![],
    ]);

    let engine = engine_with(client, search);
    let (state, summary) = engine.run("KV Cache Optimization").await.unwrap();

    assert_eq!(state.queries.len(), 3);
    assert_eq!(state.candidates.len(), 5);
    let selected = state.selected.as_ref().unwrap();
    assert_eq!(selected.title, "Paged Attention");

    let artifact = state.artifact.as_ref().unwrap();
    assert!(artifact.citation.contains("https://arxiv.org/abs/2309.06180"));

    assert_eq!(state.iteration, 1);
    assert_eq!(state.feedback.as_deref(), Some("APPROVE"));
    assert!(state.post.as_ref().unwrap().contains("KV Cache"));
    // Each stage ran exactly once.
    assert_eq!(summary.steps, 6);
}

// ---------------------------------------------------------------------------
// Scenario B — total provider failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_b_offline_search_degrades_to_all_null_state() {
    // Only the planner reaches the reasoning service; every later node
    // short-circuits on its missing input.
    let client = ScriptedClient::new(&["q1, q2, q3"]);
    let engine = engine_with(client, OfflineSearch);
    let (state, summary) = engine.run("KV Cache Optimization").await.unwrap();

    assert!(state.candidates.is_empty());
    assert!(state.selected.is_none());
    assert!(state.artifact.is_none());
    assert_eq!(state.feedback.as_deref(), Some("Failed to generate question."));
    assert_eq!(state.iteration, 0);
    assert!(state.post.is_none());
    // Still a full traversal: no stage was skipped by the engine itself.
    assert_eq!(summary.steps, 6);
}

// ---------------------------------------------------------------------------
// Scenario C — forced cap
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_c_never_approving_reviewer_is_capped_at_three_rounds() {
    let client = ScriptedClient::new(&[
        "q1, q2, q3",
        SELECTION,
        ARTIFACT,
        "Needs a sharper wrong answer.",
        ARTIFACT,
        "Still too shallow for Staff level.",
        ARTIFACT,
        "I remain unconvinced this tests depth.",
        "Final post despite reviewer grumbling.",
    ]);
    let search = ScriptedSearch::new(vec![vec![hit("A", "https://a.example")]]);

    let engine = engine_with(client, search);
    let (state, summary) = engine.run("KV Cache Optimization").await.unwrap();

    // The cap, not the feedback, forced publication.
    assert_eq!(state.iteration, 3);
    assert!(state.artifact.is_some());
    assert_eq!(
        state.post.as_deref(),
        Some("Final post despite reviewer grumbling.")
    );
    // plan, research, select + 3 generate/review cycles + publish.
    assert_eq!(summary.steps, 3 + 3 * 2 + 1);
}

// ---------------------------------------------------------------------------
// Concurrent runs stay isolated
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_runs_do_not_share_state() {
    // Two engines with independent scripts, run on the same executor.
    let a = engine_with(ScriptedClient::new(&["qa"]), OfflineSearch);
    let b = engine_with(ScriptedClient::new(&["qb1, qb2"]), OfflineSearch);

    let (ra, rb) = tokio::join!(a.run("Topic A"), b.run("Topic B"));
    let (state_a, _) = ra.unwrap();
    let (state_b, _) = rb.unwrap();

    assert_eq!(state_a.topic, "Topic A");
    assert_eq!(state_a.queries, vec!["qa"]);
    assert_eq!(state_b.topic, "Topic B");
    assert_eq!(state_b.queries, vec!["qb1", "qb2"]);
}
