use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use deepq_search::DynSearch;
use deepq_types::{Candidate, Result, RunState, Stage, StatePatch};

use crate::node::StageNode;

/// Organic results taken per query before deduplication.
const RESULTS_PER_QUERY: usize = 3;

// ---------------------------------------------------------------------------
// Researcher — queries to deduplicated candidates
// ---------------------------------------------------------------------------

pub struct Researcher {
    search: Arc<DynSearch>,
}

impl Researcher {
    pub fn new(search: Arc<DynSearch>) -> Self {
        Self { search }
    }
}

#[async_trait]
impl StageNode for Researcher {
    fn stage(&self) -> Stage {
        Stage::Research
    }

    async fn run(&self, state: &RunState) -> Result<StatePatch> {
        let mut candidates: Vec<Candidate> = Vec::new();
        // One dedup set across every query in the run.
        let mut seen_urls: HashSet<String> = HashSet::new();

        for query in &state.queries {
            let query = query.trim_matches(&['"', '\''][..]);
            let hits = match self.search.search(query).await {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Search failed; skipping query");
                    continue;
                }
            };

            for hit in hits.into_iter().take(RESULTS_PER_QUERY) {
                if hit.link.is_empty() || !seen_urls.insert(hit.link.clone()) {
                    continue;
                }
                candidates.push(Candidate {
                    title: if hit.title.is_empty() {
                        "No Title".to_string()
                    } else {
                        hit.title
                    },
                    url: hit.link,
                    summary: if hit.snippet.is_empty() {
                        "No summary available.".to_string()
                    } else {
                        hit.snippet
                    },
                });
            }
        }

        tracing::info!(count = candidates.len(), "Collected candidates");
        Ok(StatePatch::Researched { candidates })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
