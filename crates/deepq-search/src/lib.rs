//! Search-provider client for the deepq pipeline.
//!
//! Provides the `SearchProvider` trait, the `DynSearch` wrapper, and a
//! SerpAPI adapter that degrades to empty result lists when no API key is
//! configured.

mod serpapi;

pub use serpapi::SerpApiClient;

use async_trait::async_trait;
use serde::Deserialize;

use deepq_types::Result;

// ---------------------------------------------------------------------------
// SearchHit
// ---------------------------------------------------------------------------

/// One organic search result.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

// ---------------------------------------------------------------------------
// SearchProvider
// ---------------------------------------------------------------------------

/// A web-search collaborator. Implementations must degrade to an empty
/// result list, not an error, when they have no credentials.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// DynSearch
// ---------------------------------------------------------------------------

pub struct DynSearch(Box<dyn SearchProvider>);

impl DynSearch {
    pub fn new(provider: impl SearchProvider + 'static) -> Self {
        Self(Box::new(provider))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.0.search(query).await
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
