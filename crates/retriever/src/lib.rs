//! Law retriever — hybrid TF-IDF search over curated and ingested sources.
//!
//! Pipeline per query:
//! - expand the query (LLM paraphrases, else the synonym table)
//! - project it into the cached TF-IDF space
//! - rank documents by cosine similarity
//! - fall back to corpus order when scoring has nothing to offer
//!
//! The index is rebuilt lazily after runtime additions and published as an
//! immutable snapshot, so a query always scores against one consistent
//! vocabulary / document-frequency / vector set.

pub mod corpus;
pub mod expander;
pub mod ingest;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use renter_aid_embedding::{is_zero, tokenize, TfIdfIndex};
use renter_aid_knowledge::{law_sources, CaseCategory, LawSearchResponse, LawSearchResult, LawSource};
use tracing::{debug, info};

use corpus::{collect_corpus, Document, RuntimeCorpus};
use expander::QueryExpander;

pub use ingest::{IngestError, LawIngestResponse, PageIngestor};

/// How a result list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Cosine-ranked, similarity strictly above zero.
    Ranked,
    /// Leading documents in corpus order; scoring found nothing.
    CorpusOrder,
    /// The query had no tokens.
    Empty,
}

/// Results of one retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalContext {
    pub results: Vec<LawSearchResult>,
    pub strategy: Strategy,
}

/// One built index together with the documents it was built from.
#[derive(Debug)]
pub struct IndexSnapshot {
    documents: Vec<Document>,
    index: TfIdfIndex,
}

impl IndexSnapshot {
    fn build(documents: Vec<Document>) -> Self {
        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let index = TfIdfIndex::build(&texts);
        Self { documents, index }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn index(&self) -> &TfIdfIndex {
        &self.index
    }

    /// First `top_k` payloads in corpus order.
    fn leading(&self, top_k: usize) -> Vec<LawSearchResult> {
        self.documents
            .iter()
            .take(top_k)
            .map(|d| d.result.clone())
            .collect()
    }

    /// Score expanded query text against this snapshot.
    pub fn rank(&self, expanded: &str, top_k: usize) -> RetrievalContext {
        let tokens = tokenize(expanded);
        if tokens.is_empty() {
            return RetrievalContext {
                results: Vec::new(),
                strategy: Strategy::Empty,
            };
        }

        let query = self.index.embed_tokens(&tokens);
        if is_zero(&query) {
            debug!("no query term in vocabulary, returning corpus order");
            return RetrievalContext {
                results: self.leading(top_k),
                strategy: Strategy::CorpusOrder,
            };
        }

        let matches = self.index.search_top_k(&query, top_k);
        if matches.is_empty() {
            debug!("no positive similarity, returning corpus order");
            return RetrievalContext {
                results: self.leading(top_k),
                strategy: Strategy::CorpusOrder,
            };
        }

        RetrievalContext {
            results: matches
                .iter()
                .map(|m| self.documents[m.index].result.clone())
                .collect(),
            strategy: Strategy::Ranked,
        }
    }
}

/// Mutable state behind the retriever's lock.
#[derive(Debug, Default)]
struct CorpusState {
    runtime: RuntimeCorpus,
    /// `None` when runtime additions have invalidated the last build.
    snapshot: Option<Arc<IndexSnapshot>>,
}

/// Hybrid retriever over the static law table plus runtime additions.
pub struct LawRetriever {
    sources: &'static [LawSource],
    expander: QueryExpander,
    state: Mutex<CorpusState>,
}

impl LawRetriever {
    /// Retriever over the built-in law table.
    pub fn new(expander: QueryExpander) -> Self {
        Self::with_sources(law_sources(), expander)
    }

    /// Retriever over an arbitrary static table.
    pub fn with_sources(sources: &'static [LawSource], expander: QueryExpander) -> Self {
        Self {
            sources,
            expander,
            state: Mutex::new(CorpusState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CorpusState> {
        // Writers replace whole values, so a poisoned guard is still coherent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current index snapshot, rebuilding first if the corpus changed.
    pub fn ensure_fresh(&self) -> Arc<IndexSnapshot> {
        let mut state = self.lock();
        if let Some(snapshot) = &state.snapshot {
            return Arc::clone(snapshot);
        }

        let documents = collect_corpus(self.sources, &state.runtime);
        let snapshot = Arc::new(IndexSnapshot::build(documents));
        info!(
            documents = snapshot.documents.len(),
            terms = snapshot.index.dimensions(),
            runtime = state.runtime.len(),
            "rebuilt law index"
        );
        state.snapshot = Some(Arc::clone(&snapshot));
        snapshot
    }

    /// Add or replace a runtime document and invalidate the index.
    pub fn add_runtime(&self, result: LawSearchResult, keywords: Vec<String>) {
        let url = result.source_url.clone();
        let mut state = self.lock();
        let replaced = state.runtime.upsert(result, keywords);
        state.snapshot = None;
        debug!(%url, replaced, "runtime law source added");
    }

    /// Rank the corpus against `query`.
    ///
    /// `category` is advisory: it is logged with the query and never filters
    /// results. Returns at most `top_k` results.
    pub async fn retrieve(
        &self,
        query: &str,
        category: Option<CaseCategory>,
        top_k: usize,
    ) -> RetrievalContext {
        let snapshot = self.ensure_fresh();
        let expanded = self.expander.expand(query).await;
        let context = snapshot.rank(&expanded, top_k);
        debug!(
            query,
            category = category.map(|c| c.as_str()),
            top_k,
            strategy = ?context.strategy,
            results = context.results.len(),
            "retrieved law sources"
        );
        context
    }

    /// Plain search without a category hint.
    pub async fn search(&self, query: &str, top_k: usize) -> LawSearchResponse {
        let context = self.retrieve(query, None, top_k).await;
        LawSearchResponse {
            results: context.results,
        }
    }

    /// Number of runtime entries.
    pub fn runtime_len(&self) -> usize {
        self.lock().runtime.len()
    }

    /// Static plus runtime document count.
    pub fn corpus_len(&self) -> usize {
        self.sources.len() + self.runtime_len()
    }

    /// Whether the next retrieval will rebuild the index.
    pub fn is_stale(&self) -> bool {
        self.lock().snapshot.is_none()
    }
}
