use anyhow::Result;
use nanoid::nanoid;
use std::time::Duration;

use crate::chunker::chunk_text_by_tokens;
use crate::config::Config;
use crate::data_models::{Chunk, SearchHit};
use crate::embedding::{Embedder, HashingEmbedder};
use crate::fetcher::PageFetcher;
use crate::vector_store::VectorStore;

pub const NO_TEXT: &str = "No text could be extracted from the webpage.";
pub const NO_CHUNKS: &str = "Failed to split webpage text into chunks.";
pub const EMBEDDING_FAILED: &str = "Embedding generation failed.";
pub const NO_EMBEDDINGS: &str = "Embeddings list is empty.";
pub const ADD_FAILED: &str = "Failed to add embeddings to vector database.";
pub const SEARCH_FAILED: &str = "Search failed.";

/// Fetches a page, splits it into chunks, embeds them into a throwaway
/// collection and ranks the chunks against the query.
///
/// Every stage failure is reported as a single sentinel hit instead of an
/// error, so callers always get something to show.
pub struct QueryEngine {
    fetcher: PageFetcher,
    embedder: Box<dyn Embedder>,
    store: VectorStore,
    chunk_max_tokens: usize,
}

impl QueryEngine {
    pub fn new(fetcher: PageFetcher, embedder: Box<dyn Embedder>, chunk_max_tokens: usize) -> Self {
        Self {
            fetcher,
            embedder,
            store: VectorStore::new(),
            chunk_max_tokens,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = PageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
        let embedder = HashingEmbedder::new(config.embedding_dim)?;
        Ok(Self::new(
            fetcher,
            Box::new(embedder),
            config.chunk_max_tokens,
        ))
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    pub async fn index_and_search(&self, url: &str, query: &str, top_k: usize) -> Vec<SearchHit> {
        let page = self.fetcher.fetch_text(url).await;
        self.search_text(&page.text, query, top_k).await
    }

    pub async fn search_text(&self, text: &str, query: &str, top_k: usize) -> Vec<SearchHit> {
        if text.trim().is_empty() {
            return vec![SearchHit::sentinel(NO_TEXT)];
        }

        let chunks = Chunk::numbered(chunk_text_by_tokens(text, self.chunk_max_tokens));
        if chunks.is_empty() {
            return vec![SearchHit::sentinel(NO_CHUNKS)];
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = match self.embedder.embed_batch(&texts) {
            Ok(embeddings) => embeddings,
            Err(e) => {
                log::error!("embedding failed: {:#}", e);
                return vec![SearchHit::sentinel(EMBEDDING_FAILED)];
            }
        };
        if embeddings.is_empty() {
            return vec![SearchHit::sentinel(NO_EMBEDDINGS)];
        }

        // one collection per request so concurrent searches never collide
        let collection = format!("tmp-{}", nanoid!());
        if let Err(e) = self.store.create_collection(&collection).await {
            log::error!("creating collection failed: {:#}", e);
            return vec![SearchHit::sentinel(ADD_FAILED)];
        }

        let hits = self
            .add_and_query(&collection, chunks, embeddings, query, top_k)
            .await;

        if let Err(e) = self.store.delete_collection(&collection).await {
            log::warn!("dropping collection {collection} failed: {:#}", e);
        }
        hits
    }

    async fn add_and_query(
        &self,
        collection: &str,
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
        query: &str,
        top_k: usize,
    ) -> Vec<SearchHit> {
        let (ids, documents): (Vec<String>, Vec<String>) =
            chunks.into_iter().map(|c| (c.id, c.text)).unzip();
        log::debug!("indexing {} chunks into {collection}", ids.len());

        if let Err(e) = self.store.add(collection, ids, documents, embeddings).await {
            log::error!("adding embeddings failed: {:#}", e);
            return vec![SearchHit::sentinel(ADD_FAILED)];
        }

        let query_embedding = match self.embedder.embed(query) {
            Ok(e) => e,
            Err(e) => {
                log::error!("query embedding failed: {:#}", e);
                return vec![SearchHit::sentinel(SEARCH_FAILED)];
            }
        };

        match self.store.query(collection, &query_embedding, top_k).await {
            Ok(found) => found
                .into_iter()
                .map(|h| SearchHit::new(h.id, h.document, f64::from(h.distance)))
                .collect(),
            Err(e) => {
                log::error!("query failed: {:#}", e);
                vec![SearchHit::sentinel(SEARCH_FAILED)]
            }
        }
    }
}
