use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug, PartialEq)]
pub enum VectorStoreError {
    #[error("collection {0} already exists")]
    CollectionExists(String),
    #[error("collection {0} does not exist")]
    CollectionMissing(String),
    #[error("length mismatch: {ids} ids, {documents} documents, {embeddings} embeddings")]
    LengthMismatch {
        ids: usize,
        documents: usize,
        embeddings: usize,
    },
    #[error("embedding dimension {got} does not match collection dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("duplicate id {0}")]
    DuplicateId(String),
}

/// Hit returned by [`VectorStore::query`]. `distance` is the cosine distance
/// to the query embedding, so lower is closer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub id: String,
    pub document: String,
    pub distance: f32,
}

#[derive(Default)]
struct Collection {
    dimension: Option<usize>,
    ids: Vec<String>,
    documents: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl Collection {
    fn add(
        &mut self,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<(), VectorStoreError> {
        if ids.len() != documents.len() || ids.len() != embeddings.len() {
            return Err(VectorStoreError::LengthMismatch {
                ids: ids.len(),
                documents: documents.len(),
                embeddings: embeddings.len(),
            });
        }

        let expected = self
            .dimension
            .or_else(|| embeddings.first().map(Vec::len))
            .unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
            return Err(VectorStoreError::DimensionMismatch {
                expected,
                got: bad.len(),
            });
        }
        for (idx, id) in ids.iter().enumerate() {
            if self.ids.contains(id) || ids[..idx].contains(id) {
                return Err(VectorStoreError::DuplicateId(id.clone()));
            }
        }

        if !embeddings.is_empty() {
            self.dimension = Some(expected);
        }
        self.ids.extend(ids);
        self.documents.extend(documents);
        self.embeddings.extend(embeddings);
        Ok(())
    }

    fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<QueryHit>, VectorStoreError> {
        if let Some(expected) = self.dimension {
            if embedding.len() != expected {
                return Err(VectorStoreError::DimensionMismatch {
                    expected,
                    got: embedding.len(),
                });
            }
        }

        let mut hits: Vec<QueryHit> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(idx, e)| QueryHit {
                id: self.ids[idx].clone(),
                document: self.documents[idx].clone(),
                distance: cosine_distance(embedding, e),
            })
            .collect();
        // stable sort keeps insertion order among equal distances
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(n_results);
        Ok(hits)
    }
}

/// Calculate cosine distance between two vectors
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        1.0 // Maximum distance for zero vectors
    } else {
        1.0 - (dot / (norm_a * norm_b))
    }
}

/// In-memory store of named collections. Nothing is persisted.
#[derive(Default)]
pub struct VectorStore {
    collections: Mutex<HashMap<String, Collection>>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        let mut collections = self.collections.lock().await;
        if collections.contains_key(name) {
            return Err(VectorStoreError::CollectionExists(name.to_string()));
        }
        collections.insert(name.to_string(), Collection::default());
        log::debug!("created collection {name}");
        Ok(())
    }

    pub async fn delete_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        self.collections
            .lock()
            .await
            .remove(name)
            .map(|_| log::debug!("deleted collection {name}"))
            .ok_or_else(|| VectorStoreError::CollectionMissing(name.to_string()))
    }

    pub async fn add(
        &self,
        name: &str,
        ids: Vec<String>,
        documents: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<(), VectorStoreError> {
        let mut collections = self.collections.lock().await;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| VectorStoreError::CollectionMissing(name.to_string()))?;
        collection.add(ids, documents, embeddings)
    }

    pub async fn query(
        &self,
        name: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<Vec<QueryHit>, VectorStoreError> {
        let collections = self.collections.lock().await;
        let collection = collections
            .get(name)
            .ok_or_else(|| VectorStoreError::CollectionMissing(name.to_string()))?;
        collection.query(embedding, n_results)
    }

    pub async fn collection_count(&self) -> usize {
        self.collections.lock().await.len()
    }
}
