use serde::{Deserialize, Serialize};

/// Id carried by placeholder hits the server returns when a pipeline stage fails.
pub const SENTINEL_ID: &str = "none";

/// One scored snippet. The server fills every field; the client tolerates
/// any of them missing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchHit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub text: String,
}

impl SearchHit {
    pub fn new(id: String, text: String, score: f64) -> SearchHit {
        SearchHit {
            id: Some(id),
            score: Some(score),
            text,
        }
    }

    pub fn sentinel(message: &str) -> SearchHit {
        SearchHit::new(SENTINEL_ID.to_string(), message.to_string(), 0.0)
    }

    pub fn is_sentinel(&self) -> bool {
        self.id.as_deref() == Some(SENTINEL_ID)
    }
}

/// A chunk of page text ready to be embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub text: String,
}

impl Chunk {
    pub fn numbered(texts: Vec<String>) -> Vec<Chunk> {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                id: format!("chunk-{i}"),
                text,
            })
            .collect()
    }
}
