use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;

use crate::chunker::DEFAULT_MAX_TOKENS;
use crate::embedding::DEFAULT_DIMENSION;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        api_base: get_env_or_default("SEARCH_API_BASE", "http://localhost:8000"),
        server_addr: get_env_or_default("SERVER_ADDR", "0.0.0.0:8000"),
        top_k: get_parsed_or_default("SEARCH_TOP_K", 10),
        chunk_max_tokens: get_parsed_or_default("CHUNK_MAX_TOKENS", DEFAULT_MAX_TOKENS),
        fetch_timeout_secs: get_parsed_or_default("FETCH_TIMEOUT_SECS", 10),
        embedding_dim: get_parsed_or_default("EMBEDDING_DIM", DEFAULT_DIMENSION),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL the form posts to; `/api/search` is appended.
    pub api_base: String,
    pub server_addr: String,
    pub top_k: usize,
    pub chunk_max_tokens: usize,
    pub fetch_timeout_secs: u64,
    pub embedding_dim: usize,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_parsed_or_default<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparsable value for {key}: {raw:?}");
            default
        }),
        Err(_) => default,
    }
}
