pub mod analyzer;
pub mod api;
pub mod chunker;
pub mod client;
pub mod config;
pub mod data_models;
pub mod embedding;
pub mod fetcher;
pub mod query_engine;
pub mod vector_store;
