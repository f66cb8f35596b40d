//! Splitting of page text into chunks of at most `max_tokens` gpt2 BPE
//! tokens, each decoded back to text.

use std::sync::OnceLock;

use anyhow::{Result, anyhow, bail};
use tiktoken_rs::CoreBPE;

pub const DEFAULT_MAX_TOKENS: usize = 500;
/// Chunk width (in chars) used when token chunking cannot be applied.
pub const FALLBACK_CHUNK_CHARS: usize = 3000;

static GPT2_BPE: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn gpt2_bpe() -> Option<&'static CoreBPE> {
    GPT2_BPE
        .get_or_init(|| match tiktoken_rs::r50k_base() {
            Ok(bpe) => Some(bpe),
            Err(e) => {
                log::error!("loading gpt2 encoding failed: {:#}", e);
                None
            }
        })
        .as_ref()
}

/// Number of gpt2 tokens in `text`, if the encoding is available.
pub fn token_count(text: &str) -> Option<usize> {
    gpt2_bpe().map(|bpe| bpe.encode_ordinary(text).len())
}

fn chunk_with_bpe(text: &str, max_tokens: usize) -> Result<Vec<String>> {
    let bpe = gpt2_bpe().ok_or_else(|| anyhow!("gpt2 encoding unavailable"))?;
    if max_tokens == 0 {
        bail!("max_tokens must be non-zero");
    }
    let tokens = bpe.encode_ordinary(text);
    if tokens.is_empty() {
        bail!("tokenization returned empty");
    }
    tokens
        .chunks(max_tokens)
        .map(|window| {
            bpe.decode(window.to_vec())
                .map_err(|e| anyhow!("decode failed: {e}"))
        })
        .collect()
}

/// Chunks `text` by gpt2 tokens. Blank text gives no chunks. If encoding or
/// decoding fails (a window can end inside a multi-byte character) the
/// whole text is split into fixed-width char chunks instead.
pub fn chunk_text_by_tokens(text: &str, max_tokens: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match chunk_with_bpe(text, max_tokens) {
        Ok(chunks) => chunks,
        Err(e) => {
            log::warn!(
                "tokenization failed, falling back to {FALLBACK_CHUNK_CHARS}-char chunks: {:#}",
                e
            );
            chunk_by_chars(text, FALLBACK_CHUNK_CHARS)
        }
    }
}

pub fn chunk_by_chars(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|c| c.iter().collect::<String>())
        .collect()
}
