//! Tokenizer module for token counting with different LLM models
//!
//! Handles tokenization for various LLM models from different providers
//! with on-disk caching of counts to avoid repeated work.

mod cache;
mod error;
mod model;
mod provider;

// Re-exports for public API
pub use cache::CacheStats;
pub use error::{TokenizerError, TokenizerResult};
pub use model::{Model, ModelProvider};

use std::sync::Mutex;

use cache::TokenCache;
use provider::Provider;

/// Number of leading tokens included in an analysis sample
pub const SAMPLE_LIMIT: usize = 10;

/// Result of token counting operation
#[derive(Debug, Clone, Copy)]
pub struct TokenCount {
    /// Number of tokens in the text
    pub tokens: usize,
    /// Whether this was a cache hit (if caching is enabled)
    pub cached: Option<bool>,
}

/// One token of a sample: its id and decoded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleToken {
    /// Token id in the model's vocabulary
    pub id: u32,
    /// Decoded text of the token
    pub piece: String,
}

/// Token analysis of a rendered document
#[derive(Debug, Clone)]
pub struct TokenAnalysis {
    /// Number of tokens in the document
    pub tokens: usize,
    /// Cost in dollars of sending the document as input
    pub input_cost: f64,
    /// Cost in dollars of receiving this many tokens as output
    pub output_cost: f64,
    /// First tokens of the document, when the backend exposes them
    pub sample: Vec<SampleToken>,
}

/// Trait defining the interface for tokenizers
pub trait Tokenizer: Send + Sync {
    /// Count tokens in the given text
    fn count_tokens(&self, text: &str) -> TokenizerResult<TokenCount>;

    /// Sample the first tokens of the text with their ids
    fn sample_tokens(&self, _text: &str, _limit: usize) -> TokenizerResult<Vec<SampleToken>> {
        Ok(Vec::new())
    }

    /// Get the context window size for this model
    fn model_context_window(&self) -> usize;

    /// Cache statistics for this session, if the tokenizer caches
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}

/// Create a tokenizer for the specified model
pub fn create_tokenizer(model: Model, project_dir: &str) -> TokenizerResult<Box<dyn Tokenizer>> {
    // Create the appropriate provider based on model
    let provider: Box<dyn Provider> = match model.provider() {
        ModelProvider::Anthropic => Box::new(provider::anthropic::ClaudeProvider::new(model)),
        ModelProvider::OpenAI => Box::new(provider::openai::OpenAIProvider::new(model)?),
        ModelProvider::HuggingFace => {
            Box::new(provider::huggingface::HuggingFaceProvider::new(model))
        }
    };

    // Wrap with caching tokenizer
    let cache = TokenCache::open(project_dir)?;

    Ok(Box::new(CachingTokenizer::new(provider, model, cache)))
}

/// Count and price a document, sampling its leading tokens
pub fn analyze(
    tokenizer: &dyn Tokenizer,
    model: Model,
    text: &str,
) -> TokenizerResult<TokenAnalysis> {
    let count = tokenizer.count_tokens(text)?;
    let sample = tokenizer.sample_tokens(text, SAMPLE_LIMIT)?;

    Ok(TokenAnalysis {
        tokens: count.tokens,
        input_cost: model.input_cost_usd(count.tokens),
        output_cost: model.output_cost_usd(count.tokens),
        sample,
    })
}

/// Tokenizer that caches counts to avoid repeated tokenization
pub struct CachingTokenizer {
    provider: Box<dyn Provider>,
    model: Model,
    cache: Mutex<TokenCache>,
}

impl CachingTokenizer {
    /// Create a new cached tokenizer
    pub fn new(provider: Box<dyn Provider>, model: Model, cache: TokenCache) -> Self {
        Self {
            provider,
            model,
            cache: Mutex::new(cache),
        }
    }
}

impl Tokenizer for CachingTokenizer {
    fn count_tokens(&self, text: &str) -> TokenizerResult<TokenCount> {
        let model_id = self.model.model_id();

        // Try to get from cache
        let cached = self
            .cache
            .lock()
            .map_err(|_| TokenizerError::CacheLock)?
            .get(text, model_id);

        if let Some(count) = cached {
            return Ok(TokenCount {
                tokens: count,
                cached: Some(true),
            });
        }

        // Not in cache, ask the provider
        let result = self.provider.count_tokens(text)?;

        self.cache
            .lock()
            .map_err(|_| TokenizerError::CacheLock)?
            .insert(text, model_id, result)?;

        Ok(TokenCount {
            tokens: result,
            cached: Some(false),
        })
    }

    fn sample_tokens(&self, text: &str, limit: usize) -> TokenizerResult<Vec<SampleToken>> {
        self.provider.sample_tokens(text, limit)
    }

    fn model_context_window(&self) -> usize {
        self.model.context_window()
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.lock().ok().map(|cache| cache.stats())
    }
}
