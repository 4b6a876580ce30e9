//! Provider implementations for different tokenizer backends

pub mod anthropic;
pub mod huggingface;
pub mod openai;

use crate::tokenizer::error::TokenizerResult;
use crate::tokenizer::SampleToken;

/// Trait for tokenizer provider implementations
pub trait Provider: Send + Sync {
    /// Count tokens in the given text
    fn count_tokens(&self, text: &str) -> TokenizerResult<usize>;

    /// Sample the first tokens of the text with their ids.
    ///
    /// Providers that only expose a count return an empty sample.
    fn sample_tokens(&self, _text: &str, _limit: usize) -> TokenizerResult<Vec<SampleToken>> {
        Ok(Vec::new())
    }
}
