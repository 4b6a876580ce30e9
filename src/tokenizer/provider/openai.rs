//! OpenAI tokenizer implementation using tiktoken

use tiktoken_rs::CoreBPE;

use super::Provider;
use crate::tokenizer::error::{TokenizerError, TokenizerResult};
use crate::tokenizer::model::Model;
use crate::tokenizer::SampleToken;

/// OpenAI tokenizer implementation
pub struct OpenAIProvider {
    encoding: CoreBPE,
}

impl OpenAIProvider {
    /// Create a new OpenAI tokenizer
    pub fn new(model: Model) -> TokenizerResult<Self> {
        let encoding = tiktoken_rs::get_bpe_from_model(model.model_id())
            .map_err(|e| TokenizerError::Backend(e.to_string()))?;

        Ok(Self { encoding })
    }
}

impl Provider for OpenAIProvider {
    fn count_tokens(&self, text: &str) -> TokenizerResult<usize> {
        let tokens = self.encoding.encode_ordinary(text);
        Ok(tokens.len())
    }

    fn sample_tokens(&self, text: &str, limit: usize) -> TokenizerResult<Vec<SampleToken>> {
        let ids = self.encoding.encode_ordinary(text);
        let mut sample = Vec::with_capacity(limit.min(ids.len()));
        for &id in ids.iter().take(limit) {
            // A single token may decode to an incomplete UTF-8
            // sequence; show the replacement character in that case.
            let piece = self
                .encoding
                .decode(vec![id])
                .unwrap_or_else(|_| "\u{fffd}".to_string());
            sample.push(SampleToken { id, piece });
        }
        Ok(sample)
    }
}
