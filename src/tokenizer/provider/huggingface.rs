//! HuggingFace tokenizer implementation

use once_cell::sync::OnceCell;
use std::sync::Mutex;
use tokenizers::Tokenizer as HfTokenizer;

use super::Provider;
use crate::tokenizer::error::{TokenizerError, TokenizerResult};
use crate::tokenizer::model::Model;
use crate::tokenizer::SampleToken;

/// HuggingFace tokenizer implementation
pub struct HuggingFaceProvider {
    repo_id: &'static str,
    tokenizer: OnceCell<Mutex<HfTokenizer>>,
}

impl HuggingFaceProvider {
    /// Create a new HuggingFace tokenizer
    pub fn new(model: Model) -> Self {
        Self {
            repo_id: model.model_id(),
            tokenizer: OnceCell::new(),
        }
    }

    /// Get or initialize the tokenizer
    fn get_tokenizer(&self) -> TokenizerResult<&Mutex<HfTokenizer>> {
        self.tokenizer.get_or_try_init(|| {
            // Try to load the tokenizer from HuggingFace
            let tokenizer = match HfTokenizer::from_pretrained(self.repo_id, None) {
                Ok(t) => t,
                Err(e) => {
                    // Fall back to a basic BPE tokenizer
                    log::warn!("cannot load tokenizer for {}: {}, using fallback", self.repo_id, e);
                    let mut tokenizer = HfTokenizer::new(tokenizers::models::bpe::BPE::default());

                    // Configure for LLaMA-like tokenization
                    tokenizer.with_pre_tokenizer(Some(
                        tokenizers::pre_tokenizers::whitespace::Whitespace,
                    ));

                    tokenizer
                }
            };

            Ok(Mutex::new(tokenizer))
        })
    }

    fn encode(&self, text: &str) -> TokenizerResult<tokenizers::Encoding> {
        let tokenizer = self
            .get_tokenizer()?
            .lock()
            .map_err(|_| TokenizerError::Backend("Failed to lock tokenizer".to_string()))?;

        tokenizer
            .encode(text, false)
            .map_err(|e| TokenizerError::Backend(format!("Failed to encode text: {}", e)))
    }
}

impl Provider for HuggingFaceProvider {
    fn count_tokens(&self, text: &str) -> TokenizerResult<usize> {
        Ok(self.encode(text)?.get_ids().len())
    }

    fn sample_tokens(&self, text: &str, limit: usize) -> TokenizerResult<Vec<SampleToken>> {
        let encoding = self.encode(text)?;
        let sample = encoding
            .get_ids()
            .iter()
            .zip(encoding.get_tokens())
            .take(limit)
            .map(|(&id, piece)| SampleToken {
                id,
                piece: piece.clone(),
            })
            .collect();
        Ok(sample)
    }
}
