//! Model definitions and metadata

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumProperty, EnumString, IntoEnumIterator};

/// Supported LLM models for tokenization
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    Display,
    ValueEnum,
    Serialize,
    Deserialize,
    EnumProperty,
)]
pub enum Model {
    #[strum(props(
        model_id = "claude-3-5-sonnet-latest",
        provider = "anthropic"
    ))]
    Sonnet35,

    #[strum(props(
        model_id = "claude-3-7-sonnet-latest",
        provider = "anthropic"
    ))]
    Sonnet37,

    // OpenAI models
    #[strum(props(model_id = "gpt-3.5-turbo", provider = "openai"))]
    Gpt35Turbo,

    #[strum(props(model_id = "gpt-4", provider = "openai"))]
    Gpt4,

    #[strum(props(model_id = "gpt-4-turbo", provider = "openai"))]
    Gpt4Turbo,

    #[strum(props(model_id = "gpt-4o", provider = "openai"))]
    Gpt4o,

    // HuggingFace models
    #[strum(props(
        model_id = "meta-llama/Llama-3-8b-hf",
        provider = "huggingface"
    ))]
    Llama3_8b,

    #[strum(props(
        model_id = "mistralai/Mistral-Small-Instruct-2409",
        provider = "huggingface"
    ))]
    MistralSmall,
}

impl Model {
    /// Get the model identifier as used by the provider's API
    pub fn model_id(&self) -> &'static str {
        self.get_str("model_id").unwrap_or("unknown")
    }

    /// Get the provider of this model
    pub fn provider(&self) -> ModelProvider {
        let provider = self.get_str("provider").unwrap_or("unknown");
        ModelProvider::from_str(provider).unwrap_or(ModelProvider::HuggingFace)
    }

    /// Get the context window size for this model
    pub fn context_window(&self) -> usize {
        match self {
            Model::Sonnet35 | Model::Sonnet37 => 200_000,
            Model::Gpt35Turbo => 16_385,
            Model::Gpt4 => 8_192,
            Model::Gpt4Turbo | Model::Gpt4o => 128_000,
            Model::Llama3_8b => 8_192,
            Model::MistralSmall => 32_000,
        }
    }

    /// Input price in cents per million tokens
    pub fn input_price_cents(&self) -> u64 {
        match self {
            Model::Sonnet35 | Model::Sonnet37 => 300,
            Model::Gpt35Turbo => 50,
            Model::Gpt4 => 3_000,
            Model::Gpt4Turbo => 1_000,
            Model::Gpt4o => 250,
            // Self-hosted models have no metered price.
            Model::Llama3_8b | Model::MistralSmall => 0,
        }
    }

    /// Output price in cents per million tokens
    pub fn output_price_cents(&self) -> u64 {
        match self {
            Model::Sonnet35 | Model::Sonnet37 => 1_500,
            Model::Gpt35Turbo => 150,
            Model::Gpt4 => 6_000,
            Model::Gpt4Turbo => 3_000,
            Model::Gpt4o => 1_000,
            Model::Llama3_8b | Model::MistralSmall => 0,
        }
    }

    /// Cost in dollars of sending this many tokens as input
    pub fn input_cost_usd(&self, tokens: usize) -> f64 {
        tokens as f64 * self.input_price_cents() as f64 / 100.0 / 1_000_000.0
    }

    /// Cost in dollars of receiving this many tokens as output
    pub fn output_cost_usd(&self, tokens: usize) -> f64 {
        tokens as f64 * self.output_price_cents() as f64 / 100.0 / 1_000_000.0
    }

    /// All supported models
    pub fn available() -> Vec<Model> {
        Model::iter().collect()
    }
}

/// Model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ModelProvider {
    /// Anthropic (Claude models)
    Anthropic,
    /// OpenAI (GPT models)
    OpenAI,
    /// HuggingFace models
    HuggingFace,
}
