//! Global error handling for promptpack
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

use crate::clipboard::ClipboardError;
use crate::crawler::CrawlError;
use crate::settings::SettingsError;
use crate::tokenizer::TokenizerError;

/// Global error type for promptpack operations
#[derive(Error, Debug)]
pub enum Error {
    /// Crawl errors
    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    /// Tokenizer-related errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    /// Settings file errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Clipboard errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// XML processing errors
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Specialized Result type for promptpack operations
pub type Result<T> = std::result::Result<T, Error>;
