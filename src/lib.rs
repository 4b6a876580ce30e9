/*!
 * PromptPack - Pack a directory tree into an XML document for LLM context
 *
 * This library crawls a directory tree, filters it against ignore
 * rules, and renders the surviving files into a single deterministic
 * document for use as context for Large Language Models.
 */

pub mod clipboard;
pub mod config;
pub mod crawler;
pub mod error;
pub mod overview;
pub mod report;
pub mod rules;
pub mod settings;
pub mod tokenizer;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Config, OutputFormat};
pub use crawler::{CrawlError, CrawlStats, Crawler, SkipReason, SkippedEntry};
pub use error::{Error, Result};
pub use report::{FileReportInfo, ReportFormat, Reporter, ScanReport};
pub use rules::RuleSet;
pub use settings::Settings;
pub use types::{DirectoryNode, FileContent, FileNode, Node, SymlinkNode};
pub use utils::{count_files, format_file_size};
pub use writer::XmlWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
