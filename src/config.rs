/*!
 * Configuration handling for promptpack
 */

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use clap_complete::Shell;

use crate::rules::RuleSet;
use crate::settings::Settings;
use crate::tokenizer::Model;

/// Default output file name
pub const DEFAULT_OUTPUT_FILE: &str = ".promptpack.context.xml";

/// Default maximum size of a file whose content is embedded, in bytes
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Nested XML document with embedded file contents
    #[default]
    Xml,
    /// Indented text tree of names only
    Tree,
    /// Plain-text listing of file contents
    Overview,
}

/// Command-line arguments for promptpack
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "promptpack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pack a directory tree into an XML document for LLM context",
    long_about = "Crawls a directory tree, filters it against ignore rules, and renders the surviving files into a single deterministic XML document suitable for pasting into an LLM prompt."
)]
pub struct Args {
    /// Target directory to process
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output file name
    #[clap(default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    /// Comma-separated directory name patterns to ignore, added to the configured set
    #[clap(long, value_delimiter = ',')]
    pub ignore_dirs: Vec<String>,

    /// Comma-separated file name patterns to ignore, added to the configured set
    #[clap(long, value_delimiter = ',')]
    pub ignore_files: Vec<String>,

    /// Comma-separated extensions to exclude, added to the configured set
    #[clap(long, value_delimiter = ',')]
    pub exclude_extensions: Vec<String>,

    /// Comma-separated extensions to include (if specified, only matching files are kept)
    #[clap(long, value_delimiter = ',')]
    pub include_extensions: Vec<String>,

    /// Match ignore patterns case-insensitively
    #[clap(long)]
    pub ignore_case: bool,

    /// Start from an empty ignore set instead of the configured one
    #[clap(long)]
    pub no_default_ignores: bool,

    /// Respect .gitignore files found in the tree
    #[clap(long)]
    pub respect_gitignore: bool,

    /// Maximum file size whose content is embedded, in bytes
    #[clap(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// LLM model to use for tokenization (enables token counting)
    #[clap(long, value_enum)]
    pub model: Option<Model>,

    /// Saved rule names to embed in the document
    #[clap(long, value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Output document format
    #[clap(long, value_enum, default_value_t = OutputFormat::Xml)]
    pub format: OutputFormat,

    /// Render absolute paths instead of paths relative to the target's parent
    #[clap(long)]
    pub absolute_paths: bool,

    /// Copy output to clipboard
    #[clap(long, help = "Copy output to system clipboard")]
    pub clip: bool,

    /// Persist the effective ignore patterns and model to the settings file
    #[clap(long)]
    pub save_settings: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output
    #[clap(short, long)]
    pub quiet: bool,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Target directory to process
    pub target_dir: PathBuf,

    /// Output file path
    pub output_file: PathBuf,

    /// Compiled ignore rules
    pub rules: RuleSet,

    /// Whether to respect .gitignore files
    pub respect_gitignore: bool,

    /// Maximum file size whose content is embedded, in bytes
    pub max_file_size: u64,

    /// LLM model to use for tokenization
    pub model: Option<Model>,

    /// Names of saved rules to embed
    pub selected_rules: Vec<String>,

    /// Output document format
    pub format: OutputFormat,

    /// Render paths relative to the target's parent
    pub relative_paths: bool,

    /// Copy output to clipboard
    pub clip: bool,
}

impl Config {
    /// Build configuration by merging arguments over persisted settings.
    ///
    /// Settings provide the base ignore set (itself defaulting to the
    /// built-in patterns); command-line patterns extend it and
    /// `--no-default-ignores` replaces it with the command line alone.
    pub fn from_args(args: Args, settings: &Settings) -> Self {
        let mut dir_patterns = if args.no_default_ignores {
            Vec::new()
        } else {
            settings.ignore_patterns.directories.clone()
        };
        dir_patterns.extend(args.ignore_dirs);

        let mut file_patterns = if args.no_default_ignores {
            Vec::new()
        } else {
            settings.ignore_patterns.files.clone()
        };
        file_patterns.extend(args.ignore_files);

        let mut denied_extensions = if args.no_default_ignores {
            Vec::new()
        } else {
            settings.excluded_extensions.clone()
        };
        denied_extensions.extend(args.exclude_extensions);

        let rules = RuleSet::new(
            dir_patterns,
            file_patterns,
            denied_extensions,
            args.include_extensions,
            args.ignore_case,
        );

        Self {
            target_dir: PathBuf::from(args.directory_path),
            output_file: PathBuf::from(args.output_file),
            rules,
            respect_gitignore: args.respect_gitignore,
            max_file_size: args.max_file_size,
            model: args.model.or(settings.model),
            selected_rules: args.rules,
            format: args.format,
            relative_paths: if args.absolute_paths {
                false
            } else {
                settings.use_relative_paths
            },
            clip: args.clip,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> io::Result<()> {
        // Check if target directory exists and is a directory
        if !self.target_dir.exists() || !self.target_dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Target directory not found: {}", self.target_dir.display()),
            ));
        }

        // Check if output file directory exists
        if let Some(parent) = self.output_file.parent() {
            if !parent.exists() && parent != PathBuf::from("") {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Output directory not found: {}", parent.display()),
                ));
            }
        }

        Ok(())
    }

    /// Canonical absolute path of the output file, for excluding it
    /// from the crawl.
    ///
    /// The file usually does not exist yet, so its parent directory is
    /// canonicalized and the file name appended. Comparing the full
    /// resolved path keeps same-named files elsewhere in the tree from
    /// being dropped.
    pub fn resolved_output(&self) -> Option<PathBuf> {
        if let Ok(path) = fs::canonicalize(&self.output_file) {
            return Some(path);
        }

        let file_name = self.output_file.file_name()?;
        let parent = match self.output_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::canonicalize(parent).ok()?,
            _ => fs::canonicalize(env::current_dir().ok()?).ok()?,
        };
        Some(parent.join(file_name))
    }
}
