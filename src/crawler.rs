/*!
 * Directory crawling
 *
 * The crawler walks the target tree depth-first in a single thread and
 * produces a tree of nodes with deterministic child ordering:
 * directories before files, each group sorted by name. Only a failure
 * on the target directory itself aborts a crawl; failures on
 * individual entries are recorded as skips and the crawl continues.
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use indicatif::ProgressBar;
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::Config;
use crate::report::FileReportInfo;
use crate::types::{DirectoryNode, FileContent, FileNode, Node, SymlinkNode};
use crate::utils::tail_truncate;

/// Number of bytes sampled when deciding whether a file is text
const PROBE_BYTES: usize = 8192;

/// Errors that abort a crawl
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Target directory does not exist
    #[error("target directory not found: {0}")]
    RootNotFound(PathBuf),

    /// Target exists but is not a directory
    #[error("target is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    /// Target directory could not be listed
    #[error("cannot list target directory {path}: {source}")]
    RootUnlistable {
        /// Canonical target path
        path: PathBuf,
        /// Underlying listing error
        source: io::Error,
    },

    /// Other IO failure on the target itself
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Why a single entry was left out of the tree
#[derive(Debug, Clone, Error)]
pub enum SkipReason {
    /// Directory could not be listed
    #[error("cannot list directory: {0}")]
    Unlistable(String),

    /// Entry could not be stat'ed
    #[error("cannot stat entry: {0}")]
    Stat(String),

    /// Symlink target could not be resolved
    #[error("cannot read symlink: {0}")]
    Link(String),
}

/// An entry the crawl skipped, with the reason
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    /// Path of the skipped entry
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Crawl statistics
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Number of files and symlinks processed
    pub files_processed: usize,
    /// Total number of lines across embedded text
    pub total_lines: usize,
    /// Total number of characters across embedded text
    pub total_chars: usize,
    /// Details for each processed entry, keyed by rendered path
    pub file_details: HashMap<String, FileReportInfo>,
    /// Entries skipped because of filesystem errors
    pub skipped: Vec<SkippedEntry>,
}

/// Crawler for directory contents
pub struct Crawler {
    /// Crawler configuration
    config: Config,
    /// Resolved output file path, excluded from the crawl
    output_abs: Option<PathBuf>,
    /// Progress bar
    progress: Arc<ProgressBar>,
    /// Crawl statistics
    stats: RefCell<CrawlStats>,
}

impl Crawler {
    /// Create a new crawler
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        let output_abs = config.resolved_output();
        Self {
            config,
            output_abs,
            progress,
            stats: RefCell::new(CrawlStats::default()),
        }
    }

    /// Get crawl statistics
    pub fn statistics(&self) -> CrawlStats {
        self.stats.borrow().clone()
    }

    /// Crawl the target directory and return the directory tree.
    ///
    /// If the target's own name matches a directory ignore pattern the
    /// result is a childless root node.
    pub fn crawl(&self) -> Result<DirectoryNode, CrawlError> {
        let target = &self.config.target_dir;
        if !target.exists() {
            return Err(CrawlError::RootNotFound(target.clone()));
        }
        let abs_path = fs::canonicalize(target)?;
        if !abs_path.is_dir() {
            return Err(CrawlError::RootNotDirectory(target.clone()));
        }

        let dir_name = abs_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        if self.config.rules.excludes_dir(&dir_name) {
            log::warn!(
                "target directory '{}' matches an ignore pattern, emitting an empty tree",
                dir_name
            );
            return Ok(DirectoryNode {
                name: dir_name.clone(),
                path: PathBuf::from(dir_name),
                children: Vec::new(),
            });
        }

        let mut gitignores = GitignoreStack::new(self.config.respect_gitignore);
        self.crawl_directory(&abs_path, &PathBuf::from(&dir_name), &mut gitignores)
            .map_err(|source| CrawlError::RootUnlistable {
                path: abs_path,
                source,
            })
    }

    /// Crawl one directory level and return its node representation.
    ///
    /// Returns an error only when the directory itself cannot be
    /// listed; the caller records that as a skip (or, for the root,
    /// aborts the crawl).
    fn crawl_directory(
        &self,
        abs_path: &Path,
        rel_path: &Path,
        gitignores: &mut GitignoreStack,
    ) -> io::Result<DirectoryNode> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(abs_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            match entry {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    // An error on the directory itself means the level
                    // cannot be listed at all.
                    if err.path() == Some(abs_path) {
                        return Err(err.into());
                    }
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| abs_path.to_path_buf());
                    self.record_skip(path, SkipReason::Stat(err.to_string()));
                }
            }
        }

        let pushed = gitignores.push_dir(abs_path);
        let mut children = Vec::new();

        // Directories first, then files; partition keeps each group in
        // name order.
        let (dirs, files): (Vec<_>, Vec<_>) =
            entries.into_iter().partition(|e| e.file_type().is_dir());

        for entry in dirs {
            let name = entry.file_name().to_string_lossy().to_string();
            if self.config.rules.excludes_dir(&name) {
                log::debug!("excluded directory: {}", entry.path().display());
                continue;
            }
            if gitignores.is_ignored(entry.path(), true) {
                log::debug!("gitignored directory: {}", entry.path().display());
                continue;
            }

            let child_rel = rel_path.join(&name);
            match self.crawl_directory(entry.path(), &child_rel, gitignores) {
                Ok(dir_node) => children.push(Node::Directory(dir_node)),
                Err(err) => {
                    self.record_skip(
                        entry.path().to_path_buf(),
                        SkipReason::Unlistable(err.to_string()),
                    );
                }
            }
        }

        for entry in files {
            let name = entry.file_name().to_string_lossy().to_string();
            if self.output_abs.as_deref() == Some(entry.path()) {
                continue;
            }
            if self.config.rules.excludes_file(&name) {
                log::debug!("excluded file: {}", entry.path().display());
                continue;
            }
            if gitignores.is_ignored(entry.path(), false) {
                log::debug!("gitignored file: {}", entry.path().display());
                continue;
            }

            let child_rel = rel_path.join(&name);
            match self.process_entry(&entry, &child_rel, name) {
                Ok(node) => children.push(node),
                Err(reason) => self.record_skip(entry.path().to_path_buf(), reason),
            }
        }

        if pushed {
            gitignores.pop();
        }

        Ok(DirectoryNode {
            name: abs_path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            path: rel_path.to_path_buf(),
            children,
        })
    }

    /// Process a single non-directory entry
    fn process_entry(
        &self,
        entry: &walkdir::DirEntry,
        rel_path: &Path,
        name: String,
    ) -> Result<Node, SkipReason> {
        self.progress.inc(1);
        self.progress
            .set_message(format!("Current file: {}", tail_truncate(&name, 40)));

        let file_path = rel_path.to_string_lossy().to_string();

        if entry.path_is_symlink() {
            let target = fs::read_link(entry.path())
                .map_err(|e| SkipReason::Link(e.to_string()))?
                .to_string_lossy()
                .to_string();

            {
                let mut stats = self.stats.borrow_mut();
                stats.files_processed += 1;
                stats.file_details.insert(
                    file_path,
                    FileReportInfo {
                        lines: 0,
                        chars: target.chars().count(),
                        tokens: None,
                    },
                );
            }

            return Ok(Node::Symlink(SymlinkNode {
                name,
                path: rel_path.to_path_buf(),
                target,
            }));
        }

        let metadata = entry
            .metadata()
            .map_err(|e| SkipReason::Stat(e.to_string()))?;
        let size = metadata.len();
        let (content, lines, chars) = self.read_content(entry.path(), size);

        {
            let mut stats = self.stats.borrow_mut();
            stats.files_processed += 1;
            stats.total_lines += lines;
            stats.total_chars += chars;
            stats
                .file_details
                .insert(file_path, FileReportInfo { lines, chars, tokens: None });
        }

        Ok(Node::File(FileNode {
            name,
            path: rel_path.to_path_buf(),
            size,
            content,
        }))
    }

    /// Read file content, falling back to a sentinel when the bytes
    /// cannot be embedded. Returns the content with its line and
    /// character counts.
    fn read_content(&self, abs_path: &Path, size: u64) -> (FileContent, usize, usize) {
        if size > self.config.max_file_size {
            return (FileContent::Oversize(size), 0, 0);
        }

        match probe_is_text(abs_path, size) {
            Ok(true) => {}
            Ok(false) => return (FileContent::Binary, 0, 0),
            Err(err) => {
                log::debug!("cannot probe {}: {}", abs_path.display(), err);
                return (FileContent::Unreadable, 0, 0);
            }
        }

        match fs::read_to_string(abs_path) {
            Ok(text) => {
                let lines = text.lines().count();
                let chars = text.chars().count();
                (FileContent::Text(text), lines, chars)
            }
            Err(err) => {
                log::debug!("cannot read {}: {}", abs_path.display(), err);
                (FileContent::Unreadable, 0, 0)
            }
        }
    }

    fn record_skip(&self, path: PathBuf, reason: SkipReason) {
        log::warn!("skipping {}: {}", path.display(), reason);
        self.stats
            .borrow_mut()
            .skipped
            .push(SkippedEntry { path, reason });
    }
}

/// Sample the head of a file and decide whether it is embeddable text
fn probe_is_text(path: &Path, size: u64) -> io::Result<bool> {
    let sample_len = size.min(PROBE_BYTES as u64) as usize;
    if sample_len == 0 {
        return Ok(true);
    }

    let mut buffer = vec![0u8; sample_len];
    let mut file = File::open(path)?;
    let bytes_read = file.read(&mut buffer)?;
    buffer.truncate(bytes_read);

    Ok(looks_like_text(&buffer))
}

/// Heuristic for text content: valid UTF-8 and a low control-byte ratio
fn looks_like_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return true;
    }
    if sample.contains(&0) {
        return false;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => {}
        // The probe may cut a multi-byte character at the end.
        Err(err) if err.error_len().is_none() => {}
        Err(_) => return false,
    }

    let control = sample
        .iter()
        .filter(|&&b| b < 9 || (b > 13 && b < 32))
        .count();
    (control as f32 / sample.len() as f32) < 0.1
}

/// Stack of `.gitignore` matchers for the directories on the current
/// crawl path. The innermost file wins, matching git's precedence.
struct GitignoreStack {
    enabled: bool,
    matchers: Vec<Gitignore>,
}

impl GitignoreStack {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            matchers: Vec::new(),
        }
    }

    /// Load `dir/.gitignore` if present; returns whether a matcher was
    /// pushed and must later be popped.
    fn push_dir(&mut self, dir: &Path) -> bool {
        if !self.enabled {
            return false;
        }
        let file = dir.join(".gitignore");
        if !file.is_file() {
            return false;
        }

        let mut builder = GitignoreBuilder::new(dir);
        if let Some(err) = builder.add(&file) {
            log::warn!("cannot parse {}: {}", file.display(), err);
            return false;
        }
        match builder.build() {
            Ok(matcher) => {
                self.matchers.push(matcher);
                true
            }
            Err(err) => {
                log::warn!("cannot build matcher for {}: {}", file.display(), err);
                false
            }
        }
    }

    fn pop(&mut self) {
        self.matchers.pop();
    }

    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        for matcher in self.matchers.iter().rev() {
            let matched = matcher.matched(path, is_dir);
            if matched.is_ignore() {
                return true;
            }
            if matched.is_whitelist() {
                return false;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_heuristic_accepts_plain_source() {
        assert!(looks_like_text(b"fn main() {}\n"));
        assert!(looks_like_text("héllo wörld\n".as_bytes()));
        assert!(looks_like_text(b""));
    }

    #[test]
    fn test_text_heuristic_rejects_binary() {
        assert!(!looks_like_text(&[0x00, 0x01, 0x02, 0x03]));
        assert!(!looks_like_text(&[0xff, 0xfe, 0x00, 0x00, 0x01]));
    }

    #[test]
    fn test_text_heuristic_tolerates_cut_utf8_tail() {
        // "é" is two bytes; keep only the first.
        let mut sample = b"hello ".to_vec();
        sample.extend_from_slice(&"é".as_bytes()[..1]);
        assert!(looks_like_text(&sample));
    }

    #[test]
    fn test_text_heuristic_rejects_control_heavy_content() {
        let mut sample = Vec::new();
        for _ in 0..10 {
            sample.push(0x01);
            sample.extend_from_slice(b"abc");
        }
        assert!(!looks_like_text(&sample));
    }
}
