/*!
 * Core types for the crawled directory tree
 */

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::utils::format_file_size;

/// Content of a crawled file.
///
/// Files whose bytes cannot be embedded verbatim keep their place in the
/// tree with a fixed sentinel payload, so two crawls of an unchanged tree
/// render the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// UTF-8 text, embedded verbatim
    Text(String),
    /// Non-text bytes, content omitted
    Binary,
    /// File larger than the configured size limit
    Oversize(u64),
    /// File could not be read
    Unreadable,
}

impl FileContent {
    /// Payload rendered into the document for this content
    pub fn payload(&self) -> Cow<'_, str> {
        match self {
            FileContent::Text(text) => Cow::Borrowed(text),
            FileContent::Binary => Cow::Borrowed("[binary content omitted]"),
            FileContent::Oversize(size) => Cow::Owned(format!(
                "[content omitted: {} exceeds size limit]",
                format_file_size(*size)
            )),
            FileContent::Unreadable => Cow::Borrowed("[unreadable content omitted]"),
        }
    }

    /// Whether this is embeddable text rather than a sentinel
    pub fn is_text(&self) -> bool {
        matches!(self, FileContent::Text(_))
    }

    /// Embedded text, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Represents a directory in the crawled tree
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    /// Directory name
    pub name: String,
    /// Path relative to the crawl root's parent
    pub path: PathBuf,
    /// Children, directories first, each group sorted by name
    pub children: Vec<Node>,
}

impl DirectoryNode {
    /// Number of files in this subtree, sentinels included
    pub fn file_count(&self) -> usize {
        let mut count = 0;
        for child in &self.children {
            match child {
                Node::Directory(dir) => count += dir.file_count(),
                Node::File(_) => count += 1,
                Node::Symlink(_) => {}
            }
        }
        count
    }

    /// Visit every file node in this subtree, in document order
    pub fn for_each_file<'a>(&'a self, visit: &mut dyn FnMut(&'a FileNode)) {
        for child in &self.children {
            match child {
                Node::Directory(dir) => dir.for_each_file(visit),
                Node::File(file) => visit(file),
                Node::Symlink(_) => {}
            }
        }
    }
}

/// Represents a file in the crawled tree
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File name
    pub name: String,
    /// Path relative to the crawl root's parent
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// File content or sentinel
    pub content: FileContent,
}

/// Represents a symbolic link.
///
/// Links are recorded with their target but never followed, so cyclic
/// links cannot send the crawl into unbounded recursion.
#[derive(Debug, Clone)]
pub struct SymlinkNode {
    /// Link name
    pub name: String,
    /// Path relative to the crawl root's parent
    pub path: PathBuf,
    /// Target of the symlink, as stored on disk
    pub target: String,
}

/// A generic node of the crawled tree
#[derive(Debug, Clone)]
pub enum Node {
    /// Directory node
    Directory(DirectoryNode),
    /// File node
    File(FileNode),
    /// Symbolic link node
    Symlink(SymlinkNode),
}

impl Node {
    /// Name of the underlying entry
    pub fn name(&self) -> &str {
        match self {
            Node::Directory(dir) => &dir.name,
            Node::File(file) => &file.name,
            Node::Symlink(link) => &link.name,
        }
    }

    /// Path of the underlying entry
    pub fn path(&self) -> &Path {
        match self {
            Node::Directory(dir) => &dir.path,
            Node::File(file) => &file.path,
            Node::Symlink(link) => &link.path,
        }
    }
}
