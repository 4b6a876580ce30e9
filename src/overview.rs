/*!
 * Plain-text output formats
 *
 * Lighter alternatives to the XML document: an indented name-only tree
 * and a flat overview of file contents. Both follow the tree's
 * document order, so they are as deterministic as the XML form.
 */

use std::fmt::Write;

use crate::types::{DirectoryNode, Node};

const INDENT: &str = "    ";

/// Render an indented text tree of the crawled names.
///
/// Directories are bracketed with a trailing slash, symlinks shown
/// with their target. The root itself is not printed.
pub fn render_tree_text(root: &DirectoryNode) -> String {
    let mut out = String::new();
    render_level(&root.children, 0, &mut out);
    out
}

fn render_level(children: &[Node], depth: usize, out: &mut String) {
    for node in children {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        match node {
            Node::Directory(dir) => {
                let _ = writeln!(out, "[{}/]", dir.name);
                render_level(&dir.children, depth + 1, out);
            }
            Node::File(file) => {
                let _ = writeln!(out, "{}", file.name);
            }
            Node::Symlink(link) => {
                let _ = writeln!(out, "{} -> {}", link.name, link.target);
            }
        }
    }
}

/// Render a flat plain-text overview: a header followed by every
/// file's path, size, and payload.
pub fn render_overview(root: &DirectoryNode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Repository: {}", root.name);
    let _ = writeln!(out, "Total Files: {}", root.file_count());
    out.push('\n');

    root.for_each_file(&mut |file| {
        let _ = writeln!(out, "File: {}", file.path.display());
        let _ = writeln!(out, "Size: {} bytes", file.size);
        out.push_str("---\n");
        out.push_str(&file.content.payload());
        out.push_str("\n\n");
    });

    out
}
