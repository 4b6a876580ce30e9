/*!
 * XML writer for promptpack
 *
 * Renders a crawled tree into a single XML document. The document is a
 * pure function of the tree and the embedded rules: it carries no
 * timestamps, host names, or other run-varying data, so two crawls of
 * an unchanged tree produce byte-identical output.
 */

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::Config;
use crate::error::Result;
use crate::types::{DirectoryNode, FileNode, Node, SymlinkNode};

/// XML writer for directory contents
pub struct XmlWriter {
    /// Writer configuration
    config: Config,
}

impl XmlWriter {
    /// Create a new XML writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Write the directory tree to the configured output file
    pub fn write(&self, root: &DirectoryNode, rules: &[(String, String)]) -> Result<()> {
        let base = self.absolute_base()?;
        let file = File::create(&self.config.output_file)?;
        let writer = BufWriter::new(file);
        let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);
        self.write_document(root, rules, base.as_deref(), &mut xml_writer)?;
        Ok(())
    }

    /// Render the directory tree to an XML string
    pub fn render(&self, root: &DirectoryNode, rules: &[(String, String)]) -> Result<String> {
        let base = self.absolute_base()?;
        let mut xml_writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_document(root, rules, base.as_deref(), &mut xml_writer)?;
        Ok(String::from_utf8_lossy(&xml_writer.into_inner()).into_owned())
    }

    /// Base directory for absolute path rendering, when configured
    fn absolute_base(&self) -> Result<Option<PathBuf>> {
        if self.config.relative_paths {
            return Ok(None);
        }
        let canonical = fs::canonicalize(&self.config.target_dir)?;
        // Node paths start with the root directory's name, so joining
        // onto the canonical parent yields the absolute path.
        Ok(Some(
            canonical.parent().unwrap_or(&canonical).to_path_buf(),
        ))
    }

    fn write_document<W: Write>(
        &self,
        root: &DirectoryNode,
        rules: &[(String, String)],
        base: Option<&Path>,
        writer: &mut Writer<W>,
    ) -> io::Result<()> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut start_tag = BytesStart::new("repository");
        start_tag.push_attribute(("name", root.name.as_str()));
        let file_count = root.file_count().to_string();
        start_tag.push_attribute(("files", file_count.as_str()));
        writer.write_event(Event::Start(start_tag))?;

        if !rules.is_empty() {
            self.write_rules(rules, writer)?;
        }

        for node in &root.children {
            self.write_node(node, base, writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("repository")))?;

        Ok(())
    }

    /// Write the embedded rule instructions
    fn write_rules<W: Write>(
        &self,
        rules: &[(String, String)],
        writer: &mut Writer<W>,
    ) -> io::Result<()> {
        writer.write_event(Event::Start(BytesStart::new("rules")))?;

        for (name, content) in rules {
            let mut start_tag = BytesStart::new("rule");
            start_tag.push_attribute(("name", name.as_str()));
            writer.write_event(Event::Start(start_tag))?;
            writer.write_event(Event::Text(BytesText::new(content)))?;
            writer.write_event(Event::End(BytesEnd::new("rule")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("rules")))?;

        Ok(())
    }

    fn write_node<W: Write>(
        &self,
        node: &Node,
        base: Option<&Path>,
        writer: &mut Writer<W>,
    ) -> io::Result<()> {
        match node {
            Node::Directory(dir_node) => self.write_directory(dir_node, base, writer),
            Node::File(file_node) => self.write_file(file_node, base, writer),
            Node::Symlink(sym_node) => self.write_symlink(sym_node, base, writer),
        }
    }

    /// Write a directory node to XML
    fn write_directory<W: Write>(
        &self,
        dir: &DirectoryNode,
        base: Option<&Path>,
        writer: &mut Writer<W>,
    ) -> io::Result<()> {
        let path = self.render_path(&dir.path, base);
        let mut start_tag = BytesStart::new("directory");
        start_tag.push_attribute(("name", dir.name.as_str()));
        start_tag.push_attribute(("path", path.as_str()));
        writer.write_event(Event::Start(start_tag))?;

        for node in &dir.children {
            self.write_node(node, base, writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new("directory")))?;

        Ok(())
    }

    /// Write a file node to XML
    fn write_file<W: Write>(
        &self,
        file: &FileNode,
        base: Option<&Path>,
        writer: &mut Writer<W>,
    ) -> io::Result<()> {
        let path = self.render_path(&file.path, base);
        let size = file.size.to_string();
        let mut start_tag = BytesStart::new("file");
        start_tag.push_attribute(("name", file.name.as_str()));
        start_tag.push_attribute(("path", path.as_str()));
        start_tag.push_attribute(("size", size.as_str()));
        writer.write_event(Event::Start(start_tag))?;

        // BytesText escapes markup, so the payload survives a round
        // trip through any XML parser.
        writer.write_event(Event::Text(BytesText::new(&file.content.payload())))?;

        writer.write_event(Event::End(BytesEnd::new("file")))?;

        Ok(())
    }

    /// Write a symlink node to XML
    fn write_symlink<W: Write>(
        &self,
        symlink: &SymlinkNode,
        base: Option<&Path>,
        writer: &mut Writer<W>,
    ) -> io::Result<()> {
        let path = self.render_path(&symlink.path, base);
        let mut tag = BytesStart::new("symlink");
        tag.push_attribute(("name", symlink.name.as_str()));
        tag.push_attribute(("path", path.as_str()));
        tag.push_attribute(("target", symlink.target.as_str()));
        writer.write_event(Event::Empty(tag))?;

        Ok(())
    }

    fn render_path(&self, rel: &Path, base: Option<&Path>) -> String {
        match base {
            Some(base) => base.join(rel).to_string_lossy().to_string(),
            None => rel.to_string_lossy().to_string(),
        }
    }
}
