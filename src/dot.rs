//! Graphviz export of the tree shape, for looking at how rotations move words.
//!
//! Each node is drawn as a `{word|count}` record. PDF rendering shells out to
//! the `dot` tool, which has to be on `PATH`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

use crate::{Error, NodeId, Result, TourneyTree};

/// Writes the tree as a DOT digraph. Nodes are numbered in pre-order.
pub fn write_dot<W: Write>(tree: &TourneyTree, mut out: W) -> io::Result<()> {
    writeln!(out, "digraph TourneyTree {{")?;
    writeln!(out, "  node [shape=record, height=.1];")?;

    let mut next = 0u64;
    let mut stack: Vec<(NodeId, u64)> = Vec::new();
    if !tree.root.is_null() {
        stack.push((tree.root, next));
    }
    while let Some((id, num)) = stack.pop() {
        let node = &tree.arena[id];
        writeln!(
            out,
            "  node{num} [label=\"{{{}|{}}}\"];",
            escape_label(&node.key),
            node.count
        )?;

        let mut children = Vec::with_capacity(2);
        for child in [node.left, node.right] {
            if child.is_null() {
                continue;
            }
            next += 1;
            writeln!(out, "  node{num} -> node{next};")?;
            children.push((child, next));
        }
        stack.extend(children.into_iter().rev());
    }

    writeln!(out, "}}")?;
    out.flush()
}

/// Escapes record-label metacharacters.
fn escape_label(key: &[u8]) -> String {
    let text = String::from_utf8_lossy(key);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '{' | '}' | '|' | '<' | '>' | '"' | '\\' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Renders the tree to `pdf` through a temporary `<pdf>.dot` file.
///
/// An empty tree renders nothing and returns `Ok(false)`.
pub fn export_pdf(tree: &TourneyTree, pdf: &Path) -> Result<bool> {
    if tree.is_empty() {
        return Ok(false);
    }

    let mut dot_name = OsString::from(pdf.as_os_str());
    dot_name.push(".dot");
    let dot_path = PathBuf::from(dot_name);

    let file = File::create(&dot_path).map_err(|e| Error::io(&dot_path, e))?;
    write_dot(tree, BufWriter::new(file)).map_err(|e| Error::io(&dot_path, e))?;

    let status = Command::new("dot")
        .arg("-Tpdf")
        .arg(&dot_path)
        .arg("-o")
        .arg(pdf)
        .status()
        .map_err(|e| Error::io("dot", e))?;
    if !status.success() {
        return Err(Error::Graphviz { status });
    }

    fs::remove_file(&dot_path).map_err(|e| Error::io(&dot_path, e))?;
    Ok(true)
}

/// Numbered per-mutation snapshots: `insertion_N.pdf` after every insert and
/// `suppression_N.pdf` after every tier extraction that leaves words behind.
///
/// Rendering failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct Exporter {
    dir: PathBuf,
    insertions: u64,
    extractions: u64,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            insertions: 0,
            extractions: 0,
        }
    }

    pub fn after_insert(&mut self, tree: &TourneyTree) {
        self.insertions += 1;
        let path = self.dir.join(format!("insertion_{}.pdf", self.insertions));
        Self::render(tree, &path);
    }

    pub fn after_extract(&mut self, tree: &TourneyTree) {
        self.extractions += 1;
        if tree.is_empty() {
            return;
        }
        let path = self.dir.join(format!("suppression_{}.pdf", self.extractions));
        Self::render(tree, &path);
    }

    fn render(tree: &TourneyTree, path: &Path) {
        match export_pdf(tree, path) {
            Ok(true) => debug!("wrote {}", path.display()),
            Ok(false) => {}
            Err(e) => warn!("diagram not written: {e}"),
        }
    }
}
