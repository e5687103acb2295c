//! One-shot construction of the virtual tree.
//!
//! The builder makes a single synchronous pass over the source root at
//! startup. Direct children of every directory are processed in lexical
//! order of their on-disk names, so collision outcomes are reproducible
//! across runs given identical input. Real subdirectories are preserved
//! as pass-through regions and recursed into with the same rules, which
//! is what lets preserved regions carry their own nested packages.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, trace};

use super::collision::{drop_candidate, DroppedCandidate};
use super::{DirectoryNode, FileNode, Node, NodeId, VirtualTree};
use crate::naming::{decode_file_name, DecodedName};

/// Failure to construct a tree.
///
/// Collisions are not errors; the only way a build fails is an
/// unreadable source root or an entry that vanishes mid-scan.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A directory or file under the source root could not be read.
    #[error("cannot scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source root exists but is not a directory.
    #[error("source root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

impl BuildError {
    fn scan(path: &Path, source: io::Error) -> Self {
        BuildError::Scan {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Build a [`VirtualTree`] from a source root.
pub(super) fn build(source_root: PathBuf) -> Result<VirtualTree, BuildError> {
    let metadata = fs::metadata(&source_root).map_err(|e| BuildError::scan(&source_root, e))?;
    if !metadata.is_dir() {
        return Err(BuildError::NotADirectory(source_root));
    }

    let mut builder = TreeBuilder::new();
    builder.scan_directory(VirtualTree::ROOT, "", &source_root)?;

    info!(
        source_root = %source_root.display(),
        nodes = builder.nodes.len(),
        dropped = builder.dropped.len(),
        "virtual tree built"
    );

    Ok(VirtualTree {
        nodes: builder.nodes,
        dropped: builder.dropped,
        source_root,
    })
}

struct TreeBuilder {
    nodes: Vec<Node>,
    dropped: Vec<DroppedCandidate>,
}

impl TreeBuilder {
    fn new() -> Self {
        let root = Node::Directory(DirectoryNode {
            name: String::new(),
            children: Default::default(),
        });
        Self {
            nodes: vec![root],
            dropped: Vec::new(),
        }
    }

    /// Scan one source directory into the virtual directory `dir`.
    ///
    /// `virtual_path` is the `/`-joined canonical path of `dir`, empty
    /// for the root; it only feeds collision records and logs.
    fn scan_directory(
        &mut self,
        dir: NodeId,
        virtual_path: &str,
        source_dir: &Path,
    ) -> Result<(), BuildError> {
        let mut entries: Vec<(OsString, PathBuf)> = Vec::new();
        let read_dir = fs::read_dir(source_dir).map_err(|e| BuildError::scan(source_dir, e))?;
        for entry in read_dir {
            let entry = entry.map_err(|e| BuildError::scan(source_dir, e))?;
            entries.push((entry.file_name(), entry.path()));
        }
        // Lexical on-disk order fixes which candidate wins a collision.
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path) in entries {
            let Some(name) = name.to_str() else {
                debug!(path = %path.display(), "skipping entry with non-UTF-8 name");
                continue;
            };
            let metadata = fs::metadata(&path).map_err(|e| BuildError::scan(&path, e))?;
            if metadata.is_dir() {
                self.add_pass_through(dir, virtual_path, name, &path)?;
            } else {
                self.add_file(dir, virtual_path, name, &path, &metadata)?;
            }
        }
        Ok(())
    }

    /// Preserve a real subdirectory as a virtual directory and recurse.
    fn add_pass_through(
        &mut self,
        parent: NodeId,
        parent_path: &str,
        name: &str,
        source_dir: &Path,
    ) -> Result<(), BuildError> {
        let canonical = name.to_uppercase();
        let child_path = join_virtual(parent_path, &canonical);
        match self.ensure_directory(parent, &canonical) {
            Some(child) => self.scan_directory(child, &child_path, source_dir),
            None => {
                // A file already owns this name; the whole region loses.
                let record = drop_candidate(child_path, source_dir);
                self.dropped.push(record);
                Ok(())
            }
        }
    }

    /// Decode one file entry and insert it, or skip it.
    fn add_file(
        &mut self,
        parent: NodeId,
        parent_path: &str,
        name: &str,
        source: &Path,
        metadata: &fs::Metadata,
    ) -> Result<(), BuildError> {
        let Some(decoded) = decode_file_name(name) else {
            trace!(path = %source.display(), "not a package file, skipping");
            return Ok(());
        };

        // Every decoded segment becomes a directory; the innermost one
        // both encloses the file and names it.
        let mut dir = parent;
        let mut dir_path = parent_path.to_string();
        for segment in &decoded.segments {
            dir_path = join_virtual(&dir_path, segment);
            match self.ensure_directory(dir, segment) {
                Some(child) => dir = child,
                None => {
                    let record = drop_candidate(dir_path, source);
                    self.dropped.push(record);
                    return Ok(());
                }
            }
        }

        self.insert_file(dir, &dir_path, decoded, source, metadata)
    }

    /// Walk to (or create) the directory `canonical` under `parent`.
    ///
    /// Returns `None` when the name is occupied by a file, which is a
    /// collision for the caller to record.
    fn ensure_directory(&mut self, parent: NodeId, canonical: &str) -> Option<NodeId> {
        if let Some(existing) = self.directory(parent).get(canonical) {
            return match &self.nodes[existing.index()] {
                Node::Directory(_) => Some(existing),
                Node::File(_) => None,
            };
        }
        let id = self.push(Node::Directory(DirectoryNode {
            name: canonical.to_string(),
            children: Default::default(),
        }));
        self.directory_mut(parent)
            .children
            .insert(canonical.to_string(), id);
        Some(id)
    }

    fn insert_file(
        &mut self,
        dir: NodeId,
        dir_path: &str,
        decoded: DecodedName,
        source: &Path,
        metadata: &fs::Metadata,
    ) -> Result<(), BuildError> {
        let display = decoded.file_name();
        let canonical = display.to_uppercase();
        let file_path = join_virtual(dir_path, &display);

        let modified = metadata.modified().map_err(|e| BuildError::scan(source, e))?;
        let node = FileNode {
            name: display,
            kind: decoded.kind,
            source: source.to_path_buf(),
            size: metadata.len(),
            modified,
        };

        if self.directory(dir).get(&canonical).is_some() {
            let record = drop_candidate(file_path, source);
            self.dropped.push(record);
        } else {
            let id = self.push(Node::File(node));
            self.directory_mut(dir).children.insert(canonical, id);
        }
        Ok(())
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn directory(&self, id: NodeId) -> &DirectoryNode {
        match &self.nodes[id.index()] {
            Node::Directory(dir) => dir,
            Node::File(_) => unreachable!("builder only descends into directories"),
        }
    }

    fn directory_mut(&mut self, id: NodeId) -> &mut DirectoryNode {
        match &mut self.nodes[id.index()] {
            Node::Directory(dir) => dir,
            Node::File(_) => unreachable!("builder only descends into directories"),
        }
    }
}

fn join_virtual(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}
