//! The virtual package tree.
//!
//! A [`VirtualTree`] is built exactly once per mount session by a single
//! synchronous scan of the source root, then never mutated:
//! every later operation is a read-only query. Nodes live in one owned
//! arena (`Vec<Node>`) and reference each other through stable [`NodeId`]
//! indices, so the tree can be shared freely behind an `Arc` and mapped
//! directly onto FUSE inode numbers. Rebuilding means discarding the
//! arena and constructing a new one.
//!
//! Directory children are keyed by their canonical (uppercased) name,
//! which makes the per-directory uniqueness invariant structural and
//! gives listings a deterministic order.

mod builder;
mod collision;
mod lookup;

pub use builder::BuildError;
pub use collision::DroppedCandidate;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::naming::SourceKind;

/// Stable index of a node in the tree arena.
///
/// Ids are assigned during the build pass and stay valid for the life of
/// the tree. The root directory is always [`VirtualTree::ROOT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Reconstruct an id from an arena position, if in range.
    pub fn from_index(tree: &VirtualTree, index: usize) -> Option<Self> {
        if index < tree.nodes.len() {
            Some(NodeId(index as u32))
        } else {
            None
        }
    }
}

/// A directory in the virtual hierarchy.
///
/// Both decoded package directories and pass-through regions end up as
/// this one node type; lookup never needs to know where a directory came
/// from.
#[derive(Debug)]
pub struct DirectoryNode {
    name: String,
    children: BTreeMap<String, NodeId>,
}

impl DirectoryNode {
    /// Display name (canonical uppercase form).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child ids keyed by canonical name, in canonical order.
    pub fn children(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.children.iter().map(|(key, id)| (key.as_str(), *id))
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn get(&self, canonical: &str) -> Option<NodeId> {
        self.children.get(canonical).copied()
    }
}

/// A leaf exposing exactly one real crunched file.
///
/// Content is always a verbatim byte-for-byte passthrough of the
/// referenced source file; a file node never aggregates bytes from more
/// than one real file.
#[derive(Debug)]
pub struct FileNode {
    name: String,
    kind: SourceKind,
    source: PathBuf,
    size: u64,
    modified: SystemTime,
}

impl FileNode {
    /// Display name, e.g. `STRINGS.ads` (uppercase stem, original
    /// lowercase extension).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spec or body.
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Real path of the referenced crunched file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Size of the referenced file, captured at build time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Modification time of the referenced file, captured at build time.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }
}

/// One node of the virtual tree.
#[derive(Debug)]
pub enum Node {
    Directory(DirectoryNode),
    File(FileNode),
}

impl Node {
    /// Display name of the node.
    pub fn name(&self) -> &str {
        match self {
            Node::Directory(dir) => dir.name(),
            Node::File(file) => file.name(),
        }
    }

    /// True for directory nodes.
    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }
}

/// The immutable virtual hierarchy for one mount session.
#[derive(Debug)]
pub struct VirtualTree {
    nodes: Vec<Node>,
    dropped: Vec<DroppedCandidate>,
    source_root: PathBuf,
}

impl VirtualTree {
    /// Id of the root directory.
    pub const ROOT: NodeId = NodeId(0);

    /// Build the tree from a source root.
    ///
    /// This is the only constructor. Fails only when a directory or
    /// file under `source_root` cannot be read - never because of name
    /// collisions.
    pub fn build(source_root: impl Into<PathBuf>) -> Result<Self, BuildError> {
        builder::build(source_root.into())
    }

    /// Access a node by id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The scanned source root.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Candidates discarded by the first-writer-wins collision policy,
    /// in the order they were encountered. Purely diagnostic: dropped
    /// entries are not reachable anywhere in the tree.
    pub fn dropped(&self) -> &[DroppedCandidate] {
        &self.dropped
    }

    fn directory(&self, id: NodeId) -> Option<&DirectoryNode> {
        match self.node(id) {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }
}
