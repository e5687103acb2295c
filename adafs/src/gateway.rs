//! The read-only operation contract.
//!
//! [`TreeGateway`] is the only surface a mounting adapter talks to. It
//! owns nothing but a shared reference to the immutable
//! [`VirtualTree`], so any number of callers may query it in parallel
//! without coordination. Reads open the referenced real file per call;
//! there is no shared handle state. Every verb is total: it always
//! returns a defined outcome and never blocks on anything but local
//! file I/O.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use thiserror::Error;

use crate::naming::SourceKind;
use crate::tree::{Node, NodeId, VirtualTree};

/// Outcomes a verb can fail with.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The path does not resolve in the tree.
    #[error("no such entry: {0}")]
    NotFound(String),

    /// The path resolved to a file where a directory was required.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The path resolved to a directory where a file was required.
    #[error("not a file: {0}")]
    NotAFile(String),

    /// Any mutating verb. Unconditional; checked before resolution.
    #[error("operation not permitted: tree is read-only")]
    ReadOnly,

    /// The referenced real file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The mutating verbs a filesystem could ask for. All of them are
/// denied the same way, for any path, before existence is even checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationVerb {
    Create,
    Write,
    Delete,
    Rename,
    Chmod,
    Truncate,
    Link,
}

/// Metadata for a resolved node.
///
/// The [`NodeId`] doubles as the content identity an adapter can hand
/// back to [`TreeGateway::read_node`] for subsequent reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attributes {
    Directory {
        node: NodeId,
        /// Number of direct children.
        entries: usize,
    },
    File {
        node: NodeId,
        /// Size of the referenced real file.
        size: u64,
        /// Modification time of the referenced real file.
        modified: SystemTime,
        kind: SourceKind,
    },
}

/// Read-only query surface over one virtual tree.
#[derive(Debug, Clone)]
pub struct TreeGateway {
    tree: Arc<VirtualTree>,
}

impl TreeGateway {
    /// Wrap a built tree.
    pub fn new(tree: Arc<VirtualTree>) -> Self {
        Self { tree }
    }

    /// The underlying tree.
    pub fn tree(&self) -> &VirtualTree {
        &self.tree
    }

    /// Resolve a path and return its metadata.
    pub fn attributes(&self, path: &Path) -> Result<Attributes, GatewayError> {
        let node = self.resolve(path)?;
        Ok(self.attributes_of(node))
    }

    /// Metadata for an already-resolved node.
    pub fn attributes_of(&self, node: NodeId) -> Attributes {
        match self.tree.node(node) {
            Node::Directory(dir) => Attributes::Directory {
                node,
                entries: dir.len(),
            },
            Node::File(file) => Attributes::File {
                node,
                size: file.size(),
                modified: file.modified(),
                kind: file.kind(),
            },
        }
    }

    /// Resolve a path to a directory and return its children's display
    /// names. Callers must not rely on the order.
    pub fn list(&self, path: &Path) -> Result<Vec<String>, GatewayError> {
        let node = self.resolve(path)?;
        self.tree
            .list(node)
            .map(|names| names.into_iter().map(str::to_string).collect())
            .ok_or_else(|| GatewayError::NotADirectory(display(path)))
    }

    /// Resolve a path to a file and read `length` bytes at `offset`
    /// from the referenced real file, verbatim.
    ///
    /// Reading at or past end of file returns the available (possibly
    /// empty) bytes, as a plain read(2) would.
    pub fn read(&self, path: &Path, offset: u64, length: u32) -> Result<Vec<u8>, GatewayError> {
        let node = self.resolve(path)?;
        self.read_node(node, offset, length)
            .map_err(|err| match err {
                GatewayError::NotAFile(_) => GatewayError::NotAFile(display(path)),
                other => other,
            })
    }

    /// Read from an already-resolved file node.
    pub fn read_node(&self, node: NodeId, offset: u64, length: u32) -> Result<Vec<u8>, GatewayError> {
        let file = match self.tree.node(node) {
            Node::File(file) => file,
            Node::Directory(dir) => return Err(GatewayError::NotAFile(dir.name().to_string())),
        };

        let io_err = |source| GatewayError::Io {
            path: file.source().to_path_buf(),
            source,
        };

        let mut real = File::open(file.source()).map_err(io_err)?;
        real.seek(SeekFrom::Start(offset)).map_err(io_err)?;
        let mut buffer = Vec::with_capacity(length as usize);
        real.take(u64::from(length))
            .read_to_end(&mut buffer)
            .map_err(io_err)?;
        Ok(buffer)
    }

    /// Deny a mutating verb.
    ///
    /// Denial precedes existence checks: the outcome is the same for a
    /// live file, a directory, or a path that resolves to nothing, so a
    /// caller can never probe the tree through mutation errors.
    pub fn mutate(&self, _path: &Path, _verb: MutationVerb) -> Result<(), GatewayError> {
        Err(GatewayError::ReadOnly)
    }

    fn resolve(&self, path: &Path) -> Result<NodeId, GatewayError> {
        self.tree
            .resolve(path)
            .ok_or_else(|| GatewayError::NotFound(display(path)))
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
