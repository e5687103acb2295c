//! Case-insensitive resolution against the virtual tree.
//!
//! Canonical child names are uppercase, so resolving a caller path is
//! just uppercasing each component and walking the children maps. Every
//! component must match exactly after folding - there is no prefix or
//! partial matching - and resolution is total and side-effect-free: the
//! same input yields the same answer for the life of the tree.

use std::path::{Component, Path};

use super::{Node, NodeId, VirtualTree};

impl VirtualTree {
    /// Resolve one child of a directory, case-insensitively.
    ///
    /// Returns `None` when `dir` is not a directory or has no matching
    /// child.
    pub fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.directory(dir)?.get(&name.to_uppercase())
    }

    /// Resolve a sequence of path components from the root.
    ///
    /// An empty sequence resolves to the root directory.
    pub fn resolve_components<'a, I>(&self, components: I) -> Option<NodeId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = VirtualTree::ROOT;
        for component in components {
            current = self.child(current, component)?;
        }
        Some(current)
    }

    /// Resolve a host path against the tree.
    ///
    /// Leading separators and `.` components are ignored; `..`, prefix
    /// components and non-UTF-8 components never resolve.
    pub fn resolve(&self, path: &Path) -> Option<NodeId> {
        let mut current = VirtualTree::ROOT;
        for component in path.components() {
            match component {
                Component::RootDir | Component::CurDir => {}
                Component::Normal(name) => {
                    current = self.child(current, name.to_str()?)?;
                }
                Component::ParentDir | Component::Prefix(_) => return None,
            }
        }
        Some(current)
    }

    /// Display names of a directory's children, in canonical order.
    ///
    /// Returns `None` when `id` is not a directory.
    pub fn list(&self, id: NodeId) -> Option<Vec<&str>> {
        let dir = self.directory(id)?;
        Some(dir.children().map(|(_, child)| self.node(child).name()).collect())
    }

    /// True when the node is a directory.
    pub fn is_directory(&self, id: NodeId) -> bool {
        matches!(self.node(id), Node::Directory(_))
    }
}
