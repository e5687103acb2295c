//! Tree command - print the synthesized hierarchy without mounting.

use std::fmt::Write as _;
use std::path::Path;

use adafs::config::DEFAULT_LOG_FILTER;
use adafs::tree::{Node, NodeId, VirtualTree};

use crate::error::CliError;

/// Run the tree command.
pub fn run(source: &Path) -> Result<(), CliError> {
    adafs::logging::init(DEFAULT_LOG_FILTER);

    let tree = VirtualTree::build(source)?;
    print!("{}", render(&tree));

    if !tree.dropped().is_empty() {
        println!();
        println!("Shadowed by name collisions:");
        for dropped in tree.dropped() {
            println!("  {}  (from {})", dropped.virtual_path, dropped.source.display());
        }
    }
    Ok(())
}

/// Render the tree in `tree(1)` style.
fn render(tree: &VirtualTree) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", tree.source_root().display());
    render_children(tree, VirtualTree::ROOT, "", &mut out);
    out
}

fn render_children(tree: &VirtualTree, id: NodeId, prefix: &str, out: &mut String) {
    let children: Vec<NodeId> = match tree.node(id) {
        Node::Directory(dir) => dir.children().map(|(_, child)| child).collect(),
        Node::File(_) => return,
    };
    let last = children.len().saturating_sub(1);
    for (index, child) in children.into_iter().enumerate() {
        let (connector, continuation) = if index == last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let _ = writeln!(out, "{}{}{}", prefix, connector, tree.node(child).name());
        let deeper = format!("{}{}", prefix, continuation);
        render_children(tree, child, &deeper, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_render_nested_tree() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("outer_sep_inner-222.ads"), b"spec").unwrap();
        fs::write(src.path().join("top-1.ads"), b"spec").unwrap();

        let tree = VirtualTree::build(src.path()).unwrap();
        let rendered = render(&tree);
        let lines: Vec<&str> = rendered.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "├── OUTER",
                "│   └── INNER",
                "│       └── INNER.ads",
                "└── TOP",
                "    └── TOP.ads",
            ]
        );
    }
}
