//! Integration tests for the virtual package tree.
//!
//! These tests drive the whole engine the way a mounting adapter would:
//! build a tree over a real temporary source directory, then go through
//! the gateway for every query. Covered end to end:
//! - crunched name decoding into the displayed hierarchy
//! - pass-through regions merged with decoded packages
//! - case-insensitive resolution
//! - byte-for-byte read passthrough
//! - first-writer-wins collision behavior
//! - unconditional mutation denial
//!
//! Run with: `cargo test --test virtual_tree_integration`

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use adafs::gateway::{Attributes, GatewayError, MutationVerb, TreeGateway};
use adafs::tree::VirtualTree;

// ============================================================================
// Helper Functions
// ============================================================================

fn gateway_over(src: &TempDir) -> TreeGateway {
    let tree = VirtualTree::build(src.path()).expect("build succeeds");
    TreeGateway::new(Arc::new(tree))
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

// ============================================================================
// Decoding scenarios
// ============================================================================

/// Source root with `a-111.ads` and `a-111.adb`: the root lists `A`,
/// `A` holds both halves, and both read back their source bytes.
#[test]
fn test_single_package_spec_and_body() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("a-111.ads"), b"package A is\nend A;\n").unwrap();
    fs::write(src.path().join("a-111.adb"), b"package body A is\nend A;\n").unwrap();

    let gateway = gateway_over(&src);
    assert_eq!(gateway.list(Path::new("")).unwrap(), vec!["A"]);
    assert_eq!(
        sorted(gateway.list(Path::new("A")).unwrap()),
        vec!["A.adb", "A.ads"]
    );

    let spec = gateway.read(Path::new("A/A.ads"), 0, 1 << 16).unwrap();
    assert_eq!(spec, fs::read(src.path().join("a-111.ads")).unwrap());
    let body = gateway.read(Path::new("A/A.adb"), 0, 1 << 16).unwrap();
    assert_eq!(body, fs::read(src.path().join("a-111.adb")).unwrap());
}

/// `outer_sep_inner-222.ads` synthesizes the whole OUTER/INNER chain.
#[test]
fn test_nested_package_chain() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("outer_sep_inner-222.ads"), b"spec").unwrap();

    let gateway = gateway_over(&src);
    assert_eq!(gateway.list(Path::new("")).unwrap(), vec!["OUTER"]);
    assert_eq!(gateway.list(Path::new("OUTER")).unwrap(), vec!["INNER"]);
    assert_eq!(gateway.list(Path::new("OUTER/INNER")).unwrap(), vec!["INNER.ads"]);
}

/// A real subdirectory is preserved and its contents decoded in place.
#[test]
fn test_pass_through_region() {
    let src = TempDir::new().unwrap();
    fs::create_dir(src.path().join("keep")).unwrap();
    fs::write(src.path().join("keep/x-333.ads"), b"package X is end X;").unwrap();
    fs::write(src.path().join("y-444.ads"), b"package Y is end Y;").unwrap();

    let gateway = gateway_over(&src);
    assert_eq!(gateway.list(Path::new("")).unwrap(), vec!["KEEP", "Y"]);
    assert_eq!(gateway.list(Path::new("KEEP")).unwrap(), vec!["X"]);
    assert_eq!(gateway.list(Path::new("KEEP/X")).unwrap(), vec!["X.ads"]);

    let bytes = gateway.read(Path::new("keep/x/x.ads"), 0, 1 << 16).unwrap();
    assert_eq!(bytes, fs::read(src.path().join("keep/x-333.ads")).unwrap());
}

/// Build artifacts, backups and docs never surface at any depth.
#[test]
fn test_non_package_files_hidden_everywhere() {
    let src = TempDir::new().unwrap();
    fs::create_dir(src.path().join("sub")).unwrap();
    fs::write(src.path().join("a-111.ads"), b"spec").unwrap();
    fs::write(src.path().join("a-111.o"), b"\x7fELF").unwrap();
    fs::write(src.path().join("README.md"), b"docs").unwrap();
    fs::write(src.path().join("sub/b-222.adb"), b"body").unwrap();
    fs::write(src.path().join("sub/b-222.ali"), b"meta").unwrap();
    fs::write(src.path().join("sub/b.adb"), b"no hash").unwrap();

    let gateway = gateway_over(&src);
    assert_eq!(gateway.list(Path::new("")).unwrap(), vec!["A", "SUB"]);
    assert_eq!(gateway.list(Path::new("SUB")).unwrap(), vec!["B"]);
    assert_eq!(gateway.list(Path::new("SUB/B")).unwrap(), vec!["B.adb"]);
}

// ============================================================================
// Resolution
// ============================================================================

/// Any casing of any component reaches the same node.
#[test]
fn test_case_insensitive_resolution() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("outer_sep_inner-222.ads"), b"spec").unwrap();

    let gateway = gateway_over(&src);
    let canonical = gateway.attributes(Path::new("OUTER/INNER/INNER.ads")).unwrap();
    for variant in [
        "outer/inner/inner.ads",
        "Outer/Inner/Inner.ads",
        "OUTER/inner/InNeR.aDs",
    ] {
        assert_eq!(gateway.attributes(Path::new(variant)).unwrap(), canonical);
    }
}

/// Attribute queries distinguish files from directories and report the
/// real file's size.
#[test]
fn test_attributes_shapes() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("a-111.ads"), b"0123456789").unwrap();

    let gateway = gateway_over(&src);
    match gateway.attributes(Path::new("A")).unwrap() {
        Attributes::Directory { entries, .. } => assert_eq!(entries, 1),
        Attributes::File { .. } => panic!("A is a directory"),
    }
    match gateway.attributes(Path::new("A/A.ads")).unwrap() {
        Attributes::File { size, .. } => assert_eq!(size, 10),
        Attributes::Directory { .. } => panic!("A.ads is a file"),
    }
}

/// not-found and kind mismatches surface as distinct outcomes.
#[test]
fn test_error_taxonomy() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("a-111.ads"), b"spec").unwrap();

    let gateway = gateway_over(&src);
    assert!(matches!(
        gateway.attributes(Path::new("missing")).unwrap_err(),
        GatewayError::NotFound(_)
    ));
    assert!(matches!(
        gateway.list(Path::new("A/A.ads")).unwrap_err(),
        GatewayError::NotADirectory(_)
    ));
    assert!(matches!(
        gateway.read(Path::new("A"), 0, 16).unwrap_err(),
        GatewayError::NotAFile(_)
    ));
}

// ============================================================================
// Collisions
// ============================================================================

/// `x-1.ads` then `x-2.ads`: the first enumerated candidate is served,
/// the second is invisible but the build still succeeds.
#[test]
fn test_collision_first_writer_wins_and_is_silent() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("x-1.ads"), b"first wins").unwrap();
    fs::write(src.path().join("x-2.ads"), b"never seen").unwrap();

    let gateway = gateway_over(&src);
    assert_eq!(gateway.list(Path::new("X")).unwrap(), vec!["X.ads"]);

    let bytes = gateway.read(Path::new("X/X.ads"), 0, 1 << 16).unwrap();
    assert_eq!(bytes, b"first wins");

    // The diagnostic channel records the drop without changing results.
    let dropped = gateway.tree().dropped();
    assert_eq!(dropped.len(), 1);
    assert!(dropped[0].source.ends_with("x-2.ads"));
}

// ============================================================================
// Read-only contract
// ============================================================================

/// Every mutating verb is denied for every kind of path, and the source
/// tree is byte-identical afterwards.
#[test]
fn test_mutation_always_denied() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("a-111.ads"), b"package A is end A;").unwrap();

    let gateway = gateway_over(&src);
    let before = fs::read(src.path().join("a-111.ads")).unwrap();

    for verb in [
        MutationVerb::Create,
        MutationVerb::Write,
        MutationVerb::Delete,
        MutationVerb::Rename,
        MutationVerb::Chmod,
        MutationVerb::Truncate,
        MutationVerb::Link,
    ] {
        for path in ["A/A.ads", "A", "ghost.ads"] {
            assert!(matches!(
                gateway.mutate(Path::new(path), verb).unwrap_err(),
                GatewayError::ReadOnly
            ));
        }
    }

    assert_eq!(fs::read(src.path().join("a-111.ads")).unwrap(), before);
}

/// Reads are independent per call: interleaved readers over the same
/// virtual file each get the full, correct bytes.
#[test]
fn test_concurrent_reads_share_nothing() {
    let src = TempDir::new().unwrap();
    let payload: Vec<u8> = (0..=255u8).cycle().take(8192).collect();
    fs::write(src.path().join("big-aa1.ads"), &payload).unwrap();

    let gateway = gateway_over(&src);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let gateway = gateway.clone();
            let expected = payload.clone();
            std::thread::spawn(move || {
                for _ in 0..8 {
                    let bytes = gateway.read(Path::new("BIG/BIG.ads"), 0, 1 << 16).unwrap();
                    assert_eq!(bytes, expected);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
