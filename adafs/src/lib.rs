//! AdaFS - a read-only package view over GNAT-crunched Ada sources.
//!
//! GNAT build trees flatten hierarchical package names into "crunched"
//! filenames such as `ada_sep_strings-9f3a21.ads`. This library decodes
//! those names, merges them with any real subdirectories found in the
//! source tree, and serves the result as a browsable, case-insensitive
//! virtual hierarchy (`ADA/STRINGS/STRINGS.ads`) over FUSE.
//!
//! The pieces, leaf first:
//!
//! - [`naming`] - decodes a crunched filename into package segments,
//!   a spec/body kind and the disambiguating hash token.
//! - [`tree`] - builds the immutable [`tree::VirtualTree`] in a single
//!   startup pass and resolves case-folded lookups against it.
//! - [`gateway`] - the read-only operation contract
//!   (attributes/list/read, mutation always denied).
//! - [`fuse`] - the `fuser` adapter translating kernel requests into
//!   gateway calls.
//! - [`config`] / [`logging`] - ini configuration and tracing setup
//!   shared with the CLI.

pub mod config;
pub mod fuse;
pub mod gateway;
pub mod logging;
pub mod naming;
pub mod tree;

pub use gateway::{Attributes, GatewayError, MutationVerb, TreeGateway};
pub use naming::{decode_file_name, DecodedName, SourceKind};
pub use tree::{BuildError, DroppedCandidate, Node, NodeId, VirtualTree};

/// Crate version, surfaced in the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
