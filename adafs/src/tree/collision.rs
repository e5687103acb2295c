//! First-writer-wins collision policy.
//!
//! Two source entries can decode to the same virtual path (same package,
//! different hash; or a crunched file shadowing a pass-through region).
//! Under the builder's fixed lexical enumeration the first candidate
//! occupies the path and every later one is silently discarded: it is
//! never listed, never readable, and never fails the build. The drop is
//! recorded here so operators can inspect what was shadowed, but the
//! record changes nothing about resolution.

use std::path::{Path, PathBuf};

use tracing::debug;

/// A candidate discarded because its virtual path was already occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedCandidate {
    /// Canonical virtual path the candidate decoded to, `/`-joined.
    pub virtual_path: String,
    /// Real path of the discarded source entry.
    pub source: PathBuf,
}

/// Apply the policy: keep the existing occupant, record the newcomer.
pub(crate) fn drop_candidate(virtual_path: String, source: &Path) -> DroppedCandidate {
    debug!(
        virtual_path = %virtual_path,
        source = %source.display(),
        "virtual path already occupied, discarding later candidate"
    );
    DroppedCandidate {
        virtual_path,
        source: source.to_path_buf(),
    }
}
