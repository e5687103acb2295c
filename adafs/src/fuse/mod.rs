//! FUSE mounting adapter.
//!
//! Translates kernel filesystem requests into [`TreeGateway`] calls and
//! gateway outcomes back into errno values. The tree is immutable for
//! the whole session, so inode numbers are simply arena indices (offset
//! by one for the FUSE root convention) and no inode table is needed.
//!
//! [`TreeGateway`]: crate::gateway::TreeGateway

mod filesystem;
mod mount;

pub use filesystem::AdaFs;
pub use mount::{mount_foreground, mount_options, spawn_mount, MountError};
