//! Mounting helpers.
//!
//! Thin wrappers around `fuser::mount2` / `fuser::spawn_mount2` that fix
//! the option set every AdaFS mount uses: the filesystem is always
//! mounted read-only, the kernel-side write denial backing up the
//! gateway's own unconditional refusal.

use std::io;
use std::path::Path;
use std::sync::Arc;

use fuser::{BackgroundSession, MountOption};
use thiserror::Error;
use tracing::info;

use super::AdaFs;
use crate::gateway::TreeGateway;
use crate::tree::VirtualTree;

/// Errors raised while attaching the tree to a mountpoint.
#[derive(Debug, Error)]
pub enum MountError {
    /// The FUSE session could not be established.
    #[error("mount failed: {0}")]
    Io(#[from] io::Error),
}

/// The option set for an AdaFS mount.
pub fn mount_options(allow_other: bool, auto_unmount: bool) -> Vec<MountOption> {
    let mut options = vec![MountOption::RO, MountOption::FSName("adafs".to_string())];
    if auto_unmount {
        options.push(MountOption::AutoUnmount);
    }
    if allow_other {
        options.push(MountOption::AllowOther);
    }
    options
}

/// Mount and block until the filesystem is unmounted.
pub fn mount_foreground(
    tree: Arc<VirtualTree>,
    mountpoint: &Path,
    options: &[MountOption],
) -> Result<(), MountError> {
    info!(mountpoint = %mountpoint.display(), "mounting (foreground)");
    let filesystem = AdaFs::new(TreeGateway::new(tree));
    fuser::mount2(filesystem, mountpoint, options)?;
    Ok(())
}

/// Mount in the background.
///
/// The returned session unmounts when dropped, so the caller decides
/// the lifetime (typically: hold it until a shutdown signal arrives).
pub fn spawn_mount(
    tree: Arc<VirtualTree>,
    mountpoint: &Path,
    options: &[MountOption],
) -> Result<BackgroundSession, MountError> {
    info!(mountpoint = %mountpoint.display(), "mounting (background)");
    let filesystem = AdaFs::new(TreeGateway::new(tree));
    let session = fuser::spawn_mount2(filesystem, mountpoint, options)?;
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_options_always_read_only() {
        for allow_other in [false, true] {
            for auto_unmount in [false, true] {
                let options = mount_options(allow_other, auto_unmount);
                assert!(options.contains(&MountOption::RO));
                assert_eq!(options.contains(&MountOption::AllowOther), allow_other);
                assert_eq!(options.contains(&MountOption::AutoUnmount), auto_unmount);
            }
        }
    }
}
