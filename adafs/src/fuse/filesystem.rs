//! `fuser::Filesystem` implementation over the virtual tree.

use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, SystemTime};

use fuser::{
    FileAttr, FileType, Filesystem, ReplyAttr, ReplyCreate, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, ReplyWrite, Request, TimeOrNow,
};
use tracing::{debug, trace};

use crate::gateway::{GatewayError, TreeGateway};
use crate::tree::{Node, NodeId, VirtualTree};

/// Attribute cache TTL handed to the kernel. The tree never changes
/// within a session, so the kernel may cache generously.
const TTL: Duration = Duration::from_secs(60);

/// Read-only FUSE filesystem serving one [`VirtualTree`].
pub struct AdaFs {
    gateway: TreeGateway,
    /// Timestamp reported for synthesized directories, which have no
    /// real file behind them.
    mounted_at: SystemTime,
}

impl AdaFs {
    /// Wrap a gateway for mounting.
    pub fn new(gateway: TreeGateway) -> Self {
        Self {
            gateway,
            mounted_at: SystemTime::now(),
        }
    }

    fn tree(&self) -> &VirtualTree {
        self.gateway.tree()
    }

    /// FUSE inode 1 is the root; everything else is arena index + 1.
    fn node_for(&self, ino: u64) -> Option<NodeId> {
        let index = usize::try_from(ino.checked_sub(1)?).ok()?;
        NodeId::from_index(self.tree(), index)
    }

    fn ino_for(id: NodeId) -> u64 {
        id.index() as u64 + 1
    }

    fn attr_for(&self, req: &Request<'_>, id: NodeId) -> FileAttr {
        let (kind, perm, nlink, size, mtime) = match self.tree().node(id) {
            Node::Directory(_) => (FileType::Directory, 0o555, 2, 0, self.mounted_at),
            Node::File(file) => (FileType::RegularFile, 0o444, 1, file.size(), file.modified()),
        };
        FileAttr {
            ino: Self::ino_for(id),
            size,
            blocks: size.div_ceil(512),
            atime: mtime,
            mtime,
            ctime: mtime,
            crtime: mtime,
            kind,
            perm,
            nlink,
            uid: req.uid(),
            gid: req.gid(),
            rdev: 0,
            flags: 0,
            blksize: 512,
        }
    }
}

fn errno(err: &GatewayError) -> i32 {
    match err {
        GatewayError::NotFound(_) => libc::ENOENT,
        GatewayError::NotADirectory(_) => libc::ENOTDIR,
        GatewayError::NotAFile(_) => libc::EISDIR,
        GatewayError::ReadOnly => libc::EROFS,
        GatewayError::Io { .. } => libc::EIO,
    }
}

impl Filesystem for AdaFs {
    fn lookup(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let Some(parent_id) = self.node_for(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let Some(name) = name.to_str() else {
            reply.error(libc::ENOENT);
            return;
        };
        match self.tree().child(parent_id, name) {
            Some(child) => {
                let attr = self.attr_for(req, child);
                reply.entry(&TTL, &attr, 0);
            }
            None => {
                trace!(parent, name, "lookup miss");
                reply.error(libc::ENOENT);
            }
        }
    }

    fn getattr(&mut self, req: &Request<'_>, ino: u64, reply: ReplyAttr) {
        match self.node_for(ino) {
            Some(id) => {
                let attr = self.attr_for(req, id);
                reply.attr(&TTL, &attr);
            }
            None => reply.error(libc::ENOENT),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let Some(id) = self.node_for(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        let children: Vec<(u64, FileType, String)> = match self.tree().node(id) {
            Node::Directory(dir) => dir
                .children()
                .map(|(_, child)| {
                    let node = self.tree().node(child);
                    let kind = if node.is_directory() {
                        FileType::Directory
                    } else {
                        FileType::RegularFile
                    };
                    (Self::ino_for(child), kind, node.name().to_string())
                })
                .collect(),
            Node::File(_) => {
                reply.error(libc::ENOTDIR);
                return;
            }
        };

        let mut listing = Vec::with_capacity(children.len() + 2);
        listing.push((ino, FileType::Directory, ".".to_string()));
        listing.push((
            Self::ino_for(VirtualTree::ROOT),
            FileType::Directory,
            "..".to_string(),
        ));
        listing.extend(children);

        let start = offset.max(0) as usize;
        for (index, (ino, kind, name)) in listing.into_iter().enumerate().skip(start) {
            if reply.add(ino, (index + 1) as i64, kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        // Write intent is denied before the inode is even looked at.
        if flags & libc::O_ACCMODE != libc::O_RDONLY {
            reply.error(libc::EROFS);
            return;
        }
        match self.node_for(ino) {
            Some(id) if !self.tree().is_directory(id) => reply.opened(0, 0),
            Some(_) => reply.error(libc::EISDIR),
            None => reply.error(libc::ENOENT),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let Some(id) = self.node_for(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        if offset < 0 {
            reply.error(libc::EINVAL);
            return;
        }
        match self.gateway.read_node(id, offset as u64, size) {
            Ok(bytes) => reply.data(&bytes),
            Err(err) => {
                debug!(ino, error = %err, "read failed");
                reply.error(errno(&err));
            }
        }
    }

    // Mutating verbs. Each one is refused unconditionally, without
    // resolving the path first, so a missing target and a live one are
    // indistinguishable through these.

    fn setattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        _size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        reply.error(libc::EROFS);
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _rdev: u32,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn unlink(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(libc::EROFS);
    }

    fn rmdir(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(libc::EROFS);
    }

    fn symlink(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _link_name: &OsStr,
        _target: &Path,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _newparent: u64,
        _newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        reply.error(libc::EROFS);
    }

    fn link(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _newparent: u64,
        _newname: &OsStr,
        reply: ReplyEntry,
    ) {
        reply.error(libc::EROFS);
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _offset: i64,
        _data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        reply.error(libc::EROFS);
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        reply.error(libc::EROFS);
    }
}
