//! Mount command - serve the virtual package tree over FUSE.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use adafs::config::{derive_mountpoint, ConfigFile};
use adafs::fuse::{mount_foreground, mount_options, spawn_mount};
use adafs::tree::VirtualTree;
use tracing::info;

use crate::error::CliError;

/// Arguments for the mount command.
pub struct MountArgs {
    pub source: PathBuf,
    pub mountpoint: Option<PathBuf>,
    pub foreground: bool,
    pub allow_other: bool,
    pub config: Option<PathBuf>,
}

/// Run the mount command.
pub fn run(args: MountArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };
    adafs::logging::init(&config.logging.filter);

    // Mountpoint: CLI > derived from the source path.
    let mountpoint = args
        .mountpoint
        .unwrap_or_else(|| derive_mountpoint(&args.source));
    std::fs::create_dir_all(&mountpoint).map_err(|e| {
        CliError::Setup(format!(
            "cannot create mountpoint {}: {}",
            mountpoint.display(),
            e
        ))
    })?;

    // The tree is built exactly once; everything after this line is
    // read-only queries against it.
    let started = Instant::now();
    let tree = Arc::new(VirtualTree::build(&args.source)?);
    info!(
        nodes = tree.node_count(),
        dropped = tree.dropped().len(),
        elapsed = ?started.elapsed(),
        "virtual tree ready"
    );

    println!("AdaFS v{}", adafs::VERSION);
    println!("==========");
    println!();
    println!("Source:     {}", args.source.display());
    println!("Mountpoint: {}", mountpoint.display());
    println!(
        "Tree:       {} nodes in {:.0?}",
        tree.node_count(),
        started.elapsed()
    );
    if !tree.dropped().is_empty() {
        println!(
            "Shadowed:   {} crunched file(s) lost a name collision (RUST_LOG=adafs=debug for the list)",
            tree.dropped().len()
        );
    }
    println!();

    let allow_other = args.allow_other || config.mount.allow_other;
    let options = mount_options(allow_other, config.mount.auto_unmount);

    if args.foreground {
        println!("Serving in the foreground; unmount with fusermount -u.");
        mount_foreground(tree, &mountpoint, &options)?;
        println!("Filesystem unmounted.");
        return Ok(());
    }

    // Background session plus a Ctrl+C wait loop; dropping the session
    // unmounts.
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, unmounting...");
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Setup(format!("failed to set signal handler: {}", e)))?;

    let session = spawn_mount(tree, &mountpoint, &options)?;
    println!("Press Ctrl+C to unmount and exit");

    while !shutdown.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    drop(session);
    println!("Filesystem unmounted.");
    Ok(())
}
