//! CLI error type.

use std::fmt;

use adafs::config::ConfigError;
use adafs::fuse::MountError;
use adafs::tree::BuildError;

/// Errors surfaced to the terminal.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or made sense of.
    Config(ConfigError),

    /// The virtual tree could not be built from the source root.
    Build(BuildError),

    /// Mounting failed.
    Mount(MountError),

    /// Anything else worth aborting over.
    Setup(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "configuration error: {}", e),
            CliError::Build(e) => write!(f, "failed to build virtual tree: {}", e),
            CliError::Mount(e) => write!(f, "failed to mount: {}", e),
            CliError::Setup(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Build(e) => Some(e),
            CliError::Mount(e) => Some(e),
            CliError::Setup(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<BuildError> for CliError {
    fn from(e: BuildError) -> Self {
        CliError::Build(e)
    }
}

impl From<MountError> for CliError {
    fn from(e: MountError) -> Self {
        CliError::Mount(e)
    }
}
