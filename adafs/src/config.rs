//! CLI/application configuration.
//!
//! AdaFS reads an optional ini file from the platform config directory
//! (`~/.config/adafs/config.ini` on Linux):
//!
//! ```ini
//! [mount]
//! allow_other = false
//! auto_unmount = true
//!
//! [logging]
//! filter = adafs=info
//! ```
//!
//! A missing file just means defaults. Command-line flags win over the
//! file; the file wins over the built-in defaults.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

/// Default tracing filter when neither RUST_LOG nor the config file
/// says otherwise.
pub const DEFAULT_LOG_FILTER: &str = "adafs=info";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read or parsed.
    #[error("cannot load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },
}

/// `[mount]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSection {
    /// Pass `allow_other` to the kernel so other users can browse the
    /// mount.
    pub allow_other: bool,
    /// Ask the kernel to clean up the mountpoint when the process dies.
    pub auto_unmount: bool,
}

impl Default for MountSection {
    fn default() -> Self {
        Self {
            allow_other: false,
            auto_unmount: true,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSection {
    /// Tracing env-filter directive string.
    pub filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// The loaded configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub mount: MountSection,
    pub logging: LoggingSection,
}

impl ConfigFile {
    /// Platform path of the config file, if a config directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("adafs").join("config.ini"))
    }

    /// Load from the default location; a missing file yields defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        if let Some(value) = ini.get_from(Some("mount"), "allow_other") {
            if let Some(flag) = parse_bool(value) {
                config.mount.allow_other = flag;
            }
        }
        if let Some(value) = ini.get_from(Some("mount"), "auto_unmount") {
            if let Some(flag) = parse_bool(value) {
                config.mount.auto_unmount = flag;
            }
        }
        if let Some(value) = ini.get_from(Some("logging"), "filter") {
            if !value.trim().is_empty() {
                config.logging.filter = value.trim().to_string();
            }
        }
        Ok(config)
    }
}

/// Derive the default mountpoint for a source tree: the source path
/// with `.fuse` appended (`/src/gnat` mounts at `/src/gnat.fuse`).
pub fn derive_mountpoint(source: &Path) -> PathBuf {
    // Normalize away a trailing separator first so the suffix lands on
    // the directory name.
    let trimmed: PathBuf = source.components().collect();
    let mut os = trimmed.into_os_string();
    os.push(".fuse");
    PathBuf::from(os)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert!(!config.mount.allow_other);
        assert!(config.mount.auto_unmount);
        assert_eq!(config.logging.filter, "adafs=info");
    }

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(
            &path,
            "[mount]\nallow_other = yes\nauto_unmount = off\n\n[logging]\nfilter = adafs=debug\n",
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert!(config.mount.allow_other);
        assert!(!config.mount.auto_unmount);
        assert_eq!(config.logging.filter, "adafs=debug");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[mount]\nallow_other = true\n").unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert!(config.mount.allow_other);
        assert!(config.mount.auto_unmount);
        assert_eq!(config.logging.filter, "adafs=info");
    }

    #[test]
    fn test_load_unparsable_values_fall_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[mount]\nallow_other = maybe\n[logging]\nfilter =\n").unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let err = ConfigFile::load(&dir.path().join("nope.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("no"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("sometimes"), None);
    }

    #[test]
    fn test_derive_mountpoint() {
        assert_eq!(
            derive_mountpoint(Path::new("/src/gnat")),
            PathBuf::from("/src/gnat.fuse")
        );
    }

    #[test]
    fn test_derive_mountpoint_trims_trailing_separator() {
        assert_eq!(
            derive_mountpoint(Path::new("/src/gnat/")),
            PathBuf::from("/src/gnat.fuse")
        );
    }
}
