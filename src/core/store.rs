//! Store handle for cluckbook's on-disk state.
//!
//! A store is a directory holding the SQLite records database, the broker
//! audit journal and nothing else. Two locations are recognised.

use std::path::{Path, PathBuf};

/// Where a store lives.
///
/// - `User`: personal store at `~/.cluckbook/data/`
/// - `Project`: directory-scoped store at `<dir>/.cluckbook/data/`, created by `cluckbook init`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    User,
    Project,
    /// Explicit `--data-dir` override.
    Custom,
}

/// Store handle representing one cluckbook data directory.
#[derive(Debug, Clone)]
pub struct Store {
    pub kind: StoreKind,
    /// Absolute path to the store root directory
    pub root: PathBuf,
}

impl Store {
    pub fn new(kind: StoreKind, root: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            root: root.into(),
        }
    }

    /// Directory holding `config.toml` (the parent of the data directory).
    pub fn config_dir(&self) -> &Path {
        self.root.parent().unwrap_or(&self.root)
    }
}
