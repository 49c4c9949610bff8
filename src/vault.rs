//! Resolving asset names against an Obsidian vault.
//!
//! Embeds only carry a file name; Obsidian finds the file anywhere in the
//! vault. [`VaultLocator`] indexes a vault once and [`stage_assets`] copies
//! the files a converted note includes next to the `.tex` output.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::convert::ConvertResult;
use crate::error::{Error, Result};
use crate::parser::ErrorMode;

/// Finds the file behind an asset name.
pub trait AssetLocator {
    /// Return the path of the file called `name`, if any.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Locator over a vault directory tree.
///
/// Dot-directories (`.obsidian`, `.trash`, `.git`) are skipped. When two
/// files share a name, the first one found in sorted path order wins.
#[derive(Debug, Clone, Default)]
pub struct VaultLocator {
    root: PathBuf,
    index: HashMap<String, PathBuf>,
}

impl VaultLocator {
    /// Index every file below `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::Other(format!(
                "vault is not a directory: {}",
                root.display()
            )));
        }

        let mut index = HashMap::new();
        index_dir(&root, &mut index)?;
        log::debug!("Indexed {} files in {}", index.len(), root.display());
        Ok(Self { root, index })
    }

    /// Vault root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the vault has no files.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl AssetLocator for VaultLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.index.get(name).cloned()
    }
}

/// Plain directory locator that only looks at `dir/name`.
impl AssetLocator for Path {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let path = self.join(name);
        path.is_file().then_some(path)
    }
}

fn index_dir(dir: &Path, index: &mut HashMap<String, PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_dir() {
            if !name.starts_with('.') {
                index_dir(&path, index)?;
            }
        } else {
            index.entry(name.to_string()).or_insert(path);
        }
    }
    Ok(())
}

/// Outcome of [`stage_assets`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StagedAssets {
    /// Destination paths of the copied files
    pub copied: Vec<PathBuf>,

    /// Names no file was found for
    pub missing: Vec<String>,
}

impl StagedAssets {
    /// Check if every asset was found.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Copy the files `result` includes into `dest`.
///
/// Drawings are staged by their rendered file; exporting the scene is left to
/// the drawing tool. A missing file is an error in strict mode and is
/// reported in [`StagedAssets::missing`] otherwise.
pub fn stage_assets<L: AssetLocator + ?Sized>(
    locator: &L,
    result: &ConvertResult,
    dest: &Path,
    mode: ErrorMode,
) -> Result<StagedAssets> {
    let mut staged = StagedAssets::default();
    if !result.has_assets() {
        return Ok(staged);
    }
    fs::create_dir_all(dest)?;

    for name in result.included_files() {
        match locator.locate(name) {
            Some(source) => {
                let target = dest.join(name);
                if source != target {
                    fs::copy(&source, &target)?;
                }
                staged.copied.push(target);
            }
            None if mode == ErrorMode::Strict => {
                return Err(Error::AssetNotFound(name.to_string()));
            }
            None => {
                log::warn!("Asset not found in vault: {}", name);
                staged.missing.push(name.to_string());
            }
        }
    }

    Ok(staged)
}
