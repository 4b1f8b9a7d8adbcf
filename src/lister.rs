//! Candidate file discovery.
//!
//! A [`FileLister`] tries a prioritised chain of [`PathSource`]s and uses the
//! first one that is available: `rg --files`, then `git ls-files`, then a
//! manual directory walk. Every source yields paths relative to the root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::debug;

/// Name of the version-control metadata directory skipped by the walk.
const VCS_DIR: &str = ".git";

/// Why a source could not produce a listing. Never shown to the user; the
/// lister falls through to the next source instead.
#[derive(Debug, Error)]
pub enum ListingUnavailable {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Status {
        program: &'static str,
        status: ExitStatus,
    },
}

/// A strategy that lists the files under a root.
pub trait PathSource {
    fn name(&self) -> &str;

    fn list(&self, root: &Path) -> Result<Vec<PathBuf>, ListingUnavailable>;
}

/// External listing tool that prints NUL-separated relative paths.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: &'static str,
    args: &'static [&'static str],
}

impl CommandSource {
    pub fn ripgrep() -> Self {
        CommandSource {
            program: "rg",
            args: &["--files", "-0"],
        }
    }

    pub fn git() -> Self {
        CommandSource {
            program: "git",
            args: &["ls-files", "-z"],
        }
    }
}

impl PathSource for CommandSource {
    fn name(&self) -> &str {
        self.program
    }

    fn list(&self, root: &Path) -> Result<Vec<PathBuf>, ListingUnavailable> {
        let output = Command::new(self.program)
            .args(self.args)
            .current_dir(root)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ListingUnavailable::Spawn {
                program: self.program,
                source,
            })?;
        if !output.status.success() {
            return Err(ListingUnavailable::Status {
                program: self.program,
                status: output.status,
            });
        }
        Ok(split_nul_separated(&output.stdout))
    }
}

/// Recursive filesystem walk; always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkSource;

impl PathSource for WalkSource {
    fn name(&self) -> &str {
        "walk"
    }

    fn list(&self, root: &Path) -> Result<Vec<PathBuf>, ListingUnavailable> {
        let mut files = Vec::new();
        walk_directory(root, Path::new(""), &mut files);
        Ok(files)
    }
}

fn walk_directory(dir: &Path, relative: &Path, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot read directory {}: {}", dir.display(), err);
            return;
        }
    };

    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                debug!("cannot read entry in {}: {}", dir.display(), err);
                continue;
            }
        };
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(err) => {
                debug!("cannot read type of {}: {}", entry.path().display(), err);
                continue;
            }
        };

        let name = entry.file_name();
        let entry_relative = relative.join(&name);
        if file_type.is_dir() {
            if name == VCS_DIR {
                continue;
            }
            walk_directory(&entry.path(), &entry_relative, files);
        } else if file_type.is_symlink() && points_to_directory(&entry.path()) {
            // Directory symlinks are neither followed nor listed.
            continue;
        } else {
            files.push(entry_relative);
        }
    }
}

// A dangling link has no metadata and is listed like a file.
fn points_to_directory(link: &Path) -> bool {
    fs::metadata(link)
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Split NUL-separated tool output into paths, dropping empty entries.
pub fn split_nul_separated(bytes: &[u8]) -> Vec<PathBuf> {
    bytes
        .split(|&b| b == 0)
        .filter(|chunk| !chunk.is_empty())
        .map(path_from_bytes)
        .collect()
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Prioritised chain of path sources; the first available one wins.
pub struct FileLister {
    sources: Vec<Box<dyn PathSource>>,
}

impl FileLister {
    pub fn new(sources: Vec<Box<dyn PathSource>>) -> Self {
        FileLister { sources }
    }

    /// `rg`, then `git`, then the manual walk.
    pub fn standard() -> Self {
        FileLister::new(vec![
            Box::new(CommandSource::ripgrep()),
            Box::new(CommandSource::git()),
            Box::new(WalkSource),
        ])
    }

    /// Sorted, deduplicated relative paths from the first available source.
    /// Returns an empty list if every source is unavailable.
    pub fn list(&self, root: &Path) -> Vec<PathBuf> {
        for source in &self.sources {
            match source.list(root) {
                Ok(mut paths) => {
                    paths.sort();
                    paths.dedup();
                    debug!("listed {} files with {}", paths.len(), source.name());
                    return paths;
                }
                Err(err) => debug!("{} unavailable: {}", source.name(), err),
            }
        }
        Vec::new()
    }
}
