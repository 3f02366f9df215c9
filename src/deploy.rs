//! Deploying rendered preference sets to destination files
//!
//! Every write goes to a temporary file in the destination's directory which
//! is flushed, synced and then renamed over the destination. An interrupted
//! or failed write leaves the previous file (or its absence) untouched.

use crate::error::{Error, Result};
use crate::merge::plan_merge;
use crate::render::{check_renderable, render, RenderOptions};
use crate::set::PreferenceSet;
use crate::types::Policy;
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// What a deployment did to one destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DeployOutcome {
    /// The destination now holds exactly the rendered set
    Written { entries: usize },
    /// Missing entries were appended to the existing destination
    Merged { appended: usize, kept: usize },
    /// The destination already had the desired content and was not rewritten
    Unchanged,
}

/// Per-destination result of a multi-destination deployment
#[derive(Debug)]
pub struct DestinationReport {
    pub path: PathBuf,
    pub result: Result<DeployOutcome>,
}

impl DestinationReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Writes preference sets to destination files
///
/// # Example
///
/// ```rust,no_run
/// use ffskel::{Deployer, Policy, PreferenceSet};
/// use std::path::{Path, PathBuf};
///
/// let set = PreferenceSet::load(Path::new("user.js"))?;
/// let deployer = Deployer {
///     policy: Policy::Merge,
///     create_dirs: true,
///     ..Deployer::default()
/// };
/// let reports = deployer.deploy_all(
///     &set,
///     &[PathBuf::from("/etc/skel/.mozilla/firefox/default/user.js")],
/// );
/// for report in &reports {
///     println!("{}: {:?}", report.path.display(), report.result);
/// }
/// # Ok::<(), ffskel::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Deployer {
    pub policy: Policy,
    /// Create missing parent directories instead of failing
    pub create_dirs: bool,
    pub render: RenderOptions,
}

impl Deployer {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Deploy `set` to a single destination file
    ///
    /// Every value is checked before the destination or its parent is
    /// touched, whatever the policy.
    pub fn deploy(&self, set: &PreferenceSet, dest: &Path) -> Result<DeployOutcome> {
        check_renderable(set.entries())?;
        self.prepare_parent(dest)?;
        let existing = read_existing(dest)?;

        let (content, outcome) = match (self.policy, existing) {
            (Policy::Merge, Some(existing)) => {
                let plan = plan_merge(&existing, set, &self.render)?;
                if plan.is_noop() {
                    return Ok(DeployOutcome::Unchanged);
                }
                let outcome = DeployOutcome::Merged {
                    appended: plan.appended,
                    kept: plan.kept,
                };
                (plan.content, outcome)
            }
            (_, existing) => {
                let rendered = render(set, &self.render)?;
                if existing.as_deref() == Some(rendered.as_str()) {
                    return Ok(DeployOutcome::Unchanged);
                }
                (rendered, DeployOutcome::Written { entries: set.len() })
            }
        };

        write_atomic(dest, |w| w.write_all(content.as_bytes()))?;
        Ok(outcome)
    }

    /// Deploy `set` to every destination; a failure only affects its own report
    pub fn deploy_all(&self, set: &PreferenceSet, dests: &[PathBuf]) -> Vec<DestinationReport> {
        dests
            .iter()
            .map(|dest| {
                let result = self.deploy(set, dest);
                match &result {
                    Ok(outcome) => {
                        tracing::info!(
                            path = %dest.display(),
                            policy = %self.policy,
                            ?outcome,
                            "Deployed preferences"
                        )
                    }
                    Err(e) => {
                        tracing::warn!(path = %dest.display(), error = %e, "Deployment failed")
                    }
                }
                DestinationReport {
                    path: dest.clone(),
                    result,
                }
            })
            .collect()
    }

    fn prepare_parent(&self, dest: &Path) -> Result<()> {
        let parent = parent_dir(dest);
        if !parent.exists() {
            if !self.create_dirs {
                return Err(Error::DestinationUnwritable {
                    path: dest.to_path_buf(),
                    reason: format!("parent directory {} does not exist", parent.display()),
                });
            }
            fs::create_dir_all(parent).map_err(|e| Error::unwritable(dest, &e))?;
            tracing::debug!(dir = %parent.display(), "Created destination directory");
        }
        if !parent.is_dir() {
            return Err(Error::DestinationUnwritable {
                path: dest.to_path_buf(),
                reason: format!("{} is not a directory", parent.display()),
            });
        }
        Ok(())
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn read_existing(dest: &Path) -> Result<Option<String>> {
    match fs::read_to_string(dest) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::unwritable(dest, &e)),
    }
}

/// Write a file through a temp file in the same directory and rename it into place
///
/// `write` receives a buffered writer over the temp file. If it fails, or
/// flushing, syncing or renaming fails, the temp file is removed and the
/// destination keeps its previous content.
///
/// A destination that is a symlink is followed: the link stays and its
/// target is replaced. A dangling link is replaced by a regular file.
///
/// ```rust
/// use std::io::Write;
///
/// let dir = tempfile::TempDir::new().unwrap();
/// let path = dir.path().join("user.js");
/// ffskel::write_atomic(&path, |w| w.write_all(b"user_pref(\"a\", 1);\n"))?;
/// assert_eq!(std::fs::read_to_string(&path)?, "user_pref(\"a\", 1);\n");
/// # Ok::<(), ffskel::Error>(())
/// ```
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let resolved = follow_symlink(path);
    let path = resolved.as_path();
    let partial = |source: io::Error| Error::PartialWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = parent_dir(path);
    let temp = NamedTempFile::new_in(parent).map_err(|e| Error::unwritable(path, &e))?;
    tracing::debug!(temp = %temp.path().display(), dest = %path.display(), "Writing temp file");

    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer).map_err(partial)?;
        writer.flush().map_err(partial)?;
    }
    temp.as_file().sync_all().map_err(partial)?;

    if let Some(permissions) = target_permissions(path) {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(partial)?;
    }

    temp.persist(path).map_err(|e| partial(e.error))?;
    tracing::debug!(dest = %path.display(), "Renamed temp file into place");
    Ok(())
}

fn follow_symlink(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Keep the mode of an existing destination; new files are world-readable
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    if let Ok(meta) = fs::metadata(path) {
        return Some(meta.permissions());
    }
    default_permissions()
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
