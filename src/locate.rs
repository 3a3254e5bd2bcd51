use crate::{PipError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Names pip is installed under. Debian and Ubuntu ship `pip`, newer Fedora
/// ships `python-pip`, older Fedora and RHEL/CentOS ship `pip-python`. Inside
/// a virtualenv it is always `pip`.
pub const PIP_CANDIDATES: &[&str] = &["pip", "python-pip", "pip-python"];

const SBIN_DIRS: &[&str] = &["/sbin", "/usr/sbin", "/usr/local/sbin"];

pub trait BinaryLocator {
    /// Look up `name`, trying `opt_dirs` before the default search path.
    fn find(&self, name: &str, opt_dirs: &[PathBuf]) -> Option<PathBuf>;

    fn find_required(&self, name: &str, opt_dirs: &[PathBuf]) -> Result<PathBuf> {
        self.find(name, opt_dirs)
            .ok_or_else(|| PipError::MissingExecutable(name.to_string()))
    }
}

/// Searches the optional directories, then `PATH`, then the sbin directories.
#[derive(Debug, Default, Clone)]
pub struct SystemLocator;

impl SystemLocator {
    fn search_dirs(opt_dirs: &[PathBuf]) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = opt_dirs.iter().filter(|d| d.is_dir()).cloned().collect();

        if let Some(path) = env::var_os("PATH") {
            dirs.extend(env::split_paths(&path));
        }

        for sbin in SBIN_DIRS {
            let sbin = PathBuf::from(sbin);
            if !dirs.contains(&sbin) {
                dirs.push(sbin);
            }
        }

        dirs
    }
}

impl BinaryLocator for SystemLocator {
    fn find(&self, name: &str, opt_dirs: &[PathBuf]) -> Option<PathBuf> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));

        if name.contains(std::path::MAIN_SEPARATOR) {
            return which::which_in(name, None::<&str>, &cwd).ok();
        }

        for dir in Self::search_dirs(opt_dirs) {
            match which::which_in(name, Some(dir.as_os_str()), &cwd) {
                Ok(found) => {
                    tracing::debug!("Found {} at {}", name, found.display());
                    return Some(found);
                }
                Err(_) => continue,
            }
        }

        tracing::debug!("{} not found", name);
        None
    }
}

/// Resolve the pip executable, scoped to `<virtualenv>/bin` when given.
///
/// Each candidate name is tried in order. When none is found a final required
/// lookup for the first candidate produces the error naming it.
pub fn resolve_pip(
    locator: &dyn BinaryLocator,
    candidates: &[String],
    virtualenv: Option<&Path>,
) -> Result<PathBuf> {
    let opt_dirs: Vec<PathBuf> = virtualenv.map(|env| env.join("bin")).into_iter().collect();

    for candidate in candidates {
        if let Some(pip) = locator.find(candidate, &opt_dirs) {
            return Ok(pip);
        }
    }

    let primary = candidates.first().map(String::as_str).unwrap_or("pip");
    locator.find_required(primary, &opt_dirs)
}

pub fn default_candidates() -> Vec<String> {
    PIP_CANDIDATES.iter().map(|c| c.to_string()).collect()
}
