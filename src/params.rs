use crate::{PipError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_VIRTUALENV_COMMAND: &str = "virtualenv";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageState {
    #[default]
    Present,
    Absent,
    Latest,
}

impl PackageState {
    /// pip verb for this state
    pub fn verb(&self) -> &'static str {
        match self {
            PackageState::Present => "install",
            PackageState::Absent => "uninstall -y",
            PackageState::Latest => "install -U",
        }
    }

    pub fn is_install(&self) -> bool {
        !matches!(self, PackageState::Absent)
    }
}

impl FromStr for PackageState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(PackageState::Present),
            "absent" => Ok(PackageState::Absent),
            "latest" => Ok(PackageState::Latest),
            _ => Err(format!(
                "Unknown state: {} (expected present, absent or latest)",
                s
            )),
        }
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PackageState::Present => "present",
            PackageState::Absent => "absent",
            PackageState::Latest => "latest",
        };
        f.write_str(s)
    }
}

/// Parameters of one invocation, as supplied by the harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipParams {
    pub state: PackageState,
    pub name: Option<String>,
    pub version: Option<String>,
    pub requirements: Option<String>,
    pub virtualenv: Option<String>,
    pub virtualenv_command: String,
    pub virtualenv_site_packages: bool,
    pub use_mirrors: bool,
    pub extra_args: Option<String>,
}

impl Default for PipParams {
    fn default() -> Self {
        Self {
            state: PackageState::Present,
            name: None,
            version: None,
            requirements: None,
            virtualenv: None,
            virtualenv_command: DEFAULT_VIRTUALENV_COMMAND.to_string(),
            virtualenv_site_packages: false,
            use_mirrors: true,
            extra_args: None,
        }
    }
}

/// What pip is asked to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageTarget {
    Package {
        name: String,
        version: Option<String>,
    },
    Requirements(String),
}

impl PackageTarget {
    /// `name` or `name==version`
    pub fn full_name(name: &str, version: Option<&str>) -> String {
        match version {
            Some(version) => format!("{}=={}", name, version),
            None => name.to_string(),
        }
    }
}

/// Parameters after validation. Empty strings have been folded to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedParams {
    pub state: PackageState,
    pub target: PackageTarget,
    /// Version as supplied, kept for the result even when a requirements
    /// file is the target and pip never sees it.
    pub version: Option<String>,
    pub virtualenv: Option<PathBuf>,
    pub virtualenv_command: String,
    pub virtualenv_site_packages: bool,
    pub use_mirrors: bool,
    pub extra_args: Option<String>,
}

impl PipParams {
    pub fn validate(&self) -> Result<ValidatedParams> {
        let name = non_empty(&self.name);
        let version = non_empty(&self.version);
        let requirements = non_empty(&self.requirements);

        if self.state == PackageState::Latest && version.is_some() {
            return Err(PipError::InvalidParameters(
                "version is incompatible with state=latest".to_string(),
            ));
        }

        let target = match (name, requirements) {
            (Some(_), Some(_)) => {
                return Err(PipError::InvalidParameters(
                    "parameters are mutually exclusive: name|requirements".to_string(),
                ));
            }
            (None, None) => {
                return Err(PipError::InvalidParameters(
                    "one of the following is required: name, requirements".to_string(),
                ));
            }
            (Some(name), None) => {
                if name.contains('=') {
                    return Err(PipError::InvalidParameters(format!(
                        "versions must be given with the version parameter, not in name: {}",
                        name
                    )));
                }
                PackageTarget::Package {
                    name: name.to_string(),
                    version: version.map(str::to_string),
                }
            }
            (None, Some(requirements)) => PackageTarget::Requirements(requirements.to_string()),
        };

        let virtualenv_command = match self.virtualenv_command.trim() {
            "" => DEFAULT_VIRTUALENV_COMMAND.to_string(),
            command => command.to_string(),
        };

        Ok(ValidatedParams {
            state: self.state,
            target,
            version: version.map(str::to_string),
            virtualenv: non_empty(&self.virtualenv).map(expand_tilde),
            virtualenv_command,
            virtualenv_site_packages: self.virtualenv_site_packages,
            use_mirrors: self.use_mirrors,
            extra_args: non_empty(&self.extra_args).map(str::to_string),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
