use crate::locate::default_candidates;
use crate::params::DEFAULT_VIRTUALENV_COMMAND;
use serde::{Deserialize, Serialize};

/// User defaults, read from the platform config directory.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub virtualenv_command: Option<String>,
    pub use_mirrors: Option<bool>,
    pub pip_candidates: Option<Vec<String>>,
}

impl Config {
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load("pipstate", None)
    }

    pub fn virtualenv_command(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.virtualenv_command.clone())
            .unwrap_or_else(|| DEFAULT_VIRTUALENV_COMMAND.to_string())
    }

    pub fn use_mirrors(&self, flag: Option<bool>) -> bool {
        flag.or(self.use_mirrors).unwrap_or(true)
    }

    pub fn pip_candidates(&self) -> Vec<String> {
        match &self.pip_candidates {
            Some(candidates) if !candidates.is_empty() => candidates.clone(),
            _ => default_candidates(),
        }
    }
}
