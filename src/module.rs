use crate::command::PipCommand;
use crate::locate::{BinaryLocator, SystemLocator, default_candidates, resolve_pip};
use crate::outcome::{self, Outcome};
use crate::params::{PackageState, PackageTarget, PipParams, ValidatedParams};
use crate::runner::{CommandRunner, ShellRunner};
use crate::virtualenv::{self, VirtualenvStatus};
use crate::{PipError, Result};
use serde::Serialize;
use std::env;
use std::path::PathBuf;

/// Result payload of a successful (or dry-run) invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub state: PackageState,
    pub requirements: Option<String>,
    pub virtualenv: Option<String>,
    pub stdout: String,
    pub stderr: String,
}

impl PipResult {
    fn echo(params: &ValidatedParams) -> Self {
        let (name, requirements) = match &params.target {
            PackageTarget::Package { name, .. } => (Some(name.clone()), None),
            PackageTarget::Requirements(path) => (None, Some(path.clone())),
        };

        Self {
            changed: false,
            cmd: None,
            name,
            version: params.version.clone(),
            state: params.state,
            requirements,
            virtualenv: params
                .virtualenv
                .as_ref()
                .map(|env| env.to_string_lossy().into_owned()),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Brings one package (or requirements file) into the requested state.
pub struct PipModule<L, R> {
    locator: L,
    runner: R,
    pip_candidates: Vec<String>,
    workdir: PathBuf,
}

impl PipModule<SystemLocator, ShellRunner> {
    pub fn system() -> Self {
        Self::new(SystemLocator, ShellRunner::default())
    }
}

impl<L: BinaryLocator, R: CommandRunner> PipModule<L, R> {
    pub fn new(locator: L, runner: R) -> Self {
        Self {
            locator,
            runner,
            pip_candidates: default_candidates(),
            // keeps a stray setup.py in the caller's directory out of pip's way
            workdir: env::temp_dir(),
        }
    }

    pub fn with_pip_candidates(mut self, candidates: Vec<String>) -> Self {
        if !candidates.is_empty() {
            self.pip_candidates = candidates;
        }
        self
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Run one invocation. In check mode nothing is spawned and the result
    /// reports `changed` as soon as a change would be made.
    pub fn run(&self, params: &PipParams, check_mode: bool) -> Result<PipResult> {
        let validated = params.validate()?;
        let mut result = PipResult::echo(&validated);

        if let Some(env) = &validated.virtualenv {
            let virtualenv_bin = self
                .locator
                .find_required(&validated.virtualenv_command, &[])?;

            match virtualenv::ensure(
                &self.runner,
                &virtualenv_bin,
                env,
                validated.virtualenv_site_packages,
                check_mode,
                &self.workdir,
            )? {
                VirtualenvStatus::Existing => {}
                VirtualenvStatus::WouldCreate => {
                    result.changed = true;
                    return Ok(result);
                }
                VirtualenvStatus::Created(output) => {
                    result.stdout.push_str(&output.stdout);
                    result.stderr.push_str(&output.stderr);
                }
            }
        }

        let pip = resolve_pip(
            &self.locator,
            &self.pip_candidates,
            validated.virtualenv.as_deref(),
        )?;
        let cmd = PipCommand::build(&pip, &validated);

        if check_mode {
            result.changed = true;
            result.cmd = Some(cmd.to_string());
            return Ok(result);
        }

        tracing::info!("Running pip: {}", cmd);
        let output = self.runner.run(cmd.as_str(), &self.workdir)?;
        result.stdout.push_str(&output.stdout);
        result.stderr.push_str(&output.stderr);

        match outcome::classify(validated.state, &output) {
            Outcome::Failed { rc } => Err(PipError::CommandFailed {
                cmd: cmd.to_string(),
                rc,
                stdout: result.stdout,
                stderr: result.stderr,
            }),
            Outcome::Succeeded { changed } => {
                result.changed = changed;
                result.cmd = Some(cmd.to_string());
                Ok(result)
            }
        }
    }
}
