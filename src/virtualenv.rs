use crate::runner::{CommandOutput, CommandRunner, shell_quote};
use crate::{PipError, Result};
use std::path::Path;

/// File whose presence under `<env>/bin` marks an initialized virtualenv.
pub const ACTIVATION_MARKER: &str = "activate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualenvStatus {
    Existing,
    /// Check mode: the environment is missing and would be created.
    WouldCreate,
    Created(CommandOutput),
}

pub fn is_initialized(env: &Path) -> bool {
    env.join("bin").join(ACTIVATION_MARKER).exists()
}

pub fn creation_command(virtualenv: &Path, env: &Path, site_packages: bool) -> String {
    let mut cmd = shell_quote(&virtualenv.to_string_lossy());
    if site_packages {
        cmd.push_str(" --system-site-packages");
    }
    cmd.push(' ');
    cmd.push_str(&shell_quote(&env.to_string_lossy()));
    cmd
}

/// Create the virtualenv at `env` unless it is already initialized.
pub fn ensure(
    runner: &dyn CommandRunner,
    virtualenv: &Path,
    env: &Path,
    site_packages: bool,
    check_mode: bool,
    cwd: &Path,
) -> Result<VirtualenvStatus> {
    if is_initialized(env) {
        tracing::debug!("Virtualenv already initialized: {}", env.display());
        return Ok(VirtualenvStatus::Existing);
    }

    if check_mode {
        return Ok(VirtualenvStatus::WouldCreate);
    }

    let cmd = creation_command(virtualenv, env, site_packages);
    tracing::info!("Creating virtualenv: {}", cmd);

    let output = runner.run(&cmd, cwd)?;
    if !output.success() {
        return Err(PipError::VirtualenvCreation {
            cmd,
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }

    Ok(VirtualenvStatus::Created(output))
}
