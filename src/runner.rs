use crate::Result;
use std::path::Path;
use std::process::Command;

/// Captured result of one child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub rc: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.rc == 0
    }
}

pub trait CommandRunner {
    /// Run a shell command line with `cwd` as its working directory.
    fn run(&self, cmd: &str, cwd: &Path) -> Result<CommandOutput>;
}

/// Runs command lines through `sh -c`.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, cmd: &str, cwd: &Path) -> Result<CommandOutput> {
        tracing::debug!("Running `{}` in {}", cmd, cwd.display());

        // pip's messages are matched as English text
        let output = Command::new(&self.shell)
            .args(["-c", cmd])
            .current_dir(cwd)
            .env("LC_ALL", "C")
            .env("LANG", "C")
            .output()?;

        // killed by a signal
        let rc = output.status.code().unwrap_or(-1);

        Ok(CommandOutput {
            rc,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Quote a single argument for `sh` unless every character is known to be
/// inert to the shell.
pub fn shell_quote(arg: &str) -> String {
    let needs_quoting = arg.is_empty() || !arg.chars().all(is_shell_safe);

    if needs_quoting {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-')
}
