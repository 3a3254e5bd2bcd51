use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Failed to find required executable {0}")]
    MissingExecutable(String),

    #[error("Virtualenv creation failed: {cmd}")]
    VirtualenvCreation {
        cmd: String,
        stdout: String,
        stderr: String,
    },

    #[error("Command failed with exit code {rc}: {cmd}")]
    CommandFailed {
        cmd: String,
        rc: i32,
        stdout: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipError>;

impl PipError {
    /// Failure payload emitted by the binary. Process failures carry the
    /// command that ran and everything it printed.
    pub fn to_payload(&self) -> Value {
        match self {
            PipError::VirtualenvCreation {
                cmd,
                stdout,
                stderr,
            } => json!({
                "failed": true,
                "msg": process_message(stdout, stderr),
                "cmd": cmd,
                "stdout": stdout,
                "stderr": stderr,
            }),
            PipError::CommandFailed {
                cmd,
                rc,
                stdout,
                stderr,
            } => json!({
                "failed": true,
                "msg": process_message(stdout, stderr),
                "cmd": cmd,
                "rc": rc,
                "stdout": stdout,
                "stderr": stderr,
            }),
            PipError::InvalidParameters(msg) => json!({
                "failed": true,
                "msg": msg,
            }),
            other => json!({
                "failed": true,
                "msg": other.to_string(),
            }),
        }
    }

    pub fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            PipError::InvalidParameters(_) => exitcode::USAGE,
            PipError::MissingExecutable(_) => exitcode::UNAVAILABLE,
            PipError::VirtualenvCreation { .. } | PipError::CommandFailed { .. } => {
                exitcode::SOFTWARE
            }
            PipError::Io(_) => exitcode::IOERR,
        }
    }
}

fn process_message(stdout: &str, stderr: &str) -> String {
    format!("stdout: {}\n\nstderr: {}", stdout, stderr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_payload() {
        let err = PipError::CommandFailed {
            cmd: "/usr/bin/pip install flask".to_string(),
            rc: 2,
            stdout: "Downloading flask".to_string(),
            stderr: "boom".to_string(),
        };

        let payload = err.to_payload();
        assert_eq!(payload["failed"], true);
        assert_eq!(payload["cmd"], "/usr/bin/pip install flask");
        assert_eq!(payload["rc"], 2);
        assert_eq!(payload["msg"], "stdout: Downloading flask\n\nstderr: boom");
        assert_eq!(err.exit_code(), exitcode::SOFTWARE);
    }

    #[test]
    fn test_missing_executable_names_binary() {
        let err = PipError::MissingExecutable("pip".to_string());
        assert_eq!(err.to_string(), "Failed to find required executable pip");
        assert_eq!(
            err.to_payload()["msg"],
            "Failed to find required executable pip"
        );
        assert_eq!(err.exit_code(), exitcode::UNAVAILABLE);
    }

    #[test]
    fn test_invalid_parameters_payload_has_bare_message() {
        let err = PipError::InvalidParameters("version is incompatible with state=latest".into());
        let payload = err.to_payload();
        assert_eq!(payload["msg"], "version is incompatible with state=latest");
        assert!(payload.get("cmd").is_none());
        assert_eq!(err.exit_code(), exitcode::USAGE);
    }
}
