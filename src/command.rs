use crate::params::{PackageTarget, ValidatedParams};
use crate::runner::shell_quote;
use std::fmt;
use std::path::Path;

/// The single pip command line of an invocation. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipCommand {
    line: String,
}

impl PipCommand {
    pub fn build(pip: &Path, params: &ValidatedParams) -> Self {
        let mut line = format!(
            "{} {}",
            shell_quote(&pip.to_string_lossy()),
            params.state.verb()
        );

        // --use-mirrors is meaningless to uninstall
        if params.state.is_install() && params.use_mirrors {
            line.push_str(" --use-mirrors");
        }

        if let Some(extra_args) = &params.extra_args {
            line.push(' ');
            line.push_str(extra_args);
        }

        match &params.target {
            PackageTarget::Package { name, version } => {
                line.push(' ');
                line.push_str(&shell_quote(&PackageTarget::full_name(
                    name,
                    version.as_deref(),
                )));
            }
            PackageTarget::Requirements(path) => {
                line.push_str(" -r ");
                line.push_str(&shell_quote(path));
            }
        }

        Self { line }
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for PipCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}
