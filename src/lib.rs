pub mod command;
pub mod config;
pub mod error;
pub mod locate;
pub mod module;
pub mod outcome;
pub mod params;
pub mod runner;
pub mod virtualenv;

pub use command::PipCommand;
pub use config::Config;
pub use error::{PipError, Result};
pub use locate::{BinaryLocator, SystemLocator};
pub use module::{PipModule, PipResult};
pub use params::{PackageState, PackageTarget, PipParams};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
