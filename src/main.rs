use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, ArgGroup, Parser};
use pipstate::{Config, PackageState, PipModule, PipParams};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pipstate")]
#[command(about = "Ensure a Python package is present, absent or at the latest version")]
#[command(group(ArgGroup::new("target").required(true).args(["name", "requirements"])))]
struct Cli {
    /// Package name (without a version specifier)
    #[arg(long)]
    name: Option<String>,
    /// Exact version to install
    #[arg(long)]
    version: Option<String>,
    /// Path to a pip requirements file
    #[arg(long)]
    requirements: Option<String>,
    /// Virtualenv to install into, created if missing
    #[arg(long)]
    virtualenv: Option<String>,
    /// Give a newly created virtualenv access to the system site-packages
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true",
          default_value = "false", action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    virtualenv_site_packages: bool,
    /// Command used to create the virtualenv [default: virtualenv]
    #[arg(long)]
    virtualenv_command: Option<String>,
    /// Pass --use-mirrors to pip when installing [default: yes]
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true",
          value_parser = BoolishValueParser::new())]
    use_mirrors: Option<bool>,
    /// Desired package state
    #[arg(long, default_value = "present")]
    state: PackageState,
    /// Extra arguments passed to pip verbatim
    #[arg(long, allow_hyphen_values = true)]
    extra_args: Option<String>,
    /// Report what would change without running anything
    #[arg(long)]
    check: bool,
    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
    /// Ignore the user configuration file
    #[arg(long)]
    no_config: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("PIPSTATE_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(no_config: bool) -> anyhow::Result<Config> {
    if no_config {
        return Ok(Config::default());
    }
    Config::load().context("Failed to load pipstate configuration")
}

fn emit(payload: &serde_json::Value) -> anyhow::Result<()> {
    let rendered = serde_json::to_string(payload).context("Failed to render result")?;
    println!("{}", rendered);
    Ok(())
}

fn run(cli: Cli) -> i32 {
    let config = match load_config(cli.no_config) {
        Ok(config) => config,
        Err(e) => {
            let _ = emit(&json!({ "failed": true, "msg": format!("{:#}", e) }));
            return exitcode::CONFIG;
        }
    };

    let params = PipParams {
        state: cli.state,
        name: cli.name,
        version: cli.version,
        requirements: cli.requirements,
        virtualenv: cli.virtualenv,
        virtualenv_command: config.virtualenv_command(cli.virtualenv_command),
        virtualenv_site_packages: cli.virtualenv_site_packages,
        use_mirrors: config.use_mirrors(cli.use_mirrors),
        extra_args: cli.extra_args,
    };

    let module = PipModule::system().with_pip_candidates(config.pip_candidates());

    let (payload, code) = match module.run(&params, cli.check) {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(payload) => (payload, exitcode::OK),
            Err(e) => (
                json!({ "failed": true, "msg": format!("Failed to render result: {}", e) }),
                exitcode::SOFTWARE,
            ),
        },
        Err(e) => {
            tracing::error!("{}", e);
            (e.to_payload(), e.exit_code())
        }
    };

    if let Err(e) = emit(&payload) {
        eprintln!("Error: {:#}", e);
        return exitcode::IOERR;
    }
    code
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    std::process::exit(run(cli));
}
