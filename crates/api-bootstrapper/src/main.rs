//! API Bootstrapper CLI - Python environment and commit hook setup

use anyhow::Result;
use bootstrapper_core::tui::{BootstrapArgs, PreCommitArgs};
use bootstrapper_core::ManagerChoice;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "api-bootstrapper")]
#[command(about = "Bootstrap Python API projects: interpreter, venv, editor settings and commit hooks")]
#[command(version)]
pub struct Args {
    /// Show every command that is run
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Python environment commands
    #[command(subcommand)]
    Env(EnvCommand),
    /// Commit hook commands
    #[command(subcommand)]
    Hooks(HooksCommand),
    /// Bootstrap the environment, then add pre-commit hooks
    Init(CliInitArgs),
    /// Same as `env bootstrap`
    BootstrapEnv(CliBootstrapArgs),
    /// Same as `hooks add-pre-commit`
    AddPreCommit(CliPreCommitArgs),
}

#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// Pin Python, create the venv and write editor settings
    Bootstrap(CliBootstrapArgs),
}

#[derive(Subcommand, Debug)]
pub enum HooksCommand {
    /// Add ruff and commitizen hooks through pre-commit
    AddPreCommit(CliPreCommitArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CliBootstrapArgs {
    /// Project directory
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Python version to pin (e.g. 3.12.12)
    #[arg(long)]
    pub python: Option<String>,

    /// Environment manager
    #[arg(long, value_enum)]
    pub manager: Option<ManagerChoice>,

    /// Install declared dependencies
    #[arg(long, overrides_with = "no_install")]
    pub install: bool,

    /// Only create the venv, skip dependency installation
    #[arg(long = "no-install")]
    pub no_install: bool,
}

impl CliBootstrapArgs {
    fn install_flag(&self) -> Option<bool> {
        if self.no_install {
            Some(false)
        } else if self.install {
            Some(true)
        } else {
            None
        }
    }
}

impl From<CliBootstrapArgs> for BootstrapArgs {
    fn from(args: CliBootstrapArgs) -> Self {
        BootstrapArgs {
            install: args.install_flag(),
            path: Some(args.path),
            python: args.python,
            manager: args.manager,
            yes: true,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CliInitArgs {
    #[command(flatten)]
    pub bootstrap: CliBootstrapArgs,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliInitArgs> for BootstrapArgs {
    fn from(args: CliInitArgs) -> Self {
        BootstrapArgs {
            yes: args.yes,
            ..args.bootstrap.into()
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct CliPreCommitArgs {
    /// Project directory
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Environment manager (detected from pyproject.toml when omitted)
    #[arg(long, value_enum)]
    pub manager: Option<ManagerChoice>,
}

impl From<CliPreCommitArgs> for PreCommitArgs {
    fn from(args: CliPreCommitArgs) -> Self {
        PreCommitArgs {
            path: Some(args.path),
            manager: args.manager,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Command::Env(EnvCommand::Bootstrap(bootstrap_args))
        | Command::BootstrapEnv(bootstrap_args) => {
            bootstrapper_core::run_bootstrap(bootstrap_args.into())
        }
        Command::Hooks(HooksCommand::AddPreCommit(hook_args))
        | Command::AddPreCommit(hook_args) => bootstrapper_core::run_add_pre_commit(hook_args.into()),
        Command::Init(init_args) => bootstrapper_core::run_init(init_args.into()),
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
