//! Charm-style command flows using cliclack

use super::logger::ConsoleLogger;
use crate::config::BootstrapConfig;
use crate::deps::VENV_DIR;
use crate::environment::EnvironmentSetupResult;
use crate::hooks::{PreCommitConfigurator, PreCommitSetup};
use crate::manager::ManagerChoice;
use crate::python::PythonVersion;
use crate::runtime::{CommandRunner, SystemRunner};
use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TITLE: &str = "api-bootstrapper";

/// Arguments shared by the bootstrap and init commands
#[derive(Debug, Clone, Default)]
pub struct BootstrapArgs {
    /// Project directory (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Python version; falls back to the configured default
    pub python: Option<String>,

    pub manager: Option<ManagerChoice>,

    /// Install declared dependencies after creating the venv
    pub install: Option<bool>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PreCommitArgs {
    pub path: Option<PathBuf>,

    /// Detected from pyproject.toml when absent
    pub manager: Option<ManagerChoice>,
}

/// Bootstrap the Python environment of a project
pub fn run_bootstrap(args: BootstrapArgs) -> Result<()> {
    cliclack::intro(TITLE)?;

    let project_dir = resolve_directory(args.path.as_deref())?;
    let config = BootstrapConfig::load(&project_dir)?.with_overrides(
        args.python,
        args.manager,
        args.install,
    );

    let runner = system_runner();
    check_tools(config.manager, &runner)?;

    let result = bootstrap_environment(&project_dir, &config, runner)?;
    print_environment(&result);
    print_next_steps(&next_steps(&project_dir, config.manager, false));

    cliclack::outro("Environment ready")?;
    Ok(())
}

/// Add the ruff and commitizen hook pipeline to a project
pub fn run_add_pre_commit(args: PreCommitArgs) -> Result<()> {
    cliclack::intro(format!("{TITLE} add-pre-commit"))?;

    let project_dir = resolve_directory(args.path.as_deref())?;
    if !project_dir.is_dir() {
        anyhow::bail!("Directory does not exist: {}", project_dir.display());
    }

    let setup = configure_hooks(&project_dir, args.manager, system_runner())?;
    report_hooks(&setup)?;

    cliclack::outro("Pre-commit ready")?;
    Ok(())
}

/// Bootstrap the environment, then add the hook pipeline
pub fn run_init(args: BootstrapArgs) -> Result<()> {
    cliclack::intro(format!("{TITLE} init"))?;

    let project_dir = resolve_directory(args.path.as_deref())?;
    let mut config = BootstrapConfig::load(&project_dir)?.with_overrides(
        args.python.clone(),
        args.manager,
        args.install,
    );

    let interactive = !args.yes && console::Term::stdout().is_term();
    if interactive {
        if args.python.is_none() {
            config.python = prompt_python(&config.python)?;
        }
        if args.manager.is_none() {
            config.manager = prompt_manager(config.manager)?;
        }
    }

    let runner = system_runner();
    check_tools(config.manager, &runner)?;

    let result = bootstrap_environment(&project_dir, &config, runner.clone())?;
    print_environment(&result);

    let setup = configure_hooks(&project_dir, Some(config.manager), runner)?;
    report_hooks(&setup)?;

    print_next_steps(&next_steps(&project_dir, config.manager, true));
    cliclack::outro("Happy coding!")?;
    Ok(())
}

fn system_runner() -> Arc<dyn CommandRunner> {
    Arc::new(SystemRunner::new())
}

fn resolve_directory(path: Option<&Path>) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let path = match path {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) if dir == Path::new(".") => current_dir,
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    if let Some(parent) = path.parent() {
        if !parent.exists() && parent != Path::new("") {
            anyhow::bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    Ok(path)
}

fn prompt_python(default: &str) -> Result<String> {
    let input: String = cliclack::input("Python version")
        .placeholder(default)
        .default_input(default)
        .validate(|input: &String| {
            input
                .trim()
                .parse::<PythonVersion>()
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact()?;

    Ok(input.trim().to_string())
}

fn prompt_manager(current: ManagerChoice) -> Result<ManagerChoice> {
    let mut select = cliclack::select("Environment manager");
    for choice in ManagerChoice::ALL {
        select = select.item(choice, choice.label(), choice.as_str());
    }

    Ok(select.initial_value(current).interact()?)
}

fn check_tools(manager: ManagerChoice, runner: &Arc<dyn CommandRunner>) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking tools...");

    let tools = manager.tools(runner.clone());
    let mut detected = Vec::new();
    let mut missing = Vec::new();
    for tool in &tools {
        match tool.get_version() {
            Some(version) => detected.push(format!("{} ({})", tool.config().display_name, version)),
            None => missing.push(tool),
        }
    }

    if missing.is_empty() {
        spinner.stop(format!("Detected tools: {}", detected.join(", ")));
        return Ok(());
    }

    spinner.stop("Missing tools");
    for tool in missing {
        cliclack::log::error(tool.missing().to_string())?;
    }
    anyhow::bail!("Please install the missing tools and try again.");
}

fn bootstrap_environment(
    project_dir: &Path,
    config: &BootstrapConfig,
    runner: Arc<dyn CommandRunner>,
) -> Result<EnvironmentSetupResult> {
    cliclack::log::info(format!(
        "Python {} with {} in {}",
        config.python,
        config.manager.label(),
        project_dir.display()
    ))?;

    let bootstrapper = config.manager.bootstrapper(runner, Box::new(ConsoleLogger));
    match bootstrapper.bootstrap(project_dir, &config.python, config.install) {
        Ok(result) => Ok(result),
        Err(e) => {
            cliclack::log::error(e.to_string())?;
            cliclack::outro_cancel("Bootstrap failed")?;
            Err(e.into())
        }
    }
}

fn configure_hooks(
    project_dir: &Path,
    manager: Option<ManagerChoice>,
    runner: Arc<dyn CommandRunner>,
) -> Result<PreCommitSetup> {
    let configurator = PreCommitConfigurator::new(runner, Box::new(ConsoleLogger));
    match configurator.configure(project_dir, manager) {
        Ok(setup) => Ok(setup),
        Err(e) => {
            cliclack::log::error(e.to_string())?;
            cliclack::outro_cancel("Pre-commit setup failed")?;
            Err(e.into())
        }
    }
}

fn report_hooks(setup: &PreCommitSetup) -> Result<()> {
    let versions: Vec<String> = setup
        .versions
        .iter()
        .map(|(tool, version)| format!("{tool} {version}"))
        .collect();

    let state = if setup.already_existed { "kept" } else { "created" };
    cliclack::log::success(format!("{} {}", state, setup.config_path.display()))?;
    if !versions.is_empty() {
        cliclack::log::info(format!("Hook tools: {}", versions.join(", ")))?;
    }
    Ok(())
}

fn print_environment(result: &EnvironmentSetupResult) {
    let row = |label: &str, value: String| {
        println!("  {} {}", format!("{label:<12}").dimmed(), value);
    };

    println!();
    println!("  {}", "Environment".cyan().bold());
    row("python", result.python_version.clone());
    row("interpreter", result.python_path.display().to_string());
    if let Some(venv) = &result.venv_path {
        row("venv", venv.display().to_string());
    }
    if let Some(python) = &result.venv_python {
        row("venv python", python.display().to_string());
    }
    row("editor", result.editor_config_path.display().to_string());
    println!();
}

fn activation_command() -> String {
    if cfg!(windows) {
        format!("{VENV_DIR}\\Scripts\\activate")
    } else {
        format!("source {VENV_DIR}/bin/activate")
    }
}

fn next_steps(project_dir: &Path, manager: ManagerChoice, with_hooks: bool) -> Vec<String> {
    let mut steps = Vec::new();
    let current = std::env::current_dir().ok();

    if current.as_deref() != Some(project_dir) {
        steps.push(format!("cd {}", project_dir.display()));
    }

    steps.push(activation_command());

    if with_hooks {
        let tool = manager.run_tool();
        if !project_dir.join(".git").exists() {
            steps.push(format!(
                "git init && {tool} run pre-commit install --hook-type pre-commit --hook-type commit-msg"
            ));
        }
        steps.push(format!("{tool} run pre-commit run --all-files"));
    }

    steps
}

fn print_next_steps(steps: &[String]) {
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }
    println!();
}
