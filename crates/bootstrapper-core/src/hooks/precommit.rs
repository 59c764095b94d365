//! Pre-commit pipeline setup: config template, dev dependencies, pinned hook revisions

use crate::error::{BootstrapError, Result};
use crate::logger::Logger;
use crate::manager::ManagerChoice;
use crate::project::files::{read_text, write_text};
use crate::project::manifest::{manifest_path, MANIFEST_FILE};
use crate::runtime::command::{CommandRunner, CommandSpec};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const PRE_COMMIT_CONFIG: &str = ".pre-commit-config.yaml";

const CONFIG_TEMPLATE: &str = r#"repos:
  - repo: https://github.com/astral-sh/ruff-pre-commit
    rev: ""
    hooks:
      - id: ruff
        args: [--fix, --exit-non-zero-on-fix]
      - id: ruff-format
  - repo: https://github.com/commitizen-tools/commitizen
    rev: ""
    hooks:
      - id: commitizen
        stages: [commit-msg]
"#;

const POETRY_DEV_TABLE: &str = "[tool.poetry.group.dev.dependencies]";
const DEPENDENCY_GROUPS_TABLE: &str = "[dependency-groups]";

/// A hook tool and how each manifest dialect spells its requirement
struct DevTool {
    name: &'static str,
    poetry: &'static str,
    pep508: &'static str,
    /// Repository whose `rev` follows this tool's version
    hook_repo: Option<&'static str>,
}

const DEV_TOOLS: [DevTool; 3] = [
    DevTool {
        name: "pre-commit",
        poetry: "^4.5.1",
        pep508: "pre-commit>=4.5.1",
        hook_repo: None,
    },
    DevTool {
        name: "ruff",
        poetry: "^0.15.2",
        pep508: "ruff>=0.15.2",
        hook_repo: Some("astral-sh/ruff-pre-commit"),
    },
    DevTool {
        name: "commitizen",
        poetry: "^4.13.8",
        pep508: "commitizen>=4.13.8,<4.14",
        hook_repo: Some("commitizen-tools/commitizen"),
    },
];

/// Result of [`PreCommitConfigurator::configure`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreCommitSetup {
    pub config_path: PathBuf,
    /// Tool name to the version pinned in the manifest
    pub versions: BTreeMap<String, String>,
    /// The config file was there before and was left untouched
    pub already_existed: bool,
}

pub struct PreCommitConfigurator {
    runner: Arc<dyn CommandRunner>,
    logger: Box<dyn Logger>,
}

impl PreCommitConfigurator {
    pub fn new(runner: Arc<dyn CommandRunner>, logger: Box<dyn Logger>) -> Self {
        Self { runner, logger }
    }

    /// Set up the hook pipeline for `project_root`.
    ///
    /// With no explicit manager, it is detected from the manifest.
    pub fn configure(
        &self,
        project_root: &Path,
        manager: Option<ManagerChoice>,
    ) -> Result<PreCommitSetup> {
        if !project_root.is_dir() {
            return Err(BootstrapError::io(
                project_root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "project root does not exist"),
            ));
        }
        let manifest = manifest_path(project_root);
        if !manifest.is_file() {
            self.logger.error(&format!("{MANIFEST_FILE} not found"));
            return Err(BootstrapError::io(
                &manifest,
                std::io::Error::new(std::io::ErrorKind::NotFound, "manifest not found"),
            ));
        }
        let manager = manager.unwrap_or_else(|| ManagerChoice::detect(project_root));
        tracing::debug!(%manager, "configuring pre-commit");

        let config_path = project_root.join(PRE_COMMIT_CONFIG);
        let already_existed = config_path.exists();
        if already_existed {
            self.logger
                .info("pre-commit config already exists, leaving it untouched");
        } else {
            write_text(&config_path, CONFIG_TEMPLATE, false)?;
            self.logger.success(&format!("created {PRE_COMMIT_CONFIG}"));
        }

        self.add_dev_dependencies(project_root, &manifest, manager)?;

        let versions = extract_versions(&read_text(&manifest)?, manager);
        if versions.is_empty() {
            self.logger
                .warning(&format!("no hook tool versions found in {MANIFEST_FILE}"));
        }

        if !already_existed && !versions.is_empty() {
            let config = read_text(&config_path)?;
            let pinned = pin_hook_revisions(&config, &versions);
            if pinned == config {
                self.logger.warning("no hook revisions were updated");
            } else {
                write_text(&config_path, &pinned, true)?;
            }
        }

        self.install_hooks(project_root, manager);

        Ok(PreCommitSetup {
            config_path,
            versions,
            already_existed,
        })
    }

    fn add_dev_dependencies(
        &self,
        project_root: &Path,
        manifest: &Path,
        manager: ManagerChoice,
    ) -> Result<()> {
        self.logger
            .info("adding pre-commit, ruff and commitizen to dev dependencies");

        let content = read_text(manifest)?;
        let updated = match manager {
            ManagerChoice::Pyenv => add_poetry_dev_dependencies(&content),
            ManagerChoice::Uv => add_dependency_group_entries(&content),
        };
        if updated != content {
            write_text(manifest, &updated, true)?;
            self.logger
                .success(&format!("dev dependencies added to {MANIFEST_FILE}"));
        }

        let commands: &[&[&str]] = match manager {
            ManagerChoice::Pyenv => &[&["lock"], &["install", "--no-root"]],
            ManagerChoice::Uv => &[&["sync", "--all-groups"]],
        };
        for args in commands {
            let spec = CommandSpec::new(manager.run_tool(), args.iter().copied()).in_dir(project_root);
            self.logger.info(&format!("running {}", spec.display()));
            if let Err(e) = self.runner.run_checked(&spec) {
                self.logger.error(&format!("{} failed", spec.display()));
                return Err(e);
            }
        }
        self.logger.success("dev dependencies installed");
        Ok(())
    }

    /// Failure here only warns; hooks can be installed by hand later
    fn install_hooks(&self, project_root: &Path, manager: ManagerChoice) {
        let spec = CommandSpec::new(
            manager.run_tool(),
            [
                "run",
                "pre-commit",
                "install",
                "--hook-type",
                "pre-commit",
                "--hook-type",
                "commit-msg",
            ],
        )
        .in_dir(project_root);

        self.logger.info("installing pre-commit hooks");
        match self.runner.run_checked(&spec) {
            Ok(_) => self.logger.success("pre-commit hooks installed"),
            Err(e) => self
                .logger
                .warning(&format!("failed to install hooks: {e}")),
        }
    }
}

/// Byte offset just past the line holding `header`, if the header exists
fn after_header(content: &str, header: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        offset += line.len();
        if line.trim() == header {
            return Some(offset);
        }
    }
    None
}

/// Make sure `content` ends with a newline so a new line can follow
fn terminated(content: &str) -> String {
    let mut out = content.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn add_poetry_dev_dependencies(content: &str) -> String {
    let mut content = terminated(content);
    if after_header(&content, POETRY_DEV_TABLE).is_none() {
        content = match content.find("[build-system]") {
            Some(pos) => format!(
                "{}{POETRY_DEV_TABLE}\n\n{}",
                &content[..pos],
                &content[pos..]
            ),
            None => format!("{content}\n{POETRY_DEV_TABLE}\n"),
        };
    }

    let missing: String = DEV_TOOLS
        .iter()
        .filter(|tool| !has_poetry_key(&content, tool.name))
        .map(|tool| format!("{} = \"{}\"\n", tool.name, tool.poetry))
        .collect();
    if missing.is_empty() {
        return content;
    }

    let Some(at) = after_header(&content, POETRY_DEV_TABLE) else {
        return content;
    };
    format!("{}{missing}{}", &content[..at], &content[at..])
}

fn has_poetry_key(content: &str, name: &str) -> bool {
    Regex::new(&format!(r"(?m)^\s*{}\s*=", regex::escape(name)))
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

fn has_requirement(content: &str, name: &str) -> bool {
    Regex::new(&format!(r#"["']{}\s*([<>=!~;\[]|["'])"#, regex::escape(name)))
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

fn add_dependency_group_entries(content: &str) -> String {
    let mut content = terminated(content);
    if after_header(&content, DEPENDENCY_GROUPS_TABLE).is_none() {
        content = format!("{content}\n{DEPENDENCY_GROUPS_TABLE}\ndev = []\n");
    }

    let Some(table_start) = after_header(&content, DEPENDENCY_GROUPS_TABLE) else {
        return content;
    };
    let table_end = std::iter::once(table_start)
        .chain(
            content[table_start..]
                .match_indices('\n')
                .map(|(i, _)| table_start + i + 1),
        )
        .find(|&i| content[i..].trim_start_matches([' ', '\t']).starts_with('['))
        .unwrap_or(content.len());

    let dev_array = Regex::new(r"(?m)^\s*dev\s*=\s*\[").ok();
    let array_open = dev_array
        .as_ref()
        .and_then(|re| re.find(&content[table_start..table_end]))
        .map(|m| table_start + m.end());

    let array_open = match array_open {
        Some(at) => at,
        None => {
            content.insert_str(table_start, "dev = []\n");
            table_start + "dev = [".len()
        }
    };

    let missing: String = DEV_TOOLS
        .iter()
        .filter(|tool| !has_requirement(&content, tool.name))
        .map(|tool| format!("\n    \"{}\",", tool.pep508))
        .collect();
    if missing.is_empty() {
        return content;
    }

    let rest = &content[array_open..];
    let closing = if rest.starts_with(']') { "\n" } else { "" };
    format!("{}{missing}{closing}{rest}", &content[..array_open])
}

/// Versions of the hook tools as declared in the manifest
fn extract_versions(content: &str, manager: ManagerChoice) -> BTreeMap<String, String> {
    DEV_TOOLS
        .iter()
        .filter_map(|tool| {
            let name = regex::escape(tool.name);
            let pattern = match manager {
                ManagerChoice::Pyenv => format!(r#"(?m)^\s*{name}\s*=\s*"[^"0-9]*([0-9][0-9.]*)"#),
                ManagerChoice::Uv => format!(r#"["']{name}\s*>=\s*([0-9][0-9.]*)"#),
            };
            let re = Regex::new(&pattern).ok()?;
            let caps = re.captures(content)?;
            Some((tool.name.to_string(), caps[1].trim_end_matches('.').to_string()))
        })
        .collect()
}

/// Set `rev: "v<version>"` on the ruff and commitizen repositories
fn pin_hook_revisions(config: &str, versions: &BTreeMap<String, String>) -> String {
    let mut out = config.to_string();
    for tool in &DEV_TOOLS {
        let (Some(repo), Some(version)) = (tool.hook_repo, versions.get(tool.name)) else {
            continue;
        };
        let Ok(re) = Regex::new(&format!(r#"({}\s+rev:\s+)"[^"]*""#, regex::escape(repo))) else {
            continue;
        };
        out = re
            .replace(&out, |caps: &regex::Captures| {
                format!("{}\"v{}\"", &caps[1], version)
            })
            .into_owned();
    }
    out
}
