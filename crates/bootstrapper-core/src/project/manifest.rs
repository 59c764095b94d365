//! `pyproject.toml` dialects and Python constraint patching
//!
//! Poetry keeps the interpreter constraint as `python = "^3.12"` under
//! `[tool.poetry.dependencies]`; PEP 621 projects (uv) use
//! `requires-python = ">=3.12"` under `[project]`. Both are described by a
//! [`ManifestDialect`] value so the patch logic exists once.

use super::files::{read_text, write_text};
use crate::error::{BootstrapError, Result};
use crate::python::PythonVersion;
use regex::Regex;
use std::path::{Path, PathBuf};

/// File name of the project manifest
pub const MANIFEST_FILE: &str = "pyproject.toml";

const POETRY_TEMPLATE: &str = r#"[tool.poetry]
name = "{name}"
version = "0.1.0"
description = ""
authors = []
package-mode = false

[tool.poetry.dependencies]
python = "{constraint}"

[build-system]
requires = ["poetry-core"]
build-backend = "poetry.core.masonry.api"
"#;

const PEP621_TEMPLATE: &str = r#"[project]
name = "{name}"
version = "0.1.0"
description = ""
requires-python = "{constraint}"
dependencies = []

[dependency-groups]
dev = []
"#;

/// Where and how a manifest dialect stores its Python constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestDialect {
    pub name: &'static str,
    /// Table holding the constraint, without brackets
    pub table: &'static str,
    pub key: &'static str,
    /// Prepended to `major.minor` (`^` or `>=`)
    pub constraint_prefix: &'static str,
    pub lock_file: &'static str,
    /// Header prefix that identifies this dialect in existing content
    marker: &'static str,
    template: &'static str,
}

impl ManifestDialect {
    pub const POETRY: Self = Self {
        name: "poetry",
        table: "tool.poetry.dependencies",
        key: "python",
        constraint_prefix: "^",
        lock_file: "poetry.lock",
        marker: "[tool.poetry",
        template: POETRY_TEMPLATE,
    };

    pub const PEP621: Self = Self {
        name: "pep621",
        table: "project",
        key: "requires-python",
        constraint_prefix: ">=",
        lock_file: "uv.lock",
        marker: "[project]",
        template: PEP621_TEMPLATE,
    };

    /// Recognize the dialect of existing manifest content.
    ///
    /// A dialect whose constraint table is present wins over one that is
    /// only mentioned, so a Poetry 2 manifest with a `[project]` table and no
    /// `[tool.poetry.dependencies]` is patched as PEP 621.
    pub fn detect(content: &str) -> Option<Self> {
        let dialects = [Self::POETRY, Self::PEP621];
        let headers: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with('['))
            .collect();

        dialects
            .into_iter()
            .find(|d| headers.iter().any(|h| *h == format!("[{}]", d.table)))
            .or_else(|| {
                dialects
                    .into_iter()
                    .find(|d| headers.iter().any(|h| h.starts_with(d.marker)))
            })
    }

    /// `"3.12.3"` -> `"^3.12"` / `">=3.12"`
    pub fn constraint(&self, version: &PythonVersion) -> String {
        format!("{}{}", self.constraint_prefix, version.major_minor())
    }

    pub fn render_minimal(&self, project_name: &str, version: &PythonVersion) -> String {
        self.template
            .replace("{name}", project_name)
            .replace("{constraint}", &self.constraint(version))
    }

    /// Rewrite the constraint inside `content`; `Ok(None)` when nothing changes.
    ///
    /// Only the dialect's table is touched. A missing key is inserted right
    /// under the table header; a missing table is left alone. The value may
    /// be a quoted string or an inline table carrying `version = "..."`;
    /// anything else is refused rather than duplicated.
    pub fn patch_constraint(
        &self,
        content: &str,
        version: &PythonVersion,
    ) -> Result<Option<String>> {
        let wanted = self.constraint(version);
        let header = format!("[{}]", self.table);
        let key_line = Regex::new(&format!(r"^(\s*{}\s*=\s*)(.*)$", regex::escape(self.key)))
            .map_err(|e| BootstrapError::ConfigValue(e.to_string()))?;

        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        let Some(header_idx) = lines.iter().position(|l| l.trim() == header) else {
            return Ok(None);
        };

        let section_end = lines[header_idx + 1..]
            .iter()
            .position(|l| l.trim_start().starts_with('['))
            .map_or(lines.len(), |offset| header_idx + 1 + offset);

        let mut out: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        let existing = (header_idx + 1..section_end).find_map(|i| {
            let (body, ending) = split_line_ending(lines[i]);
            key_line
                .captures(body)
                .map(|caps| (i, caps[1].to_string(), caps[2].to_string(), ending))
        });

        let Some((i, lead, value, ending)) = existing else {
            if !out[header_idx].ends_with('\n') {
                out[header_idx].push('\n');
            }
            out.insert(header_idx + 1, format!("{} = \"{}\"\n", self.key, wanted));
            return Ok(Some(out.concat()));
        };

        let (current, patched) = rewrite_constraint_value(&value, &wanted).ok_or_else(|| {
            BootstrapError::UnsupportedConstraint {
                key: self.key.to_string(),
                value: value.trim().to_string(),
            }
        })?;
        if current == wanted {
            return Ok(None);
        }
        out[i] = format!("{lead}{patched}{ending}");
        Ok(Some(out.concat()))
    }
}

/// Split a constraint value into its current constraint and the value with
/// `wanted` substituted. Handles `"^3.12"` and `{ version = "^3.12", ... }`.
fn rewrite_constraint_value(value: &str, wanted: &str) -> Option<(String, String)> {
    let quoted = Regex::new(r#"^(["'])([^"']*)(["'])(.*)$"#).ok()?;
    if let Some(caps) = quoted.captures(value) {
        return Some((caps[2].to_string(), format!("\"{wanted}\"{}", &caps[4])));
    }

    let inline = Regex::new(r#"^(\{.*?\bversion\s*=\s*)(["'])([^"']*)(["'])(.*)$"#).ok()?;
    inline.captures(value).map(|caps| {
        (
            caps[3].to_string(),
            format!("{}\"{wanted}\"{}", &caps[1], &caps[5]),
        )
    })
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

pub fn manifest_path(project_root: &Path) -> PathBuf {
    project_root.join(MANIFEST_FILE)
}

/// Write a minimal manifest unless one already exists; returns its path.
///
/// The project name defaults to the directory name.
pub fn create_minimal_manifest(
    project_root: &Path,
    version: &PythonVersion,
    dialect: ManifestDialect,
    project_name: Option<&str>,
) -> Result<PathBuf> {
    let path = manifest_path(project_root);
    if path.exists() {
        return Ok(path);
    }

    let name = project_name.map(str::to_string).unwrap_or_else(|| {
        project_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "project".to_string())
    });

    write_text(&path, &dialect.render_minimal(&name, version), false)?;
    Ok(path)
}

/// Update the Python constraint of the manifest at `path` in place.
///
/// Returns the constraint that was written, or `None` without touching the
/// file when it is missing or already holds the wanted constraint. The
/// dialect is detected from the content and falls back to `default_dialect`.
pub fn update_python_constraint(
    path: &Path,
    version: &PythonVersion,
    default_dialect: ManifestDialect,
) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = read_text(path)?;
    let dialect = ManifestDialect::detect(&content).unwrap_or(default_dialect);

    match dialect.patch_constraint(&content, version)? {
        Some(updated) => {
            write_text(path, &updated, true)?;
            Ok(Some(dialect.constraint(version)))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn version(v: &str) -> PythonVersion {
        v.parse().unwrap()
    }

    const POETRY_PROJECT: &str = r#"[tool.poetry]
name = "test-project"
version = "0.1.0"

[tool.poetry.dependencies]
python = "^3.12"
fastapi = "^0.110"

[build-system]
requires = ["poetry-core"]
"#;

    #[test]
    fn test_minimal_poetry_manifest() {
        let dir = TempDir::new().unwrap();
        let path =
            create_minimal_manifest(dir.path(), &version("3.13.9"), ManifestDialect::POETRY, None)
                .unwrap();

        assert_eq!(path, dir.path().join("pyproject.toml"));
        let content = std::fs::read_to_string(&path).unwrap();
        let dir_name = dir.path().file_name().unwrap().to_string_lossy();
        assert!(content.contains("[tool.poetry]"));
        assert!(content.contains(&format!("name = \"{dir_name}\"")));
        assert!(content.contains("version = \"0.1.0\""));
        assert!(content.contains("authors = []"));
        assert!(content.contains("python = \"^3.13\""));
        assert!(content.contains("[build-system]"));
    }

    #[test]
    fn test_minimal_pep621_manifest_with_custom_name() {
        let dir = TempDir::new().unwrap();
        let path = create_minimal_manifest(
            dir.path(),
            &version("3.12"),
            ManifestDialect::PEP621,
            Some("custom-name"),
        )
        .unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("[project]"));
        assert!(content.contains("name = \"custom-name\""));
        assert!(content.contains("requires-python = \">=3.12\""));
        assert!(content.contains("[dependency-groups]"));
    }

    #[test]
    fn test_existing_manifest_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        std::fs::write(&path, "[tool.poetry]\nname = 'existing'\n").unwrap();

        create_minimal_manifest(dir.path(), &version("3.12"), ManifestDialect::POETRY, None)
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[tool.poetry]\nname = 'existing'\n"
        );
    }

    #[test]
    fn test_update_rewrites_only_constraint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        std::fs::write(&path, POETRY_PROJECT).unwrap();

        let updated =
            update_python_constraint(&path, &version("3.9.24"), ManifestDialect::POETRY).unwrap();

        assert_eq!(updated.as_deref(), Some("^3.9"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, POETRY_PROJECT.replace("^3.12", "^3.9"));
    }

    #[test]
    fn test_update_is_noop_when_already_correct() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        std::fs::write(&path, POETRY_PROJECT).unwrap();

        let updated =
            update_python_constraint(&path, &version("3.12.3"), ManifestDialect::POETRY).unwrap();

        assert_eq!(updated, None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), POETRY_PROJECT);
    }

    #[test]
    fn test_update_missing_file_returns_false() {
        let dir = TempDir::new().unwrap();
        let updated = update_python_constraint(
            &dir.path().join("pyproject.toml"),
            &version("3.12"),
            ManifestDialect::POETRY,
        )
        .unwrap();
        assert_eq!(updated, None);
    }

    #[test]
    fn test_update_handles_single_quotes_and_spacing() {
        let content = "[tool.poetry.dependencies]\npython   =   '^3.12'\n";
        let patched = ManifestDialect::POETRY
            .patch_constraint(content, &version("3.10.5"))
            .unwrap()
            .unwrap();
        assert_eq!(patched, "[tool.poetry.dependencies]\npython   =   \"^3.10\"\n");
    }

    #[test]
    fn test_update_detects_pep621_dialect() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        std::fs::write(
            &path,
            "[project]\nname = \"api\"\nrequires-python = \">=3.11\"\n\n[tool.ruff]\nline-length = 88\n",
        )
        .unwrap();

        let updated =
            update_python_constraint(&path, &version("3.12.0"), ManifestDialect::POETRY).unwrap();

        assert_eq!(updated.as_deref(), Some(">=3.12"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("requires-python = \">=3.12\""));
        assert!(content.contains("line-length = 88"));
    }

    #[test]
    fn test_key_outside_table_is_ignored_and_key_inserted() {
        let content = "[tool.other]\npython = \"^3.8\"\n\n[tool.poetry.dependencies]\nrequests = \"*\"\n";
        let patched = ManifestDialect::POETRY
            .patch_constraint(content, &version("3.12"))
            .unwrap()
            .unwrap();

        assert!(patched.contains("[tool.other]\npython = \"^3.8\""));
        assert!(patched.contains("[tool.poetry.dependencies]\npython = \"^3.12\"\nrequests"));
    }

    #[test]
    fn test_missing_table_is_left_alone() {
        let content = "[tool.poetry]\nname = \"x\"\n";
        assert!(ManifestDialect::POETRY
            .patch_constraint(content, &version("3.12"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_inline_table_constraint_is_rewritten_in_place() {
        let content = "[tool.poetry.dependencies]\npython = { version = \"^3.11\", source = \"pypi\" }\nfastapi = \"*\"\n";
        let patched = ManifestDialect::POETRY
            .patch_constraint(content, &version("3.12.0"))
            .unwrap()
            .unwrap();

        assert_eq!(patched.matches("python =").count(), 1);
        assert_eq!(
            patched,
            "[tool.poetry.dependencies]\npython = { version = \"^3.12\", source = \"pypi\" }\nfastapi = \"*\"\n"
        );

        assert!(ManifestDialect::POETRY
            .patch_constraint(&patched, &version("3.12.7"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unrecognized_constraint_value_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pyproject.toml");
        let content = "[tool.poetry.dependencies]\npython = [\"^3.11\"]\n";
        std::fs::write(&path, content).unwrap();

        let err = update_python_constraint(&path, &version("3.12.0"), ManifestDialect::POETRY)
            .unwrap_err();

        assert!(matches!(err, BootstrapError::UnsupportedConstraint { .. }));
        assert!(err.to_string().contains("python = [\"^3.11\"]"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_similar_key_names_are_not_the_constraint() {
        let content = "[tool.poetry.dependencies]\npython-dotenv = \"^1.0\"\n";
        let patched = ManifestDialect::POETRY
            .patch_constraint(content, &version("3.12"))
            .unwrap()
            .unwrap();
        assert_eq!(
            patched,
            "[tool.poetry.dependencies]\npython = \"^3.12\"\npython-dotenv = \"^1.0\"\n"
        );
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            ManifestDialect::detect(POETRY_PROJECT),
            Some(ManifestDialect::POETRY)
        );
        assert_eq!(
            ManifestDialect::detect("[project]\nname = \"x\"\n"),
            Some(ManifestDialect::PEP621)
        );
        assert_eq!(ManifestDialect::detect("[tool.black]\n"), None);
    }
}
