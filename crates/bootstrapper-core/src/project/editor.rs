//! VSCode settings for the project interpreter

use super::files::{ensure_dir, read_text, write_text};
use crate::error::{BootstrapError, Result};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Writes editor configuration pointing at an interpreter
pub trait EditorConfigWriter {
    /// Where the settings file lives for `project_root`
    fn settings_path(&self, project_root: &Path) -> PathBuf;

    /// Merge the interpreter into the settings file; returns the file path
    fn write_config(&self, project_root: &Path, python: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VsCodeWriter;

impl VsCodeWriter {
    fn load_existing(path: &Path) -> Map<String, Value> {
        if !path.exists() {
            return Map::new();
        }
        match read_text(path).map(|text| serde_json::from_str::<Value>(&text)) {
            Ok(Ok(Value::Object(map))) => map,
            _ => {
                tracing::warn!(path = %path.display(), "ignoring unreadable editor settings");
                Map::new()
            }
        }
    }

    fn interpreter_setting(project_root: &Path, python: &Path) -> String {
        python
            .strip_prefix(project_root)
            .unwrap_or(python)
            .display()
            .to_string()
    }

    fn merge(settings: &mut Map<String, Value>, interpreter: String) {
        settings.insert(
            "python.defaultInterpreterPath".to_string(),
            Value::String(interpreter),
        );

        let defaults = [
            ("python.testing.pytestArgs", json!(["-s", "-vv"])),
            ("python.testing.unittestEnabled", json!(false)),
            ("python.testing.pytestEnabled", json!(true)),
            (
                "[python]",
                json!({
                    "editor.defaultFormatter": "ms-python.python",
                    "editor.formatOnType": true,
                    "editor.rulers": [88]
                }),
            ),
        ];
        for (key, value) in defaults {
            settings.entry(key).or_insert(value);
        }
    }
}

impl EditorConfigWriter for VsCodeWriter {
    fn settings_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(".vscode").join("settings.json")
    }

    fn write_config(&self, project_root: &Path, python: &Path) -> Result<PathBuf> {
        let path = self.settings_path(project_root);
        ensure_dir(&project_root.join(".vscode"))?;

        let mut settings = Self::load_existing(&path);
        Self::merge(
            &mut settings,
            Self::interpreter_setting(project_root, python),
        );

        let mut content = serde_json::to_string_pretty(&Value::Object(settings)).map_err(|e| {
            BootstrapError::io(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        content.push('\n');
        write_text(&path, &content, true)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_creates_settings_with_relative_interpreter() {
        let dir = TempDir::new().unwrap();
        let python = dir.path().join(".venv").join("bin").join("python");

        let path = VsCodeWriter.write_config(dir.path(), &python).unwrap();

        assert_eq!(path, dir.path().join(".vscode").join("settings.json"));
        let settings = read(&path);
        let expected = Path::new(".venv").join("bin").join("python");
        assert_eq!(
            settings["python.defaultInterpreterPath"],
            json!(expected.display().to_string())
        );
        assert_eq!(settings["python.testing.pytestEnabled"], json!(true));
        assert_eq!(settings["[python]"]["editor.rulers"], json!([88]));
    }

    #[test]
    fn test_interpreter_outside_project_stays_absolute() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let python = other.path().join("python");

        let path = VsCodeWriter.write_config(dir.path(), &python).unwrap();
        assert_eq!(
            read(&path)["python.defaultInterpreterPath"],
            json!(python.display().to_string())
        );
    }

    #[test]
    fn test_merges_and_preserves_existing_keys_in_order() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".vscode")).unwrap();
        let path = dir.path().join(".vscode").join("settings.json");
        std::fs::write(
            &path,
            r#"{"editor.fontSize": 14, "python.testing.pytestEnabled": false, "files.exclude": {"**/.git": true}}"#,
        )
        .unwrap();

        VsCodeWriter
            .write_config(dir.path(), &dir.path().join(".venv/bin/python"))
            .unwrap();

        let settings = read(&path);
        let keys: Vec<&String> = settings.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "editor.fontSize");
        assert_eq!(keys[1], "python.testing.pytestEnabled");
        assert_eq!(keys[2], "files.exclude");
        assert_eq!(settings["python.testing.pytestEnabled"], json!(false));
        assert_eq!(settings["files.exclude"]["**/.git"], json!(true));
    }

    #[test]
    fn test_invalid_or_empty_settings_are_replaced() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".vscode")).unwrap();
        let path = dir.path().join(".vscode").join("settings.json");

        for broken in ["", "{not json", "[1, 2]"] {
            std::fs::write(&path, broken).unwrap();
            VsCodeWriter
                .write_config(dir.path(), &dir.path().join(".venv/bin/python"))
                .unwrap();
            assert!(read(&path).get("python.defaultInterpreterPath").is_some());
        }
    }

    #[test]
    fn test_output_is_indented_with_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let path = VsCodeWriter
            .write_config(dir.path(), &dir.path().join(".venv/bin/python"))
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("{\n  \""));
        assert!(text.ends_with("}\n"));
    }
}
