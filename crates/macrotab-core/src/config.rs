//! Configuration types

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{EntryOrder, TableShape, TableTarget};

/// macrotab configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool configuration
    pub toolchain: ToolchainConfig,

    /// Directory that relative target outputs are written under
    pub output_dir: Option<PathBuf>,

    /// Macro families to generate
    pub targets: Vec<TableTarget>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toolchain: ToolchainConfig::default(),
            output_dir: None,
            targets: builtin_targets(),
        }
    }
}

impl Config {
    /// Load configuration from file, auto-detecting format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let config: Config = match ext.to_lowercase().as_str() {
            "json" => serde_json::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?,
            _ => {
                return Err(Error::Config(format!(
                    "Unknown config file extension: {}",
                    ext
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run
    pub fn validate(&self) -> Result<()> {
        let mut seen = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            if target.name.is_empty() {
                return Err(Error::Config("target with empty name".to_string()));
            }
            if seen.contains(&target.name.as_str()) {
                return Err(Error::Config(format!("duplicate target '{}'", target.name)));
            }
            if target.header.is_empty() {
                return Err(Error::Config(format!(
                    "target '{}' has no header",
                    target.name
                )));
            }
            if target.shape.array_name().is_empty() {
                return Err(Error::Config(format!(
                    "target '{}' has no array name",
                    target.name
                )));
            }
            seen.push(target.name.as_str());
        }

        if self.toolchain.timeout_secs == 0 {
            return Err(Error::Config("toolchain timeout must be positive".to_string()));
        }

        Ok(())
    }

    /// Find a target by name
    pub fn target(&self, name: &str) -> Option<&TableTarget> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Output path of a target, joined onto `output_dir` when relative
    pub fn output_path(&self, target: &TableTarget) -> PathBuf {
        match &self.output_dir {
            Some(dir) if target.output.is_relative() => dir.join(&target.output),
            _ => target.output.clone(),
        }
    }
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler executable; auto-detected when unset
    pub compiler: Option<PathBuf>,

    /// pkg-config executable
    pub pkg_config: PathBuf,

    /// Upper bound for every external invocation (seconds)
    pub timeout_secs: u64,

    /// Extra include directories passed as `-I`
    pub include_dirs: Vec<PathBuf>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: None,
            pkg_config: PathBuf::from("pkg-config"),
            timeout_secs: 30,
            include_dirs: Vec::new(),
        }
    }
}

impl ToolchainConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// The two tables the keyboard layout editor is built with
pub fn builtin_targets() -> Vec<TableTarget> {
    vec![
        TableTarget {
            name: "keysyms".to_string(),
            header: "xkbcommon/xkbcommon-keysyms.h".to_string(),
            package: Some("xkbcommon".to_string()),
            prefix: "XKB_KEY_".to_string(),
            shape: TableShape::StructArray {
                type_name: "keysym_name_t".to_string(),
                value_type: "xkb_keysym_t".to_string(),
                array_name: "keysym_names".to_string(),
                order: EntryOrder::Encounter,
            },
            output: PathBuf::from("keysym_names.h"),
            comment: None,
        },
        TableTarget {
            name: "keycodes".to_string(),
            header: "linux/input-event-codes.h".to_string(),
            package: None,
            prefix: "KEY_".to_string(),
            shape: TableShape::FlatArray {
                array_name: "kernel_keycode_names".to_string(),
                bound: Some("MAX".to_string()),
            },
            output: PathBuf::from("kernel_keycode_names.h"),
            comment: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_has_builtin_targets() {
        let config = Config::default();
        assert!(config.target("keysyms").is_some());
        assert!(config.target("keycodes").is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("macrotab.yaml");
        fs::write(
            &path,
            r#"
toolchain:
  compiler: /usr/bin/gcc
  timeout_secs: 5
output_dir: gen
targets:
  - name: evdev
    header: linux/input-event-codes.h
    prefix: BTN_
    output: btn_names.h
    shape:
      kind: struct_array
      type_name: btn_name_t
      value_type: int
      array_name: btn_names
      order: ascending
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.toolchain.compiler, Some(PathBuf::from("/usr/bin/gcc")));
        assert_eq!(config.toolchain.timeout(), Duration::from_secs(5));
        assert_eq!(config.toolchain.pkg_config, PathBuf::from("pkg-config"));

        let target = config.target("evdev").unwrap();
        assert_eq!(target.prefix, "BTN_");
        assert!(matches!(
            target.shape,
            TableShape::StructArray { order: EntryOrder::Ascending, .. }
        ));
        assert_eq!(config.output_path(target), PathBuf::from("gen/btn_names.h"));
    }

    #[test]
    fn test_load_json_flat_array() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("macrotab.json");
        fs::write(
            &path,
            r#"{
  "targets": [
    {
      "name": "keycodes",
      "header": "linux/input-event-codes.h",
      "prefix": "KEY_",
      "output": "/tmp/kc.h",
      "shape": { "kind": "flat_array", "array_name": "kc_names", "bound": "MAX" }
    }
  ]
}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.targets.len(), 1);
        let target = config.target("keycodes").unwrap();
        assert_eq!(config.output_path(target), PathBuf::from("/tmp/kc.h"));
    }

    #[test]
    fn test_rejects_duplicate_targets() {
        let mut config = Config::default();
        config.targets.push(config.targets[0].clone());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("macrotab.ini");
        fs::write(&path, "").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }
}
