use crate::backend::DEFAULT_TIMEOUT;
use crate::t_args;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Compiler location relative to the working directory when nothing else is given.
pub const DEFAULT_COMPILER: &str = "build/bitsyc";
/// Spec corpus location relative to the working directory when nothing else is given.
pub const DEFAULT_SPEC_DIR: &str = "../bitsyspec/specs";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct RunnerCfg {
    #[serde(alias = "Exe", alias = "Bitsyc")]
    pub compiler: Option<String>,
    #[serde(alias = "SpecDir")]
    pub specs: Option<String>,
    /// Seconds per spec file
    pub timeout: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "PascalCase")]
pub struct RawConfig {
    pub config: Option<RunnerCfg>,
}

/// Settings given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub compiler: Option<String>,
    pub specs: Option<PathBuf>,
    pub timeout: Option<u64>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub compiler: String,
    pub spec_dir: PathBuf,
    pub timeout: Duration,
}

fn resolve_path_relative_to_yaml(path: &str, yaml_file_path: &Path) -> String {
    let path_buf = Path::new(path);
    if path_buf.is_absolute() {
        return path.to_string();
    }
    match yaml_file_path.parent() {
        Some(yaml_dir) if !yaml_dir.as_os_str().is_empty() => {
            yaml_dir.join(path).to_string_lossy().into_owned()
        }
        _ => path.to_string(),
    }
}

pub fn load_config(path: &Path) -> Result<RunnerCfg> {
    let content = fs::read_to_string(path)
        .with_context(|| t_args!("config-failed-to-read", "file" => path.display()))?;
    let raw: RawConfig = serde_yaml::from_str(&content)
        .with_context(|| t_args!("config-yaml-error", "file" => path.display()))?;
    let mut cfg = raw.config.unwrap_or_default();
    cfg.compiler = cfg
        .compiler
        .map(|c| resolve_path_relative_to_yaml(c.trim(), path));
    cfg.specs = cfg.specs.map(|s| resolve_path_relative_to_yaml(s.trim(), path));
    Ok(cfg)
}

/// Merge command line, config file and defaults, in that order of precedence.
pub fn resolve(overrides: Overrides, file: Option<RunnerCfg>) -> Settings {
    let file = file.unwrap_or_default();
    let compiler = overrides
        .compiler
        .map(|c| c.trim().to_string())
        .or(file.compiler)
        .unwrap_or_else(|| DEFAULT_COMPILER.to_string());
    let spec_dir = overrides
        .specs
        .or_else(|| file.specs.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SPEC_DIR));
    let timeout = overrides
        .timeout
        .or(file.timeout)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    Settings {
        compiler,
        spec_dir,
        timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_apply_without_config() {
        let s = resolve(Overrides::default(), None);
        assert_eq!(s.compiler, DEFAULT_COMPILER);
        assert_eq!(s.spec_dir, PathBuf::from(DEFAULT_SPEC_DIR));
        assert_eq!(s.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn yaml_paths_are_relative_to_the_file() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("runner.yaml");
        let yaml = r#"
Config:
  Compiler: "  build/bitsyc "
  Specs: /srv/bitsyspec/specs
  Timeout: 5
"#;
        fs::write(&file, yaml)?;
        let cfg = load_config(&file)?;
        let expected = dir.path().join("build/bitsyc").to_string_lossy().into_owned();
        assert_eq!(cfg.compiler.as_deref(), Some(expected.as_str()));
        assert_eq!(cfg.specs.as_deref(), Some("/srv/bitsyspec/specs"));
        assert_eq!(cfg.timeout, Some(5));
        Ok(())
    }

    #[test]
    fn command_line_beats_config_file() {
        let file = RunnerCfg {
            compiler: Some("/opt/bitsyc".into()),
            specs: Some("/opt/specs".into()),
            timeout: Some(5),
        };
        let overrides = Overrides {
            compiler: Some("./bitsyc".into()),
            specs: None,
            timeout: Some(1),
        };
        let s = resolve(overrides, Some(file));
        assert_eq!(s.compiler, "./bitsyc");
        assert_eq!(s.spec_dir, PathBuf::from("/opt/specs"));
        assert_eq!(s.timeout, Duration::from_secs(1));
    }

    #[test]
    fn broken_yaml_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("runner.yaml");
        fs::write(&file, "Config: [unclosed")?;
        assert!(load_config(&file).is_err());
        Ok(())
    }
}
