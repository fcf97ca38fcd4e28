//! Classifier configuration stored in `rca.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::keywords::Keywords;

/// Classifier configuration (TOML).
///
/// Missing fields fall back to the built-in tables, so an empty file is a
/// valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Framework used when a task names none and the log gives no hint.
    pub default_framework: Option<String>,

    pub keywords: Keywords,

    /// Framework name → advice, replacing or extending the built-in advice.
    pub advice: BTreeMap<String, String>,
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.keywords.failure_markers.is_empty() {
            return Err(anyhow!("keywords.failure_markers must be non-empty"));
        }
        if self
            .keywords
            .failure_markers
            .iter()
            .any(|marker| marker.trim().is_empty())
        {
            return Err(anyhow!("keywords.failure_markers must not contain blank entries"));
        }
        if self.keywords.success_prefix.trim().is_empty() {
            return Err(anyhow!("keywords.success_prefix must be non-empty"));
        }
        if self.keywords.interaction_markers.is_empty() {
            return Err(anyhow!("keywords.interaction_markers must be non-empty"));
        }
        if self
            .keywords
            .interaction_markers
            .iter()
            .any(|marker| marker.trim().is_empty())
        {
            return Err(anyhow!(
                "keywords.interaction_markers must not contain blank entries"
            ));
        }
        for (framework, advice) in &self.advice {
            if framework.trim().is_empty() {
                return Err(anyhow!("advice keys must be non-empty"));
            }
            if advice.trim().is_empty() {
                return Err(anyhow!("advice.{} must be non-empty", framework));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ClassifierConfig::default()`.
pub fn load_config(path: &Path) -> Result<ClassifierConfig> {
    if !path.exists() {
        let cfg = ClassifierConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ClassifierConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &ClassifierConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, ClassifierConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("rca.toml");
        let mut cfg = ClassifierConfig::default();
        cfg.default_framework = Some("selenium".to_string());
        cfg.advice
            .insert("cypress".to_string(), "retry cy.get".to_string());
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("rca.toml");
        fs::write(
            &path,
            "[keywords]\nfailure_markers = [\"erreur\", \"échec\"]\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.keywords.failure_markers, vec!["erreur", "échec"]);
        assert_eq!(cfg.keywords.success_prefix, "Success");
        assert!(!cfg.keywords.interaction_markers.is_empty());
    }

    #[test]
    fn rejects_empty_success_prefix() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("rca.toml");
        fs::write(&path, "[keywords]\nsuccess_prefix = \" \"\n").expect("write");
        let err = load_config(&path).expect_err("invalid");
        assert!(format!("{err:#}").contains("success_prefix"));
    }
}
