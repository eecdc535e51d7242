//! Glint configuration file handling

use anyhow::{Context, Result};
use glint_gpu::ProgramConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "glint.toml";

/// Top-level Glint configuration (glint.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GlintConfig {
    #[serde(default)]
    pub shader: ShaderConfig,
    #[serde(default)]
    pub ease: EaseConfig,
}

/// Defaults for `glint check`
#[derive(Debug, Deserialize, Serialize)]
pub struct ShaderConfig {
    #[serde(default)]
    pub vertex_entry: Option<String>,
    #[serde(default)]
    pub fragment_entry: Option<String>,
    #[serde(default = "default_true")]
    pub validate: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex_entry: None,
            fragment_entry: None,
            validate: true,
        }
    }
}

/// Defaults for `glint ease`
#[derive(Debug, Deserialize, Serialize)]
pub struct EaseConfig {
    /// Number of samples between start and end
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_easing")]
    pub easing: String,
}

fn default_steps() -> u32 {
    10
}

fn default_easing() -> String {
    "ease-out-quart".to_string()
}

impl Default for EaseConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            easing: default_easing(),
        }
    }
}

impl GlintConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `glint.toml` in the working
    /// directory is used when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file {} does not exist", path.display());
                }
                Self::load_file(path)
            }
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::load_file(path)
                } else {
                    tracing::debug!("no {} found, using defaults", CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Program options from the `[shader]` table
    pub fn program_config(&self) -> ProgramConfig {
        ProgramConfig {
            label: None,
            vertex_entry: self.shader.vertex_entry.clone(),
            fragment_entry: self.shader.fragment_entry.clone(),
            validate: self.shader.validate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GlintConfig::from_toml("").unwrap();
        assert!(config.shader.validate);
        assert_eq!(config.ease.steps, 10);
        assert_eq!(config.ease.easing, "ease-out-quart");
    }

    #[test]
    fn test_partial_tables() {
        let config = GlintConfig::from_toml(
            r#"
[shader]
vertex_entry = "vs"
validate = false

[ease]
steps = 4
"#,
        )
        .unwrap();

        let program = config.program_config();
        assert_eq!(program.vertex_entry.as_deref(), Some("vs"));
        assert!(program.fragment_entry.is_none());
        assert!(!program.validate);
        assert_eq!(config.ease.steps, 4);
        assert_eq!(config.ease.easing, "ease-out-quart");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(GlintConfig::from_toml("[shader\nvalidate = ").is_err());
    }
}
