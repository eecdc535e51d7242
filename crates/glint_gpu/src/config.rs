//! Shader program configuration

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
    env_string(name).and_then(|v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

/// Options for compiling and linking a [`ShaderProgram`](crate::ShaderProgram)
#[derive(Clone, Debug)]
pub struct ProgramConfig {
    /// Debug label passed to the context and GPU objects
    pub label: Option<String>,
    /// Vertex entry point name (None = first `@vertex` function)
    pub vertex_entry: Option<String>,
    /// Fragment entry point name (None = first `@fragment` function)
    pub fragment_entry: Option<String>,
    /// Run naga's validator after parsing.
    ///
    /// Parse errors are always fatal; disabling this only skips the semantic
    /// checks (type rules, uniformity, resource limits).
    pub validate: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            label: None,
            vertex_entry: None,
            fragment_entry: None,
            validate: true,
        }
    }
}

impl ProgramConfig {
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_entry_points(
        mut self,
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        self.vertex_entry = Some(vertex.into());
        self.fragment_entry = Some(fragment.into());
        self
    }

    /// Apply process environment overrides.
    ///
    /// Env:
    /// - GLINT_VERTEX_ENTRY=vs_main
    /// - GLINT_FRAGMENT_ENTRY=fs_main
    /// - GLINT_SHADER_VALIDATE=0
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(v) = env_string("GLINT_VERTEX_ENTRY") {
            self.vertex_entry = Some(v);
        }
        if let Some(v) = env_string("GLINT_FRAGMENT_ENTRY") {
            self.fragment_entry = Some(v);
        }
        if let Some(v) = env_bool("GLINT_SHADER_VALIDATE") {
            self.validate = v;
        }

        if !self.validate {
            tracing::warn!("shader validation disabled; only parse errors will be reported");
        }
        tracing::debug!(
            "program config: label={:?}, vertex_entry={:?}, fragment_entry={:?}, validate={}",
            self.label,
            self.vertex_entry,
            self.fragment_entry,
            self.validate
        );

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProgramConfig::default();
        assert!(config.validate);
        assert!(config.vertex_entry.is_none());
        assert!(config.fragment_entry.is_none());
    }

    #[test]
    fn test_builders() {
        let config = ProgramConfig::default()
            .with_label("sprite")
            .with_entry_points("vs", "fs");
        assert_eq!(config.label.as_deref(), Some("sprite"));
        assert_eq!(config.vertex_entry.as_deref(), Some("vs"));
        assert_eq!(config.fragment_entry.as_deref(), Some("fs"));
    }
}
