//! Terminal configuration
//!
//! Everything here has a default, so an empty YAML/JSON document is a valid
//! configuration. Owner details feed the informational commands.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default broadcast channel shared by every terminal instance
pub const DEFAULT_CHANNEL_NAME: &str = "portfolio-terminal";

/// Site owner details shown by `about`, `contact` and `resume`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnerProfile {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub resume_url: Option<String>,
}

impl Default for OwnerProfile {
    fn default() -> Self {
        Self {
            name: "Guest Developer".to_string(),
            title: "Software Engineer".to_string(),
            bio: "I build things for the web and the terminal.".to_string(),
            email: "hello@example.com".to_string(),
            github: None,
            linkedin: None,
            resume_url: Some("/resume.pdf".to_string()),
        }
    }
}

/// Animation timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Play the boot sequence once per session
    pub boot_enabled: bool,
    /// Delay between boot lines
    pub boot_line_interval_ms: u64,
    /// Delay between typewriter steps
    pub typewriter_interval_ms: u64,
    /// Characters revealed per typewriter step
    pub typewriter_chars_per_tick: usize,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            boot_enabled: true,
            boot_line_interval_ms: 120,
            typewriter_interval_ms: 18,
            typewriter_chars_per_tick: 2,
        }
    }
}

/// Top-level terminal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Host name the site is served from; keys the quest obfuscation
    pub host: String,
    /// Prompt string rendered before the input line
    pub prompt: String,
    /// Broadcast channel name for cross-instance sync
    pub channel_name: String,
    /// Owner details
    pub owner: OwnerProfile,
    /// Animation timing
    pub animation: AnimationConfig,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            prompt: "guest@portfolio:~$".to_string(),
            channel_name: DEFAULT_CHANNEL_NAME.to_string(),
            owner: OwnerProfile::default(),
            animation: AnimationConfig::default(),
        }
    }
}

impl TerminalConfig {
    /// Parse configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a file, choosing the format by extension
    ///
    /// `.json` is parsed as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = TerminalConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, TerminalConfig::default());
        assert_eq!(config.channel_name, DEFAULT_CHANNEL_NAME);
    }

    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = "host: folio.dev\nowner:\n  name: Ada\nanimation:\n  boot_enabled: false\n";
        let config = TerminalConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.host, "folio.dev");
        assert_eq!(config.owner.name, "Ada");
        assert_eq!(config.owner.email, OwnerProfile::default().email);
        assert!(!config.animation.boot_enabled);
        assert_eq!(config.animation.boot_line_interval_ms, 120);
    }

    #[test]
    fn test_json_config() {
        let config = TerminalConfig::from_json_str(r#"{"prompt":"$"}"#).unwrap();
        assert_eq!(config.prompt, "$");
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terminal.json");
        std::fs::write(&path, r#"{"host":"a.example"}"#).unwrap();
        assert_eq!(TerminalConfig::from_file(&path).unwrap().host, "a.example");

        let path = dir.path().join("terminal.yaml");
        std::fs::write(&path, "host: b.example\n").unwrap();
        assert_eq!(TerminalConfig::from_file(&path).unwrap().host, "b.example");
    }
}
