// ============================
// crates/classroom-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Starter buffer shown to every freshly joined context.
pub const DEFAULT_CODE: &str = r#"// Welcome to CollabCode Classroom!
// Your teacher will guide you through this lesson.

// Let's start with a simple function
function greet(name) {
    return "Hello, " + name + "!";
}

// Try calling the function
console.log(greet("Student"));
"#;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quiescence window for code-change emission, in milliseconds
    pub debounce_ms: u64,
    /// Capacity of each room's relay channel
    pub relay_capacity: usize,
    /// Prefix joined with the room token to form the relay scope name
    pub channel_prefix: String,
    /// Initial buffer content for new contexts
    pub default_code: String,
    /// Log level
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            relay_capacity: 64,
            channel_prefix: "collabcode-classroom-".to_string(),
            default_code: DEFAULT_CODE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from an optional `classroom` config file plus
    /// `CLASSROOM_`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::with_name("classroom").required(false))
            .add_source(Environment::with_prefix("CLASSROOM").try_parsing(true))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// Load settings from an explicit config file path.
    pub fn load_from(path: &str) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("CLASSROOM").try_parsing(true))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.debounce_ms, 150);
        assert_eq!(settings.relay_capacity, 64);
        assert_eq!(settings.channel_prefix, "collabcode-classroom-");
        assert!(settings.default_code.contains("console.log"));
    }

    #[test]
    fn test_load_without_config_file() {
        // No classroom.* file in the test cwd; defaults must apply.
        let settings = Settings::load().unwrap();
        assert_eq!(settings.debounce_ms, 150);
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        assert!(Settings::load_from("does/not/exist").is_err());
    }
}
