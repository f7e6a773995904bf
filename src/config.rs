//! TOML configuration for the `interpol` binary
//!
//! ```toml
//! [scanner]
//! trigger = "$"
//! delimiters = "strict"
//!
//! [globals]
//! user = "ada"
//!
//! [[route]]
//! key = "re:h.i"
//! handler = "greeting"
//! priority = 10
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::dispatch::{DispatchError, DispatchKey, PatternDispatchRegistry};
use crate::expr::{Namespace, Value};
use crate::scanner::{DelimiterPolicy, ScanOptions};

/// Errors that can occur when loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid trigger {0:?}: expected a single character that cannot start a name or delimiter")]
    InvalidTrigger(String),
    #[error("Invalid route: {0}")]
    RouteError(#[from] DispatchError),
}

/// Scanner section of the configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub trigger: String,
    pub delimiters: DelimiterPolicy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            trigger: "$".to_string(),
            delimiters: DelimiterPolicy::default(),
        }
    }
}

/// A handler name registered under a dispatch key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Route {
    /// Exact key, or `re:<pattern>` for a pattern key
    pub key: String,
    pub handler: String,
    #[serde(default)]
    pub priority: i64,
}

/// Loaded configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub globals: toml::Table,
    pub locals: Option<toml::Table>,
    #[serde(rename = "route")]
    pub routes: Vec<Route>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        // Fail on load rather than on first use
        config.scan_options()?;
        Ok(config)
    }

    /// Scanner options described by the `[scanner]` section
    pub fn scan_options(&self) -> Result<ScanOptions, ConfigError> {
        let invalid = || ConfigError::InvalidTrigger(self.scanner.trigger.clone());
        let mut chars = self.scanner.trigger.chars();
        let trigger = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(invalid()),
        };
        if trigger.is_alphanumeric() || matches!(trigger, '_' | '.' | '{' | '(' | '[') {
            return Err(invalid());
        }
        Ok(ScanOptions::new()
            .with_trigger(trigger)
            .with_delimiters(self.scanner.delimiters))
    }

    /// Namespace holding the configured globals and locals
    pub fn namespace(&self) -> Namespace {
        let globals = self
            .globals
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.clone())))
            .collect();
        let mut ns = Namespace::with_globals(globals);
        if let Some(locals) = &self.locals {
            ns = ns.with_locals(
                locals
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                    .collect(),
            );
        }
        ns
    }

    /// Registry of handler names built from the `[[route]]` entries, in file order
    pub fn registry(&self) -> Result<PatternDispatchRegistry<String>, ConfigError> {
        let mut registry = PatternDispatchRegistry::new();
        for route in &self.routes {
            let key: DispatchKey = match route.key.parse() {
                Ok(key) => key,
                Err(never) => match never {},
            };
            registry.register(key, route.handler.clone(), route.priority)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BindingEnvironment;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.scan_options().unwrap(), ScanOptions::default());
        assert!(config.routes.is_empty());
        assert!(config.registry().unwrap().is_empty());
    }

    #[test]
    fn test_scanner_section() {
        let config = Config::from_str(
            r#"
[scanner]
trigger = "@"
delimiters = "lenient"
"#,
        )
        .unwrap();
        let options = config.scan_options().unwrap();
        assert_eq!(options.trigger, '@');
        assert_eq!(options.delimiters, DelimiterPolicy::Lenient);
    }

    #[test]
    fn test_invalid_triggers() {
        for trigger in ["", "$$", "a", "_", "{", "7"] {
            let content = format!("[scanner]\ntrigger = {:?}\n", trigger);
            assert!(
                matches!(Config::from_str(&content), Err(ConfigError::InvalidTrigger(_))),
                "trigger {:?} should be rejected",
                trigger
            );
        }
    }

    #[test]
    fn test_unknown_delimiter_policy() {
        let result = Config::from_str("[scanner]\ndelimiters = \"loose\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_bindings() {
        let config = Config::from_str(
            r#"
[globals]
user = "ada"
count = 3
tags = ["a", "b"]

[locals]
user = "grace"
"#,
        )
        .unwrap();
        let ns = config.namespace();
        assert_eq!(ns.evaluate("user"), Ok(Value::from("grace")));
        assert_eq!(ns.evaluate("count * 2"), Ok(Value::Int(6)));
        assert_eq!(ns.evaluate("join(tags, '-')"), Ok(Value::from("a-b")));
    }

    #[test]
    fn test_globals_without_locals() {
        let config = Config::from_str("[globals]\nuser = \"ada\"\n").unwrap();
        let ns = config.namespace();
        assert_eq!(ns.locals(), None);
        assert_eq!(ns.evaluate("user.upper()"), Ok(Value::from("ADA")));
    }

    #[test]
    fn test_routes() {
        let config = Config::from_str(
            r#"
[[route]]
key = "re:h.i"
handler = "pattern"
priority = 100

[[route]]
key = "hei"
handler = "exact"
"#,
        )
        .unwrap();
        assert_eq!(config.routes[1].priority, 0);

        let registry = config.registry().unwrap();
        let handlers: Vec<&str> = registry.flatten("hei").map(String::as_str).collect();
        assert_eq!(handlers, vec!["exact", "pattern"]);
    }

    #[test]
    fn test_invalid_route_pattern() {
        let config = Config::from_str(
            r#"
[[route]]
key = "re:(oops"
handler = "broken"
"#,
        )
        .unwrap();
        assert!(matches!(config.registry(), Err(ConfigError::RouteError(_))));
    }
}
