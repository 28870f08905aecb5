use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::CliArgs;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KshellConfig {
    pub context: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub log_filter: Option<String>,
    pub log_file: Option<PathBuf>,
    pub show_labels: bool,
}

impl Default for KshellConfig {
    fn default() -> Self {
        Self {
            context: None,
            kubeconfig: None,
            log_filter: None,
            log_file: None,
            show_labels: true,
        }
    }
}

/// Effective settings after the config file and CLI flags are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: Option<PathBuf>,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
    pub show_labels: bool,
}

impl KshellConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse config {}", path.display()))
    }

    fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Flags given on the command line win over the file.
    pub fn merge(self, args: &CliArgs, source: Option<PathBuf>) -> Settings {
        Settings {
            source,
            kubeconfig: args.kubeconfig.clone().or(self.kubeconfig),
            context: args.context.clone().or(self.context),
            log_filter: args
                .log_filter
                .clone()
                .or(self.log_filter)
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            log_file: args.log_file.clone().or(self.log_file),
            show_labels: self.show_labels && !args.hide_labels,
        }
    }
}

pub fn load_settings(args: &CliArgs) -> Result<Settings> {
    let source = args.config.clone().or_else(discover_config_path);
    let config = match source.as_deref() {
        Some(path) => KshellConfig::load(path)?,
        None => KshellConfig::default(),
    };
    Ok(config.merge(args, source))
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("KSHELL_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("kshell.yaml"),
        PathBuf::from("kshell.yml"),
        PathBuf::from(".kshell.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/kshell/config.yaml"),
            PathBuf::from(&home).join(".config/kshell/config.yml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::KshellConfig;
    use crate::cli::CliArgs;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn empty_file_uses_defaults() {
        let config = KshellConfig::parse("").expect("empty config should parse");
        assert!(config.show_labels);
        assert!(config.context.is_none());
    }

    #[test]
    fn parses_known_fields() {
        let raw = "context: staging\nlog_filter: debug\nlog_file: /tmp/kshell.log\nshow_labels: false\n";
        let config = KshellConfig::parse(raw).expect("config should parse");
        assert_eq!(config.context.as_deref(), Some("staging"));
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/kshell.log")));
        assert!(!config.show_labels);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(KshellConfig::parse("show_labels: [not, a, bool]").is_err());
    }

    #[test]
    fn cli_flags_override_file() {
        let config = KshellConfig::parse("context: staging\nlog_filter: debug\n")
            .expect("config should parse");
        let args = CliArgs::parse_from(["kshell", "--context", "prod"]);

        let settings = config.merge(&args, None);
        assert_eq!(settings.context.as_deref(), Some("prod"));
        assert_eq!(settings.log_filter, "debug");
        assert!(settings.show_labels);
    }

    #[test]
    fn log_filter_defaults_to_info() {
        let args = CliArgs::parse_from(["kshell", "--no-labels"]);
        let settings = KshellConfig::default().merge(&args, None);
        assert_eq!(settings.log_filter, "info");
        assert!(!settings.show_labels);
    }
}
