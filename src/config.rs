//! Configuration: ambient concerns only (logging, trace verbosity, sanity
//! limits), loaded the way the reference crate's `Config::load` does —
//! `config.toml` merged with `EXPERT_SYSTEM_`-prefixed environment
//! variables. Never influences solving semantics.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Top-level configuration, all fields defaulted so an absent
/// `config.toml` is never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub explain: ExplainConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn`, or `error`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainConfig {
    /// Whether memoization hits appear in the `--explain` trace.
    #[serde(default = "default_true")]
    pub show_memo_hits: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Sanity ceiling on distinct symbols in one program; exceeding it is
    /// a syntax error rather than a silent truncation.
    #[serde(default = "default_max_symbols")]
    pub max_symbols: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_true() -> bool {
    true
}
fn default_max_symbols() -> usize {
    26
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ExplainConfig {
    fn default() -> Self {
        ExplainConfig { show_memo_hits: default_true() }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            max_symbols: default_max_symbols(),
        }
    }
}

impl Config {
    /// Merges `config.toml` (if present) with `EXPERT_SYSTEM_`-prefixed
    /// environment variables (`EXPERT_SYSTEM_LOGGING__LEVEL=debug`, etc.).
    /// Works with no files present, falling back entirely to defaults.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("EXPERT_SYSTEM_").split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            explain: ExplainConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_fallbacks() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.resolver.max_symbols, 26);
        assert!(config.explain.show_memo_hits);
    }

    #[test]
    fn load_with_no_files_present_falls_back_to_default() {
        // No config.toml in the crate root during tests: load() must not error.
        let config = Config::load().expect("load should fall back to defaults");
        assert_eq!(config.logging.format, "text");
    }
}
