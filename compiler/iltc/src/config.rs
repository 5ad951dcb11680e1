//! Translator configuration.

use ilt_rewrite::RewriteOptions;

/// Environment variable overriding the worker count (`auto` or a positive number).
pub const THREADS_ENV: &str = "ILT_THREADS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid thread count '{value}': expected `auto` or a positive number")]
    InvalidThreads { value: String },
    #[error("unknown translator option '{0}'")]
    UnknownOption(String),
}

/// How a [`Translator`](crate::Translator) schedules and rewrites members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Translate members on a worker pool.
    pub parallel: bool,
    /// Worker count; one per core when `None`.
    pub threads: Option<usize>,
    /// Require `String.Concat` operands to be strictly `System.String`.
    pub strict_concat_args: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            parallel: true,
            threads: None,
            strict_concat_args: true,
        }
    }
}

impl TranslatorConfig {
    /// Defaults, with [`THREADS_ENV`] applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults, with environment overrides read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = TranslatorConfig::default();
        if let Some(value) = lookup(THREADS_ENV) {
            config.threads = parse_threads(&value)?;
        }
        Ok(config)
    }

    /// Apply `--threads=N`, `--sequential` and `--loose-concat`.
    ///
    /// Arguments not starting with `--` are left for the caller.
    pub fn apply_options(&mut self, args: &[String]) -> Result<(), ConfigError> {
        for arg in args {
            if let Some(threads) = arg.strip_prefix("--threads=") {
                self.threads = parse_threads(threads)?;
            } else if arg == "--sequential" {
                self.parallel = false;
            } else if arg == "--loose-concat" {
                self.strict_concat_args = false;
            } else if arg.starts_with("--") {
                return Err(ConfigError::UnknownOption(arg.clone()));
            }
        }
        Ok(())
    }

    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            strict_string_check: self.strict_concat_args,
        }
    }
}

/// Environment first, then command-line options on top.
pub fn parse_translator_options(args: &[String]) -> Result<TranslatorConfig, ConfigError> {
    let mut config = TranslatorConfig::from_env()?;
    config.apply_options(args)?;
    Ok(config)
}

fn parse_threads(value: &str) -> Result<Option<usize>, ConfigError> {
    if value == "auto" {
        return Ok(None);
    }
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError::InvalidThreads {
            value: value.to_owned(),
        }),
    }
}
