#![forbid(unsafe_code)]

//! Runtime configuration (deterministic, env-overridable).
//!
//! # Environment Variables
//! - `FRX_UNHANDLED_ERROR` = drop|log
//! - `FRX_DEBUG` (bool)
//! - `FRX_DEBUG_VALUE_LIMIT` (usize, > 0)
//!
//! Unparseable values leave the default in place and are reported through
//! [`RxConfigParse::errors`].

use std::env;
use std::fmt;
use std::sync::OnceLock;

use crate::error::RxConfigError;

const ENV_UNHANDLED_ERROR: &str = "FRX_UNHANDLED_ERROR";
const ENV_DEBUG: &str = "FRX_DEBUG";
const ENV_DEBUG_VALUE_LIMIT: &str = "FRX_DEBUG_VALUE_LIMIT";

static GLOBAL: OnceLock<RxConfig> = OnceLock::new();

/// What happens to an `Error` event whose observer has no error callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhandledErrorPolicy {
    /// Discard silently.
    #[default]
    Drop,
    /// Emit a `tracing::warn!` and discard.
    Log,
}

impl UnhandledErrorPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "drop" => Some(Self::Drop),
            "log" => Some(Self::Log),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for UnhandledErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxConfig {
    pub unhandled_error: UnhandledErrorPolicy,
    /// Whether the `debug(tag)` tap logs anything.
    pub debug_enabled: bool,
    /// Max characters of an event rendering logged by `debug(tag)`.
    pub debug_value_limit: usize,
}

impl Default for RxConfig {
    fn default() -> Self {
        Self {
            unhandled_error: UnhandledErrorPolicy::Drop,
            debug_enabled: true,
            debug_value_limit: 256,
        }
    }
}

/// Configuration parse diagnostics (env + validation).
#[derive(Debug, Clone)]
pub struct RxConfigParse {
    pub config: RxConfig,
    pub errors: Vec<RxConfigError>,
}

impl RxConfig {
    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with_diagnostics().config
    }

    /// Parse config from environment variables and return diagnostics.
    #[must_use]
    pub fn from_env_with_diagnostics() -> RxConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Parse config through an arbitrary key lookup.
    pub fn from_env_with<F>(mut get: F) -> RxConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = get(ENV_UNHANDLED_ERROR) {
            match UnhandledErrorPolicy::parse(&value) {
                Some(parsed) => config.unhandled_error = parsed,
                None => errors.push(RxConfigError::new(
                    "unhandled_error",
                    value,
                    "expected drop|log",
                )),
            }
        }

        if let Some(value) = get(ENV_DEBUG) {
            match parse_bool(&value) {
                Some(parsed) => config.debug_enabled = parsed,
                None => errors.push(RxConfigError::new(
                    "debug_enabled",
                    value,
                    "expected bool (1/0/true/false)",
                )),
            }
        }

        if let Some(value) = get(ENV_DEBUG_VALUE_LIMIT) {
            match parse_usize(&value) {
                Some(parsed) => config.debug_value_limit = parsed,
                None => errors.push(RxConfigError::new(
                    "debug_value_limit",
                    value,
                    "expected usize",
                )),
            }
        }

        if let Err(mut invalid) = config.validate() {
            errors.append(&mut invalid);
            config.debug_value_limit = Self::default().debug_value_limit;
        }

        RxConfigParse { config, errors }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<RxConfigError>> {
        let mut errors = Vec::new();
        if self.debug_value_limit == 0 {
            errors.push(RxConfigError::new(
                "debug_value_limit",
                "0",
                "must be greater than zero",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The process-wide config, loaded from the environment on first use.
    pub fn global() -> &'static RxConfig {
        GLOBAL.get_or_init(|| {
            let parsed = Self::from_env_with_diagnostics();
            for err in &parsed.errors {
                tracing::warn!(target: "frx::config", %err, "ignoring invalid frx setting");
            }
            parsed.config
        })
    }

    /// Install `self` as the process-wide config.
    ///
    /// Fails (returning `self`) once the global config has been read or
    /// installed.
    pub fn install(self) -> Result<(), RxConfig> {
        GLOBAL.set(self)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}
