//! Backend manager configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use numlite_core::{BackendKind, NumliteError, Tolerance, DEFAULT_ATOL, DEFAULT_RTOL};

/// Environment variable consulted by [`ManagerConfig::from_env`].
pub const BACKEND_ENV_VAR: &str = "NUMLITE_BACKEND";

/// Which backend the manager should try to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Accelerated when it initializes, reference otherwise.
    #[default]
    Auto,
    Reference,
    /// Like `Auto`, but a failed initialization is logged as an error
    /// instead of a warning.
    Accelerated,
}

impl BackendPreference {
    /// Log level for falling back to the reference backend.
    pub fn fallback_level(self) -> log::Level {
        match self {
            BackendPreference::Accelerated => log::Level::Error,
            BackendPreference::Auto | BackendPreference::Reference => log::Level::Warn,
        }
    }
}

impl FromStr for BackendPreference {
    type Err = NumliteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(BackendPreference::Auto);
        }
        Ok(match s.parse::<BackendKind>()? {
            BackendKind::Reference => BackendPreference::Reference,
            BackendKind::Accelerated => BackendPreference::Accelerated,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub preference: BackendPreference,
    /// Relative tolerance for cross-backend comparisons.
    pub rtol: f64,
    /// Absolute tolerance for cross-backend comparisons.
    pub atol: f64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            preference: BackendPreference::Auto,
            rtol: DEFAULT_RTOL,
            atol: DEFAULT_ATOL,
        }
    }
}

impl ManagerConfig {
    pub fn with_preference(preference: BackendPreference) -> Self {
        Self {
            preference,
            ..Self::default()
        }
    }

    /// Defaults, with the preference taken from `NUMLITE_BACKEND` when set.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(BACKEND_ENV_VAR).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        let preference = match value {
            None => BackendPreference::Auto,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("ignoring {}={:?}: not a known backend", BACKEND_ENV_VAR, raw);
                BackendPreference::Auto
            }),
        };
        Self::with_preference(preference)
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.rtol, self.atol)
    }
}
