//! Backend trait that combines all operations

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NumliteError;
use crate::ops::*;

/// The two interchangeable backend variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Portable pure-Rust implementation, always available.
    Reference,
    /// Native kernel module, usable once initialized.
    Accelerated,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Reference => "reference",
            BackendKind::Accelerated => "accelerated",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = NumliteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" | "cpu" | "js" => Ok(BackendKind::Reference),
            "accelerated" | "wasm" | "native" => Ok(BackendKind::Accelerated),
            other => Err(NumliteError::UnknownBackend(other.to_string())),
        }
    }
}

/// A complete backend implementation
///
/// Backends implement the individual operation traits; this trait adds the
/// identity and readiness queries the backend manager needs. It is object
/// safe, so the selected variant is held as `Arc<dyn Backend>`.
pub trait Backend: MathOps + StatsOps + LinalgOps + FftOps + Send + Sync {
    /// Backend name for identification
    fn name(&self) -> &'static str;

    fn kind(&self) -> BackendKind;

    /// Backend version
    fn version(&self) -> &'static str;

    /// Whether operations can run right now.
    fn is_ready(&self) -> bool {
        self.ensure_ready().is_ok()
    }
}
