//! Environment configuration, validation, and error types.
//!
//! [`EnvConfig`] is the builder-input for constructing an
//! [`Env`](crate::Env). [`validate()`](EnvConfig::validate) checks its
//! invariants; [`Env::new`](crate::Env::new) calls it before building
//! anything.

use thiserror::Error;

// ── DispatchMode ───────────────────────────────────────────────────

/// When queued finalizers run relative to the collection that queued them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Drain the finalizer queue at the end of every collection cycle.
    #[default]
    Inline,
    /// Leave queued finalizers for an explicit
    /// [`drain_finalizers`](crate::Env::drain_finalizers) pass, the way an
    /// event loop runs them on a later turn.
    Deferred,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EnvConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `auto_collect_after` was `Some(0)`.
    #[error("auto_collect_after must be at least 1 when set")]
    ZeroAutoCollect,
}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Configuration for a wrapping environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    /// Finalizer dispatch timing. Default: [`DispatchMode::Inline`].
    pub dispatch: DispatchMode,
    /// Run a collection automatically once this many objects have been
    /// allocated since the previous one. `None` = collections only run
    /// when requested. Default: `None`.
    pub auto_collect_after: Option<usize>,
    /// Finalize every still-live wrapper when the environment is torn
    /// down. Default: `true`.
    pub finalize_on_teardown: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::Inline,
            auto_collect_after: None,
            finalize_on_teardown: true,
        }
    }
}

impl EnvConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auto_collect_after == Some(0) {
            return Err(ConfigError::ZeroAutoCollect);
        }
        Ok(())
    }

    /// Same configuration with deferred finalizer dispatch.
    pub fn deferred() -> Self {
        Self {
            dispatch: DispatchMode::Deferred,
            ..Self::default()
        }
    }
}
