//! The four-stage token lifecycle check:
//! generate → validate → cache-write → cache-read-back.

use std::fmt;
use std::time::Duration;

use crate::error::Error;
use crate::podinfo::ValidationResult;

pub mod pipeline;

pub use pipeline::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    GenerateToken,
    ValidateToken,
    CacheResult,
    VerifyCache,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::GenerateToken => "generate_token",
            Stage::ValidateToken => "validate_token",
            Stage::CacheResult => "cache_result",
            Stage::VerifyCache => "verify_cache",
        }
    }

    /// State reached when this stage succeeds.
    pub fn completes(&self) -> RunState {
        match self {
            Stage::GenerateToken => RunState::TokenGenerated,
            Stage::ValidateToken => RunState::TokenValidated,
            Stage::CacheResult => RunState::ResultCached,
            Stage::VerifyCache => RunState::Verified,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Linear run state. `Verified` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    TokenGenerated,
    TokenValidated,
    ResultCached,
    Verified,
    Failed(Stage),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Verified | RunState::Failed(_))
    }
}

/// The first failing stage and its cause.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

/// Summary of a run that reached `Verified`.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub validation: ValidationResult,
    pub key: String,
    pub cached_value_len: usize,
    pub stage_durations: Vec<(Stage, Duration)>,
}
