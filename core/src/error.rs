use thiserror::Error;

/// Coarse error classification, used where callers only need to distinguish
/// a rejected request from a missing resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    NotFound,
}

/// Errors surfaced by the progress engine.
///
/// Command failures are deliberately *not* represented here: a command that
/// fails during execution is collapsed into its own status record and never
/// aborts siblings (see `executor::unit`).
#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("stage weights exceed the progress budget: requested {requested}, remaining {remaining}")]
    BudgetExceeded { requested: u8, remaining: u8 },

    #[error("progress reported before any stage was started")]
    NoActiveStage,

    #[error("negative progress value: current {current} (total {total})")]
    NegativeProgress { current: i64, total: i64 },

    #[error("unknown progress id: {0}")]
    UnknownId(String),
}

impl ProgressError {
    /// Map to a coarse error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::BudgetExceeded { .. } => ErrorCode::ValidationError,
            Self::NoActiveStage => ErrorCode::ValidationError,
            Self::NegativeProgress { .. } => ErrorCode::ValidationError,
            Self::UnknownId(_) => ErrorCode::NotFound,
        }
    }
}
