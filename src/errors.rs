use thiserror::Error;
use uuid::Uuid;

/// Error type that captures scheduling, payment, and persistence failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid obligation: {0}")]
    InvalidObligation(String),
    #[error("Obligation has neither a due day nor an activation date to anchor its cadence")]
    MissingCadenceAnchor,
    #[error("Schedule {0} already has a linked payment")]
    DuplicatePayment(Uuid),
    #[error("Schedule not found: {0}")]
    ScheduleNotFound(String),
    #[error("Obligation not found: {0}")]
    ObligationNotFound(Uuid),
    #[error("Payment amount must be positive, got {0} cents")]
    InvalidAmount(i64),
    #[error("Installment payments apply in order; next payable is #{expected}, got #{requested}")]
    OutOfOrderPayment { expected: u32, requested: u32 },
    #[error(
        "Ledger entry {entry} was written but schedule {schedule} could not be updated \
         and the entry rollback failed; flag for a reconciliation sweep"
    )]
    PartialApply { entry: Uuid, schedule: Uuid },
}

pub type EngineResult<T> = Result<T, EngineError>;
