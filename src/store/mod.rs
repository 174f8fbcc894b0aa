//! Persistence boundaries for obligations, the ledger, and budget snapshots.
//!
//! The engine is stateless over these traits. Anything that guards a race,
//! such as the no-duplicate-link constraint on schedules, lives in the store
//! implementation as a conditional write, never as a read-then-write in the
//! engine.

pub mod json_backend;
pub mod memory;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{
    Biller, BudgetSnapshot, Installment, LedgerEntry, Obligation, ObligationRef, PaymentSchedule,
};
use crate::errors::EngineError;
use crate::period::{HalfPeriod, Period};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Payment fields written to a schedule when a ledger entry is linked.
#[derive(Debug, Clone, Copy)]
pub struct PaymentFields {
    pub paid_cents: i64,
    pub date_paid: NaiveDate,
    pub account_id: Uuid,
    pub transaction_id: Uuid,
}

/// Persists obligation definitions and their generated schedules.
pub trait ObligationStore {
    fn biller(&self, id: Uuid) -> Option<Biller>;
    fn installment(&self, id: Uuid) -> Option<Installment>;
    fn list_billers(&self) -> Vec<Biller>;
    fn list_installments(&self) -> Vec<Installment>;
    fn save_biller(&mut self, biller: Biller) -> Result<()>;
    fn save_installment(&mut self, installment: Installment) -> Result<()>;

    fn obligation(&self, reference: ObligationRef) -> Option<Obligation> {
        match reference {
            ObligationRef::Biller(id) => self.biller(id).map(Obligation::Biller),
            ObligationRef::Installment(id) => self.installment(id).map(Obligation::Installment),
        }
    }

    fn schedule(&self, id: Uuid) -> Option<PaymentSchedule>;
    /// Schedules for one obligation, ordered by period then payment number.
    fn schedules_for(&self, reference: ObligationRef) -> Vec<PaymentSchedule>;
    fn insert_schedules(&mut self, schedules: Vec<PaymentSchedule>) -> Result<()>;

    /// Conditionally links a payment: fails with
    /// [`EngineError::DuplicatePayment`] when the schedule already carries a
    /// linked transaction. This check-and-set must be atomic in the store;
    /// it is the engine's anti-double-payment guard.
    fn link_payment(&mut self, schedule_id: Uuid, fields: PaymentFields) -> Result<PaymentSchedule>;

    /// Nulls `paid_cents`, `date_paid`, `linked_account_id`, and
    /// `linked_transaction_id`. Idempotent: reverting an already-reverted
    /// schedule is a no-op.
    fn unlink_payment(&mut self, schedule_id: Uuid) -> Result<PaymentSchedule>;

    /// Correction write: overwrites `paid_cents` and nulls the stale
    /// transaction link along with `date_paid` and `linked_account_id`,
    /// which belonged to the entry the correction replaces. Callers must
    /// validate the link invariant first.
    fn correct_paid(&mut self, schedule_id: Uuid, paid_cents: i64) -> Result<PaymentSchedule>;

    /// Deletes schedules for `reference` from `from` forward, but only those
    /// with no recorded payment. The unpaid condition is evaluated inside
    /// the store. Returns the number removed.
    fn delete_unpaid_schedules(&mut self, reference: ObligationRef, from: Period) -> Result<usize>;
}

/// Persists money-movement records.
pub trait LedgerStore {
    fn create_entry(&mut self, entry: LedgerEntry) -> Result<Uuid>;
    fn entry(&self, id: Uuid) -> Option<LedgerEntry>;
    fn entries_for_period(&self, period: Period) -> Vec<LedgerEntry>;
    fn entries_for_period_and_account(&self, period: Period, account_id: Uuid)
        -> Vec<LedgerEntry>;
    /// Removes an entry, returning it so the caller can run the schedule
    /// revert path on anything it was linked to.
    fn delete_entry(&mut self, id: Uuid) -> Result<Option<LedgerEntry>>;
}

/// Persists per-half-period budget snapshots.
pub trait SnapshotStore {
    fn snapshot(&self, period: HalfPeriod) -> Option<BudgetSnapshot>;
    /// Saves a snapshot, refreshing its `total_cents` cache so the stored
    /// value always equals the live included-item sum. Saving stamps the
    /// snapshot [`SnapshotStatus::Saved`]; drafts exist only in memory,
    /// never in the store.
    ///
    /// [`SnapshotStatus::Saved`]: crate::domain::SnapshotStatus::Saved
    fn save_snapshot(&mut self, snapshot: BudgetSnapshot) -> Result<()>;
}

pub use memory::MemoryStore;
