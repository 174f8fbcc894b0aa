//! Persisted domain models for obligations, schedules, ledger entries, and
//! budget snapshots.

pub mod common;
pub mod ledger_entry;
pub mod obligation;
pub mod schedule;
pub mod snapshot;

pub use common::{Identifiable, NamedEntity};
pub use ledger_entry::LedgerEntry;
pub use obligation::{Biller, Installment, Obligation, ObligationRef};
pub use schedule::{PaymentSchedule, ScheduleStatus};
pub use snapshot::{BudgetSnapshot, SnapshotItem, SnapshotStatus};
