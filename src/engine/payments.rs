//! Records payments against schedule instances, atomically with ledger
//! entry creation, and reverts schedules when their entries are deleted.

use chrono::NaiveDate;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{LedgerEntry, NamedEntity, ObligationRef, PaymentSchedule};
use crate::errors::{EngineError, EngineResult};
use crate::store::{LedgerStore, ObligationStore, PaymentFields};

/// Caller-supplied payment details.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub schedule_id: Uuid,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub account_id: Uuid,
    pub note: Option<String>,
}

/// Applies a payment to one schedule: creates the ledger entry and links it
/// in a single logical step. The store-level link guard makes a retried or
/// concurrent duplicate fail with [`EngineError::DuplicatePayment`] instead
/// of double-applying.
pub fn apply_payment<O, L>(
    obligations: &mut O,
    ledger: &mut L,
    request: PaymentRequest,
) -> EngineResult<PaymentSchedule>
where
    O: ObligationStore,
    L: LedgerStore,
{
    if request.amount_cents <= 0 {
        return Err(EngineError::InvalidAmount(request.amount_cents));
    }
    let schedule = obligations
        .schedule(request.schedule_id)
        .ok_or_else(|| EngineError::ScheduleNotFound(request.schedule_id.to_string()))?;
    if schedule.linked_transaction_id.is_some() {
        return Err(EngineError::DuplicatePayment(schedule.id));
    }
    if let ObligationRef::Installment(_) = schedule.obligation {
        ensure_lowest_unpaid(obligations, &schedule)?;
    }
    let obligation = obligations
        .obligation(schedule.obligation)
        .ok_or_else(|| EngineError::ObligationNotFound(schedule.obligation.id()))?;

    let entry_name = match &request.note {
        Some(note) => format!("{} ({note})", obligation.name()),
        None => obligation.name().to_string(),
    };
    let mut entry = LedgerEntry::new(entry_name, request.date, request.amount_cents, request.account_id);
    entry.linked_schedule_id = Some(schedule.id);
    let entry_id = ledger.create_entry(entry)?;

    let fields = PaymentFields {
        paid_cents: request.amount_cents,
        date_paid: request.date,
        account_id: request.account_id,
        transaction_id: entry_id,
    };
    let updated = match obligations.link_payment(schedule.id, fields) {
        Ok(updated) => updated,
        Err(link_err) => {
            // The entry must not outlive a failed link. If the rollback also
            // fails the ledger holds an orphan and the caller must hear
            // about it loudly.
            if ledger.delete_entry(entry_id).is_err() {
                error!(
                    entry = %entry_id,
                    schedule = %schedule.id,
                    "payment partially applied; ledger entry orphaned"
                );
                return Err(EngineError::PartialApply {
                    entry: entry_id,
                    schedule: schedule.id,
                });
            }
            return Err(link_err);
        }
    };

    if let ObligationRef::Installment(installment_id) = updated.obligation {
        recompute_cumulative(obligations, installment_id)?;
    }
    info!(
        obligation = obligation.name(),
        period = %updated.period,
        amount_cents = request.amount_cents,
        "payment applied"
    );
    Ok(updated)
}

fn ensure_lowest_unpaid<O: ObligationStore>(
    obligations: &O,
    schedule: &PaymentSchedule,
) -> EngineResult<()> {
    let next_payable = obligations
        .schedules_for(schedule.obligation)
        .into_iter()
        .filter(|candidate| candidate.is_unpaid())
        .filter_map(|candidate| candidate.payment_number)
        .min();
    match (next_payable, schedule.payment_number) {
        (Some(expected), Some(requested)) if requested != expected => {
            Err(EngineError::OutOfOrderPayment { expected, requested })
        }
        _ => Ok(()),
    }
}

/// Recomputes an installment's paid total as the full sum over its
/// schedules. A recompute-on-write cache, never an incremented counter.
pub fn recompute_cumulative<O: ObligationStore>(
    obligations: &mut O,
    installment_id: Uuid,
) -> EngineResult<i64> {
    let mut installment = obligations
        .installment(installment_id)
        .ok_or(EngineError::ObligationNotFound(installment_id))?;
    let total = obligations
        .schedules_for(ObligationRef::Installment(installment_id))
        .iter()
        .filter_map(|schedule| schedule.paid_cents)
        .sum();
    installment.cumulative_paid_cents = total;
    obligations.save_installment(installment)?;
    Ok(total)
}

/// Ledger-deletion hook: returns the linked schedule to its unpaid state.
/// Idempotent; reverting an already-reverted schedule is a no-op.
pub fn revert_deleted_entry<O: ObligationStore>(
    obligations: &mut O,
    entry: &LedgerEntry,
) -> EngineResult<()> {
    let Some(schedule_id) = entry.linked_schedule_id else {
        return Ok(());
    };
    let Some(schedule) = obligations.schedule(schedule_id) else {
        return Ok(());
    };
    if schedule.linked_transaction_id != Some(entry.id) {
        // Already reverted, or superseded by a different entry.
        return Ok(());
    }
    obligations.unlink_payment(schedule_id)?;
    if let ObligationRef::Installment(installment_id) = schedule.obligation {
        recompute_cumulative(obligations, installment_id)?;
    }
    info!(schedule = %schedule_id, entry = %entry.id, "schedule reverted after entry deletion");
    Ok(())
}

/// Deletes a ledger entry and runs the revert path on whatever it was
/// linked to.
pub fn delete_entry<O, L>(
    obligations: &mut O,
    ledger: &mut L,
    entry_id: Uuid,
) -> EngineResult<Option<LedgerEntry>>
where
    O: ObligationStore,
    L: LedgerStore,
{
    let removed = ledger.delete_entry(entry_id)?;
    if let Some(entry) = &removed {
        revert_deleted_entry(obligations, entry)?;
    }
    Ok(removed)
}
