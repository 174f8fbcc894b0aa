//! Compares stored schedule state against ledger evidence and reports
//! discrepancies. Reconciliation never mutates; corrections go through the
//! explicit [`apply_correction`] path.

use chrono::Datelike;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{NamedEntity, Obligation, ObligationRef, PaymentSchedule};
use crate::errors::{EngineError, EngineResult};
use crate::period::Period;
use crate::store::{LedgerStore, ObligationStore};

/// What the caller should do with a discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    /// Stored and ledger-derived amounts agree.
    NoAction,
    /// The ledger holds evidence the stored state lacks.
    AcceptLedger,
    /// Stored claims a payment the ledger cannot corroborate; possibly a
    /// cash payment never logged or a naming mismatch.
    Investigate,
}

/// Outcome of reconciling one schedule against the ledger.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub schedule_id: Uuid,
    pub stored_paid_cents: Option<i64>,
    pub ledger_paid_cents: i64,
    pub difference_cents: i64,
    pub in_sync: bool,
    pub recommendation: Recommendation,
}

/// Reconciles the schedule of `reference` for `period`.
///
/// Two-path matching: a linked transaction is authoritative; unlinked
/// schedules fall back to fuzzy matching over the period's entries
/// (case-insensitive name containment, exact amount, same month, and for
/// billers the same timing bucket inferred from the entry's day-of-month).
pub fn reconcile<O, L>(
    obligations: &O,
    ledger: &L,
    reference: ObligationRef,
    period: Period,
) -> EngineResult<SyncReport>
where
    O: ObligationStore,
    L: LedgerStore,
{
    let obligation = obligations
        .obligation(reference)
        .ok_or(EngineError::ObligationNotFound(reference.id()))?;
    let schedule = obligations
        .schedules_for(reference)
        .into_iter()
        .find(|schedule| schedule.period == period)
        .ok_or_else(|| {
            EngineError::ScheduleNotFound(format!("{} in {period}", obligation.name()))
        })?;

    let ledger_paid_cents = match schedule.linked_transaction_id {
        // In sync by construction unless the entry was deleted out of band.
        Some(transaction_id) => ledger
            .entry(transaction_id)
            .map(|entry| entry.amount_cents)
            .unwrap_or(0),
        None => fuzzy_match_total(ledger, &obligation, &schedule),
    };

    let stored_paid_cents = schedule.paid_cents;
    let difference_cents = stored_paid_cents.unwrap_or(0) - ledger_paid_cents;
    let in_sync = difference_cents == 0;
    let recommendation = if in_sync {
        Recommendation::NoAction
    } else if ledger_paid_cents != 0 {
        Recommendation::AcceptLedger
    } else {
        Recommendation::Investigate
    };

    debug!(
        obligation = obligation.name(),
        %period,
        stored = ?stored_paid_cents,
        derived = ledger_paid_cents,
        "reconciled schedule"
    );
    Ok(SyncReport {
        schedule_id: schedule.id,
        stored_paid_cents,
        ledger_paid_cents,
        difference_cents,
        in_sync,
        recommendation,
    })
}

/// Sums the fuzzy candidate matches for an unlinked schedule. Amounts are
/// matched exactly; rounding slack would invite false positives across
/// similarly priced obligations. Entries claimed by other schedules are
/// excluded, but an entry still pointing back at this schedule counts:
/// that is the orphan a failed payment apply leaves behind, and this sweep
/// is where it surfaces.
fn fuzzy_match_total<L: LedgerStore>(
    ledger: &L,
    obligation: &Obligation,
    schedule: &PaymentSchedule,
) -> i64 {
    let needle = obligation.name().to_lowercase();
    ledger
        .entries_for_period(schedule.period)
        .iter()
        .filter(|entry| {
            entry
                .linked_schedule_id
                .map_or(true, |linked| linked == schedule.id)
        })
        .filter(|entry| entry.name.to_lowercase().contains(&needle))
        .filter(|entry| entry.amount_cents == schedule.expected_cents)
        .filter(|entry| match schedule.bucket {
            Some(bucket) => bucket.matches_day(entry.date.day()),
            None => true,
        })
        .map(|entry| entry.amount_cents)
        .sum()
}

/// Explicit correction path: overwrites a schedule's paid amount with a
/// ledger-derived value. Re-validates the link invariant first; a live
/// linked entry stays authoritative and rejects the correction. A
/// `new_paid_cents` of zero reverts the schedule to unpaid.
pub fn apply_correction<O, L>(
    obligations: &mut O,
    ledger: &L,
    schedule_id: Uuid,
    new_paid_cents: i64,
) -> EngineResult<PaymentSchedule>
where
    O: ObligationStore,
    L: LedgerStore,
{
    if new_paid_cents < 0 {
        return Err(EngineError::InvalidAmount(new_paid_cents));
    }
    let schedule = obligations
        .schedule(schedule_id)
        .ok_or_else(|| EngineError::ScheduleNotFound(schedule_id.to_string()))?;
    if let Some(transaction_id) = schedule.linked_transaction_id {
        if ledger.entry(transaction_id).is_some() {
            return Err(EngineError::DuplicatePayment(schedule_id));
        }
        // Stale link to a deleted entry; the correction clears it below.
    }

    let updated = if new_paid_cents == 0 {
        obligations.unlink_payment(schedule_id)?
    } else {
        obligations.correct_paid(schedule_id, new_paid_cents)?
    };
    if let ObligationRef::Installment(installment_id) = updated.obligation {
        crate::engine::payments::recompute_cumulative(obligations, installment_id)?;
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Biller, LedgerEntry};
    use crate::engine::generator::generate;
    use crate::engine::payments::{apply_payment, PaymentRequest};
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn internet_biller() -> Biller {
        let mut biller = Biller::new("Internet", "Utilities", 1500_00, Some(10));
        biller.created_at = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        biller.activation = NaiveDate::from_ymd_opt(2026, 1, 1);
        biller
    }

    fn seeded_store() -> (MemoryStore, ObligationRef) {
        let mut store = MemoryStore::new();
        let biller = internet_biller();
        let reference = ObligationRef::Biller(biller.id);
        let schedules = generate(&Obligation::Biller(biller.clone()), 3).unwrap();
        store.save_biller(biller).unwrap();
        store.insert_schedules(schedules).unwrap();
        (store, reference)
    }

    #[test]
    fn applied_payment_reconciles_in_sync() {
        let (mut store, reference) = seeded_store();
        let mut ledger = MemoryStore::new();
        let schedule_id = store.schedules_for(reference)[0].id;

        apply_payment(
            &mut store,
            &mut ledger,
            PaymentRequest {
                schedule_id,
                amount_cents: 1500_00,
                date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                account_id: Uuid::new_v4(),
                note: None,
            },
        )
        .unwrap();

        let report = reconcile(&store, &ledger, reference, Period::new(2026, 1)).unwrap();
        assert!(report.in_sync);
        assert_eq!(report.difference_cents, 0);
        assert_eq!(report.recommendation, Recommendation::NoAction);
    }

    #[test]
    fn fuzzy_match_requires_name_amount_and_bucket() {
        let (store, reference) = seeded_store();
        let mut ledger = MemoryStore::new();
        let account = Uuid::new_v4();

        // Matches: name contains "internet", exact amount, day 9 is first half.
        let date = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        ledger
            .create_entry(LedgerEntry::new("ACME Internet Jan", date, 1500_00, account))
            .unwrap();
        // Wrong amount.
        ledger
            .create_entry(LedgerEntry::new("Internet", date, 1499_00, account))
            .unwrap();
        // Wrong half of the month.
        let late = NaiveDate::from_ymd_opt(2026, 1, 28).unwrap();
        ledger
            .create_entry(LedgerEntry::new("Internet", late, 1500_00, account))
            .unwrap();
        // Wrong name.
        ledger
            .create_entry(LedgerEntry::new("Water", date, 1500_00, account))
            .unwrap();

        let report = reconcile(&store, &ledger, reference, Period::new(2026, 1)).unwrap();
        assert_eq!(report.ledger_paid_cents, 1500_00);
        assert_eq!(report.stored_paid_cents, None);
        assert_eq!(report.difference_cents, -1500_00);
        assert_eq!(report.recommendation, Recommendation::AcceptLedger);
    }

    #[test]
    fn orphaned_entry_for_this_schedule_counts_as_evidence() {
        let (store, reference) = seeded_store();
        let mut ledger = MemoryStore::new();
        let schedule = store.schedules_for(reference)[0].clone();
        let date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();

        // An entry left behind by a failed apply: it points at the schedule,
        // but the schedule itself was never linked.
        let mut orphan = LedgerEntry::new("Internet", date, 1500_00, Uuid::new_v4());
        orphan.linked_schedule_id = Some(schedule.id);
        ledger.create_entry(orphan).unwrap();

        // An identical entry claimed by some other schedule stays excluded.
        let mut claimed = LedgerEntry::new("Internet", date, 1500_00, Uuid::new_v4());
        claimed.linked_schedule_id = Some(Uuid::new_v4());
        ledger.create_entry(claimed).unwrap();

        let report = reconcile(&store, &ledger, reference, Period::new(2026, 1)).unwrap();
        assert_eq!(report.ledger_paid_cents, 1500_00);
        assert_eq!(report.recommendation, Recommendation::AcceptLedger);
    }

    #[test]
    fn stored_value_without_evidence_recommends_investigation() {
        let (mut store, reference) = seeded_store();
        let ledger = MemoryStore::new();
        let schedule_id = store.schedules_for(reference)[0].id;
        store.correct_paid(schedule_id, 1500_00).unwrap();

        let report = reconcile(&store, &ledger, reference, Period::new(2026, 1)).unwrap();
        assert!(!report.in_sync);
        assert_eq!(report.difference_cents, 1500_00);
        assert_eq!(report.recommendation, Recommendation::Investigate);
    }

    #[test]
    fn correction_is_rejected_while_a_live_link_exists() {
        let (mut store, reference) = seeded_store();
        let mut ledger = MemoryStore::new();
        let schedule_id = store.schedules_for(reference)[0].id;

        apply_payment(
            &mut store,
            &mut ledger,
            PaymentRequest {
                schedule_id,
                amount_cents: 1500_00,
                date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
                account_id: Uuid::new_v4(),
                note: None,
            },
        )
        .unwrap();

        let err = apply_correction(&mut store, &ledger, schedule_id, 1000_00).unwrap_err();
        assert!(matches!(err, EngineError::DuplicatePayment(_)));
    }

    #[test]
    fn correction_accepts_ledger_value_and_round_trips() {
        let (mut store, reference) = seeded_store();
        let mut ledger = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        ledger
            .create_entry(LedgerEntry::new("Internet", date, 1500_00, Uuid::new_v4()))
            .unwrap();

        let before = reconcile(&store, &ledger, reference, Period::new(2026, 1)).unwrap();
        assert_eq!(before.recommendation, Recommendation::AcceptLedger);

        apply_correction(&mut store, &ledger, before.schedule_id, before.ledger_paid_cents)
            .unwrap();
        let after = reconcile(&store, &ledger, reference, Period::new(2026, 1)).unwrap();
        assert!(after.in_sync);
    }

    #[test]
    fn correction_of_zero_reverts_to_unpaid() {
        let (mut store, reference) = seeded_store();
        let ledger = MemoryStore::new();
        let schedule_id = store.schedules_for(reference)[0].id;
        store.correct_paid(schedule_id, 1500_00).unwrap();

        let reverted = apply_correction(&mut store, &ledger, schedule_id, 0).unwrap();
        assert!(reverted.is_unpaid());
    }
}
