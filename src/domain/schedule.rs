use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;
use crate::domain::obligation::ObligationRef;
use crate::period::{Period, TimingBucket};

/// One dated, payable instance of an obligation.
///
/// Invariants: at most one live ledger entry may be linked at a time, and
/// `paid_cents`, once set, only changes through the explicit correction
/// path that re-derives it from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub id: Uuid,
    pub obligation: ObligationRef,
    pub period: Period,
    /// Billers only: half-month timing tag captured at generation time.
    #[serde(default)]
    pub bucket: Option<TimingBucket>,
    /// Installments only: 1-based position enforcing ordered application.
    #[serde(default)]
    pub payment_number: Option<u32>,
    pub expected_cents: i64,
    #[serde(default)]
    pub paid_cents: Option<i64>,
    #[serde(default)]
    pub date_paid: Option<NaiveDate>,
    #[serde(default)]
    pub linked_account_id: Option<Uuid>,
    #[serde(default)]
    pub linked_transaction_id: Option<Uuid>,
}

impl PaymentSchedule {
    pub fn for_biller(
        biller_id: Uuid,
        period: Period,
        bucket: TimingBucket,
        expected_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            obligation: ObligationRef::Biller(biller_id),
            period,
            bucket: Some(bucket),
            payment_number: None,
            expected_cents,
            paid_cents: None,
            date_paid: None,
            linked_account_id: None,
            linked_transaction_id: None,
        }
    }

    pub fn for_installment(
        installment_id: Uuid,
        period: Period,
        payment_number: u32,
        expected_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            obligation: ObligationRef::Installment(installment_id),
            period,
            bucket: None,
            payment_number: Some(payment_number),
            expected_cents,
            paid_cents: None,
            date_paid: None,
            linked_account_id: None,
            linked_transaction_id: None,
        }
    }

    pub fn is_unpaid(&self) -> bool {
        self.paid_cents.is_none()
    }

    /// End of the due window, derived from the period and timing bucket.
    pub fn due_end(&self) -> NaiveDate {
        self.period.due_end(self.bucket)
    }

    /// Derives the display status from stored amounts and an injected
    /// current date. Never stored.
    pub fn status(&self, today: NaiveDate) -> ScheduleStatus {
        match self.paid_cents {
            Some(paid) if paid >= self.expected_cents => ScheduleStatus::Paid,
            Some(paid) if paid > 0 => ScheduleStatus::Partial,
            _ => {
                if today > self.due_end() {
                    ScheduleStatus::Overdue
                } else {
                    ScheduleStatus::Pending
                }
            }
        }
    }
}

impl Identifiable for PaymentSchedule {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Read-side status of a schedule instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    Pending,
    Overdue,
    Partial,
    Paid,
}
