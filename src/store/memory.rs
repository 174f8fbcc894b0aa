use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Biller, BudgetSnapshot, Installment, LedgerEntry, ObligationRef, PaymentSchedule,
    SnapshotStatus,
};
use crate::errors::EngineError;
use crate::period::{HalfPeriod, Period};
use crate::store::{LedgerStore, ObligationStore, PaymentFields, Result, SnapshotStore};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// In-process backend implementing all three store boundaries. Also the
/// serializable state persisted by the JSON backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub billers: Vec<Biller>,
    #[serde(default)]
    pub installments: Vec<Installment>,
    #[serde(default)]
    pub schedules: Vec<PaymentSchedule>,
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
    #[serde(default)]
    pub snapshots: Vec<BudgetSnapshot>,
    #[serde(default = "MemoryStore::schema_version_default")]
    pub schema_version: u8,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            ..Default::default()
        }
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    fn schedule_mut(&mut self, id: Uuid) -> Result<&mut PaymentSchedule> {
        self.schedules
            .iter_mut()
            .find(|schedule| schedule.id == id)
            .ok_or_else(|| EngineError::ScheduleNotFound(id.to_string()))
    }
}

impl ObligationStore for MemoryStore {
    fn biller(&self, id: Uuid) -> Option<Biller> {
        self.billers.iter().find(|biller| biller.id == id).cloned()
    }

    fn installment(&self, id: Uuid) -> Option<Installment> {
        self.installments
            .iter()
            .find(|installment| installment.id == id)
            .cloned()
    }

    fn list_billers(&self) -> Vec<Biller> {
        self.billers.clone()
    }

    fn list_installments(&self) -> Vec<Installment> {
        self.installments.clone()
    }

    fn save_biller(&mut self, biller: Biller) -> Result<()> {
        match self.billers.iter_mut().find(|stored| stored.id == biller.id) {
            Some(stored) => *stored = biller,
            None => self.billers.push(biller),
        }
        Ok(())
    }

    fn save_installment(&mut self, installment: Installment) -> Result<()> {
        match self
            .installments
            .iter_mut()
            .find(|stored| stored.id == installment.id)
        {
            Some(stored) => *stored = installment,
            None => self.installments.push(installment),
        }
        Ok(())
    }

    fn schedule(&self, id: Uuid) -> Option<PaymentSchedule> {
        self.schedules
            .iter()
            .find(|schedule| schedule.id == id)
            .cloned()
    }

    fn schedules_for(&self, reference: ObligationRef) -> Vec<PaymentSchedule> {
        let mut found: Vec<PaymentSchedule> = self
            .schedules
            .iter()
            .filter(|schedule| schedule.obligation == reference)
            .cloned()
            .collect();
        found.sort_by_key(|schedule| (schedule.period, schedule.payment_number));
        found
    }

    fn insert_schedules(&mut self, schedules: Vec<PaymentSchedule>) -> Result<()> {
        self.schedules.extend(schedules);
        Ok(())
    }

    fn link_payment(&mut self, schedule_id: Uuid, fields: PaymentFields) -> Result<PaymentSchedule> {
        let schedule = self.schedule_mut(schedule_id)?;
        if schedule.linked_transaction_id.is_some() {
            return Err(EngineError::DuplicatePayment(schedule_id));
        }
        schedule.paid_cents = Some(fields.paid_cents);
        schedule.date_paid = Some(fields.date_paid);
        schedule.linked_account_id = Some(fields.account_id);
        schedule.linked_transaction_id = Some(fields.transaction_id);
        Ok(schedule.clone())
    }

    fn unlink_payment(&mut self, schedule_id: Uuid) -> Result<PaymentSchedule> {
        let schedule = self.schedule_mut(schedule_id)?;
        schedule.paid_cents = None;
        schedule.date_paid = None;
        schedule.linked_account_id = None;
        schedule.linked_transaction_id = None;
        Ok(schedule.clone())
    }

    fn correct_paid(&mut self, schedule_id: Uuid, paid_cents: i64) -> Result<PaymentSchedule> {
        let schedule = self.schedule_mut(schedule_id)?;
        schedule.paid_cents = Some(paid_cents);
        schedule.date_paid = None;
        schedule.linked_account_id = None;
        schedule.linked_transaction_id = None;
        Ok(schedule.clone())
    }

    fn delete_unpaid_schedules(&mut self, reference: ObligationRef, from: Period) -> Result<usize> {
        let before = self.schedules.len();
        self.schedules.retain(|schedule| {
            !(schedule.obligation == reference
                && schedule.period >= from
                && schedule.is_unpaid())
        });
        Ok(before - self.schedules.len())
    }
}

impl LedgerStore for MemoryStore {
    fn create_entry(&mut self, entry: LedgerEntry) -> Result<Uuid> {
        let id = entry.id;
        self.entries.push(entry);
        Ok(id)
    }

    fn entry(&self, id: Uuid) -> Option<LedgerEntry> {
        self.entries.iter().find(|entry| entry.id == id).cloned()
    }

    fn entries_for_period(&self, period: Period) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|entry| period.contains(entry.date))
            .cloned()
            .collect()
    }

    fn entries_for_period_and_account(
        &self,
        period: Period,
        account_id: Uuid,
    ) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|entry| period.contains(entry.date) && entry.account_id == account_id)
            .cloned()
            .collect()
    }

    fn delete_entry(&mut self, id: Uuid) -> Result<Option<LedgerEntry>> {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => Ok(Some(self.entries.remove(index))),
            None => Ok(None),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn snapshot(&self, period: HalfPeriod) -> Option<BudgetSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.period == period)
            .cloned()
    }

    fn save_snapshot(&mut self, mut snapshot: BudgetSnapshot) -> Result<()> {
        snapshot.recompute_total();
        snapshot.status = SnapshotStatus::Saved;
        match self
            .snapshots
            .iter_mut()
            .find(|stored| stored.period == snapshot.period)
        {
            Some(stored) => *stored = snapshot,
            None => self.snapshots.push(snapshot),
        }
        Ok(())
    }
}
