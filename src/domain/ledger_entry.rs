use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, NamedEntity};

/// A money-movement record owned by the ledger store. The engine appends
/// entries when payments apply and reverts schedules when entries vanish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    /// Signed amount in cents; outflows are positive.
    pub amount_cents: i64,
    pub account_id: Uuid,
    /// Set once this entry is definitively tied to a schedule instance.
    #[serde(default)]
    pub linked_schedule_id: Option<Uuid>,
}

impl LedgerEntry {
    pub fn new(
        name: impl Into<String>,
        date: NaiveDate,
        amount_cents: i64,
        account_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date,
            amount_cents,
            account_id,
            linked_schedule_id: None,
        }
    }
}

impl Identifiable for LedgerEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for LedgerEntry {
    fn name(&self) -> &str {
        &self.name
    }
}
