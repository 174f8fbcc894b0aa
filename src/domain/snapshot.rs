use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::period::HalfPeriod;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SnapshotStatus {
    #[default]
    Draft,
    Saved,
}

/// One budget line inside a snapshot category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub name: String,
    pub amount_cents: i64,
    pub included: bool,
    /// Loose reference back to the obligation this line was derived from,
    /// when it was not added ad hoc.
    #[serde(default)]
    pub obligation_id: Option<Uuid>,
}

impl SnapshotItem {
    pub fn new(name: impl Into<String>, amount_cents: i64) -> Self {
        Self {
            name: name.into(),
            amount_cents,
            included: true,
            obligation_id: None,
        }
    }
}

/// A manually curated budget configuration for one month half.
///
/// Obligation schedules are folded into the items at save time, so the
/// projection engine reads `total_cents` and never re-sums raw schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub id: Uuid,
    pub period: HalfPeriod,
    #[serde(default)]
    pub status: SnapshotStatus,
    /// Category name to budget lines.
    #[serde(default)]
    pub items: BTreeMap<String, Vec<SnapshotItem>>,
    pub projected_salary_cents: i64,
    #[serde(default)]
    pub actual_salary_cents: Option<i64>,
    /// Cache of the included-item sum, refreshed on every save. Never a
    /// source of truth on its own.
    #[serde(default)]
    pub total_cents: i64,
}

impl BudgetSnapshot {
    pub fn new(period: HalfPeriod, projected_salary_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            period,
            status: SnapshotStatus::Draft,
            items: BTreeMap::new(),
            projected_salary_cents,
            actual_salary_cents: None,
            total_cents: 0,
        }
    }

    pub fn push_item(&mut self, category: &str, item: SnapshotItem) {
        self.items.entry(category.to_string()).or_default().push(item);
    }

    /// Live sum over included items.
    pub fn included_total(&self) -> i64 {
        self.items
            .values()
            .flatten()
            .filter(|item| item.included)
            .map(|item| item.amount_cents)
            .sum()
    }

    pub fn recompute_total(&mut self) {
        self.total_cents = self.included_total();
    }

    /// Income for the period: the actual salary once known, otherwise the
    /// projection. The two are never summed.
    pub fn income_cents(&self) -> i64 {
        self.actual_salary_cents
            .unwrap_or(self.projected_salary_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::TimingBucket;

    fn snapshot() -> BudgetSnapshot {
        BudgetSnapshot::new(
            HalfPeriod::new(2026, 1, TimingBucket::FirstHalf),
            11_000_00,
        )
    }

    #[test]
    fn excluded_items_do_not_count_toward_total() {
        let mut snapshot = snapshot();
        snapshot.push_item("Utilities", SnapshotItem::new("Internet", 1500_00));
        let mut skipped = SnapshotItem::new("Gym", 500_00);
        skipped.included = false;
        snapshot.push_item("Health", skipped);

        snapshot.recompute_total();
        assert_eq!(snapshot.total_cents, 1500_00);
    }

    #[test]
    fn actual_salary_overrides_projection_without_summing() {
        let mut snapshot = snapshot();
        assert_eq!(snapshot.income_cents(), 11_000_00);

        snapshot.actual_salary_cents = Some(9_500_00);
        assert_eq!(snapshot.income_cents(), 9_500_00);
    }
}
