//! Read-side aggregation of budget snapshots into period and range-level
//! income, allocated spend, and remaining figures.

use serde::Serialize;

use crate::period::{HalfPeriod, Period};
use crate::store::SnapshotStore;

/// Income versus allocated spend for one half-period.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodProjection {
    pub period: HalfPeriod,
    pub income_cents: i64,
    pub obligated_cents: i64,
    pub remaining_cents: i64,
}

/// Remaining averaged across the two halves of one month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyAverage {
    pub period: Period,
    pub average_remaining_cents: f64,
}

/// Projects every half-period from `start` through `end` inclusive.
///
/// A swapped range yields an empty sequence rather than an error; callers
/// commonly flip ranges in a UI and the empty result is the right signal.
/// Snapshots already fold generated schedules into their totals at save
/// time, so this reads `total_cents` and never re-sums raw schedules.
pub fn project<S: SnapshotStore>(
    snapshots: &S,
    start: HalfPeriod,
    end: HalfPeriod,
) -> Vec<PeriodProjection> {
    HalfPeriod::range_inclusive(start, end)
        .into_iter()
        .map(|period| match snapshots.snapshot(period) {
            Some(snapshot) => {
                let income_cents = snapshot.income_cents();
                let obligated_cents = snapshot.total_cents;
                PeriodProjection {
                    period,
                    income_cents,
                    obligated_cents,
                    remaining_cents: income_cents - obligated_cents,
                }
            }
            None => PeriodProjection {
                period,
                income_cents: 0,
                obligated_cents: 0,
                remaining_cents: 0,
            },
        })
        .collect()
}

/// Groups same-month projections (the two timing halves) and averages their
/// remaining values. Output is chronological when the input is.
pub fn monthly_averages(projections: &[PeriodProjection]) -> Vec<MonthlyAverage> {
    let mut out: Vec<MonthlyAverage> = Vec::new();
    let mut current: Option<(Period, i64, u32)> = None;

    for projection in projections {
        let month = projection.period.period;
        match current.as_mut() {
            Some((period, sum, count)) if *period == month => {
                *sum += projection.remaining_cents;
                *count += 1;
            }
            _ => {
                if let Some((period, sum, count)) = current.take() {
                    out.push(average_of(period, sum, count));
                }
                current = Some((month, projection.remaining_cents, 1));
            }
        }
    }
    if let Some((period, sum, count)) = current {
        out.push(average_of(period, sum, count));
    }
    out
}

fn average_of(period: Period, sum: i64, count: u32) -> MonthlyAverage {
    MonthlyAverage {
        period,
        average_remaining_cents: sum as f64 / count as f64,
    }
}

/// Month with the highest averaged remaining; ties go to the earliest.
pub fn best_month(averages: &[MonthlyAverage]) -> Option<&MonthlyAverage> {
    averages.iter().reduce(|best, candidate| {
        if candidate.average_remaining_cents > best.average_remaining_cents {
            candidate
        } else {
            best
        }
    })
}

/// Month with the lowest averaged remaining; ties go to the earliest.
pub fn worst_month(averages: &[MonthlyAverage]) -> Option<&MonthlyAverage> {
    averages.iter().reduce(|worst, candidate| {
        if candidate.average_remaining_cents < worst.average_remaining_cents {
            candidate
        } else {
            worst
        }
    })
}
