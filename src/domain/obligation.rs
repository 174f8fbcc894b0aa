use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, NamedEntity};
use crate::errors::EngineError;
use crate::period::{Period, TimingBucket};

/// A recurring bill with an open-ended or windowed monthly cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Biller {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    /// Expected charge per month, in cents. Never negative.
    pub expected_cents: i64,
    /// Day of month the bill falls due. Drives the timing bucket.
    pub due_day: Option<u32>,
    /// First date the obligation is scheduled from. Its month opens the
    /// activation window; its day is the bucketing fallback when `due_day`
    /// is unset.
    #[serde(default)]
    pub activation: Option<NaiveDate>,
    /// Month after which no further schedules are generated. Soft state:
    /// nothing already generated is deleted.
    #[serde(default)]
    pub deactivation: Option<Period>,
    pub created_at: DateTime<Utc>,
}

impl Biller {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        expected_cents: i64,
        due_day: Option<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            expected_cents,
            due_day,
            activation: None,
            deactivation: None,
            created_at: Utc::now(),
        }
    }

    /// Day of month used for timing-bucket classification: the due day if
    /// present, else the activation day. Without either the biller cannot
    /// be scheduled.
    pub fn bucket_day(&self) -> Result<u32, EngineError> {
        self.due_day
            .or_else(|| self.activation.map(|date| date.day()))
            .ok_or(EngineError::MissingCadenceAnchor)
    }

    pub fn timing_bucket(&self) -> Result<TimingBucket, EngineError> {
        Ok(TimingBucket::from_day(self.bucket_day()?))
    }

    pub fn creation_period(&self) -> Period {
        Period::from_date(self.created_at.date_naive())
    }

    /// First month schedules are generated for: the later of the creation
    /// month and the activation window.
    pub fn start_period(&self) -> Period {
        let creation = self.creation_period();
        match self.activation {
            Some(date) => creation.max(Period::from_date(date)),
            None => creation,
        }
    }

    /// Whether this biller still generates a schedule for `period`.
    pub fn generates_in(&self, period: Period) -> bool {
        if period < self.start_period() {
            return false;
        }
        match self.deactivation {
            Some(window) => period < window,
            None => true,
        }
    }

    /// Stops schedule generation from `window` forward without deleting
    /// anything already generated.
    pub fn deactivate(&mut self, window: Period) {
        self.deactivation = Some(window);
    }

    pub fn is_open_ended(&self) -> bool {
        self.deactivation.is_none()
    }
}

/// A fixed-term loan paid off in equal monthly parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub total_cents: i64,
    /// Amount due each period, in cents.
    pub period_cents: i64,
    pub term_periods: u32,
    /// First period counts from here; falls back to the creation date.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Cache of the summed `paid_cents` across this installment's
    /// schedules. Recomputed on every schedule mutation, never incremented.
    #[serde(default)]
    pub cumulative_paid_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Installment {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        total_cents: i64,
        period_cents: i64,
        term_periods: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            total_cents,
            period_cents,
            term_periods,
            start_date: None,
            cumulative_paid_cents: 0,
            created_at: Utc::now(),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start_date
            .unwrap_or_else(|| self.created_at.date_naive())
    }

    pub fn remaining_cents(&self) -> i64 {
        self.total_cents - self.cumulative_paid_cents
    }
}

/// Mutually exclusive reference to the obligation owning a schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ObligationRef {
    Biller(Uuid),
    Installment(Uuid),
}

impl ObligationRef {
    pub fn id(&self) -> Uuid {
        match self {
            ObligationRef::Biller(id) | ObligationRef::Installment(id) => *id,
        }
    }
}

/// Either kind of recurring commitment, as handed to the schedule generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Obligation {
    Biller(Biller),
    Installment(Installment),
}

impl Obligation {
    pub fn reference(&self) -> ObligationRef {
        match self {
            Obligation::Biller(biller) => ObligationRef::Biller(biller.id),
            Obligation::Installment(installment) => ObligationRef::Installment(installment.id),
        }
    }

    pub fn category(&self) -> &str {
        match self {
            Obligation::Biller(biller) => &biller.category,
            Obligation::Installment(installment) => &installment.category,
        }
    }
}

impl Identifiable for Obligation {
    fn id(&self) -> Uuid {
        self.reference().id()
    }
}

impl NamedEntity for Obligation {
    fn name(&self) -> &str {
        match self {
            Obligation::Biller(biller) => &biller.name,
            Obligation::Installment(installment) => &installment.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bucket_day_prefers_due_day_over_activation() {
        let mut biller = Biller::new("Internet", "Utilities", 1500_00, Some(10));
        biller.activation = Some(NaiveDate::from_ymd_opt(2026, 1, 25).unwrap());
        assert_eq!(biller.bucket_day().unwrap(), 10);
        assert_eq!(biller.timing_bucket().unwrap(), TimingBucket::FirstHalf);

        biller.due_day = None;
        assert_eq!(biller.bucket_day().unwrap(), 25);
        assert_eq!(biller.timing_bucket().unwrap(), TimingBucket::SecondHalf);

        biller.activation = None;
        assert!(matches!(
            biller.bucket_day(),
            Err(EngineError::MissingCadenceAnchor)
        ));
    }

    #[test]
    fn deactivation_window_is_exclusive() {
        let mut biller = Biller::new("Gym", "Health", 500_00, Some(5));
        biller.created_at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        biller.activation = Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        biller.deactivate(Period::new(2026, 3));
        assert!(biller.generates_in(Period::new(2026, 2)));
        assert!(!biller.generates_in(Period::new(2026, 3)));
        assert!(!biller.generates_in(Period::new(2026, 4)));
        assert!(!biller.is_open_ended());
    }

    #[test]
    fn start_period_takes_later_of_creation_and_activation() {
        let mut biller = Biller::new("Stream", "Leisure", 99_00, Some(1));
        let creation = biller.creation_period();
        assert_eq!(biller.start_period(), creation);

        biller.activation = Some(creation.plus(2).first_day());
        assert_eq!(biller.start_period(), creation.plus(2));
    }
}
