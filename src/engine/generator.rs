//! Expands obligations into bounded sequences of dated payment schedules.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::{Biller, Installment, Obligation, PaymentSchedule};
use crate::errors::{EngineError, EngineResult};
use crate::period::Period;
use crate::store::ObligationStore;

/// Hard cap on schedules produced by a single generation run.
const MAX_GENERATED_SCHEDULES: usize = 1024;

/// Expands `obligation` into an ordered sequence of unsaved schedules.
/// Deterministic apart from the freshly minted schedule ids.
pub fn generate(
    obligation: &Obligation,
    horizon_periods: u32,
) -> EngineResult<Vec<PaymentSchedule>> {
    match obligation {
        Obligation::Biller(biller) => generate_biller(biller, horizon_periods),
        Obligation::Installment(installment) => generate_installment(installment),
    }
}

/// [`generate`] with the horizon taken from configuration.
pub fn generate_with(obligation: &Obligation, config: &Config) -> EngineResult<Vec<PaymentSchedule>> {
    let horizon = config
        .horizon_periods
        .min(config.max_generated_per_run as u32);
    generate(obligation, horizon)
}

fn generate_biller(biller: &Biller, horizon_periods: u32) -> EngineResult<Vec<PaymentSchedule>> {
    if biller.expected_cents < 0 {
        return Err(EngineError::InvalidObligation(format!(
            "biller '{}' has a negative expected amount",
            biller.name
        )));
    }
    let bucket = biller.timing_bucket()?;
    let horizon = (horizon_periods as usize).min(MAX_GENERATED_SCHEDULES);

    let mut schedules = Vec::new();
    let mut period = biller.start_period();
    for _ in 0..horizon {
        if !biller.generates_in(period) {
            break;
        }
        schedules.push(PaymentSchedule::for_biller(
            biller.id,
            period,
            bucket,
            biller.expected_cents,
        ));
        period = period.next();
    }
    debug!(
        biller = %biller.name,
        count = schedules.len(),
        "generated biller schedules"
    );
    Ok(schedules)
}

fn generate_installment(installment: &Installment) -> EngineResult<Vec<PaymentSchedule>> {
    if installment.period_cents <= 0 {
        return Err(EngineError::InvalidObligation(format!(
            "installment '{}' has a non-positive period amount",
            installment.name
        )));
    }
    let term = if installment.term_periods == 0 {
        warn!(
            installment = %installment.name,
            "term of zero periods clamped to one"
        );
        1
    } else {
        installment.term_periods
    };

    let start = Period::from_date(installment.start());
    let schedules = (0..term)
        .map(|offset| {
            PaymentSchedule::for_installment(
                installment.id,
                start.plus(offset),
                offset + 1,
                installment.period_cents,
            )
        })
        .collect();
    Ok(schedules)
}

/// Replaces an obligation's future unpaid schedules with freshly generated
/// ones, picking up edited cadence or amounts. Paid and past schedules are
/// never touched; the unpaid condition is enforced inside the store.
pub fn regenerate_future<S: ObligationStore>(
    store: &mut S,
    obligation: &Obligation,
    horizon_periods: u32,
    today: NaiveDate,
) -> EngineResult<Vec<PaymentSchedule>> {
    let reference = obligation.reference();
    let current = Period::from_date(today);
    let removed = store.delete_unpaid_schedules(reference, current)?;

    let kept: HashSet<Period> = store
        .schedules_for(reference)
        .iter()
        .map(|schedule| schedule.period)
        .collect();
    let fresh: Vec<PaymentSchedule> = generate(obligation, horizon_periods)?
        .into_iter()
        .filter(|schedule| schedule.period >= current && !kept.contains(&schedule.period))
        .collect();

    debug!(removed, created = fresh.len(), "regenerated future schedules");
    store.insert_schedules(fresh.clone())?;
    Ok(fresh)
}
