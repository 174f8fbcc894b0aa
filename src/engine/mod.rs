//! Stateless engine operations over the store boundaries.

pub mod generator;
pub mod payments;
pub mod projection;
pub mod reconcile;

pub use generator::{generate, generate_with, regenerate_future};
pub use payments::{apply_payment, delete_entry, revert_deleted_entry, PaymentRequest};
pub use projection::{
    best_month, monthly_averages, project, worst_month, MonthlyAverage, PeriodProjection,
};
pub use reconcile::{apply_correction, reconcile, Recommendation, SyncReport};
