//! Record store abstraction. The reporting engine only ever reads snapshots
//! produced by an implementation of [`OpportunityStore`].

use crate::error::{PipelineError, PipelineResult};
use crate::types::{NewOpportunity, Opportunity, OpportunityPatch};
use chrono::NaiveDate;

pub trait OpportunityStore: Send + Sync {
    /// Snapshot of every opportunity, ordered by id.
    fn all(&self) -> Vec<Opportunity>;

    fn get(&self, id: u64) -> Option<Opportunity>;

    /// Snapshot of opportunities created in the given calendar month.
    fn created_in_month(&self, year: i32, month: u32) -> PipelineResult<Vec<Opportunity>>;

    fn create(&self, new: NewOpportunity) -> PipelineResult<Opportunity>;

    fn update(&self, id: u64, patch: OpportunityPatch) -> PipelineResult<Opportunity>;

    fn delete(&self, id: u64) -> PipelineResult<()>;
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> PipelineResult<(NaiveDate, NaiveDate)> {
    let invalid = || PipelineError::Validation(format!("invalid month {}-{}", year, month));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let (next_year, next_month) = next_month(year, month);
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}
