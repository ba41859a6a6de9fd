//! Elapsed-time metrics between pipeline milestones.

use crate::rates::{mean, round1};
use chrono::NaiveDate;
use pipeline_core::types::{Opportunity, SlotId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMetrics {
    pub discovery_to_closing: f64,
    pub discovery_to_final_close: f64,
    pub between_discovery: f64,
    pub between_closing: f64,
    /// Same cohort and formula as `discovery_to_final_close`.
    pub sales_cycle: f64,
}

/// Absolute distance in days, `None` when either side is missing.
pub fn days_between(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<f64> {
    let (a, b) = (a?, b?);
    Some((b - a).num_days().abs() as f64)
}

/// Mean of the defined spans rounded to one decimal, zero when none are.
fn average_days<I: IntoIterator<Item = Option<f64>>>(spans: I) -> f64 {
    round1(mean(spans.into_iter().flatten()))
}

pub fn compute_time_metrics(opportunities: &[Opportunity]) -> TimeMetrics {
    let discovery_to_closing = average_days(opportunities.iter().map(|o| {
        days_between(o.date(SlotId::FIRST_DISCOVERY), o.date(SlotId::FIRST_CLOSING))
    }));

    let discovery_to_final_close = average_days(
        opportunities
            .iter()
            .map(|o| days_between(o.date(SlotId::FIRST_DISCOVERY), o.final_closing_date())),
    );

    let between_discovery = average_days(opportunities.iter().map(|o| {
        days_between(o.date(SlotId::FIRST_DISCOVERY), o.date(SlotId::SECOND_DISCOVERY))
    }));

    let between_closing = average_days(opportunities.iter().map(|o| {
        days_between(o.date(SlotId::FIRST_CLOSING), o.date(SlotId::SECOND_CLOSING))
    }));

    TimeMetrics {
        discovery_to_closing,
        discovery_to_final_close,
        between_discovery,
        between_closing,
        sales_cycle: discovery_to_final_close,
    }
}

/// Average days from first discovery to resolution, over closed deals only.
/// The end of the cycle is the latest call held, closing calls first.
pub fn average_sales_cycle(opportunities: &[Opportunity]) -> f64 {
    average_days(
        opportunities
            .iter()
            .filter(|o| o.has_date(SlotId::FIRST_DISCOVERY) && (o.is_won() || o.is_lost()))
            .map(|o| days_between(o.date(SlotId::FIRST_DISCOVERY), o.last_call_date())),
    )
}
