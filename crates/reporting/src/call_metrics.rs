//! Average call durations and won-deal revenue.

use crate::rates::{mean, round1};
use pipeline_core::types::{CallSlot, Opportunity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMetrics {
    /// Minutes, across every held discovery call.
    pub discovery_duration: f64,
    /// Minutes, across every held closing call.
    pub closing_duration: f64,
    /// Mean revenue of won deals, zero-revenue wins included.
    pub avg_revenue: f64,
}

fn mean_minutes<'a, I>(slots: I) -> f64
where
    I: Iterator<Item = &'a CallSlot>,
{
    round1(mean(slots.filter_map(CallSlot::held_minutes).map(f64::from)))
}

pub fn compute_call_metrics(opportunities: &[Opportunity]) -> CallMetrics {
    CallMetrics {
        discovery_duration: mean_minutes(opportunities.iter().flat_map(|o| o.discovery.iter())),
        closing_duration: mean_minutes(opportunities.iter().flat_map(|o| o.closing.iter())),
        avg_revenue: round1(mean(
            opportunities
                .iter()
                .filter(|o| o.is_won())
                .map(|o| o.revenue.value()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::opp;

    #[test]
    fn test_empty_input() {
        assert_eq!(compute_call_metrics(&[]), CallMetrics::default());
    }

    #[test]
    fn test_durations_are_flattened() {
        let opps = vec![
            opp(1)
                .discovery(1, "2024-03-01", Some(30))
                .discovery(2, "2024-03-05", Some(40))
                .closing(1, "2024-03-10", Some(60))
                .build(),
            opp(2)
                .discovery(1, "2024-03-02", Some(45))
                .discovery(2, "2024-03-06", None)
                .build(),
        ];
        let metrics = compute_call_metrics(&opps);
        // (30 + 40 + 45) / 3, not the mean of per-opportunity means.
        assert_eq!(metrics.discovery_duration, 38.3);
        assert_eq!(metrics.closing_duration, 60.0);
    }

    #[test]
    fn test_zero_minute_calls_count_towards_duration() {
        let opps = vec![
            opp(1).closing(1, "2024-03-10", Some(0)).build(),
            opp(2).closing(1, "2024-03-11", Some(50)).build(),
        ];
        assert_eq!(compute_call_metrics(&opps).closing_duration, 25.0);
    }

    #[test]
    fn test_avg_revenue_includes_zero_revenue_wins() {
        let opps = vec![
            opp(1).won(1000.0).build(),
            opp(2).won(0.0).build(),
            opp(3).revenue(5000.0).lost().build(),
        ];
        assert_eq!(compute_call_metrics(&opps).avg_revenue, 500.0);
    }
}
