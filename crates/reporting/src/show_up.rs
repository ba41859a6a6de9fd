//! Show-up rates: share of scheduled calls that actually took place.

use crate::rates::percent_rounded;
use pipeline_core::types::{Opportunity, SlotId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUpRates {
    pub first_discovery: u32,
    pub second_discovery: u32,
    pub third_discovery: u32,
    pub first_closing: u32,
    pub second_closing: u32,
    pub third_closing: u32,
    /// Weighted across all slots, not the mean of the six rates.
    pub overall: u32,
}

impl ShowUpRates {
    /// Per-slot rates in [`SlotId::ALL`] order.
    pub fn by_slot(&self) -> [u32; 6] {
        [
            self.first_discovery,
            self.second_discovery,
            self.third_discovery,
            self.first_closing,
            self.second_closing,
            self.third_closing,
        ]
    }

    pub fn get(&self, slot: SlotId) -> u32 {
        self.by_slot()[slot.position()]
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    scheduled: u64,
    completed: u64,
}

impl Tally {
    fn rate(&self) -> u32 {
        percent_rounded(self.completed, self.scheduled)
    }
}

pub fn compute_show_up_rates(opportunities: &[Opportunity]) -> ShowUpRates {
    let mut tallies = [Tally::default(); 6];

    for opportunity in opportunities {
        for (id, slot) in opportunity.slots() {
            let tally = &mut tallies[id.position()];
            if slot.is_scheduled() {
                tally.scheduled += 1;
                if slot.showed_up() {
                    tally.completed += 1;
                }
            }
        }
    }

    let overall = tallies.iter().fold(Tally::default(), |acc, t| Tally {
        scheduled: acc.scheduled + t.scheduled,
        completed: acc.completed + t.completed,
    });

    ShowUpRates {
        first_discovery: tallies[0].rate(),
        second_discovery: tallies[1].rate(),
        third_discovery: tallies[2].rate(),
        first_closing: tallies[3].rate(),
        second_closing: tallies[4].rate(),
        third_closing: tallies[5].rate(),
        overall: overall.rate(),
    }
}
