//! Opportunity builders for unit tests.

use chrono::NaiveDate;
use pipeline_core::types::{
    Amount, CallSlot, DealStatus, LeadSource, NewOpportunity, Opportunity, ProposalStatus,
};

pub fn d(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub struct OppBuilder(Opportunity);

pub fn opp(id: u64) -> OppBuilder {
    OppBuilder(NewOpportunity::named(format!("Opportunity {}", id)).into_opportunity(id, d("2024-03-01")))
}

impl OppBuilder {
    pub fn created(mut self, date: &str) -> Self {
        self.0.created_at = d(date);
        self
    }

    pub fn discovery(mut self, n: usize, date: &str, minutes: Option<u32>) -> Self {
        self.0.discovery[n - 1] = CallSlot {
            date: Some(d(date)),
            duration: minutes,
            recording: None,
        };
        self
    }

    pub fn closing(mut self, n: usize, date: &str, minutes: Option<u32>) -> Self {
        self.0.closing[n - 1] = CallSlot {
            date: Some(d(date)),
            duration: minutes,
            recording: None,
        };
        self
    }

    pub fn won(mut self, revenue: f64) -> Self {
        self.0.deal_status = DealStatus::Won;
        self.0.revenue = Amount::new(revenue);
        self
    }

    pub fn lost(mut self) -> Self {
        self.0.deal_status = DealStatus::Lost;
        self
    }

    pub fn revenue(mut self, revenue: f64) -> Self {
        self.0.revenue = Amount::new(revenue);
        self
    }

    pub fn cash(mut self, cash: f64) -> Self {
        self.0.cash_collected = Amount::new(cash);
        self
    }

    pub fn pitched(mut self) -> Self {
        self.0.proposal_status = ProposalStatus::Pitched;
        self
    }

    pub fn source(mut self, source: LeadSource) -> Self {
        self.0.lead_source = source;
        self
    }

    pub fn salesperson(mut self, name: &str) -> Self {
        self.0.salesperson = name.to_string();
        self
    }

    pub fn build(self) -> Opportunity {
        self.0
    }
}
