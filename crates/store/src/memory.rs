//! DashMap-backed opportunity store.

use chrono::{Datelike, NaiveDate, Utc};
use dashmap::DashMap;
use pipeline_core::store::{month_bounds, OpportunityStore};
use pipeline_core::types::{NewOpportunity, Opportunity, OpportunityPatch};
use pipeline_core::{PipelineError, PipelineResult};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub struct InMemoryStore {
    records: DashMap<u64, Opportunity>,
    next_id: AtomicU64,
    clock: fn() -> NaiveDate,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(today)
    }

    /// Store whose creation dates come from `clock` instead of the wall clock.
    pub fn with_clock(clock: fn() -> NaiveDate) -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn sorted(mut opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
        opportunities.sort_by_key(|o| o.id);
        opportunities
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OpportunityStore for InMemoryStore {
    fn all(&self) -> Vec<Opportunity> {
        Self::sorted(self.records.iter().map(|r| r.value().clone()).collect())
    }

    fn get(&self, id: u64) -> Option<Opportunity> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    fn created_in_month(&self, year: i32, month: u32) -> PipelineResult<Vec<Opportunity>> {
        month_bounds(year, month)?;
        let matching = self
            .records
            .iter()
            .filter(|r| r.created_at.year() == year && r.created_at.month() == month)
            .map(|r| r.value().clone())
            .collect();
        Ok(Self::sorted(matching))
    }

    fn create(&self, new: NewOpportunity) -> PipelineResult<Opportunity> {
        if new.name.trim().is_empty() {
            return Err(PipelineError::Validation(
                "opportunity name must not be empty".to_string(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let opportunity = new.into_opportunity(id, (self.clock)());
        self.records.insert(id, opportunity.clone());

        metrics::counter!("store.created").increment(1);
        info!(id, name = %opportunity.name, "Opportunity created");
        Ok(opportunity)
    }

    fn update(&self, id: u64, patch: OpportunityPatch) -> PipelineResult<Opportunity> {
        let mut entry = self.records.get_mut(&id).ok_or(PipelineError::NotFound(id))?;
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(PipelineError::Validation(
                "opportunity name must not be empty".to_string(),
            ));
        }
        patch.apply(entry.value_mut());

        metrics::counter!("store.updated").increment(1);
        debug!(id, "Opportunity updated");
        Ok(entry.value().clone())
    }

    fn delete(&self, id: u64) -> PipelineResult<()> {
        self.records
            .remove(&id)
            .map(|_| {
                metrics::counter!("store.deleted").increment(1);
                debug!(id, "Opportunity deleted");
            })
            .ok_or(PipelineError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_core::types::{Amount, DealStatus};

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn store() -> InMemoryStore {
        InMemoryStore::with_clock(fixed_day)
    }

    #[test]
    fn test_create_assigns_ids_and_date() {
        let store = store();
        let a = store.create(NewOpportunity::named("Acme")).unwrap();
        let b = store.create(NewOpportunity::named("Globex")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.created_at, fixed_day());
        assert_eq!(a.salesperson, "Unknown");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let result = store().create(NewOpportunity::named("   "));
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    #[test]
    fn test_created_at_override() {
        let store = store();
        let mut new = NewOpportunity::named("Imported");
        new.created_at = NaiveDate::from_ymd_opt(2023, 11, 2);
        let created = store.create(new).unwrap();
        assert_eq!(created.created_at, NaiveDate::from_ymd_opt(2023, 11, 2).unwrap());
    }

    #[test]
    fn test_created_in_month() {
        let store = store();
        store.create(NewOpportunity::named("March")).unwrap();
        let mut feb = NewOpportunity::named("February");
        feb.created_at = NaiveDate::from_ymd_opt(2024, 2, 10);
        store.create(feb).unwrap();

        let march = store.created_in_month(2024, 3).unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].name, "March");
        assert!(store.created_in_month(2023, 3).unwrap().is_empty());
        assert!(store.created_in_month(2024, 0).is_err());
    }

    #[test]
    fn test_update_and_missing() {
        let store = store();
        let created = store.create(NewOpportunity::named("Acme")).unwrap();
        let patch = OpportunityPatch {
            revenue: Some(Amount::new(1200.0)),
            deal_status: Some(DealStatus::Won),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).unwrap();
        assert!(updated.is_won());
        assert_eq!(updated.revenue.value(), 1200.0);
        assert_eq!(store.get(created.id).unwrap(), updated);

        let missing = store.update(99, OpportunityPatch::default());
        assert!(matches!(missing, Err(PipelineError::NotFound(99))));
    }

    #[test]
    fn test_delete() {
        let store = store();
        let created = store.create(NewOpportunity::named("Acme")).unwrap();
        store.delete(created.id).unwrap();
        assert!(store.get(created.id).is_none());
        assert!(matches!(store.delete(created.id), Err(PipelineError::NotFound(_))));
    }

    #[test]
    fn test_all_is_ordered_by_id() {
        let store = store();
        for name in ["a", "b", "c", "d"] {
            store.create(NewOpportunity::named(name)).unwrap();
        }
        store.delete(2).unwrap();
        let ids: Vec<u64> = store.all().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }
}
