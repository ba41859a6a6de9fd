//! Record store collaborator: an in-memory [`OpportunityStore`] and the flat
//! wire record used to import and export opportunities.
//!
//! [`OpportunityStore`]: pipeline_core::OpportunityStore

pub mod memory;
pub mod record;
pub mod samples;

pub use memory::InMemoryStore;
pub use record::OpportunityRecord;
