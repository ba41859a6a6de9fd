pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::AppConfig;
pub use error::{PipelineError, PipelineResult};
pub use store::OpportunityStore;
pub use types::{
    Amount, CallKind, CallSlot, DealStatus, LeadSource, NewOpportunity, Opportunity,
    OpportunityPatch, ProposalStatus, SlotId,
};
