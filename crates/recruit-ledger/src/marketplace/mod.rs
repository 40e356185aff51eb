//! Pool lifecycle and the hiring state transition with escrowed payout.
//!
//! The marketplace is split along its seams: the pool registry abstracts the
//! durable keyed store, the catalog and intake own vacancy and candidate
//! writes, and the hiring coordinator performs the open→hired relocation and
//! drives the two-phase escrow payout through the gateway port.

pub mod catalog;
pub mod domain;
pub mod hiring;
pub mod intake;
pub mod payout;
pub mod router;
pub mod store;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, VacancyCatalog};
pub use domain::{
    Amount, Candidate, CandidateId, CandidateStage, CandidateSubmission, DepersonalizedCandidate,
    Vacancy, VacancyDetails, VacancyDraft, VacancyId, VacancyRequirements,
};
pub use hiring::{HireReceipt, HiringCoordinator, HiringError};
pub use intake::{CandidateIntake, IntakeError};
pub use payout::{
    PayoutBook, PayoutError, PayoutGateway, PayoutOutcome, PayoutRecord, PayoutRequest,
    PayoutStatus,
};
pub use router::{marketplace_router, MarketplaceState};
pub use store::{InMemoryPoolStore, Pool, PoolKey, PoolRecord, PoolRegistry, PoolStore, StoreError};
