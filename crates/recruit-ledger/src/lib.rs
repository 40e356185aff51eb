//! Ledger-resident recruitment marketplace.
//!
//! Hiring managers post vacancies with an escrowed reward, recruiters submit
//! candidate profiles against them, and a hire decision relocates the candidate
//! record while an asynchronous payout settles the escrow. Durable storage and
//! the transfer host are modelled as ports so the marketplace logic can be
//! exercised without a live ledger.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
