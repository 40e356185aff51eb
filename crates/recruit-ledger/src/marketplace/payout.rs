use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::domain::{Amount, CandidateId, VacancyId};

/// Lifecycle of an escrow payout for one hire. `Pending` doubles as the
/// exclusive claim on the candidate: a second hire attempt against a Pending
/// or Confirmed record is rejected, while Failed may be re-claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Confirmed,
    Failed,
}

impl PayoutStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

/// Per-(vacancy, candidate) payout state persisted alongside the hire so the
/// host callback can settle the correct record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub vacancy_id: VacancyId,
    pub candidate_id: CandidateId,
    pub company_id: String,
    pub amount: Amount,
    pub status: PayoutStatus,
}

/// Transfer order handed to the gateway when a hire commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutRequest {
    pub vacancy_id: VacancyId,
    pub candidate_id: CandidateId,
    pub company_id: String,
    pub amount: Amount,
}

/// Result the host reports back through `on_hiring_complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutOutcome {
    Transferred,
    TransferFailed { reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    #[error("payout gateway unavailable: {0}")]
    Unavailable(String),
    #[error("payout rejected: {0}")]
    Rejected(String),
}

/// Asynchronous cross-contract transfer port provided by the host runtime.
/// `dispatch` only begins the transfer; the outcome arrives later through the
/// coordinator callback.
pub trait PayoutGateway: Send + Sync {
    /// Earmark attached escrow for a freshly posted vacancy.
    fn hold_escrow(&self, vacancy_id: &VacancyId, amount: Amount) -> Result<(), PayoutError>;

    /// Begin transferring `amount` to the recruiting company.
    fn dispatch(&self, request: PayoutRequest) -> Result<(), PayoutError>;
}

/// Book of payout records keyed by (vacancy, candidate). Claiming a slot is
/// the atomic step that serializes concurrent hire attempts.
#[derive(Debug, Default)]
pub struct PayoutBook {
    records: Mutex<BTreeMap<(VacancyId, CandidateId), PayoutRecord>>,
}

impl PayoutBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a Pending record unless a live claim already exists. Returns
    /// the blocking status when the slot is taken.
    pub fn claim(&self, record: PayoutRecord) -> Result<(), PayoutStatus> {
        let key = (record.vacancy_id.clone(), record.candidate_id.clone());
        let mut guard = self.records.lock().expect("payout book mutex poisoned");
        match guard.get(&key).map(|existing| existing.status) {
            Some(PayoutStatus::Pending) => Err(PayoutStatus::Pending),
            Some(PayoutStatus::Confirmed) => Err(PayoutStatus::Confirmed),
            Some(PayoutStatus::Failed) | None => {
                guard.insert(key, record);
                Ok(())
            }
        }
    }

    /// Drops a claim that never reached dispatch.
    pub fn release(&self, vacancy_id: &VacancyId, candidate_id: &CandidateId) {
        let mut guard = self.records.lock().expect("payout book mutex poisoned");
        guard.remove(&(vacancy_id.clone(), candidate_id.clone()));
    }

    /// Moves an existing record to `status`, returning the updated record.
    pub fn settle(
        &self,
        vacancy_id: &VacancyId,
        candidate_id: &CandidateId,
        status: PayoutStatus,
    ) -> Option<PayoutRecord> {
        let mut guard = self.records.lock().expect("payout book mutex poisoned");
        let record = guard.get_mut(&(vacancy_id.clone(), candidate_id.clone()))?;
        record.status = status;
        Some(record.clone())
    }

    pub fn status(&self, vacancy_id: &VacancyId, candidate_id: &CandidateId) -> Option<PayoutRecord> {
        let guard = self.records.lock().expect("payout book mutex poisoned");
        guard.get(&(vacancy_id.clone(), candidate_id.clone())).cloned()
    }
}
