use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Amount, Candidate, CandidateId, Vacancy, VacancyId};
use super::payout::{
    PayoutBook, PayoutError, PayoutGateway, PayoutOutcome, PayoutRecord, PayoutRequest,
    PayoutStatus,
};
use super::store::{PoolKey, PoolRegistry, PoolStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum HiringError {
    #[error("vacancy '{vacancy_id}' was not found in pool '{pool_name}'")]
    VacancyNotFound {
        pool_name: String,
        vacancy_id: VacancyId,
    },
    #[error("candidate '{candidate_id}' was not found in the open pool for '{vacancy_id}'")]
    CandidateNotFound {
        vacancy_id: VacancyId,
        candidate_id: CandidateId,
    },
    #[error("candidate '{candidate_id}' has already been hired for '{vacancy_id}'")]
    AlreadyHired {
        vacancy_id: VacancyId,
        candidate_id: CandidateId,
    },
    #[error("vacancy '{vacancy_id}' has no company account to pay out to")]
    PayoutUnresolved { vacancy_id: VacancyId },
    #[error("no payout is recorded for candidate '{candidate_id}' under '{vacancy_id}'")]
    PayoutNotFound {
        vacancy_id: VacancyId,
        candidate_id: CandidateId,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Payout(#[from] PayoutError),
}

/// What the caller gets back from a committed hire. The payout is Pending
/// until the host runs the transfer continuation and calls back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HireReceipt {
    pub vacancy_id: VacancyId,
    pub candidate_id: CandidateId,
    pub company_id: String,
    pub reward: Amount,
    pub payout: PayoutStatus,
}

/// Orchestrates the open→hired transition and the escrow payout.
///
/// A hire is two phases: phase one (this call) claims the payout slot,
/// relocates the candidate record, and dispatches the transfer; phase two is
/// the host-driven transfer whose outcome arrives via [`Self::on_hiring_complete`].
/// The claim in the payout book is what makes concurrent hire attempts for
/// the same candidate lose with `AlreadyHired` instead of double-paying.
pub struct HiringCoordinator<VS, CS, G> {
    vacancies: Arc<PoolRegistry<Vacancy, VS>>,
    candidates: Arc<PoolRegistry<Candidate, CS>>,
    payouts: Arc<PayoutBook>,
    gateway: Arc<G>,
}

impl<VS, CS, G> HiringCoordinator<VS, CS, G>
where
    VS: PoolStore<Vacancy>,
    CS: PoolStore<Candidate>,
    G: PayoutGateway,
{
    pub fn new(
        vacancies: Arc<PoolRegistry<Vacancy, VS>>,
        candidates: Arc<PoolRegistry<Candidate, CS>>,
        payouts: Arc<PayoutBook>,
        gateway: Arc<G>,
    ) -> Self {
        Self {
            vacancies,
            candidates,
            payouts,
            gateway,
        }
    }

    /// Hires `candidate_id` for `vacancy_id`, relocating the record from the
    /// Open to the Hired pool and dispatching the reward transfer.
    ///
    /// Fails fast with `VacancyNotFound` before touching any pool; a hire
    /// must never relocate a candidate it cannot pay for.
    pub fn hire_candidate(
        &self,
        pool_name: &str,
        candidate_id: &CandidateId,
        vacancy_id: &VacancyId,
    ) -> Result<HireReceipt, HiringError> {
        let vacancy = self
            .vacancies
            .find_by_id(&PoolKey::vacancies(pool_name), vacancy_id.as_str())?
            .ok_or_else(|| HiringError::VacancyNotFound {
                pool_name: pool_name.to_string(),
                vacancy_id: vacancy_id.clone(),
            })?;

        let company_id = vacancy.details.company_id.clone();
        if company_id.is_empty() {
            return Err(HiringError::PayoutUnresolved {
                vacancy_id: vacancy_id.clone(),
            });
        }

        self.payouts
            .claim(PayoutRecord {
                vacancy_id: vacancy_id.clone(),
                candidate_id: candidate_id.clone(),
                company_id: company_id.clone(),
                amount: vacancy.reward,
                status: PayoutStatus::Pending,
            })
            .map_err(|_| HiringError::AlreadyHired {
                vacancy_id: vacancy_id.clone(),
                candidate_id: candidate_id.clone(),
            })?;

        let open_key = PoolKey::open(vacancy_id);
        let hired_key = PoolKey::hired(vacancy_id);

        let candidate = match self
            .candidates
            .remove_by_id(&open_key, candidate_id.as_str())
        {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                self.payouts.release(vacancy_id, candidate_id);
                let already_hired = self
                    .candidates
                    .find_by_id(&hired_key, candidate_id.as_str())?
                    .is_some();
                return Err(if already_hired {
                    HiringError::AlreadyHired {
                        vacancy_id: vacancy_id.clone(),
                        candidate_id: candidate_id.clone(),
                    }
                } else {
                    HiringError::CandidateNotFound {
                        vacancy_id: vacancy_id.clone(),
                        candidate_id: candidate_id.clone(),
                    }
                });
            }
            Err(err) => {
                self.payouts.release(vacancy_id, candidate_id);
                return Err(err.into());
            }
        };

        if let Err(err) = self.candidates.append(&hired_key, candidate.clone()) {
            self.restore_to_open(&open_key, candidate);
            self.payouts.release(vacancy_id, candidate_id);
            return Err(err.into());
        }

        let request = PayoutRequest {
            vacancy_id: vacancy_id.clone(),
            candidate_id: candidate_id.clone(),
            company_id: company_id.clone(),
            amount: vacancy.reward,
        };
        if let Err(err) = self.gateway.dispatch(request) {
            // The transfer never left this call, so reverse the move instead
            // of leaving a hired record nothing will ever pay for.
            if let Ok(Some(reclaimed)) =
                self.candidates.remove_by_id(&hired_key, candidate_id.as_str())
            {
                self.restore_to_open(&open_key, reclaimed);
            }
            self.payouts.release(vacancy_id, candidate_id);
            return Err(err.into());
        }

        info!(
            vacancy_id = %vacancy_id,
            candidate_id = %candidate_id,
            company_id = %company_id,
            reward = vacancy.reward,
            "candidate hired, payout dispatched"
        );

        Ok(HireReceipt {
            vacancy_id: vacancy_id.clone(),
            candidate_id: candidate_id.clone(),
            company_id,
            reward: vacancy.reward,
            payout: PayoutStatus::Pending,
        })
    }

    /// Host callback for the transfer continuation, keyed to the hire it
    /// settles. Confirmation marks the record; a failed transfer reverses the
    /// pool move so "recorded as hired" never diverges from "actually paid".
    pub fn on_hiring_complete(
        &self,
        vacancy_id: &VacancyId,
        candidate_id: &CandidateId,
        outcome: PayoutOutcome,
    ) -> Result<PayoutStatus, HiringError> {
        match outcome {
            PayoutOutcome::Transferred => {
                self.payouts
                    .settle(vacancy_id, candidate_id, PayoutStatus::Confirmed)
                    .ok_or_else(|| HiringError::PayoutNotFound {
                        vacancy_id: vacancy_id.clone(),
                        candidate_id: candidate_id.clone(),
                    })?;
                info!(
                    vacancy_id = %vacancy_id,
                    candidate_id = %candidate_id,
                    "hiring payout confirmed"
                );
                Ok(PayoutStatus::Confirmed)
            }
            PayoutOutcome::TransferFailed { reason } => {
                self.payouts
                    .settle(vacancy_id, candidate_id, PayoutStatus::Failed)
                    .ok_or_else(|| HiringError::PayoutNotFound {
                        vacancy_id: vacancy_id.clone(),
                        candidate_id: candidate_id.clone(),
                    })?;
                warn!(
                    vacancy_id = %vacancy_id,
                    candidate_id = %candidate_id,
                    %reason,
                    "hiring payout failed, reversing hire"
                );
                if let Some(candidate) = self
                    .candidates
                    .remove_by_id(&PoolKey::hired(vacancy_id), candidate_id.as_str())?
                {
                    self.restore_to_open(&PoolKey::open(vacancy_id), candidate);
                }
                Ok(PayoutStatus::Failed)
            }
        }
    }

    /// Current payout flag for a hire, if one was ever claimed.
    pub fn payout_status(
        &self,
        vacancy_id: &VacancyId,
        candidate_id: &CandidateId,
    ) -> Option<PayoutRecord> {
        self.payouts.status(vacancy_id, candidate_id)
    }

    fn restore_to_open(&self, open_key: &PoolKey, candidate: Candidate) {
        let candidate_id = candidate.id.clone();
        if let Err(err) = self.candidates.append(open_key, candidate) {
            warn!(candidate_id = %candidate_id, error = %err, "failed to restore candidate to open pool");
        }
    }
}
