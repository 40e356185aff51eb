use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::domain::{
    Candidate, CandidateId, CandidateSubmission, DepersonalizedCandidate, VacancyId,
};
use super::store::{PoolKey, PoolRegistry, PoolStore, StoreError};

static CANDIDATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_candidate_id() -> CandidateId {
    let id = CANDIDATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CandidateId(format!("candidate-{id:08}"))
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Accepts candidate submissions and serves the two read views: the
/// depersonalized screening list and the post-hire full profiles.
pub struct CandidateIntake<S> {
    candidates: Arc<PoolRegistry<Candidate, S>>,
}

impl<S> CandidateIntake<S>
where
    S: PoolStore<Candidate>,
{
    pub fn new(candidates: Arc<PoolRegistry<Candidate, S>>) -> Self {
        Self { candidates }
    }

    /// Appends a full candidate record to the Open pool for the vacancy,
    /// creating the pool on first use. The vacancy id is not validated here;
    /// submissions may arrive before (or without) the vacancy resolving, and
    /// the hire path is where the reference is enforced.
    pub fn post_candidate(
        &self,
        submission: CandidateSubmission,
    ) -> Result<CandidateId, IntakeError> {
        let CandidateSubmission {
            vacancy_id,
            experience,
            english_level,
            timezone,
            salary_expectations,
            full_name,
            email,
            telegram,
        } = submission;

        let id = next_candidate_id();
        let candidate = Candidate {
            id: id.clone(),
            experience,
            english_level,
            timezone,
            salary_expectations,
            telegram,
            full_name,
            email,
        };

        self.candidates
            .append(&PoolKey::open(&vacancy_id), candidate)?;

        info!(candidate_id = %id, vacancy_id = %vacancy_id, "candidate posted");
        Ok(id)
    }

    /// Screening view for hiring managers: contact fields stripped. A vacancy
    /// with no submissions yet lists as empty.
    pub fn list_candidates(
        &self,
        vacancy_id: &VacancyId,
    ) -> Result<Vec<DepersonalizedCandidate>, IntakeError> {
        let candidates = self.candidates.scan(&PoolKey::open(vacancy_id), |_| true)?;
        Ok(candidates.iter().map(DepersonalizedCandidate::from).collect())
    }

    /// Full profiles, contact data included. Reads only from the Hired pool,
    /// so contact information is visible strictly after a hire decision.
    pub fn list_hired_candidates(
        &self,
        vacancy_id: &VacancyId,
    ) -> Result<Vec<Candidate>, IntakeError> {
        self.candidates
            .scan(&PoolKey::hired(vacancy_id), |_| true)
            .map_err(IntakeError::from)
    }
}
