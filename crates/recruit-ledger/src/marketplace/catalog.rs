use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::domain::{
    Amount, Vacancy, VacancyDetails, VacancyDraft, VacancyId, VacancyRequirements,
};
use super::payout::{PayoutError, PayoutGateway};
use super::store::{PoolKey, PoolRegistry, PoolStore, StoreError};

static VACANCY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_vacancy_id() -> VacancyId {
    let id = VACANCY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    VacancyId(format!("vacancy-{id:08}"))
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("attached escrow of {attached} is below the minimum of {minimum} ledger unit(s)")]
    InsufficientEscrow { attached: Amount, minimum: Amount },
    #[error("vacancy pool '{0}' has never been created")]
    PoolNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Payout(#[from] PayoutError),
}

/// Creates and lists vacancies, enforcing the minimum escrow and earmarking
/// attached value with the payout gateway.
pub struct VacancyCatalog<S, G> {
    vacancies: Arc<PoolRegistry<Vacancy, S>>,
    gateway: Arc<G>,
    min_escrow: Amount,
}

impl<S, G> VacancyCatalog<S, G>
where
    S: PoolStore<Vacancy>,
    G: PayoutGateway,
{
    pub fn new(vacancies: Arc<PoolRegistry<Vacancy, S>>, gateway: Arc<G>, min_escrow: Amount) -> Self {
        Self {
            vacancies,
            gateway,
            min_escrow,
        }
    }

    /// Posts a vacancy into its pool, creating the pool on first use. The
    /// attached amount becomes the reward and is held by the contract until a
    /// hire settles it.
    pub fn post_vacancy(&self, draft: VacancyDraft) -> Result<VacancyId, CatalogError> {
        let VacancyDraft {
            pool_name,
            position_title,
            experience,
            english_level,
            timezone,
            company_id,
            attached_amount,
        } = draft;

        if attached_amount < self.min_escrow {
            return Err(CatalogError::InsufficientEscrow {
                attached: attached_amount,
                minimum: self.min_escrow,
            });
        }

        let id = next_vacancy_id();
        let vacancy = Vacancy {
            id: id.clone(),
            reward: attached_amount,
            details: VacancyDetails {
                position_title,
                requirements: VacancyRequirements {
                    experience,
                    english_level,
                    timezone,
                },
                company_id,
            },
        };

        self.vacancies
            .append(&PoolKey::vacancies(&pool_name), vacancy)?;
        self.gateway.hold_escrow(&id, attached_amount)?;

        info!(vacancy_id = %id, pool = %pool_name, reward = attached_amount, "vacancy posted");
        Ok(id)
    }

    /// Returns the full pool in insertion order. Listing a pool that was
    /// never created is an error, not an empty sequence.
    pub fn list_vacancies(&self, pool_name: &str) -> Result<Vec<Vacancy>, CatalogError> {
        match self.vacancies.load(&PoolKey::vacancies(pool_name))? {
            Some(pool) => Ok(pool.entries().to_vec()),
            None => Err(CatalogError::PoolNotFound(pool_name.to_string())),
        }
    }

    /// Indexed lookup within a pool. A missing vacancy is `Ok(None)`,
    /// distinct from the pool itself being absent.
    pub fn find_vacancy(
        &self,
        pool_name: &str,
        vacancy_id: &VacancyId,
    ) -> Result<Option<Vacancy>, CatalogError> {
        match self.vacancies.load(&PoolKey::vacancies(pool_name))? {
            Some(pool) => Ok(pool.find(vacancy_id.as_str()).cloned()),
            None => Err(CatalogError::PoolNotFound(pool_name.to_string())),
        }
    }
}
