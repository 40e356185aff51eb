use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::marketplace::domain::{
    Amount, Candidate, CandidateId, CandidateSubmission, Vacancy, VacancyDraft, VacancyId,
};
use crate::marketplace::hiring::HiringCoordinator;
use crate::marketplace::intake::CandidateIntake;
use crate::marketplace::payout::{
    PayoutBook, PayoutError, PayoutGateway, PayoutOutcome, PayoutRequest,
};
use crate::marketplace::store::{InMemoryPoolStore, PoolRegistry};
use crate::marketplace::VacancyCatalog;

pub(super) const CONTRACT_ACCOUNT: &str = "recruit-ledger.contract";
pub(super) const COMPANY_ACCOUNT: &str = "recruiters.example";

pub(super) type TestCatalog = VacancyCatalog<InMemoryPoolStore<Vacancy>, RecordingGateway>;
pub(super) type TestIntake = CandidateIntake<InMemoryPoolStore<Candidate>>;
pub(super) type TestCoordinator =
    HiringCoordinator<InMemoryPoolStore<Vacancy>, InMemoryPoolStore<Candidate>, RecordingGateway>;

/// Gateway double backed by an in-memory balance ledger. Dispatch only
/// records the request; tests run the transfer and the callback themselves,
/// standing in for the host's asynchronous continuation.
#[derive(Default, Clone)]
pub(super) struct RecordingGateway {
    balances: Arc<Mutex<HashMap<String, Amount>>>,
    requests: Arc<Mutex<Vec<PayoutRequest>>>,
    reject_dispatch: Arc<AtomicBool>,
}

impl RecordingGateway {
    pub(super) fn requests(&self) -> Vec<PayoutRequest> {
        self.requests.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn balance(&self, account: &str) -> Amount {
        let guard = self.balances.lock().expect("gateway mutex poisoned");
        guard.get(account).copied().unwrap_or(0)
    }

    pub(super) fn set_reject_dispatch(&self, reject: bool) {
        self.reject_dispatch.store(reject, Ordering::Relaxed);
    }

    /// Executes the transfer for a recorded request, phase two of the hire.
    pub(super) fn transfer(&self, request: &PayoutRequest) -> PayoutOutcome {
        let mut guard = self.balances.lock().expect("gateway mutex poisoned");
        let held = guard.get(CONTRACT_ACCOUNT).copied().unwrap_or(0);
        if held < request.amount {
            return PayoutOutcome::TransferFailed {
                reason: format!("contract holds {held}, needs {}", request.amount),
            };
        }
        guard.insert(CONTRACT_ACCOUNT.to_string(), held - request.amount);
        *guard.entry(request.company_id.clone()).or_insert(0) += request.amount;
        PayoutOutcome::Transferred
    }
}

impl PayoutGateway for RecordingGateway {
    fn hold_escrow(&self, _vacancy_id: &VacancyId, amount: Amount) -> Result<(), PayoutError> {
        let mut guard = self.balances.lock().expect("gateway mutex poisoned");
        *guard.entry(CONTRACT_ACCOUNT.to_string()).or_insert(0) += amount;
        Ok(())
    }

    fn dispatch(&self, request: PayoutRequest) -> Result<(), PayoutError> {
        if self.reject_dispatch.load(Ordering::Relaxed) {
            return Err(PayoutError::Unavailable("gateway offline".to_string()));
        }
        self.requests
            .lock()
            .expect("gateway mutex poisoned")
            .push(request);
        Ok(())
    }
}

pub(super) struct Marketplace {
    pub(super) catalog: Arc<TestCatalog>,
    pub(super) intake: Arc<TestIntake>,
    pub(super) hiring: Arc<TestCoordinator>,
    pub(super) gateway: Arc<RecordingGateway>,
}

pub(super) fn build_marketplace() -> Marketplace {
    let vacancies = Arc::new(PoolRegistry::new(InMemoryPoolStore::<Vacancy>::new()));
    let candidates = Arc::new(PoolRegistry::new(InMemoryPoolStore::<Candidate>::new()));
    let payouts = Arc::new(PayoutBook::new());
    let gateway = Arc::new(RecordingGateway::default());

    let catalog = Arc::new(VacancyCatalog::new(vacancies.clone(), gateway.clone(), 1));
    let intake = Arc::new(CandidateIntake::new(candidates.clone()));
    let hiring = Arc::new(HiringCoordinator::new(
        vacancies,
        candidates,
        payouts,
        gateway.clone(),
    ));

    Marketplace {
        catalog,
        intake,
        hiring,
        gateway,
    }
}

pub(super) fn draft(pool_name: &str) -> VacancyDraft {
    VacancyDraft {
        pool_name: pool_name.to_string(),
        position_title: "BE Senior".to_string(),
        experience: "5+".to_string(),
        english_level: "fluent".to_string(),
        timezone: "EST".to_string(),
        company_id: COMPANY_ACCOUNT.to_string(),
        attached_amount: 3,
    }
}

pub(super) fn submission(vacancy_id: &VacancyId) -> CandidateSubmission {
    CandidateSubmission {
        vacancy_id: vacancy_id.clone(),
        experience: "4 years with BE, 1 year TL".to_string(),
        english_level: "Upper-Intermediate".to_string(),
        timezone: "EST".to_string(),
        salary_expectations: "5000USD".to_string(),
        full_name: "John Galt".to_string(),
        email: "whoisjgalt@example.com".to_string(),
        telegram: "@JohnGalt".to_string(),
    }
}

pub(super) fn post_vacancy(marketplace: &Marketplace, pool_name: &str) -> VacancyId {
    marketplace
        .catalog
        .post_vacancy(draft(pool_name))
        .expect("vacancy posts")
}

pub(super) fn post_candidate(marketplace: &Marketplace, vacancy_id: &VacancyId) -> CandidateId {
    marketplace
        .intake
        .post_candidate(submission(vacancy_id))
        .expect("candidate posts")
}
