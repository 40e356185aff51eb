use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use recruit_ledger::marketplace::{
    Amount, Candidate, CandidateIntake, HiringCoordinator, InMemoryPoolStore, MarketplaceState,
    PayoutBook, PayoutError, PayoutGateway, PayoutOutcome, PayoutRequest, PoolRegistry, Vacancy,
    VacancyCatalog, VacancyId,
};
use tokio::sync::mpsc;
use tracing::warn;

pub(crate) const CONTRACT_ACCOUNT: &str = "recruit-ledger.contract";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type VacancyStore = InMemoryPoolStore<Vacancy>;
pub(crate) type CandidateStore = InMemoryPoolStore<Candidate>;
pub(crate) type Coordinator =
    HiringCoordinator<VacancyStore, CandidateStore, ChannelPayoutGateway>;
pub(crate) type Marketplace = MarketplaceState<VacancyStore, CandidateStore, ChannelPayoutGateway>;

/// In-memory account balances standing in for the host ledger. Escrow lives
/// on the contract account between vacancy posting and payout settlement.
#[derive(Default, Clone)]
pub(crate) struct EscrowLedger {
    balances: Arc<Mutex<HashMap<String, Amount>>>,
}

impl EscrowLedger {
    /// Credits an account, saturating at the ledger ceiling. Amounts arrive
    /// from untrusted request payloads, so this must not overflow.
    pub(crate) fn credit(&self, account: &str, amount: Amount) {
        let mut guard = self.balances.lock().expect("ledger mutex poisoned");
        let balance = guard.entry(account.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub(crate) fn transfer(&self, from: &str, to: &str, amount: Amount) -> Result<(), String> {
        let mut guard = self.balances.lock().expect("ledger mutex poisoned");
        let held = guard.get(from).copied().unwrap_or(0);
        if held < amount {
            return Err(format!("account '{from}' holds {held}, needs {amount}"));
        }
        guard.insert(from.to_string(), held - amount);
        let balance = guard.entry(to.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
        Ok(())
    }

    pub(crate) fn balance(&self, account: &str) -> Amount {
        let guard = self.balances.lock().expect("ledger mutex poisoned");
        guard.get(account).copied().unwrap_or(0)
    }
}

/// Gateway that earmarks escrow on the ledger and hands transfer orders to
/// the settlement task over a channel, mimicking the host's asynchronous
/// cross-contract continuation.
#[derive(Clone)]
pub(crate) struct ChannelPayoutGateway {
    ledger: EscrowLedger,
    transfers: mpsc::UnboundedSender<PayoutRequest>,
}

impl ChannelPayoutGateway {
    pub(crate) fn new(
        ledger: EscrowLedger,
    ) -> (Self, mpsc::UnboundedReceiver<PayoutRequest>) {
        let (transfers, receiver) = mpsc::unbounded_channel();
        (Self { ledger, transfers }, receiver)
    }
}

impl PayoutGateway for ChannelPayoutGateway {
    fn hold_escrow(&self, _vacancy_id: &VacancyId, amount: Amount) -> Result<(), PayoutError> {
        self.ledger.credit(CONTRACT_ACCOUNT, amount);
        Ok(())
    }

    fn dispatch(&self, request: PayoutRequest) -> Result<(), PayoutError> {
        self.transfers
            .send(request)
            .map_err(|_| PayoutError::Unavailable("settlement task stopped".to_string()))
    }
}

pub(crate) struct MarketplaceParts {
    pub(crate) state: Arc<Marketplace>,
    pub(crate) coordinator: Arc<Coordinator>,
    pub(crate) ledger: EscrowLedger,
    pub(crate) transfers: mpsc::UnboundedReceiver<PayoutRequest>,
}

pub(crate) fn build_marketplace(min_escrow: Amount) -> MarketplaceParts {
    let vacancies = Arc::new(PoolRegistry::new(VacancyStore::new()));
    let candidates = Arc::new(PoolRegistry::new(CandidateStore::new()));
    let ledger = EscrowLedger::default();
    let (gateway, transfers) = ChannelPayoutGateway::new(ledger.clone());
    let gateway = Arc::new(gateway);

    let catalog = Arc::new(VacancyCatalog::new(
        vacancies.clone(),
        gateway.clone(),
        min_escrow,
    ));
    let intake = Arc::new(CandidateIntake::new(candidates.clone()));
    let coordinator = Arc::new(HiringCoordinator::new(
        vacancies,
        candidates,
        Arc::new(PayoutBook::new()),
        gateway,
    ));

    MarketplaceParts {
        state: Arc::new(MarketplaceState {
            catalog,
            intake,
            hiring: coordinator.clone(),
        }),
        coordinator,
        ledger,
        transfers,
    }
}

/// Runs transfer orders against the ledger and feeds each outcome back into
/// the coordinator callback, one order at a time in arrival order.
pub(crate) fn spawn_settlement_task(
    mut transfers: mpsc::UnboundedReceiver<PayoutRequest>,
    ledger: EscrowLedger,
    coordinator: Arc<Coordinator>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = transfers.recv().await {
            let outcome =
                match ledger.transfer(CONTRACT_ACCOUNT, &request.company_id, request.amount) {
                    Ok(()) => PayoutOutcome::Transferred,
                    Err(reason) => PayoutOutcome::TransferFailed { reason },
                };
            if let Err(err) = coordinator.on_hiring_complete(
                &request.vacancy_id,
                &request.candidate_id,
                outcome,
            ) {
                warn!(
                    vacancy_id = %request.vacancy_id,
                    candidate_id = %request.candidate_id,
                    error = %err,
                    "payout settlement callback failed"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_saturates_instead_of_wrapping() {
        let ledger = EscrowLedger::default();
        ledger.credit(CONTRACT_ACCOUNT, Amount::MAX);
        ledger.credit(CONTRACT_ACCOUNT, 7);
        assert_eq!(ledger.balance(CONTRACT_ACCOUNT), Amount::MAX);
    }

    #[test]
    fn transfer_saturates_the_destination_account() {
        let ledger = EscrowLedger::default();
        ledger.credit("escrow", 10);
        ledger.credit("sink", Amount::MAX);

        ledger.transfer("escrow", "sink", 10).expect("transfer succeeds");
        assert_eq!(ledger.balance("sink"), Amount::MAX);
        assert_eq!(ledger.balance("escrow"), 0);
    }

    #[test]
    fn transfer_rejects_an_underfunded_source() {
        let ledger = EscrowLedger::default();
        ledger.credit("escrow", 2);

        let err = ledger
            .transfer("escrow", "sink", 3)
            .expect_err("underfunded transfer fails");
        assert!(err.contains("holds 2"));
        assert_eq!(ledger.balance("escrow"), 2);
        assert_eq!(ledger.balance("sink"), 0);
    }
}
