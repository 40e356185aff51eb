use crate::infra::{build_marketplace, EscrowLedger, MarketplaceParts, CONTRACT_ACCOUNT};
use clap::Args;
use recruit_ledger::error::AppError;
use recruit_ledger::marketplace::{
    Amount, CandidateSubmission, PayoutOutcome, PayoutRequest, VacancyDraft,
};
use tokio::sync::mpsc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Vacancy pool to post into.
    #[arg(long, default_value = "Developers")]
    pub(crate) pool: String,
    /// Escrow reward attached to the demo vacancy, in ledger units.
    #[arg(long, default_value_t = 3)]
    pub(crate) reward: Amount,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { pool, reward } = args;

    let MarketplaceParts {
        state,
        coordinator,
        ledger,
        mut transfers,
    } = build_marketplace(1);

    println!("Recruitment marketplace demo");

    let vacancy_id = match state.catalog.post_vacancy(VacancyDraft {
        pool_name: pool.clone(),
        position_title: "BE developer Senior".to_string(),
        experience: "5+".to_string(),
        english_level: "fluent".to_string(),
        timezone: "EST".to_string(),
        company_id: "recruiters.example".to_string(),
        attached_amount: reward,
    }) {
        Ok(id) => id,
        Err(err) => {
            println!("  Vacancy rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Posted vacancy {} into pool '{}' with {} units in escrow",
        vacancy_id, pool, reward
    );

    let submissions = [
        ("John Galt", "john.galt@example.com", "@JohnGalt"),
        ("Dagny Taggart", "dagny@example.com", "@Dagny"),
    ];
    let mut candidate_ids = Vec::new();
    for (name, email, telegram) in submissions {
        match state.intake.post_candidate(CandidateSubmission {
            vacancy_id: vacancy_id.clone(),
            experience: "4 years with BE, 1 year TL".to_string(),
            english_level: "Upper-Intermediate".to_string(),
            timezone: "EST".to_string(),
            salary_expectations: "5000USD".to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            telegram: telegram.to_string(),
        }) {
            Ok(id) => {
                println!("- Received candidate {id} ({name})");
                candidate_ids.push(id);
            }
            Err(err) => println!("  Submission rejected: {err}"),
        }
    }

    println!("\nScreening listing (contacts redacted)");
    match state.intake.list_candidates(&vacancy_id) {
        Ok(candidates) => match serde_json::to_string_pretty(&candidates) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("  Listing unavailable: {err}"),
        },
        Err(err) => println!("  Listing unavailable: {err}"),
    }

    let keeper = match candidate_ids.first() {
        Some(id) => id.clone(),
        None => return Ok(()),
    };

    println!("\nHiring {keeper}");
    match state.hiring.hire_candidate(&pool, &keeper, &vacancy_id) {
        Ok(receipt) => println!(
            "- Hire accepted, payout {} for {} units to {}",
            receipt.payout.label(),
            receipt.reward,
            receipt.company_id
        ),
        Err(err) => {
            println!("  Hire rejected: {err}");
            return Ok(());
        }
    }

    settle_pending_transfers(&mut transfers, &ledger, &coordinator);

    match coordinator.payout_status(&vacancy_id, &keeper) {
        Some(record) => match serde_json::to_string_pretty(&record) {
            Ok(json) => println!("\nPayout record\n{json}"),
            Err(err) => println!("  Payout record unavailable: {err}"),
        },
        None => println!("  No payout record found"),
    }
    println!(
        "Balances: contract {} | recruiters.example {}",
        ledger.balance(CONTRACT_ACCOUNT),
        ledger.balance("recruiters.example")
    );

    println!("\nHired listing (full profiles)");
    match state.intake.list_hired_candidates(&vacancy_id) {
        Ok(hired) => {
            for candidate in hired {
                println!("- {} <{}> {}", candidate.full_name, candidate.email, candidate.telegram);
            }
        }
        Err(err) => println!("  Listing unavailable: {err}"),
    }

    println!("\nReplaying the hire");
    match state.hiring.hire_candidate(&pool, &keeper, &vacancy_id) {
        Ok(_) => println!("  Unexpectedly accepted"),
        Err(err) => println!("- Rejected as expected: {err}"),
    }

    Ok(())
}

fn settle_pending_transfers(
    transfers: &mut mpsc::UnboundedReceiver<PayoutRequest>,
    ledger: &EscrowLedger,
    coordinator: &crate::infra::Coordinator,
) {
    while let Ok(request) = transfers.try_recv() {
        let outcome = match ledger.transfer(CONTRACT_ACCOUNT, &request.company_id, request.amount) {
            Ok(()) => PayoutOutcome::Transferred,
            Err(reason) => PayoutOutcome::TransferFailed { reason },
        };
        match coordinator.on_hiring_complete(&request.vacancy_id, &request.candidate_id, outcome) {
            Ok(status) => println!("- Settlement callback resolved: {}", status.label()),
            Err(err) => println!("  Settlement callback failed: {err}"),
        }
    }
}
