use serde::{Deserialize, Serialize};
use std::fmt;

use super::store::PoolRecord;

/// Ledger value in whole units. The contract holds attached escrow in these
/// units until a hire settles it.
pub type Amount = u64;

/// Identifier wrapper for posted vacancies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VacancyId(pub String);

impl VacancyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VacancyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for submitted candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stage a candidate pool belongs to. A candidate id lives in at most one
/// stage per vacancy; hiring relocates the record between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStage {
    Open,
    Hired,
}

impl CandidateStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Hired => "hired",
        }
    }

    pub(crate) const fn storage_prefix(self) -> &'static str {
        self.label()
    }
}

/// Position requirements advertised with a vacancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyRequirements {
    pub experience: String,
    pub english_level: String,
    pub timezone: String,
}

/// Everything a recruiter sees about a vacancy besides the reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyDetails {
    pub position_title: String,
    pub requirements: VacancyRequirements,
    /// Ledger account credited when the vacancy is filled.
    pub company_id: String,
}

/// A hiring request with an escrowed reward. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacancy {
    pub id: VacancyId,
    pub reward: Amount,
    pub details: VacancyDetails,
}

impl PoolRecord for Vacancy {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Intake payload for posting a vacancy, escrow included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyDraft {
    pub pool_name: String,
    pub position_title: String,
    pub experience: String,
    pub english_level: String,
    pub timezone: String,
    pub company_id: String,
    pub attached_amount: Amount,
}

/// Full candidate profile. The last three fields are private contact data and
/// only leave the Hired pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub experience: String,
    pub english_level: String,
    pub timezone: String,
    pub salary_expectations: String,
    pub telegram: String,
    pub full_name: String,
    pub email: String,
}

impl PoolRecord for Candidate {
    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

/// Intake payload for submitting a candidate against a vacancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSubmission {
    pub vacancy_id: VacancyId,
    pub experience: String,
    pub english_level: String,
    pub timezone: String,
    pub salary_expectations: String,
    pub full_name: String,
    pub email: String,
    pub telegram: String,
}

/// Screening projection of a candidate with contact fields stripped. This is
/// the only view a hiring manager sees before a hire decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepersonalizedCandidate {
    pub id: CandidateId,
    pub experience: String,
    pub english_level: String,
    pub timezone: String,
    pub salary_expectations: String,
}

impl From<&Candidate> for DepersonalizedCandidate {
    fn from(candidate: &Candidate) -> Self {
        Self {
            id: candidate.id.clone(),
            experience: candidate.experience.clone(),
            english_level: candidate.english_level.clone(),
            timezone: candidate.timezone.clone(),
            salary_expectations: candidate.salary_expectations.clone(),
        }
    }
}
