//! Curated legal snippets for offline reasoning and drafting.
//!
//! The static corpus is a fixed table of Consumer Affairs Victoria / VCAT
//! guidance summaries. It is the first half of every retrieval corpus;
//! runtime-ingested pages follow it.

pub mod sources;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use sources::{law_sources, LawSource};

/// High-level issue classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
    RepairsUrgent,
    RepairsNonurgent,
    RentIncrease,
    NoticeToVacate,
    Bond,
    #[serde(rename = "min_standards")]
    MinimumStandards,
    EntryRights,
}

impl CaseCategory {
    pub const ALL: [CaseCategory; 7] = [
        Self::RepairsUrgent,
        Self::RepairsNonurgent,
        Self::RentIncrease,
        Self::NoticeToVacate,
        Self::Bond,
        Self::MinimumStandards,
        Self::EntryRights,
    ];

    /// Wire name, e.g. `"repairs_urgent"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RepairsUrgent => "repairs_urgent",
            Self::RepairsNonurgent => "repairs_nonurgent",
            Self::RentIncrease => "rent_increase",
            Self::NoticeToVacate => "notice_to_vacate",
            Self::Bond => "bond",
            Self::MinimumStandards => "min_standards",
            Self::EntryRights => "entry_rights",
        }
    }
}

impl fmt::Display for CaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown case category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for CaseCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One retrieved law passage, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawSearchResult {
    pub source_url: String,
    pub title: String,
    pub snippet: String,
    pub as_of_date: NaiveDate,
}

/// Envelope for a plain search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawSearchResponse {
    pub results: Vec<LawSearchResult>,
}
