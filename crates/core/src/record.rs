//! Typed shift records.
//!
//! [`ValidatedRecord`] can only be built by [`crate::validation::validate_record`],
//! so holding one means every field already satisfied its constraint.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Department
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    Sewing,
    Finishing,
    Cutting,
    #[serde(rename = "QC")]
    Qc,
}

impl Department {
    pub const ALL: [Department; 4] = [
        Department::Sewing,
        Department::Finishing,
        Department::Cutting,
        Department::Qc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sewing => "Sewing",
            Self::Finishing => "Finishing",
            Self::Cutting => "Cutting",
            Self::Qc => "QC",
        }
    }
}

impl FromStr for Department {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|d| d.as_str() == s).ok_or(())
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Incentive level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncentiveLevel {
    None,
    Low,
    Standard,
    High,
}

impl IncentiveLevel {
    pub const ALL: [IncentiveLevel; 4] = [
        IncentiveLevel::None,
        IncentiveLevel::Low,
        IncentiveLevel::Standard,
        IncentiveLevel::High,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Standard => "Standard",
            Self::High => "High",
        }
    }
}

impl FromStr for IncentiveLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|l| l.as_str() == s).ok_or(())
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// A production team, written `"Team <n>"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Team(u32);

impl Team {
    pub fn number(self) -> u32 {
        self.0
    }
}

impl From<Team> for String {
    fn from(team: Team) -> Self {
        team.to_string()
    }
}

impl TryFrom<String> for Team {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        crate::validation::parse_team(&s).ok_or(s)
    }
}

impl From<u32> for Team {
    fn from(number: u32) -> Self {
        Self(number)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team {}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Validated record
// ---------------------------------------------------------------------------

/// A fully validated shift record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRecord {
    pub(crate) date: NaiveDate,
    pub(crate) department: Department,
    pub(crate) team: Team,
    pub(crate) targeted_productivity: f64,
    pub(crate) smv_minutes: f64,
    pub(crate) over_time_hours: f64,
    pub(crate) incentive_level: IncentiveLevel,
    pub(crate) idle_time_minutes: f64,
    pub(crate) idle_men_count: u32,
    pub(crate) style_change_count: u32,
    pub(crate) worker_count: u32,
}

impl ValidatedRecord {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn department(&self) -> Department {
        self.department
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn targeted_productivity(&self) -> f64 {
        self.targeted_productivity
    }

    pub fn smv_minutes(&self) -> f64 {
        self.smv_minutes
    }

    pub fn over_time_hours(&self) -> f64 {
        self.over_time_hours
    }

    pub fn incentive_level(&self) -> IncentiveLevel {
        self.incentive_level
    }

    pub fn idle_time_minutes(&self) -> f64 {
        self.idle_time_minutes
    }

    pub fn idle_men_count(&self) -> u32 {
        self.idle_men_count
    }

    pub fn style_change_count(&self) -> u32 {
        self.style_change_count
    }

    pub fn worker_count(&self) -> u32 {
        self.worker_count
    }
}
