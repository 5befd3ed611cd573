use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// A numeric column of the dataset that a report may rank or plot.
///
/// Column names reach SQL text only through [`Metric::column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalCases,
    TotalDeaths,
    NewCases,
    NewDeaths,
    PeopleFullyVaccinated,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::TotalCases,
        Metric::TotalDeaths,
        Metric::NewCases,
        Metric::NewDeaths,
        Metric::PeopleFullyVaccinated,
    ];

    /// Position in [`Metric::ALL`].
    pub(crate) fn index(self) -> usize {
        match self {
            Metric::TotalCases => 0,
            Metric::TotalDeaths => 1,
            Metric::NewCases => 2,
            Metric::NewDeaths => 3,
            Metric::PeopleFullyVaccinated => 4,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalCases => "total_cases",
            Metric::TotalDeaths => "total_deaths",
            Metric::NewCases => "new_cases",
            Metric::NewDeaths => "new_deaths",
            Metric::PeopleFullyVaccinated => "people_fully_vaccinated",
        }
    }

    /// Human-readable axis/legend text.
    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalCases => "Total cases",
            Metric::TotalDeaths => "Total deaths",
            Metric::NewCases => "New cases",
            Metric::NewDeaths => "New deaths",
            Metric::PeopleFullyVaccinated => "People fully vaccinated",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.column() == s)
            .ok_or_else(|| {
                ReportError::Validation(format!("unknown metric {:?}", s))
            })
    }
}
