//! The closed region table used by the vaccination ratio report.
//!
//! Each continent maps to the single snapshot date the ratio is read at. The
//! set of keys is the enum itself; an unknown name never resolves.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Europe,
    Asia,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    Oceania,
}

impl Continent {
    pub const ALL: [Continent; 6] = [
        Continent::Africa,
        Continent::Europe,
        Continent::Asia,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Oceania,
    ];

    /// The location name as stored in the dataset.
    pub fn name(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Europe => "Europe",
            Continent::Asia => "Asia",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Oceania => "Oceania",
        }
    }

    /// The date the continent's vaccination snapshot is taken at.
    pub fn snapshot_date(self) -> NaiveDate {
        let (y, m, d) = match self {
            Continent::Africa => (2023, 9, 16),
            Continent::Europe => (2023, 10, 3),
            Continent::Asia => (2023, 10, 4),
            Continent::NorthAmerica => (2023, 10, 9),
            Continent::SouthAmerica => (2023, 10, 9),
            Continent::Oceania => (2023, 5, 9),
        };
        // Fixed calendar dates; every entry is valid.
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Continent {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Continent::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| ReportError::UnresolvedParameter {
                name: "continent",
                key: s.to_string(),
            })
    }
}
