//! A calendar month used for filtering transactions and generating reports.

use std::fmt::Display;

use time::Month;

use crate::Error;

/// A month in a specific year, e.g. March 2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthOfYear {
    year: i32,
    month: Month,
}

impl MonthOfYear {
    /// The period used by the client listing when no year or month is given.
    pub const DEFAULT: MonthOfYear = MonthOfYear {
        year: 2024,
        month: Month::March,
    };

    /// Create a period from a year and a month number from 1 to 12.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month` is not in the range 1 to 12.
    pub fn new(year: i32, month: u8) -> Result<Self, Error> {
        let month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;

        Ok(Self { year, month })
    }

    /// Fill in a partial period, using [MonthOfYear::DEFAULT] for missing parts.
    pub fn from_parts(year: Option<i32>, month: Option<u8>) -> Result<Self, Error> {
        Self::new(
            year.unwrap_or(Self::DEFAULT.year),
            month.unwrap_or(Self::DEFAULT.month as u8),
        )
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month number from 1 (January) to 12 (December).
    pub fn month(&self) -> u8 {
        self.month as u8
    }
}

impl Display for MonthOfYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}
