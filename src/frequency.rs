use chrono::{Days, Months, NaiveDate};
use std::{fmt, str::FromStr};

use crate::error::{AmortizationError, Result};

/// How often a repayment falls due.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RepaymentFrequency {
    Weekly,
    Fortnightly,
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl RepaymentFrequency {
    pub const ALL: [RepaymentFrequency; 5] = [
        RepaymentFrequency::Weekly,
        RepaymentFrequency::Fortnightly,
        RepaymentFrequency::Monthly,
        RepaymentFrequency::Quarterly,
        RepaymentFrequency::Annually,
    ];

    pub fn periods_per_year(&self) -> u32 {
        match self {
            RepaymentFrequency::Weekly => 52,
            RepaymentFrequency::Fortnightly => 26,
            RepaymentFrequency::Monthly => 12,
            RepaymentFrequency::Quarterly => 4,
            RepaymentFrequency::Annually => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RepaymentFrequency::Weekly => "weekly",
            RepaymentFrequency::Fortnightly => "fortnightly",
            RepaymentFrequency::Monthly => "monthly",
            RepaymentFrequency::Quarterly => "quarterly",
            RepaymentFrequency::Annually => "annually",
        }
    }

    /// Frequency matching a periods-per-year count, e.g. `26` for fortnightly.
    pub fn from_periods(periods: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.periods_per_year() == periods)
            .ok_or_else(|| AmortizationError::UnknownFrequency(periods.to_string()))
    }

    // months between due dates, None for the day based frequencies
    fn month_step(&self) -> Option<u32> {
        match self {
            RepaymentFrequency::Weekly | RepaymentFrequency::Fortnightly => None,
            _ => Some(12 / self.periods_per_year()),
        }
    }

    /// Due date of the repayment following `date`.
    pub fn next_due_date(&self, date: NaiveDate) -> Result<NaiveDate> {
        match self {
            RepaymentFrequency::Weekly => add_days(date, 7),
            RepaymentFrequency::Fortnightly => add_days(date, 14),
            RepaymentFrequency::Monthly => add_months(date, 1),
            RepaymentFrequency::Quarterly => add_months(date, 3),
            RepaymentFrequency::Annually => add_months(date, 12),
        }
    }

    /// `count` consecutive due dates starting at `first`.
    ///
    /// Month based frequencies are stepped from `first` rather than from the
    /// previous date so a due date clamped to a short month (31st -> 28th)
    /// recovers in the following month.
    pub fn due_dates(&self, first: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
        let mut dates: Vec<NaiveDate> = Vec::with_capacity(count);
        for i in 0..count {
            let date = match (self.month_step(), dates.last()) {
                (Some(step), _) => add_months(first, i as u32 * step)?,
                (None, Some(prev)) => self.next_due_date(*prev)?,
                (None, None) => first,
            };
            dates.push(date);
        }
        Ok(dates)
    }
}

fn out_of_range(date: NaiveDate) -> AmortizationError {
    AmortizationError::InvalidDate(format!("no due date follows {}", date))
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    let next = date.checked_add_days(Days::new(days));
    next.ok_or_else(|| out_of_range(date))
}

fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    let next = date.checked_add_months(Months::new(months));
    next.ok_or_else(|| out_of_range(date))
}

impl fmt::Display for RepaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RepaymentFrequency {
    type Err = AmortizationError;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim().to_lowercase();
        if let Some(freq) = Self::ALL.into_iter().find(|f| f.name() == label) {
            return Ok(freq);
        }
        // numeric labels such as "52" are accepted as periods per year
        label
            .parse::<u32>()
            .ok()
            .and_then(|periods| Self::from_periods(periods).ok())
            .ok_or_else(|| AmortizationError::UnknownFrequency(s.to_string()))
    }
}
