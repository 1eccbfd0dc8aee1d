use chrono::NaiveDate;
use log::{debug, info};
use std::ops::{Deref, DerefMut};

use crate::chart::{stacked_bar_chart, ChartLayout, StackedBarChart};
use crate::error::{AmortizationError, Result};
use crate::frequency::RepaymentFrequency;
use crate::schedule::{
    calculate_total_period_payment, generate_amortization_table, AmortizationRow, TableOptions,
};

/// Setters mutate in place unless told otherwise.
pub const DEFAULT_INPLACE: bool = true;

/// Outcome of a setter: the updated instance itself, or an updated copy.
///
/// Derefs to [`Amortization`] either way, so setters chain:
/// `loan.set_years(25, true)?.set_principal(400_000., true)?;`
#[derive(Debug)]
pub enum Updated<'a> {
    InPlace(&'a mut Amortization),
    Copied(Amortization),
}

impl Updated<'_> {
    pub fn is_copy(&self) -> bool {
        matches!(self, Updated::Copied(_))
    }

    /// Owned result; an in-place update is cloned out.
    pub fn into_owned(self) -> Amortization {
        match self {
            Updated::InPlace(loan) => loan.clone(),
            Updated::Copied(loan) => loan,
        }
    }
}

impl Deref for Updated<'_> {
    type Target = Amortization;

    fn deref(&self) -> &Amortization {
        match self {
            Updated::InPlace(loan) => loan,
            Updated::Copied(loan) => loan,
        }
    }
}

impl DerefMut for Updated<'_> {
    fn deref_mut(&mut self) -> &mut Amortization {
        match self {
            Updated::InPlace(loan) => loan,
            Updated::Copied(loan) => loan,
        }
    }
}

/// A loan and its repayment schedule.
///
/// The schedule is regenerated every time a loan parameter changes, so the
/// derived figures always describe the current parameters.
#[derive(Clone, PartialEq, Debug)]
pub struct Amortization {
    nominal_annual_interest_rate: f64,
    principal: f64,
    years: u32,
    repayment_frequency: RepaymentFrequency,
    additional_payment_per_period: f64,
    interest_only_nominal_annual_interest_rate: f64,
    interest_only_years: u32,
    first_payment_date: Option<NaiveDate>,
    schedule: Vec<AmortizationRow>,
}

impl Amortization {
    pub fn new(
        nominal_annual_interest_rate: f64,
        principal: f64,
        years: u32,
        repayment_frequency: RepaymentFrequency,
    ) -> Result<Self> {
        let mut loan = Self {
            nominal_annual_interest_rate,
            principal,
            years,
            repayment_frequency,
            additional_payment_per_period: 0.,
            interest_only_nominal_annual_interest_rate: 0.,
            interest_only_years: 0,
            first_payment_date: None,
            schedule: Vec::new(),
        };
        loan.schedule = loan.build_schedule()?;
        info!(
            "amortization created: ${:.2} over {} years {}, {} periods",
            principal,
            years,
            repayment_frequency,
            loan.schedule.len()
        );
        Ok(loan)
    }

    /// Like [`Amortization::new`] with the frequency given as a label such as
    /// `"weekly"` or `"26"`.
    pub fn from_label(
        nominal_annual_interest_rate: f64,
        principal: f64,
        years: u32,
        frequency: &str,
    ) -> Result<Self> {
        let frequency = frequency.parse()?;
        Self::new(nominal_annual_interest_rate, principal, years, frequency)
    }

    // getters

    pub fn nominal_annual_interest_rate(&self) -> f64 {
        self.nominal_annual_interest_rate
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn repayment_frequency(&self) -> RepaymentFrequency {
        self.repayment_frequency
    }

    pub fn additional_payment_per_period(&self) -> f64 {
        self.additional_payment_per_period
    }

    pub fn interest_only_nominal_annual_interest_rate(&self) -> f64 {
        self.interest_only_nominal_annual_interest_rate
    }

    pub fn interest_only_years(&self) -> u32 {
        self.interest_only_years
    }

    pub fn first_payment_date(&self) -> Option<NaiveDate> {
        self.first_payment_date
    }

    pub fn schedule(&self) -> &[AmortizationRow] {
        &self.schedule
    }

    /// Contracted number of repayments, `years * periods per year`.
    pub fn n_periods(&self) -> u32 {
        self.years * self.repayment_frequency.periods_per_year()
    }

    pub fn period_rate(&self) -> f64 {
        self.nominal_annual_interest_rate / self.repayment_frequency.periods_per_year() as f64
    }

    pub fn n_interest_only_periods(&self) -> u32 {
        self.interest_only_years * self.repayment_frequency.periods_per_year()
    }

    pub fn has_interest_only(&self) -> bool {
        self.interest_only_nominal_annual_interest_rate > 0. && self.interest_only_years > 0
    }

    // derived figures

    pub fn total_interest(&self) -> f64 {
        self.schedule.iter().map(|row| row.interest).sum()
    }

    /// Principal plus all interest payable.
    pub fn total_outstanding_balance(&self) -> f64 {
        self.principal + self.total_interest()
    }

    /// Total interest as a fraction of principal, e.g. `0.70` for 70%.
    pub fn total_interest_over_principal(&self) -> f64 {
        self.total_interest() / self.principal
    }

    /// EAR `(1 + i/n)^n - 1` with `n` the repayments per year.
    pub fn effective_annual_interest_rate(&self) -> f64 {
        let n = self.repayment_frequency.periods_per_year() as f64;
        (1. + self.nominal_annual_interest_rate / n).powf(n) - 1.
    }

    /// Minimum (`PMT`) payment per amortizing period, before any additional payment.
    pub fn total_payment_per_period(&self) -> f64 {
        calculate_total_period_payment(
            self.principal,
            self.period_rate(),
            self.n_periods() - self.n_interest_only_periods(),
        )
    }

    pub fn interest_only_payment_per_period(&self) -> f64 {
        if !self.has_interest_only() {
            return 0.;
        }
        self.principal * self.interest_only_nominal_annual_interest_rate
            / self.repayment_frequency.periods_per_year() as f64
    }

    pub fn total_interest_only_payments(&self) -> f64 {
        self.interest_only_payment_per_period() * self.n_interest_only_periods() as f64
    }

    /// Opening principal and interest still payable at each period.
    pub fn period_balances_chart(&self) -> Result<StackedBarChart> {
        stacked_bar_chart(
            &self.schedule,
            "period",
            &[
                ("opening_balance", "Outstanding Principal ($)"),
                ("cumulative_interest", "Cumulative Interest Payable ($)"),
            ],
            ChartLayout {
                title: "Amortization Period Balances Over Time (n)".to_string(),
                xaxis_title: "n - Number of Repayment Periods".to_string(),
                yaxis_title: "Period Balances ($)".to_string(),
                legend_title: "Legend".to_string(),
            },
        )
    }

    /// Principal and interest portions of each repayment.
    pub fn period_repayments_chart(&self) -> Result<StackedBarChart> {
        stacked_bar_chart(
            &self.schedule,
            "period",
            &[
                ("principal", "Principal Payment ($)"),
                ("interest", "Interest Payment ($)"),
            ],
            ChartLayout {
                title: "Amortization Period Repayments Over Time (n)".to_string(),
                xaxis_title: "n - Number of Repayment Periods".to_string(),
                yaxis_title: "Period Payments ($)".to_string(),
                legend_title: "Legend".to_string(),
            },
        )
    }

    /// Deep, independent duplicate.
    pub fn copy(&self) -> Amortization {
        self.clone()
    }

    // setters

    pub fn set_nominal_annual_interest_rate(
        &mut self,
        rate: f64,
        inplace: bool,
    ) -> Result<Updated<'_>> {
        self.update(inplace, |loan| loan.nominal_annual_interest_rate = rate)
    }

    pub fn set_principal(&mut self, principal: f64, inplace: bool) -> Result<Updated<'_>> {
        self.update(inplace, |loan| loan.principal = principal)
    }

    pub fn set_years(&mut self, years: u32, inplace: bool) -> Result<Updated<'_>> {
        self.update(inplace, |loan| loan.years = years)
    }

    pub fn set_repayment_frequency(
        &mut self,
        frequency: RepaymentFrequency,
        inplace: bool,
    ) -> Result<Updated<'_>> {
        self.update(inplace, |loan| loan.repayment_frequency = frequency)
    }

    /// Label form of [`Amortization::set_repayment_frequency`].
    pub fn set_repayment_frequency_label(
        &mut self,
        frequency: &str,
        inplace: bool,
    ) -> Result<Updated<'_>> {
        let frequency = frequency.parse()?;
        self.set_repayment_frequency(frequency, inplace)
    }

    pub fn set_additional_payment_per_period(
        &mut self,
        amount: f64,
        inplace: bool,
    ) -> Result<Updated<'_>> {
        self.update(inplace, |loan| loan.additional_payment_per_period = amount)
    }

    /// Leading interest-only phase. A zero rate and zero years removes it.
    pub fn set_interest_only(
        &mut self,
        rate: f64,
        years: u32,
        inplace: bool,
    ) -> Result<Updated<'_>> {
        self.update(inplace, |loan| {
            loan.interest_only_nominal_annual_interest_rate = rate;
            loan.interest_only_years = years;
        })
    }

    /// Date the first repayment falls due; rows carry due dates once set.
    pub fn set_first_payment_date(
        &mut self,
        date: Option<NaiveDate>,
        inplace: bool,
    ) -> Result<Updated<'_>> {
        self.update(inplace, |loan| loan.first_payment_date = date)
    }

    fn update(
        &mut self,
        inplace: bool,
        change: impl FnOnce(&mut Amortization),
    ) -> Result<Updated<'_>> {
        let mut next = self.clone();
        change(&mut next);
        next.schedule = next.build_schedule()?;
        if inplace {
            *self = next;
            debug!(
                "amortization updated in place, {} periods",
                self.schedule.len()
            );
            Ok(Updated::InPlace(self))
        } else {
            debug!(
                "amortization updated as a copy, {} periods",
                next.schedule.len()
            );
            Ok(Updated::Copied(next))
        }
    }

    // years to periods, refusing terms that overflow the period count
    fn periods_in(&self, field: &str, years: u32) -> Result<u32> {
        let frequency = self.repayment_frequency;
        let periods = years.checked_mul(frequency.periods_per_year());
        periods.ok_or_else(|| {
            let reason = format!("{} years of {} repayments is too long", years, frequency);
            AmortizationError::invalid(field, reason)
        })
    }

    fn build_schedule(&self) -> Result<Vec<AmortizationRow>> {
        if self.years == 0 {
            return Err(AmortizationError::invalid("years", "must be > 0"));
        }
        let n_periods = self.periods_in("years", self.years)?;
        let io_periods = self.periods_in("interest_only_years", self.interest_only_years)?;
        let periods_per_year = self.repayment_frequency.periods_per_year() as f64;
        let io_rate = self.interest_only_nominal_annual_interest_rate / periods_per_year;
        let mut rows = generate_amortization_table(
            self.period_rate(),
            self.principal,
            n_periods,
            TableOptions {
                total_payment_per_period: None,
                additional_payment_per_period: Some(self.additional_payment_per_period),
                interest_only_rate_per_period: io_rate,
                interest_only_periods: io_periods,
            },
        )?;
        if let Some(first) = self.first_payment_date {
            let dates = self.repayment_frequency.due_dates(first, rows.len())?;
            for (row, date) in rows.iter_mut().zip(dates) {
                row.due_date = Some(date);
            }
        }
        Ok(rows)
    }
}
