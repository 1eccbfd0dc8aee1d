//! Loan amortization schedules.
//!
//! [`generate_amortization_table`] is the pure period-by-period calculation;
//! [`Amortization`] wraps a loan's parameters and keeps its schedule, summary
//! figures and charts in step with them.

pub mod amortization;
pub mod chart;
pub mod error;
pub mod frequency;
pub mod report;
pub mod schedule;

pub use amortization::{Amortization, Updated, DEFAULT_INPLACE};
pub use chart::{stacked_bar_chart, ChartLayout, Series, StackedBarChart};
pub use error::{AmortizationError, Result};
pub use frequency::RepaymentFrequency;
pub use report::{format_currency, read_csv, schedule_table, write_csv};
pub use schedule::{
    calculate_interest_payment, calculate_principal_and_interest_payment,
    calculate_principal_payment, calculate_total_period_payment, generate_amortization_table,
    AmortizationRow, TableOptions,
};

/// Build an [`Amortization`] from a frequency label such as `"monthly"`.
pub fn generate_amortization_schedule(
    nominal_annual_interest_rate: f64,
    principal: f64,
    years: u32,
    repayment_frequency: &str,
) -> Result<Amortization> {
    Amortization::from_label(
        nominal_annual_interest_rate,
        principal,
        years,
        repayment_frequency,
    )
}
