use chrono::NaiveDate;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AmortizationError, Result};

/// Decimal places kept on closing balances.
pub const BALANCE_DEC_PLACES: f64 = 6.;

/// One repayment period of an amortization schedule.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub due_date: Option<NaiveDate>,
    pub opening_balance: f64,
    pub interest: f64,
    pub principal: f64,
    pub period_payment: f64,
    pub closing_balance: f64,
    /// Interest still payable from this period to the end of the schedule.
    pub cumulative_interest: f64,
}

impl fmt::Display for AmortizationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "period {}, payment ${:.2}, interest ${:.2}, principal ${:.2}, balance ${:.2}",
            self.period,
            self.period_payment,
            self.interest,
            self.principal,
            self.closing_balance
        )
    }
}

/// Optional knobs for [`generate_amortization_table`].
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct TableOptions {
    /// Desired payment per period. Ignored when below the minimum payment.
    pub total_payment_per_period: Option<f64>,
    /// Extra principal paid every period on top of the payment.
    pub additional_payment_per_period: Option<f64>,
    /// Rate charged during the leading interest-only periods.
    pub interest_only_rate_per_period: f64,
    pub interest_only_periods: u32,
}

pub(crate) fn round(amt: f64, dec: f64) -> f64 {
    if amt == 0. {
        0.
    } else {
        (amt * 10_f64.powf(dec)).round() / 10_f64.powf(dec)
    }
}

/// `PMT`: the fixed payment that retires `loan_amount` over `n_periods`.
pub fn calculate_total_period_payment(loan_amount: f64, period_rate: f64, n_periods: u32) -> f64 {
    if n_periods == 0 {
        return loan_amount;
    }
    let n = n_periods as f64;
    if period_rate == 0. {
        return loan_amount / n;
    }
    // discounted form: (1 + r)^-n underflows to 0 instead of overflowing
    loan_amount * period_rate / (1. - (1. + period_rate).powf(-n))
}

/// `IPMT`: interest accrued on the outstanding balance for one period.
pub fn calculate_interest_payment(outstanding: f64, period_rate: f64) -> f64 {
    outstanding * period_rate
}

/// `PPMT`: the share of `total_period_payment` that reduces principal.
pub fn calculate_principal_payment(
    total_period_payment: f64,
    outstanding: f64,
    period_rate: f64,
) -> f64 {
    total_period_payment - calculate_interest_payment(outstanding, period_rate)
}

/// `(principal, interest)` portions of a period payment.
pub fn calculate_principal_and_interest_payment(
    total_period_payment: f64,
    outstanding: f64,
    period_rate: f64,
) -> (f64, f64) {
    (
        calculate_principal_payment(total_period_payment, outstanding, period_rate),
        calculate_interest_payment(outstanding, period_rate),
    )
}

fn check_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0. {
        let reason = format!("must be finite and >= 0, got {}", value);
        return Err(AmortizationError::invalid(field, reason));
    }
    Ok(())
}

fn validate(
    period_rate: f64,
    principal: f64,
    n_periods: u32,
    options: &TableOptions,
) -> Result<()> {
    if !principal.is_finite() || principal <= 0. {
        let reason = format!("must be > 0, got {}", principal);
        return Err(AmortizationError::invalid("principal", reason));
    }
    if n_periods == 0 {
        return Err(AmortizationError::invalid("n_periods", "must be > 0"));
    }
    check_non_negative("period_rate", period_rate)?;
    let io_rate = options.interest_only_rate_per_period;
    check_non_negative("interest_only_rate_per_period", io_rate)?;
    if let Some(extra) = options.additional_payment_per_period {
        check_non_negative("additional_payment_per_period", extra)?;
    }
    if let Some(pmt) = options.total_payment_per_period {
        check_non_negative("total_payment_per_period", pmt)?;
    }
    if (io_rate > 0.) != (options.interest_only_periods > 0) {
        return Err(AmortizationError::invalid(
            "interest_only",
            "interest-only rate and interest-only periods must be set together",
        ));
    }
    if options.interest_only_periods >= n_periods {
        return Err(AmortizationError::invalid(
            "interest_only_periods",
            format!("must be fewer than the {} loan periods", n_periods),
        ));
    }
    Ok(())
}

/// Generate the repayment schedule of a declining-balance loan.
///
/// The payment is the annuity `PMT` over the amortizing (non interest-only)
/// periods, raised to `total_payment_per_period` when that is larger, plus any
/// additional payment. The schedule ends early once the balance reaches zero.
///
/// Terms so long that the payment no longer reduces the balance at
/// [`BALANCE_DEC_PLACES`] precision are rejected as `InvalidInput`.
pub fn generate_amortization_table(
    period_rate: f64,
    principal: f64,
    n_periods: u32,
    options: TableOptions,
) -> Result<Vec<AmortizationRow>> {
    validate(period_rate, principal, n_periods, &options)?;

    let io_periods = options.interest_only_periods;
    let io_rate = options.interest_only_rate_per_period;
    let amortizing_periods = n_periods - io_periods;
    let minimum = calculate_total_period_payment(principal, period_rate, amortizing_periods);
    let mut pmt = match options.total_payment_per_period {
        Some(pmt) if pmt >= minimum => pmt,
        Some(pmt) => {
            warn!(
                "total payment per period {:.2} is below the minimum {:.2}, using the minimum",
                pmt,
                minimum
            );
            minimum
        }
        None => minimum,
    };
    pmt += options.additional_payment_per_period.unwrap_or(0.);

    // the first amortizing period opens on the full principal
    let (reduction, _) = calculate_principal_and_interest_payment(pmt, principal, period_rate);
    if !pmt.is_finite() || round(principal - reduction, BALANCE_DEC_PLACES) >= principal {
        return Err(AmortizationError::invalid(
            "n_periods",
            format!("payment {} never reduces the balance", pmt),
        ));
    }
    debug!(
        "generating schedule: period rate {}, {} periods ({} interest only), payment {}",
        period_rate,
        n_periods,
        io_periods,
        pmt
    );

    let mut rows: Vec<AmortizationRow> = Vec::new();
    let mut opening_balance = principal;
    for period in 1..=n_periods {
        let (mut principal_paid, interest, mut period_payment) = if period <= io_periods {
            let interest = calculate_interest_payment(opening_balance, io_rate);
            (0., interest, interest)
        } else {
            let (principal_paid, interest) =
                calculate_principal_and_interest_payment(pmt, opening_balance, period_rate);
            (principal_paid, interest, pmt)
        };

        let mut closing_balance = round(opening_balance - principal_paid, BALANCE_DEC_PLACES);
        // last payment clears whatever is left, including rounding residue
        if closing_balance <= 0. || period == n_periods {
            principal_paid = opening_balance;
            closing_balance = 0.;
            period_payment = principal_paid + interest;
        }
        trace!(
            "period {}, interest {}, principal {}, closing balance {}",
            period,
            interest,
            principal_paid,
            closing_balance
        );

        rows.push(AmortizationRow {
            period,
            due_date: None,
            opening_balance,
            interest,
            principal: principal_paid,
            period_payment,
            closing_balance,
            cumulative_interest: 0.,
        });

        opening_balance = closing_balance;
        if opening_balance <= 0. {
            break;
        }
    }

    let mut remaining = 0.;
    for row in rows.iter_mut().rev() {
        remaining += row.interest;
        row.cumulative_interest = remaining;
    }
    Ok(rows)
}
