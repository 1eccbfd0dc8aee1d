use std::{fmt, io};
use tabled::{builder::Builder, settings::Style};

use crate::amortization::Amortization;
use crate::error::Result;
use crate::schedule::AmortizationRow;

const RULE: &str = "--------------------------------------------------------------------";

/// `$1,234,567.89`
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_at(fixed.len() - 3);
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    // no sign when the amount rounds to zero
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if amount < 0. && !is_zero { "-" } else { "" };
    format!("{}${}{}", sign, grouped, cents)
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for Amortization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rate = percent(self.nominal_annual_interest_rate());
        let interest = format_currency(self.total_interest());
        let frequency = format!(
            "{} - {} Periods",
            title_case(self.repayment_frequency().name()),
            self.n_periods()
        );
        let minimum = format_currency(self.total_payment_per_period());
        let ear = percent(self.effective_annual_interest_rate());
        let ratio = percent(self.total_interest_over_principal());
        let lines = [
            ("Principal Borrowed:", format_currency(self.principal())),
            ("Years:", self.years().to_string()),
            ("Annual Interest Rate:", rate),
            ("Forecasted Total Interest:", interest),
            ("Repayment Frequency:", frequency),
            ("Minimum Repayments Per Period:", minimum),
            ("Effective Annual Interest Rate (EAR):", ear),
            ("Total Interest / Total Principal:", ratio),
        ];

        writeln!(f, "{}", RULE)?;
        writeln!(f, "Amortization Schedule")?;
        writeln!(f, "{}", RULE)?;
        for (label, value) in lines {
            writeln!(f, "{:<40}{}", label, value)?;
        }
        if self.additional_payment_per_period() > 0. {
            writeln!(
                f,
                "{:<40}{} ({} periods to repay)",
                "Additional Repayments Per Period:",
                format_currency(self.additional_payment_per_period()),
                self.schedule().len()
            )?;
        }
        if self.has_interest_only() {
            let total_io = self.total_interest_only_payments();
            writeln!(f, "----")?;
            writeln!(
                f,
                "{:<40}{}",
                "Interest Only Repayments Per Period:",
                format_currency(self.interest_only_payment_per_period())
            )?;
            writeln!(
                f,
                "{:<40}{}",
                "Interest Only Annual Interest Rate:",
                percent(self.interest_only_nominal_annual_interest_rate())
            )?;
            writeln!(
                f,
                "{:<40}{}",
                "Forecasted Total Interest Only:",
                format_currency(total_io)
            )?;
            writeln!(
                f,
                "{:<40}{}",
                "Total Interest Only / Total Interest:",
                percent(total_io / self.total_interest())
            )?;
        }
        write!(f, "{}", RULE)
    }
}

/// Render schedule rows as a text table.
pub fn schedule_table(rows: &[AmortizationRow]) -> String {
    let with_dates = rows.iter().any(|row| row.due_date.is_some());
    let mut builder = Builder::default();

    let mut header = vec!["Period"];
    if with_dates {
        header.push("Due Date");
    }
    header.extend([
        "Opening Balance",
        "Interest",
        "Principal",
        "Payment",
        "Closing Balance",
        "Cumulative Interest",
    ]);
    builder.push_record(header.into_iter().map(String::from));

    for row in rows {
        let mut record = vec![row.period.to_string()];
        if with_dates {
            record.push(row.due_date.map(|d| d.to_string()).unwrap_or_default());
        }
        record.extend(
            [
                row.opening_balance,
                row.interest,
                row.principal,
                row.period_payment,
                row.closing_balance,
                row.cumulative_interest,
            ]
            .map(format_currency),
        );
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

/// Write schedule rows as CSV, one header line then one line per period.
pub fn write_csv<W: io::Write>(rows: &[AmortizationRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read schedule rows back from CSV in the [`write_csv`] layout.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<AmortizationRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: AmortizationRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::RepaymentFrequency;
    use chrono::NaiveDate;
    use test_log::test;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.), "$0.00");
        assert_eq!(format_currency(562.9150451), "$562.92");
        assert_eq!(format_currency(1000.), "$1,000.00");
        assert_eq!(format_currency(363147.4704), "$363,147.47");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-2500.5), "-$2,500.50");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn test_summary() {
        let loan = Amortization::from_label(0.0394, 515000., 30, "weekly").unwrap();
        let summary = loan.to_string();

        assert!(summary.contains("Principal Borrowed:                     $515,000.00"));
        assert!(summary.contains("Annual Interest Rate:                   3.94%"));
        assert!(summary.contains("Forecasted Total Interest:              $363,147.47"));
        let frequency = "Repayment Frequency:                    Weekly - 1560 Periods";
        assert!(summary.contains(frequency));
        assert!(summary.contains("Minimum Repayments Per Period:          $562.92"));
        assert!(summary.contains("Effective Annual Interest Rate (EAR):   4.02%"));
        assert!(summary.contains("Total Interest / Total Principal:       70.51%"));
        assert!(!summary.contains("Interest Only"));
    }

    #[test]
    fn test_summary_interest_only() {
        let mut loan = Amortization::new(0.05, 120000., 10, RepaymentFrequency::Monthly).unwrap();
        loan.set_interest_only(0.06, 1, true).unwrap();
        let summary = loan.to_string();
        assert!(summary.contains("Interest Only Repayments Per Period:    $600.00"));
        assert!(summary.contains("Forecasted Total Interest Only:         $7,200.00"));
    }

    #[test]
    fn test_schedule_table() {
        let mut loan = Amortization::new(0.05, 12000., 1, RepaymentFrequency::Quarterly).unwrap();
        let table = schedule_table(loan.schedule());
        assert!(table.contains("Cumulative Interest"));
        assert!(table.contains("$12,000.00"));
        assert!(!table.contains("Due Date"));

        let first = NaiveDate::from_ymd_opt(2024, 3, 1);
        loan.set_first_payment_date(first, true).unwrap();
        let table = schedule_table(loan.schedule());
        assert!(table.contains("Due Date"));
        assert!(table.contains("2024-12-01"));
    }

    #[test]
    fn test_write_csv() {
        let loan = Amortization::new(0., 1200., 1, RepaymentFrequency::Quarterly).unwrap();
        let mut out = Vec::new();
        write_csv(loan.schedule(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        let header = concat!(
            "period,due_date,opening_balance,interest,principal,",
            "period_payment,closing_balance,cumulative_interest"
        );
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], header);
        assert_eq!(lines[1], "1,,1200.0,0.0,300.0,300.0,900.0,0.0");
        assert_eq!(lines[4], "4,,300.0,0.0,300.0,300.0,0.0,0.0");
    }

    #[test]
    fn test_csv_round_trip() {
        let mut loan = Amortization::new(0.045, 25000., 2, RepaymentFrequency::Monthly).unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 1, 31);
        loan.set_first_payment_date(first, true).unwrap();

        let mut out = Vec::new();
        write_csv(loan.schedule(), &mut out).unwrap();
        let rows = read_csv(out.as_slice()).unwrap();
        assert_eq!(rows.len(), 24);
        assert_eq!(rows, loan.schedule());
        assert_eq!(rows[1].due_date, NaiveDate::from_ymd_opt(2024, 2, 29));

        assert!(read_csv("period,due_date\n1,not-a-date\n".as_bytes()).is_err());
    }
}
