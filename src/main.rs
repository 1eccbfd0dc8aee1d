use amortize::{generate_amortization_schedule, schedule_table, Result};
use log::info;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .expect("logger initialised once");

    let mut loan = generate_amortization_schedule(0.0394, 515000., 30, "weekly")?;
    println!("{}", loan);

    let faster = loan
        .set_additional_payment_per_period(100., false)?
        .into_owned();
    info!(
        "paying $100 extra per period saves {} and {} periods",
        amortize::format_currency(loan.total_interest() - faster.total_interest()),
        loan.schedule().len() - faster.schedule().len()
    );

    loan.set_years(1, true)?
        .set_repayment_frequency_label("monthly", true)?;
    println!("{}", schedule_table(loan.schedule()));
    Ok(())
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<amortize::Amortization>();
    is_normal::<amortize::AmortizationRow>();
    is_normal::<amortize::StackedBarChart>();
}
