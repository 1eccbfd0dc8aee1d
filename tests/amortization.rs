use amortize::{
    generate_amortization_schedule, generate_amortization_table, read_csv, stacked_bar_chart,
    write_csv, AmortizationError, ChartLayout, RepaymentFrequency, TableOptions,
};
use test_log::test;

fn round(amt: f64, dec: i32) -> f64 {
    (amt * 10_f64.powi(dec)).round() / 10_f64.powi(dec)
}

#[test]
fn schedule_length_matches_term() {
    let terms = [
        (30, "weekly"),
        (25, "fortnightly"),
        (15, "monthly"),
        (10, "quarterly"),
        (5, "annually"),
    ];
    for (years, label) in terms {
        let loan = generate_amortization_schedule(0.045, 350000., years, label).unwrap();
        let frequency: RepaymentFrequency = label.parse().unwrap();
        let periods = years * frequency.periods_per_year();
        assert_eq!(loan.schedule().len() as u32, periods);
        assert_eq!(loan.schedule().last().unwrap().closing_balance, 0.);

        let principal_paid: f64 = loan.schedule().iter().map(|r| r.principal).sum();
        assert_eq!(round(principal_paid, 2), 350000.);
    }
}

#[test]
fn reference_weekly_mortgage() {
    let loan = generate_amortization_schedule(0.0394, 515000., 30, "weekly").unwrap();
    assert_eq!(loan.n_periods(), 1560);
    assert_eq!(round(loan.total_payment_per_period(), 2), 562.92);
    assert_eq!(round(loan.total_interest(), 2), 363147.47);
    assert_eq!(round(loan.effective_annual_interest_rate(), 4), 0.0402);
}

#[test]
fn table_and_object_agree() {
    let loan = generate_amortization_schedule(0.061, 420000., 20, "fortnightly").unwrap();
    let opts = TableOptions::default();
    let rows = generate_amortization_table(0.061 / 26., 420000., 520, opts).unwrap();
    assert_eq!(loan.schedule(), rows.as_slice());
}

#[test]
fn copy_toggle() {
    let mut loan = generate_amortization_schedule(0.05, 300000., 30, "monthly").unwrap();
    let original = loan.copy();

    let cheaper = loan
        .set_nominal_annual_interest_rate(0.04, false)
        .unwrap()
        .into_owned();
    assert_eq!(loan, original);
    assert!(cheaper.total_interest() < loan.total_interest());

    loan.set_nominal_annual_interest_rate(0.04, amortize::DEFAULT_INPLACE)
        .unwrap();
    assert_eq!(loan, cheaper);
    assert_ne!(loan, original);
}

#[test]
fn larger_extra_payments_cost_less() {
    let mut loan = generate_amortization_schedule(0.0394, 515000., 30, "weekly").unwrap();
    let mut previous = (loan.total_interest(), loan.schedule().len());
    for extra in [10., 50., 200., 1000.] {
        loan.set_additional_payment_per_period(extra, true).unwrap();
        let current = (loan.total_interest(), loan.schedule().len());
        assert!(current.0 < previous.0);
        assert!(current.1 <= previous.1);
        previous = current;
    }
}

#[test]
fn invalid_inputs_are_rejected() {
    assert!(matches!(
        generate_amortization_schedule(0.04, 100000., 30, "hourly"),
        Err(AmortizationError::UnknownFrequency(label)) if label == "hourly"
    ));
    let cases = [
        (0.04, 0., 30),
        (0.04, -1., 30),
        (0.04, 1000., 0),
        (-0.01, 1000., 30),
        (1.0, 100000., 1000),
    ];
    for (rate, principal, years) in cases {
        assert!(matches!(
            generate_amortization_schedule(rate, principal, years, "monthly"),
            Err(AmortizationError::InvalidInput { .. })
        ));
    }
}

#[test]
fn charts_export_as_plotly_figures() {
    let loan = generate_amortization_schedule(0.05, 10000., 2, "quarterly").unwrap();
    let figure = loan.period_repayments_chart().unwrap().to_figure_json();
    assert_eq!(figure["layout"]["barmode"], "stack");
    assert_eq!(figure["data"][0]["name"], "Principal Payment ($)");
    assert_eq!(figure["data"][0]["x"].as_array().unwrap().len(), 8);

    // the chart builder is not tied to schedules
    let chart = stacked_bar_chart(
        &[serde_json::json!({"x": 1, "a": 1.5, "b": 2})],
        "x",
        &[("a", "A"), ("b", "B")],
        ChartLayout::default(),
    )
    .unwrap();
    assert_eq!(chart.stack_totals(), vec![3.5]);
}

#[test]
fn very_long_terms_stay_finite_or_fail() {
    let weekly = RepaymentFrequency::Weekly;
    let result = amortize::Amortization::new(0.05, 1000., u32::MAX, weekly);
    assert!(matches!(
        result,
        Err(AmortizationError::InvalidInput { ref field, .. }) if field == "years"
    ));

    let loan = generate_amortization_schedule(0.05, 100000., 200, "annually").unwrap();
    assert_eq!(loan.schedule().len(), 200);
    assert!(loan.total_interest().is_finite());
    let balances = loan.period_balances_chart().unwrap();
    assert_eq!(balances.stack_totals().len(), 200);
}

#[test]
fn csv_export_reads_back() {
    let loan = generate_amortization_schedule(0.0394, 515000., 30, "weekly").unwrap();
    let mut out = Vec::new();
    write_csv(loan.schedule(), &mut out).unwrap();
    assert_eq!(read_csv(out.as_slice()).unwrap(), loan.schedule());
}
