use loan_calc_core::amortization::{self, compute_balance_series, compute_monthly_payment};
use loan_calc_core::{LoanCalcError, LoanForm, LoanRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Monthly payment
// ===========================================================================

fn sample_loans() -> Vec<LoanRequest> {
    vec![
        LoanRequest::new(dec!(10000), dec!(5), 2).unwrap(),
        LoanRequest::new(dec!(250000), dec!(3.5), 30).unwrap(),
        LoanRequest::new(dec!(18500.99), dec!(7.49), 6).unwrap(),
        LoanRequest::new(dec!(1200), dec!(19.99), 1).unwrap(),
        LoanRequest::new(dec!(50000), dec!(0.5), 15).unwrap(),
    ]
}

#[test]
fn test_reference_example() {
    let req = LoanForm::new("10000", "5", "2").parse().unwrap();
    let out = amortization::amortize(&req).unwrap();
    let r = &out.result;

    assert_eq!(r.monthly_payment, dec!(438.71));
    assert_eq!(r.balance_series.len(), 24);

    let last = r.balance_series.last().unwrap();
    assert_eq!(last.month, 24);
    assert!(last.remaining_balance <= dec!(0.24), "final balance {}", last.remaining_balance);
}

#[test]
fn test_payment_positive_and_stable() {
    for req in sample_loans() {
        let a = compute_monthly_payment(&req).unwrap();
        let b = compute_monthly_payment(&req).unwrap();
        assert!(a > Decimal::ZERO);
        assert_eq!(a, b);
        assert!(a.scale() <= 2, "payment {a} not rounded to cents");
    }
}

#[test]
fn test_payment_covers_more_than_principal_over_term() {
    for req in sample_loans() {
        let payment = compute_monthly_payment(&req).unwrap();
        let total = payment * Decimal::from(req.number_of_payments());
        assert!(total > req.principal());
    }
}

#[test]
fn test_higher_rate_means_higher_payment() {
    let low = LoanRequest::new(dec!(100000), dec!(4), 20).unwrap();
    let high = LoanRequest::new(dec!(100000), dec!(8), 20).unwrap();
    assert!(compute_monthly_payment(&high).unwrap() > compute_monthly_payment(&low).unwrap());
}

#[test]
fn test_longer_term_means_lower_payment() {
    let short = LoanRequest::new(dec!(100000), dec!(6), 10).unwrap();
    let long = LoanRequest::new(dec!(100000), dec!(6), 30).unwrap();
    assert!(compute_monthly_payment(&long).unwrap() < compute_monthly_payment(&short).unwrap());
}

// ===========================================================================
// Balance series
// ===========================================================================

#[test]
fn test_series_length_matches_term() {
    for req in sample_loans() {
        let payment = compute_monthly_payment(&req).unwrap();
        let series = compute_balance_series(&req, payment);
        assert_eq!(series.len(), (req.term_years() * 12) as usize);
        for (i, point) in series.iter().enumerate() {
            assert_eq!(point.month as usize, i + 1);
        }
    }
}

#[test]
fn test_series_never_negative_and_never_rises() {
    for req in sample_loans() {
        let payment = compute_monthly_payment(&req).unwrap();
        let series = compute_balance_series(&req, payment);
        let mut previous = req.principal();
        for point in &series {
            assert!(point.remaining_balance >= Decimal::ZERO);
            assert!(point.remaining_balance <= previous);
            previous = point.remaining_balance;
        }
    }
}

#[test]
fn test_interest_declines_over_life() {
    let req = LoanRequest::new(dec!(250000), dec!(3.5), 30).unwrap();
    let out = amortization::amortize(&req).unwrap();
    let series = &out.result.balance_series;
    assert!(series[0].interest > series[series.len() - 1].interest);
    assert!(series[0].principal < series[series.len() - 1].principal);
}

#[test]
fn test_chart_series_mirrors_balances() {
    let req = LoanRequest::new(dec!(18500.99), dec!(7.49), 6).unwrap();
    let out = amortization::amortize(&req).unwrap();
    let chart = amortization::chart_series(&out.result);

    assert_eq!(chart.labels.len(), 72);
    let balances: Vec<Decimal> = out
        .result
        .balance_series
        .iter()
        .map(|p| p.remaining_balance)
        .collect();
    assert_eq!(chart.balances, balances);
}

// ===========================================================================
// Rejection
// ===========================================================================

#[test]
fn test_precision_rejection_performs_no_computation() {
    let err = LoanForm::new("100.123", "5", "2").parse().unwrap_err();
    assert!(matches!(err, LoanCalcError::ExcessPrecision { .. }));
}

#[test]
fn test_zero_rate_rejected_at_the_boundary() {
    let err = LoanForm::new("1000", "0", "2").parse().unwrap_err();
    assert!(matches!(err, LoanCalcError::InvalidInput { .. }));
    assert!(LoanRequest::new(dec!(1000), Decimal::ZERO, 2).is_err());
}

#[test]
fn test_envelope_records_assumptions() {
    let req = LoanRequest::new(dec!(10000), dec!(5), 2).unwrap();
    let out = amortization::amortize(&req).unwrap();
    assert_eq!(out.assumptions["loanAmount"], "10000");
    assert_eq!(out.assumptions["loanTerm"], 2);
    assert!(out.methodology.contains("amortization"));
}
