//! Fixed-rate loan amortization: level monthly payment and balance run-off.
//!
//! The payment is the standard annuity formula
//! `P * r / (1 - (1 + r)^-n)` with `r` the monthly rate and `n` the number of
//! monthly payments. Rounding to cents is applied only at the two outputs
//! (the payment and each displayed balance); the running balance is carried
//! at full decimal precision so hundreds of iterations do not accumulate
//! rounding error.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanCalcError;
use crate::request::LoanRequest;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanCalcResult;

/// Label of the single dataset handed to the chart.
pub const BALANCE_DATASET_LABEL: &str = "Loan balance";

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Balance after one monthly payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    /// 1-based month index.
    pub month: u32,
    /// Interest accrued this month, rounded to cents.
    pub interest: Money,
    /// Part of the payment that reduced principal, rounded to cents.
    pub principal: Money,
    /// Remaining balance, floored at zero and rounded to cents.
    pub remaining_balance: Money,
}

/// Payment and run-off for a single loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub monthly_payment: Money,
    pub number_of_payments: u32,
    pub monthly_rate: Rate,
    /// monthly_payment × number_of_payments.
    pub total_paid: Money,
    pub total_interest: Money,
    pub balance_series: Vec<BalancePoint>,
}

/// Labels and values for a balance-over-time line chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub dataset_label: String,
    pub labels: Vec<String>,
    pub balances: Vec<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly payment, rounded half-up to cents.
///
/// A zero monthly rate is rejected as degenerate rather than special-cased:
/// the annuity denominator `1 - (1 + r)^-n` is zero there.
pub fn compute_monthly_payment(request: &LoanRequest) -> LoanCalcResult<Money> {
    let monthly_rate = request.monthly_rate();
    if monthly_rate.is_zero() {
        return Err(LoanCalcError::DegenerateInput(
            "Monthly rate is zero; the annuity payment is undefined".into(),
        ));
    }

    // (1 + r)^-n as (1 / (1 + r))^n so large terms underflow instead of overflow.
    let n = u64::from(request.number_of_payments());
    let discount = (Decimal::ONE / (Decimal::ONE + monthly_rate))
        .checked_powu(n)
        .ok_or_else(|| {
            LoanCalcError::DegenerateInput(format!("Discount factor over {n} months is out of range"))
        })?;

    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        return Err(LoanCalcError::DegenerateInput(
            "Annuity factor collapsed to zero at decimal precision".into(),
        ));
    }

    let payment = request
        .principal()
        .checked_mul(monthly_rate)
        .and_then(|interest| interest.checked_div(denominator))
        .ok_or_else(|| {
            LoanCalcError::DegenerateInput("Monthly payment exceeds the representable range".into())
        })?;

    let rounded = round_currency(payment);
    if rounded <= Decimal::ZERO {
        return Err(LoanCalcError::FinancialImpossibility(format!(
            "Monthly payment on {} rounds to zero",
            request.principal()
        )));
    }
    Ok(rounded)
}

/// Month-by-month balance after paying `monthly_payment`.
///
/// Always returns exactly `term_years * 12` points. Pure: the same inputs
/// give the same series on every call.
pub fn compute_balance_series(request: &LoanRequest, monthly_payment: Money) -> Vec<BalancePoint> {
    let monthly_rate = request.monthly_rate();
    let n = request.number_of_payments();
    let mut balance = request.principal();
    let mut series = Vec::with_capacity(n as usize);

    for month in 1..=n {
        let interest = balance * monthly_rate;
        // The last payment only retires what is left.
        let principal_portion = (monthly_payment - interest).min(balance);
        balance -= principal_portion;

        series.push(BalancePoint {
            month,
            interest: round_currency(interest),
            principal: round_currency(principal_portion),
            remaining_balance: round_currency(balance.max(Decimal::ZERO)),
        });
    }

    series
}

/// Full amortization: payment, balance series and totals.
pub fn amortize(request: &LoanRequest) -> LoanCalcResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let monthly_payment = compute_monthly_payment(request)?;

    let first_interest = request
        .principal()
        .checked_mul(request.monthly_rate())
        .ok_or_else(|| out_of_range("First-month interest"))?;
    if monthly_payment <= first_interest {
        return Err(LoanCalcError::FinancialImpossibility(format!(
            "Monthly payment {} does not cover first-month interest {}",
            monthly_payment,
            round_currency(first_interest)
        )));
    }

    let balance_series = compute_balance_series(request, monthly_payment);
    let number_of_payments = request.number_of_payments();
    let total_paid = monthly_payment
        .checked_mul(Decimal::from(number_of_payments))
        .ok_or_else(|| out_of_range("Total paid"))?;
    let total_interest = total_paid
        .checked_sub(request.principal())
        .ok_or_else(|| out_of_range("Total interest"))?;

    if total_interest > request.principal() {
        warnings.push(format!(
            "Total interest {} exceeds the amount borrowed",
            total_interest
        ));
    }
    if let Some(last) = balance_series.last() {
        if !last.remaining_balance.is_zero() {
            warnings.push(format!(
                "Balance of {} remains after the final payment due to rounding the payment to cents",
                last.remaining_balance
            ));
        }
    }

    let result = AmortizationResult {
        monthly_payment,
        number_of_payments,
        monthly_rate: request.monthly_rate(),
        total_paid,
        total_interest,
        balance_series,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate annuity amortization (monthly compounding)",
        request,
        warnings,
        elapsed,
        result,
    ))
}

/// Chart labels ("Month 1", "Month 2", ...) and balances for `result`.
pub fn chart_series(result: &AmortizationResult) -> ChartData {
    let (labels, balances) = result
        .balance_series
        .iter()
        .map(|p| (format!("Month {}", p.month), p.remaining_balance))
        .unzip();

    ChartData {
        dataset_label: BALANCE_DATASET_LABEL.to_string(),
        labels,
        balances,
    }
}

fn out_of_range(quantity: &str) -> LoanCalcError {
    LoanCalcError::DegenerateInput(format!("{quantity} exceeds the representable range"))
}

fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
