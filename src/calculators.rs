//! Deterministic financial calculators
//!
//! Pure, total functions. The LLM never participates in these numbers; it only
//! narrates the results afterwards.

use crate::models::Debt;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payoff simulations stop after 50 years so pathological inputs (payment
/// below accruing interest) still terminate.
pub const MAX_PAYOFF_MONTHS: u32 = 600;

//
// ================= Compound interest =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Compounding {
    Annual,
    Quarterly,
    Monthly,
    Daily,
}

impl Compounding {
    pub fn periods_per_year(self) -> f64 {
        match self {
            Compounding::Annual => 1.0,
            Compounding::Quarterly => 4.0,
            Compounding::Monthly => 12.0,
            Compounding::Daily => 365.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundInterestResult {
    pub final_amount: f64,
    pub interest_earned: f64,
    pub total_contributions: f64,
}

/// A = P(1 + r/n)^(nt), with r given in percent.
pub fn compound_interest(
    principal: f64,
    annual_rate_pct: f64,
    years: u32,
    compounding: Compounding,
) -> CompoundInterestResult {
    let n = compounding.periods_per_year();
    let rate = annual_rate_pct / 100.0;
    let amount = principal * (1.0 + rate / n).powf(n * years as f64);

    CompoundInterestResult {
        final_amount: round2(amount),
        interest_earned: round2(amount - principal),
        total_contributions: principal,
    }
}

//
// ================= Loan amortization =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPaymentResult {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_payment: f64,
}

/// Fixed monthly payment via the standard amortization formula. A zero rate
/// degrades to simple division rather than an error.
pub fn loan_payment(principal: f64, annual_rate_pct: f64, years: u32) -> LoanPaymentResult {
    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let n_payments = (years * 12) as f64;

    let monthly_payment = if monthly_rate == 0.0 {
        principal / n_payments
    } else {
        principal * (monthly_rate * (1.0 + monthly_rate).powf(n_payments))
            / ((1.0 + monthly_rate).powf(n_payments) - 1.0)
    };

    let total_payment = monthly_payment * n_payments;

    LoanPaymentResult {
        monthly_payment: round2(monthly_payment),
        total_interest: round2(total_payment - principal),
        total_payment: round2(total_payment),
    }
}

//
// ================= Debt snowball =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowballEntry {
    pub name: String,
    pub balance: f64,
    pub payoff_months: u32,
    pub payoff_date: String,
}

/// Simple snowball projection: debts ascending by balance, a fixed $100 extra
/// payment that absorbs each cleared debt's minimum.
pub fn debt_snowball(debts: &[Debt]) -> Vec<SnowballEntry> {
    if debts.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&Debt> = debts.iter().collect();
    sorted.sort_by(|a, b| a.balance.total_cmp(&b.balance));

    let mut extra_payment = 100.0;
    let mut plan = Vec::with_capacity(sorted.len());

    for (i, debt) in sorted.iter().enumerate() {
        let monthly_rate = debt.interest_rate / 100.0 / 12.0;
        let min_payment = if debt.minimum_payment > 0.0 {
            debt.minimum_payment
        } else {
            debt.balance * 0.03
        };

        let (months, _) = simulate_payoff(debt.balance, monthly_rate, min_payment + extra_payment);

        plan.push(SnowballEntry {
            name: debt.name.clone(),
            balance: debt.balance,
            payoff_months: months,
            payoff_date: future_date(months),
        });

        // Cleared minimum rolls into the pool for the next-smallest debt.
        if i + 1 < sorted.len() {
            extra_payment += min_payment;
        }
    }

    plan
}

/// Month-by-month payoff of a single balance at a fixed payment. The final
/// payment is clamped to balance + accrued interest so it never goes negative.
/// Returns (months, total interest paid).
pub fn simulate_payoff(balance: f64, monthly_rate: f64, payment: f64) -> (u32, f64) {
    let mut balance = balance;
    let mut months = 0;
    let mut interest_paid = 0.0;

    while balance > 0.0 && months < MAX_PAYOFF_MONTHS {
        let interest = balance * monthly_rate;
        let applied = payment.min(balance + interest);

        interest_paid += interest;
        balance = balance + interest - applied;
        months += 1;
    }

    (months, interest_paid)
}

//
// ================= Retirement projection =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementProjection {
    pub projected_savings: f64,
    pub total_contributions: f64,
    pub growth_earned: f64,
}

/// Future value of a lump sum plus a monthly-contribution annuity.
pub fn retirement_projection(
    current_age: u32,
    retirement_age: u32,
    current_savings: f64,
    monthly_contribution: f64,
    expected_return_pct: f64,
) -> RetirementProjection {
    let months = retirement_age.saturating_sub(current_age) * 12;
    let monthly_rate = expected_return_pct / 100.0 / 12.0;

    let growth_factor = (1.0 + monthly_rate).powf(months as f64);
    let mut future_value = current_savings * growth_factor;

    if monthly_contribution > 0.0 {
        // Annuity FV; at zero rate the formula degenerates to a plain sum.
        future_value += if monthly_rate == 0.0 {
            monthly_contribution * months as f64
        } else {
            monthly_contribution * (growth_factor - 1.0) / monthly_rate
        };
    }

    let total_contributions = current_savings + monthly_contribution * months as f64;

    RetirementProjection {
        projected_savings: round2(future_value),
        total_contributions,
        growth_earned: round2(future_value - total_contributions),
    }
}

//
// ================= Risk profile =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        };
        write!(f, "{}", s)
    }
}

/// Bucketed four-factor score mapped to a profile at thresholds 8 and 5.
/// Unrecognized experience/tolerance strings score the middle value.
pub fn risk_profile(age: u32, experience: &str, time_horizon: u32, tolerance: &str) -> RiskProfile {
    let mut score = 0;

    score += if age < 30 {
        3
    } else if age < 50 {
        2
    } else {
        1
    };

    score += match experience.to_lowercase().as_str() {
        "none" => 0,
        "beginner" => 1,
        "intermediate" => 2,
        "expert" => 3,
        _ => 1,
    };

    score += if time_horizon > 10 {
        3
    } else if time_horizon > 5 {
        2
    } else {
        1
    };

    score += match tolerance.to_lowercase().as_str() {
        "low" | "conservative" => 0,
        "medium" | "moderate" => 1,
        "high" | "aggressive" => 2,
        _ => 1,
    };

    if score >= 8 {
        RiskProfile::Aggressive
    } else if score >= 5 {
        RiskProfile::Moderate
    } else {
        RiskProfile::Conservative
    }
}

//
// ================= Shared helpers =================
//

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn future_date(months_from_now: u32) -> String {
    (Utc::now() + Duration::days(months_from_now as i64 * 30))
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debt(name: &str, balance: f64, rate: f64, min: f64) -> Debt {
        Debt {
            name: name.to_string(),
            balance,
            interest_rate: rate,
            minimum_payment: min,
        }
    }

    #[test]
    fn test_compound_interest_grows_principal() {
        let result = compound_interest(10_000.0, 5.0, 10, Compounding::Monthly);
        assert!(result.final_amount > 10_000.0);
        assert!(result.interest_earned > 0.0);
        assert_eq!(result.total_contributions, 10_000.0);
    }

    #[test]
    fn test_compound_interest_zero_rate_is_identity() {
        for compounding in [
            Compounding::Annual,
            Compounding::Quarterly,
            Compounding::Monthly,
            Compounding::Daily,
        ] {
            let result = compound_interest(5_000.0, 0.0, 7, compounding);
            assert_eq!(result.final_amount, 5_000.0);
            assert_eq!(result.interest_earned, 0.0);
        }
    }

    #[test]
    fn test_compound_interest_monthly_beats_annual() {
        let annual = compound_interest(10_000.0, 6.0, 5, Compounding::Annual);
        let monthly = compound_interest(10_000.0, 6.0, 5, Compounding::Monthly);
        assert!(monthly.final_amount > annual.final_amount);
    }

    #[test]
    fn test_loan_payment_zero_rate_is_simple_division() {
        let result = loan_payment(12_000.0, 0.0, 5);
        assert_eq!(result.monthly_payment, 200.0);
        assert_eq!(result.total_interest, 0.0);
    }

    #[test]
    fn test_loan_payment_standard_mortgage() {
        // $200k at 6% over 30 years is a well-known ~$1199.10/month.
        let result = loan_payment(200_000.0, 6.0, 30);
        assert!((result.monthly_payment - 1199.10).abs() < 0.05);
        assert!(result.total_interest > 200_000.0);
    }

    #[test]
    fn test_snowball_orders_by_balance_and_terminates() {
        let debts = vec![
            debt("big", 8_000.0, 12.0, 200.0),
            debt("small", 500.0, 22.0, 25.0),
        ];
        let plan = debt_snowball(&debts);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].name, "small");
        assert_eq!(plan[1].name, "big");
        assert!(plan.iter().all(|e| e.payoff_months <= MAX_PAYOFF_MONTHS));
        assert!(plan[0].payoff_months >= 1);
    }

    #[test]
    fn test_payoff_simulation_caps_pathological_input() {
        // Payment below monthly interest never amortizes; the cap must fire.
        let (months, _) = simulate_payoff(10_000.0, 0.02, 50.0);
        assert_eq!(months, MAX_PAYOFF_MONTHS);
    }

    #[test]
    fn test_payoff_final_payment_is_clamped() {
        let (months, interest) = simulate_payoff(100.0, 0.0, 1_000.0);
        assert_eq!(months, 1);
        assert_eq!(interest, 0.0);
    }

    #[test]
    fn test_payoff_months_monotonic_in_payment() {
        let (fast, _) = simulate_payoff(5_000.0, 0.01, 500.0);
        let (slow, _) = simulate_payoff(5_000.0, 0.01, 250.0);
        assert!(slow >= fast);
    }

    #[test]
    fn test_retirement_projection_with_growth() {
        let result = retirement_projection(30, 65, 15_000.0, 500.0, 7.0);
        assert!(result.projected_savings > result.total_contributions);
        assert!(result.growth_earned > 0.0);
    }

    #[test]
    fn test_retirement_projection_zero_return_has_no_growth() {
        let result = retirement_projection(30, 40, 10_000.0, 100.0, 0.0);
        assert_eq!(result.projected_savings, 10_000.0 + 100.0 * 120.0);
        assert_eq!(result.growth_earned, 0.0);
    }

    #[test]
    fn test_retirement_projection_already_retired() {
        let result = retirement_projection(70, 65, 50_000.0, 200.0, 5.0);
        assert_eq!(result.projected_savings, 50_000.0);
    }

    #[test]
    fn test_risk_profile_aggressive_case() {
        // 25yo expert with a 20-year horizon and high tolerance maxes the score.
        assert_eq!(
            risk_profile(25, "expert", 20, "high"),
            RiskProfile::Aggressive
        );
    }

    #[test]
    fn test_risk_profile_conservative_case() {
        assert_eq!(
            risk_profile(62, "none", 3, "low"),
            RiskProfile::Conservative
        );
    }

    #[test]
    fn test_risk_profile_unknown_strings_score_middle() {
        // 45yo (2) + unknown exp (1) + 8yr horizon (2) + unknown tolerance (1) = 6
        assert_eq!(
            risk_profile(45, "wizard", 8, "whatever"),
            RiskProfile::Moderate
        );
    }
}
