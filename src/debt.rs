//! Debt repayment optimization
//!
//! Deterministic snowball and avalanche simulations plus the selection rule
//! that picks between them, with consolidation screening on top.

use crate::calculators::{round2, MAX_PAYOFF_MONTHS};
use crate::models::{Debt, UserProfile};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSituation {
    pub total_debt: f64,
    pub total_minimum_payments: f64,
    pub weighted_interest_rate: f64,
    pub debt_to_income_ratio: f64,
    pub number_of_debts: usize,
    pub high_interest_debts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffEntry {
    pub debt_name: String,
    pub balance: f64,
    pub payoff_months: u32,
    pub total_interest: f64,
    pub payoff_order: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentPlan {
    pub payoff_plan: Vec<PayoffEntry>,
    pub total_payoff_time_months: u32,
    pub total_interest_paid: f64,
    pub completion_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyChoice {
    pub recommended_method: String,
    pub interest_savings: f64,
    pub time_savings_months: u32,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationOption {
    #[serde(rename = "type")]
    pub kind: String,
    pub estimated_rate: f64,
    pub potential_savings: f64,
    pub eligibility: String,
    pub considerations: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationAnalysis {
    pub options: Vec<ConsolidationOption>,
    pub current_weighted_rate: f64,
    pub recommended: bool,
}

/// Full deterministic output of the optimizer, before narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtOptimization {
    pub current_debt_situation: DebtSituation,
    pub snowball_method: RepaymentPlan,
    pub avalanche_method: RepaymentPlan,
    pub recommended_strategy: StrategyChoice,
    pub consolidation_options: ConsolidationAnalysis,
}

pub fn optimize_repayment(debts: &[Debt], profile: &UserProfile) -> Option<DebtOptimization> {
    if debts.is_empty() {
        return None;
    }
    info!("Optimizing repayment for {} debts", debts.len());

    let situation = analyze_debt_situation(debts, profile);
    let snowball = snowball_plan(debts, profile);
    let avalanche = avalanche_plan(debts, profile);
    let strategy = select_strategy(&snowball, &avalanche, debts.len(), &profile.risk_tolerance);
    let consolidation = consolidation_analysis(debts);

    Some(DebtOptimization {
        current_debt_situation: situation,
        snowball_method: snowball,
        avalanche_method: avalanche,
        recommended_strategy: strategy,
        consolidation_options: consolidation,
    })
}

pub fn analyze_debt_situation(debts: &[Debt], profile: &UserProfile) -> DebtSituation {
    let total_debt: f64 = debts.iter().map(|d| d.balance).sum();
    let total_minimum_payments: f64 = debts.iter().map(|d| d.minimum_payment).sum();
    let weighted_rate = weighted_interest_rate(debts);

    let monthly_income = profile.monthly_income();
    let debt_to_income = if monthly_income > 0.0 {
        total_minimum_payments / monthly_income * 100.0
    } else {
        0.0
    };

    DebtSituation {
        total_debt,
        total_minimum_payments,
        weighted_interest_rate: round2(weighted_rate),
        debt_to_income_ratio: round2(debt_to_income),
        number_of_debts: debts.len(),
        high_interest_debts: debts.iter().filter(|d| d.interest_rate > 10.0).count(),
    }
}

/// Spare cash that can go toward debt beyond minimums: the tightest of
/// 15% of income, half of monthly surplus, and a tenth of liquid savings,
/// but never less than $100.
pub fn extra_payment_capacity(profile: &UserProfile) -> f64 {
    let income = profile.monthly_income();
    let surplus = (income - profile.monthly_expenses) * 0.5;
    let from_savings = profile.savings * 0.1;

    (income * 0.15).min(surplus).min(from_savings).max(100.0)
}

/// Snowball: clear the smallest balance first, rolling each retired minimum
/// into the next debt's payment.
pub fn snowball_plan(debts: &[Debt], profile: &UserProfile) -> RepaymentPlan {
    let mut ordered: Vec<&Debt> = debts.iter().collect();
    ordered.sort_by(|a, b| a.balance.total_cmp(&b.balance));

    let mut extra = extra_payment_capacity(profile);
    let mut payoff_plan = Vec::with_capacity(ordered.len());
    let mut total_interest = 0.0;
    let mut total_months = 0;

    for (i, debt) in ordered.iter().enumerate() {
        if i > 0 {
            extra += ordered[i - 1].minimum_payment;
        }

        let monthly_rate = debt.interest_rate / 100.0 / 12.0;
        let mut balance = debt.balance;
        let mut months = 0;
        let mut interest_paid = 0.0;

        while balance > 0.0 && months < MAX_PAYOFF_MONTHS {
            let monthly_interest = balance * monthly_rate;
            let mut payment = debt.minimum_payment + extra;
            if payment > balance + monthly_interest {
                payment = balance + monthly_interest;
            }
            interest_paid += monthly_interest;
            balance = balance + monthly_interest - payment;
            months += 1;
        }

        payoff_plan.push(PayoffEntry {
            debt_name: debt.name.clone(),
            balance: debt.balance,
            payoff_months: months,
            total_interest: round2(interest_paid),
            payoff_order: i + 1,
        });
        total_interest += interest_paid;
        total_months += months;
    }

    RepaymentPlan {
        payoff_plan,
        total_payoff_time_months: total_months,
        total_interest_paid: round2(total_interest),
        completion_date: completion_date(total_months),
    }
}

/// Avalanche: all spare cash attacks the highest rate. Simulated month by
/// month; only the focus debt's balance moves, matching the model where
/// other minimums hold their balances flat.
pub fn avalanche_plan(debts: &[Debt], profile: &UserProfile) -> RepaymentPlan {
    let mut active: Vec<Debt> = debts.to_vec();
    active.sort_by(|a, b| b.interest_rate.total_cmp(&a.interest_rate));

    let extra = extra_payment_capacity(profile);
    let mut payoff_plan = Vec::new();
    let mut total_interest = 0.0;
    let mut month = 0;

    while !active.is_empty() && month < MAX_PAYOFF_MONTHS {
        let total_payment: f64 =
            active.iter().map(|d| d.minimum_payment).sum::<f64>() + extra;
        let others_minimums: f64 = active[1..].iter().map(|d| d.minimum_payment).sum();
        let mut focus_payment = total_payment - others_minimums;

        let focus = &mut active[0];
        let monthly_rate = focus.interest_rate / 100.0 / 12.0;
        let monthly_interest = focus.balance * monthly_rate;

        if focus_payment > focus.balance + monthly_interest {
            focus_payment = focus.balance + monthly_interest;
        }

        let original_balance = focus.balance;
        focus.balance = focus.balance + monthly_interest - focus_payment;
        total_interest += monthly_interest;

        if focus.balance <= 0.0 {
            payoff_plan.push(PayoffEntry {
                debt_name: focus.name.clone(),
                balance: original_balance,
                payoff_months: month + 1,
                total_interest: round2(total_interest),
                payoff_order: payoff_plan.len() + 1,
            });
            active.remove(0);
        }

        month += 1;
    }

    RepaymentPlan {
        payoff_plan,
        total_payoff_time_months: month,
        total_interest_paid: round2(total_interest),
        completion_date: completion_date(month),
    }
}

/// Avalanche wins only when it is both cheaper and no slower; users juggling
/// more than three debts with a conservative temperament get the snowball's
/// quick wins regardless.
pub fn select_strategy(
    snowball: &RepaymentPlan,
    avalanche: &RepaymentPlan,
    debt_count: usize,
    risk_tolerance: &str,
) -> StrategyChoice {
    let (mut method, savings) = if avalanche.total_interest_paid < snowball.total_interest_paid
        && avalanche.total_payoff_time_months <= snowball.total_payoff_time_months
    {
        (
            "avalanche",
            snowball.total_interest_paid - avalanche.total_interest_paid,
        )
    } else {
        (
            "snowball",
            avalanche.total_interest_paid - snowball.total_interest_paid,
        )
    };

    if debt_count > 3 && risk_tolerance == "conservative" {
        method = "snowball";
    }

    let rationale = match method {
        "avalanche" => format!(
            "Mathematically optimal saving ${:.2} in interest costs",
            savings
        ),
        _ => format!(
            "Psychological motivation from quick wins outweighs ${:.2} in potential interest savings",
            savings
        ),
    };

    StrategyChoice {
        recommended_method: method.to_string(),
        interest_savings: round2(savings),
        time_savings_months: snowball
            .total_payoff_time_months
            .abs_diff(avalanche.total_payoff_time_months),
        rationale,
    }
}

pub fn consolidation_analysis(debts: &[Debt]) -> ConsolidationAnalysis {
    let total_debt: f64 = debts.iter().map(|d| d.balance).sum();
    let weighted_rate = weighted_interest_rate(debts);

    let mut options = Vec::new();

    if total_debt > 5000.0 {
        // Assume consolidation shaves roughly two points off the blended rate.
        let personal_loan_rate = (weighted_rate - 2.0).max(6.0);
        options.push(ConsolidationOption {
            kind: "Personal Loan".to_string(),
            estimated_rate: personal_loan_rate,
            potential_savings: consolidation_savings(debts, personal_loan_rate),
            eligibility: "Good credit required".to_string(),
            considerations: "Fixed payments, no collateral needed".to_string(),
        });
    }

    let high_interest: Vec<Debt> = debts
        .iter()
        .filter(|d| d.interest_rate > 15.0)
        .cloned()
        .collect();
    if !high_interest.is_empty() {
        options.push(ConsolidationOption {
            kind: "Balance Transfer Card".to_string(),
            estimated_rate: 0.0,
            potential_savings: consolidation_savings(&high_interest, 0.0),
            eligibility: "Good to excellent credit".to_string(),
            considerations: "Introductory period only, transfer fees may apply".to_string(),
        });
    }

    ConsolidationAnalysis {
        recommended: !options.is_empty() && weighted_rate > 8.0,
        current_weighted_rate: round2(weighted_rate),
        options,
    }
}

fn weighted_interest_rate(debts: &[Debt]) -> f64 {
    let total: f64 = debts.iter().map(|d| d.balance).sum();
    if total <= 0.0 {
        return 0.0;
    }
    debts
        .iter()
        .map(|d| d.balance * d.interest_rate)
        .sum::<f64>()
        / total
}

/// First-year interest at current rates vs the consolidated rate.
fn consolidation_savings(debts: &[Debt], new_rate: f64) -> f64 {
    let current: f64 = debts
        .iter()
        .map(|d| d.balance * d.interest_rate / 100.0)
        .sum();
    let consolidated: f64 = debts.iter().map(|d| d.balance).sum::<f64>() * new_rate / 100.0;
    (current - consolidated).max(0.0)
}

fn completion_date(months: u32) -> String {
    (Utc::now() + Duration::days(months as i64 * 30))
        .format("%B %Y")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            annual_income: 72_000.0, // 6000/mo
            monthly_expenses: 4000.0,
            savings: 20_000.0,
            ..Default::default()
        }
    }

    fn debt(name: &str, balance: f64, rate: f64, min: f64) -> Debt {
        Debt {
            name: name.into(),
            balance,
            interest_rate: rate,
            minimum_payment: min,
        }
    }

    #[test]
    fn test_extra_capacity_takes_tightest_constraint() {
        // 15% of income = 900, half surplus = 1000, 10% savings = 2000.
        assert_eq!(extra_payment_capacity(&profile()), 900.0);
    }

    #[test]
    fn test_extra_capacity_floor() {
        let broke = UserProfile {
            annual_income: 12_000.0,
            monthly_expenses: 1000.0,
            savings: 0.0,
            ..Default::default()
        };
        assert_eq!(extra_payment_capacity(&broke), 100.0);
    }

    #[test]
    fn test_situation_metrics() {
        let debts = vec![
            debt("card", 6000.0, 22.0, 150.0),
            debt("car", 14_000.0, 6.0, 300.0),
        ];
        let situation = analyze_debt_situation(&debts, &profile());
        assert_eq!(situation.total_debt, 20_000.0);
        assert_eq!(situation.total_minimum_payments, 450.0);
        // (6000*22 + 14000*6) / 20000 = 10.8
        assert_eq!(situation.weighted_interest_rate, 10.8);
        assert_eq!(situation.debt_to_income_ratio, 7.5);
        assert_eq!(situation.high_interest_debts, 1);
    }

    #[test]
    fn test_snowball_orders_smallest_first() {
        let debts = vec![
            debt("big", 10_000.0, 5.0, 200.0),
            debt("small", 1000.0, 20.0, 50.0),
        ];
        let plan = snowball_plan(&debts, &profile());
        assert_eq!(plan.payoff_plan[0].debt_name, "small");
        assert_eq!(plan.payoff_plan[0].payoff_order, 1);
        assert_eq!(plan.payoff_plan[1].debt_name, "big");
        assert!(plan.total_payoff_time_months > 0);
        assert!(plan.total_interest_paid > 0.0);
    }

    #[test]
    fn test_avalanche_attacks_highest_rate_first() {
        let debts = vec![
            debt("cheap", 2000.0, 4.0, 50.0),
            debt("expensive", 2000.0, 24.0, 50.0),
        ];
        let plan = avalanche_plan(&debts, &profile());
        assert_eq!(plan.payoff_plan[0].debt_name, "expensive");
        assert!(plan.total_payoff_time_months <= MAX_PAYOFF_MONTHS);
    }

    #[test]
    fn test_avalanche_respects_safety_cap() {
        // Minimum below monthly interest would never terminate unaided.
        let debts = vec![debt("trap", 100_000.0, 36.0, 10.0)];
        let poor = UserProfile {
            annual_income: 12_000.0,
            monthly_expenses: 990.0,
            savings: 0.0,
            ..Default::default()
        };
        let plan = avalanche_plan(&debts, &poor);
        assert_eq!(plan.total_payoff_time_months, MAX_PAYOFF_MONTHS);
    }

    #[test]
    fn test_strategy_conservative_override() {
        let plan = RepaymentPlan {
            payoff_plan: vec![],
            total_payoff_time_months: 24,
            total_interest_paid: 1000.0,
            completion_date: String::new(),
        };
        let cheaper = RepaymentPlan {
            total_interest_paid: 800.0,
            ..plan.clone()
        };
        let choice = select_strategy(&plan, &cheaper, 4, "conservative");
        assert_eq!(choice.recommended_method, "snowball");

        let choice = select_strategy(&plan, &cheaper, 4, "moderate");
        assert_eq!(choice.recommended_method, "avalanche");
        assert_eq!(choice.interest_savings, 200.0);
    }

    #[test]
    fn test_consolidation_options() {
        let debts = vec![
            debt("card", 8000.0, 22.0, 200.0),
            debt("card2", 3000.0, 18.0, 100.0),
        ];
        let analysis = consolidation_analysis(&debts);
        assert_eq!(analysis.options.len(), 2);
        assert_eq!(analysis.options[0].kind, "Personal Loan");
        assert_eq!(analysis.options[1].kind, "Balance Transfer Card");
        assert_eq!(analysis.options[1].estimated_rate, 0.0);
        assert!(analysis.recommended);
    }

    #[test]
    fn test_consolidation_floor_rate() {
        let debts = vec![debt("car", 10_000.0, 5.0, 200.0)];
        let analysis = consolidation_analysis(&debts);
        assert_eq!(analysis.options[0].estimated_rate, 6.0);
        assert!(!analysis.recommended);
    }

    #[test]
    fn test_no_debts_returns_none() {
        assert!(optimize_repayment(&[], &profile()).is_none());
    }
}
