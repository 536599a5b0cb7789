//! Budget allocation models
//!
//! Three competing frameworks computed deterministically; a single rule picks
//! which one the user sees.

use crate::config::{DEFAULT_SAVINGS_RATE, EMERGENCY_FUND_MONTHS};
use crate::models::{Debt, FinancialGoal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Categories counted as needs/wants when modeling the 50/30/20 rule.
const NEEDS_CATEGORIES: &[&str] = &[
    "rent",
    "utilities",
    "grocery",
    "transportation",
    "healthcare",
    "education",
];
const WANTS_CATEGORIES: &[&str] = &[
    "food & dining",
    "shopping",
    "entertainment",
    "travel",
    "miscellaneous",
];

//
// ================= Allocation =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum BudgetAllocation {
    /// 50/30/10/10 split used when minimum debt payments exceed 15% of income.
    DebtFocused {
        essential_expenses: f64,
        debt_repayment: f64,
        savings: f64,
        discretionary: f64,
    },
    /// Nine-category split with fixed percentage targets; debt repayment uses
    /// actual minimums and savings covers goal-derived need.
    Balanced {
        housing: f64,
        transportation: f64,
        food: f64,
        healthcare: f64,
        insurance: f64,
        utilities: f64,
        discretionary: f64,
        debt_repayment: f64,
        savings: f64,
    },
}

pub fn budget_allocation(
    monthly_income: f64,
    goals: &[FinancialGoal],
    debts: &[Debt],
) -> BudgetAllocation {
    let total_debt_payments: f64 = debts.iter().map(|d| d.minimum_payment).sum();
    let debt_ratio = if monthly_income > 0.0 {
        total_debt_payments / monthly_income
    } else {
        0.0
    };

    if debt_ratio > 0.15 {
        return BudgetAllocation::DebtFocused {
            essential_expenses: monthly_income * 0.50,
            debt_repayment: monthly_income * 0.30,
            savings: monthly_income * 0.10,
            discretionary: monthly_income * 0.10,
        };
    }

    BudgetAllocation::Balanced {
        housing: monthly_income * 0.25,
        transportation: monthly_income * 0.15,
        food: monthly_income * 0.12,
        healthcare: monthly_income * 0.08,
        insurance: monthly_income * 0.05,
        utilities: monthly_income * 0.05,
        discretionary: monthly_income * 0.15,
        debt_repayment: total_debt_payments,
        savings: (monthly_income * 0.15).max(goal_savings_needed(goals, monthly_income)),
    }
}

/// Monthly savings implied by the goal list: Σ(target / timeline), capped at
/// 30% of income. Without goals, the default savings rate applies.
pub fn goal_savings_needed(goals: &[FinancialGoal], monthly_income: f64) -> f64 {
    if goals.is_empty() {
        return monthly_income * DEFAULT_SAVINGS_RATE;
    }

    let total: f64 = goals
        .iter()
        .filter(|g| g.timeline_months > 0)
        .map(|g| g.target / g.timeline_months as f64)
        .sum();

    total.min(monthly_income * 0.30)
}

//
// ================= Savings plan =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyFundPlan {
    pub target: f64,
    pub current: f64,
    pub gap: f64,
    pub monthly_savings_needed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSavings {
    pub monthly_savings: f64,
    pub target: f64,
    pub timeline_months: u32,
    pub priority: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsPlan {
    pub emergency_fund: EmergencyFundPlan,
    pub goal_savings: BTreeMap<String, GoalSavings>,
    pub total_monthly_savings: f64,
}

pub fn savings_plan(
    monthly_expenses: f64,
    goals: &[FinancialGoal],
    current_savings: f64,
) -> SavingsPlan {
    let emergency_target = monthly_expenses * EMERGENCY_FUND_MONTHS;
    let gap = (emergency_target - current_savings).max(0.0);

    let mut goal_savings = BTreeMap::new();
    for goal in goals {
        let monthly = if goal.timeline_months > 0 {
            goal.target / goal.timeline_months as f64
        } else {
            0.0
        };
        goal_savings.insert(
            goal.name.clone(),
            GoalSavings {
                monthly_savings: monthly,
                target: goal.target,
                timeline_months: goal.timeline_months,
                priority: goal.priority,
            },
        );
    }

    let total_monthly_savings = goal_savings.values().map(|g| g.monthly_savings).sum();

    SavingsPlan {
        emergency_fund: EmergencyFundPlan {
            target: emergency_target,
            current: current_savings,
            gap,
            // Aim to close the gap within six months.
            monthly_savings_needed: gap / 6.0,
        },
        goal_savings,
        total_monthly_savings,
    }
}

//
// ================= Debt repayment budget =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtRepaymentLine {
    pub name: String,
    pub balance: f64,
    pub minimum_payment: f64,
    pub recommended_extra: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtRepaymentBudget {
    pub total_monthly_payment: f64,
    pub minimum_payments: f64,
    pub recommended_extra: f64,
    pub debts: Vec<DebtRepaymentLine>,
}

pub fn debt_repayment_budget(debts: &[Debt], monthly_income: f64) -> DebtRepaymentBudget {
    if debts.is_empty() {
        return DebtRepaymentBudget::default();
    }

    let minimum_payments: f64 = debts.iter().map(|d| d.minimum_payment).sum();
    let recommended_extra = (monthly_income * 0.10).min(500.0);

    let lines = debts
        .iter()
        .map(|d| DebtRepaymentLine {
            name: d.name.clone(),
            balance: d.balance,
            minimum_payment: d.minimum_payment,
            recommended_extra: recommended_extra / debts.len() as f64,
        })
        .collect();

    DebtRepaymentBudget {
        total_monthly_payment: minimum_payments + recommended_extra,
        minimum_payments,
        recommended_extra,
        debts: lines,
    }
}

//
// ================= 50/30/20 scenario modeling =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetScenarios {
    pub summary: ScenarioSummary,
    pub scenario_50_30_20: FiftyThirtyTwenty,
    pub current_spending_analysis: SpendingAnalysis,
    pub actionable_suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub income: f64,
    pub total_expenses: f64,
    pub current_savings: f64,
    pub savings_goal: f64,
    pub goal_shortfall: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiftyThirtyTwenty {
    pub needs_target_50_pct: f64,
    pub wants_target_30_pct: f64,
    pub savings_target_20_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingAnalysis {
    pub current_needs_spending: f64,
    pub current_wants_spending: f64,
    pub needs_over_target: f64,
    pub wants_over_target: f64,
}

/// Model the 50/30/20 rule against categorized monthly spending and produce
/// plain-text suggestions toward a savings goal.
pub fn budget_scenarios(
    income: f64,
    categorized_expenses: &BTreeMap<String, f64>,
    savings_goal: f64,
) -> BudgetScenarios {
    let total_expenses: f64 = categorized_expenses.values().sum();
    let current_savings = income - total_expenses;
    let goal_shortfall = savings_goal - current_savings;

    let needs_target = income * 0.50;
    let wants_target = income * 0.30;
    let savings_target = income * 0.20;

    let spend_in = |names: &[&str]| {
        categorized_expenses
            .iter()
            .filter(|(k, _)| names.contains(&k.to_lowercase().as_str()))
            .map(|(_, v)| *v)
            .sum::<f64>()
    };
    let current_needs = spend_in(NEEDS_CATEGORIES);
    let current_wants = spend_in(WANTS_CATEGORIES);

    let mut suggestions = Vec::new();
    if current_savings < savings_goal {
        suggestions.push(format!(
            "You're currently saving ${:.2}, but your goal is ${:.2}. You have a shortfall of ${:.2} per month.",
            current_savings, savings_goal, goal_shortfall
        ));
    } else {
        suggestions.push(format!(
            "Great job! You are currently saving ${:.2}, which meets or exceeds your goal of ${:.2}.",
            current_savings, savings_goal
        ));
    }

    if current_wants > wants_target {
        suggestions.push(format!(
            "Your spending on 'Wants' is at ${:.2}, which is ${:.2} over the 30% target. This is the best area to focus on for savings.",
            current_wants,
            current_wants - wants_target
        ));
    }

    if current_needs > needs_target {
        suggestions.push(format!(
            "Your spending on 'Needs' is ${:.2} over the 50% target. This is less common but worth reviewing.",
            current_needs - needs_target
        ));
    }

    BudgetScenarios {
        summary: ScenarioSummary {
            income,
            total_expenses,
            current_savings,
            savings_goal,
            goal_shortfall: goal_shortfall.max(0.0),
        },
        scenario_50_30_20: FiftyThirtyTwenty {
            needs_target_50_pct: needs_target,
            wants_target_30_pct: wants_target,
            savings_target_20_pct: savings_target,
        },
        current_spending_analysis: SpendingAnalysis {
            current_needs_spending: current_needs,
            current_wants_spending: current_wants,
            needs_over_target: (current_needs - needs_target).max(0.0),
            wants_over_target: (current_wants - wants_target).max(0.0),
        },
        actionable_suggestions: suggestions,
    }
}
