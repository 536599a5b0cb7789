//! Budget planning
//!
//! Allocation, savings plan, and debt repayment budget from the deterministic
//! models, plus a narrated recommendation block.

use crate::budget::{
    budget_allocation, debt_repayment_budget, savings_plan, BudgetAllocation, DebtRepaymentBudget,
    SavingsPlan,
};
use crate::calculators::round2;
use crate::config::{agent_temperature, EMERGENCY_FUND_MONTHS};
use crate::models::UserProfile;
use crate::narrative::Narrator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

const PERSONA: &str = r#"You are an expert budget planner specializing in creating personalized financial plans.

Your expertise:
- Creating realistic budget allocations based on income and goals
- Optimizing savings rates while maintaining quality of life
- Setting up emergency funds and contingency planning
- Balancing short-term needs with long-term goals
- Implementing the 50/30/20 rule and other budgeting frameworks

Provide practical, actionable budget recommendations that consider the user's lifestyle and constraints.
Always include specific percentages and amounts for each category."#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub monthly_income: f64,
    pub current_expenses: f64,
    pub budget_allocation: BudgetAllocation,
    pub savings_plan: SavingsPlan,
    pub debt_repayment_allocation: DebtRepaymentBudget,
    pub detailed_recommendations: String,
    pub emergency_fund_target: f64,
    pub savings_rate: f64,
}

pub struct BudgetPlanner {
    narrator: Arc<dyn Narrator>,
}

impl BudgetPlanner {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn create_plan(&self, profile: &UserProfile) -> BudgetPlan {
        info!("Creating budget plan for user profile");

        let income = profile.monthly_income();
        let expenses = profile.monthly_expenses;

        let allocation = budget_allocation(income, &profile.financial_goals, &profile.debts);
        let savings = savings_plan(expenses, &profile.financial_goals, profile.savings);
        let debt_budget = debt_repayment_budget(&profile.debts, income);

        let detailed_recommendations = match self
            .narrator
            .narrate(
                PERSONA,
                &budget_prompt(income, expenses, &allocation, &savings, &debt_budget, profile),
                agent_temperature("planner"),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Budget narration failed: {}", e);
                super::NARRATIVE_FALLBACK.to_string()
            }
        };

        BudgetPlan {
            error: None,
            monthly_income: income,
            current_expenses: expenses,
            budget_allocation: allocation,
            savings_plan: savings,
            debt_repayment_allocation: debt_budget,
            detailed_recommendations,
            emergency_fund_target: expenses * EMERGENCY_FUND_MONTHS,
            savings_rate: if income > 0.0 {
                round2((income - expenses) / income * 100.0)
            } else {
                0.0
            },
        }
    }
}

fn allocation_lines(allocation: &BudgetAllocation, income: f64) -> String {
    let pct = |amount: f64| {
        if income > 0.0 {
            amount / income * 100.0
        } else {
            0.0
        }
    };
    let line = |name: &str, amount: f64| format!("- {}: ${:.2} ({:.1}%)", name, amount, pct(amount));

    match allocation {
        BudgetAllocation::DebtFocused {
            essential_expenses,
            debt_repayment,
            savings,
            discretionary,
        } => [
            line("essential_expenses", *essential_expenses),
            line("debt_repayment", *debt_repayment),
            line("savings", *savings),
            line("discretionary", *discretionary),
        ]
        .join("\n"),
        BudgetAllocation::Balanced {
            housing,
            transportation,
            food,
            healthcare,
            insurance,
            utilities,
            discretionary,
            debt_repayment,
            savings,
        } => [
            line("housing", *housing),
            line("transportation", *transportation),
            line("food", *food),
            line("healthcare", *healthcare),
            line("insurance", *insurance),
            line("utilities", *utilities),
            line("discretionary", *discretionary),
            line("debt_repayment", *debt_repayment),
            line("savings", *savings),
        ]
        .join("\n"),
    }
}

fn budget_prompt(
    income: f64,
    expenses: f64,
    allocation: &BudgetAllocation,
    savings: &SavingsPlan,
    debt_budget: &DebtRepaymentBudget,
    profile: &UserProfile,
) -> String {
    let goals: Vec<String> = profile
        .financial_goals
        .iter()
        .map(|g| {
            format!(
                "- {}: ${:.2} in {} months",
                g.name, g.target, g.timeline_months
            )
        })
        .collect();

    format!(
        r#"Create a detailed, personalized budget plan based on this financial information:

MONTHLY INCOME: ${:.2}
CURRENT EXPENSES: ${:.2}

BUDGET ALLOCATION:
{}

SAVINGS PLAN:
Emergency Fund Target: ${:.2}
Current Emergency Savings: ${:.2}
Monthly Savings Needed for Goals: ${:.2}

DEBT REPAYMENT:
Total Monthly Debt Payments: ${:.2}

FINANCIAL GOALS:
{}

Please provide:
1. Specific budget recommendations for each category
2. Tips to reduce expenses in high-spending areas
3. Savings prioritization strategy
4. Debt repayment optimization
5. Monthly action plan
6. Progress tracking suggestions

Be practical and consider real-world constraints."#,
        income,
        expenses,
        allocation_lines(allocation, income),
        savings.emergency_fund.target,
        savings.emergency_fund.current,
        savings.total_monthly_savings,
        debt_budget.total_monthly_payment,
        goals.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::MockNarrator;

    fn profile() -> UserProfile {
        UserProfile {
            annual_income: 72_000.0,
            monthly_expenses: 4500.0,
            savings: 8000.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_plan_carries_core_figures() {
        let planner = BudgetPlanner::new(Arc::new(MockNarrator::replying("Budget advice here.")));
        let plan = planner.create_plan(&profile()).await;

        assert_eq!(plan.monthly_income, 6000.0);
        assert_eq!(plan.emergency_fund_target, 13_500.0);
        assert_eq!(plan.savings_rate, 25.0);
        assert_eq!(plan.detailed_recommendations, "Budget advice here.");
        assert!(plan.error.is_none());
    }

    #[tokio::test]
    async fn test_plan_survives_narration_failure() {
        let planner = BudgetPlanner::new(Arc::new(MockNarrator::failing()));
        let plan = planner.create_plan(&profile()).await;

        assert_eq!(plan.detailed_recommendations, crate::agents::NARRATIVE_FALLBACK);
        assert_eq!(plan.monthly_income, 6000.0);
    }

    #[tokio::test]
    async fn test_zero_income_profile() {
        let planner = BudgetPlanner::new(Arc::new(MockNarrator::replying("ok")));
        let plan = planner.create_plan(&UserProfile::default()).await;
        assert_eq!(plan.savings_rate, 0.0);
    }
}
