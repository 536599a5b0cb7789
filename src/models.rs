//! Core data models for the advisory pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Analysis routing =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    IncomeExpense,
    BudgetPlanning,
    InvestmentAdvice,
    DebtOptimization,
    FinancialEducation,
    Comprehensive,
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnalysisType::IncomeExpense => "income_expense",
            AnalysisType::BudgetPlanning => "budget_planning",
            AnalysisType::InvestmentAdvice => "investment_advice",
            AnalysisType::DebtOptimization => "debt_optimization",
            AnalysisType::FinancialEducation => "financial_education",
            AnalysisType::Comprehensive => "comprehensive",
        };
        write!(f, "{}", s)
    }
}

//
// ================= Profile records =================
//

/// A single ledger entry. Amounts are signed: positive = inflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Calendar date in "YYYY-MM-DD" form.
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    /// Annual interest rate in percent (e.g. 18.9).
    pub interest_rate: f64,
    #[serde(default)]
    pub minimum_payment: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub name: String,
    pub target: f64,
    pub timeline_months: u32,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    1
}

/// Per-request financial snapshot. Built at the API boundary, never persisted.
///
/// Missing fields degrade via serde defaults so the calculators stay total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub annual_income: f64,
    #[serde(default)]
    pub monthly_expenses: f64,
    #[serde(default)]
    pub savings: f64,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub financial_goals: Vec<FinancialGoal>,
    #[serde(default = "default_risk_tolerance")]
    pub risk_tolerance: String,
    #[serde(default = "default_experience")]
    pub investment_experience: String,
    #[serde(default = "default_time_horizon")]
    pub time_horizon: u32,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

fn default_risk_tolerance() -> String {
    "moderate".to_string()
}

fn default_experience() -> String {
    "beginner".to_string()
}

fn default_time_horizon() -> u32 {
    10
}

impl UserProfile {
    pub fn monthly_income(&self) -> f64 {
        self.annual_income / 12.0
    }

    /// True when the profile carries no usable financial data, in which case
    /// comprehensive questions are routed to the educator instead.
    pub fn is_empty(&self) -> bool {
        self.annual_income == 0.0
            && self.monthly_expenses == 0.0
            && self.savings == 0.0
            && self.debts.is_empty()
            && self.financial_goals.is_empty()
            && self.transactions.is_empty()
    }

    /// Compact plain-text rendering for LLM prompts.
    pub fn context_summary(&self) -> String {
        let mut lines = Vec::new();

        if self.age > 0 {
            lines.push(format!("- Age: {}", self.age));
        }
        if self.annual_income > 0.0 {
            lines.push(format!("- Monthly Income: ${:.2}", self.monthly_income()));
        }
        if self.monthly_expenses > 0.0 {
            lines.push(format!("- Monthly Expenses: ${:.2}", self.monthly_expenses));
        }
        if self.savings > 0.0 {
            lines.push(format!("- Current Savings: ${:.2}", self.savings));
        }
        if !self.debts.is_empty() {
            let total: f64 = self.debts.iter().map(|d| d.balance).sum();
            lines.push(format!(
                "- Total Debt: ${:.2} across {} accounts",
                total,
                self.debts.len()
            ));
        }
        if !self.financial_goals.is_empty() {
            let names: Vec<&str> = self
                .financial_goals
                .iter()
                .map(|g| g.name.as_str())
                .collect();
            lines.push(format!("- Financial Goals: {}", names.join(", ")));
        }
        lines.push(format!("- Risk Tolerance: {}", self.risk_tolerance));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_from_partial_json() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"age": 30, "annual_income": 72000.0}"#).unwrap();

        assert_eq!(profile.age, 30);
        assert_eq!(profile.monthly_expenses, 0.0);
        assert_eq!(profile.risk_tolerance, "moderate");
        assert_eq!(profile.investment_experience, "beginner");
        assert_eq!(profile.time_horizon, 10);
        assert!(profile.debts.is_empty());
        assert_eq!(profile.monthly_income(), 6000.0);
    }

    #[test]
    fn test_empty_profile_detection() {
        let profile = UserProfile::default();
        assert!(profile.is_empty());

        let mut with_debt = UserProfile::default();
        with_debt.debts.push(Debt {
            name: "card".into(),
            balance: 500.0,
            interest_rate: 20.0,
            minimum_payment: 25.0,
        });
        assert!(!with_debt.is_empty());
    }

    #[test]
    fn test_analysis_type_serde_names() {
        let json = serde_json::to_string(&AnalysisType::DebtOptimization).unwrap();
        assert_eq!(json, "\"debt_optimization\"");
        assert_eq!(AnalysisType::IncomeExpense.to_string(), "income_expense");
    }
}
