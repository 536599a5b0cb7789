//! Specialist agents
//!
//! Each specialist runs its deterministic analysis, asks the narrator for
//! prose, and degrades to a structured result when anything fails. Nothing in
//! here returns Err to the workflow.

pub mod budget_planner;
pub mod debt_optimizer;
pub mod educator;
pub mod income_expense;
pub mod investment_advisor;
pub mod master;

pub use budget_planner::{BudgetPlan, BudgetPlanner};
pub use debt_optimizer::{DebtOptimizer, DebtReport};
pub use educator::{Educator, Explanation};
pub use income_expense::{IncomeAnalysis, IncomeExpenseAnalyzer};
pub use investment_advisor::{InvestmentAdvisor, InvestmentReport};
pub use master::{Insight, MasterPlan, MasterStrategist};

/// Shown to the user when the narrative call fails; the real error goes to
/// the log, never the response.
pub const NARRATIVE_FALLBACK: &str =
    "I apologize, but I'm having trouble generating detailed recommendations right now. \
     The numbers below are still accurate.";
