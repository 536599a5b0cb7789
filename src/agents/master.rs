//! Master strategist
//!
//! Synthesizes whatever the specialists produced into one plan, and derives
//! the response metadata (action type, priority, insights) from the numbers.

use crate::agents::{BudgetPlan, DebtReport, Explanation, IncomeAnalysis, InvestmentReport};
use crate::budget::BudgetAllocation;
use crate::calculators::round2;
use crate::config::agent_temperature;
use crate::models::UserProfile;
use crate::narrative::Narrator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub const MASTER_PERSONA: &str = r#"You are the Master Financial Strategist, an AI that coordinates multiple specialized financial agents.

Your responsibilities:
1. Analyze user requests to determine which specialists are needed
2. Route requests to appropriate sub-agents based on content analysis
3. Synthesize multiple analyses into a cohesive financial plan
4. Present recommendations in clear, actionable language
5. Maintain a helpful, professional tone while ensuring comprehensive coverage

Available specialist agents:
- Income & Expense Analyzer: For spending patterns, cash flow analysis, transaction categorization
- Budget Planner: For creating and optimizing budgets, savings allocations
- Investment Advisor: For portfolio recommendations, asset allocation, retirement planning
- Debt Optimizer: For debt repayment strategies, interest minimization, consolidation
- Financial Educator: For explaining concepts and answering "why" questions

Always consider the user's complete financial picture when making recommendations.
Ensure all recommendations are practical, personalized, and actionable."#;

/// Everything the specialists produced for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analyses {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_analysis: Option<IncomeAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_plan: Option<BudgetPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment_advice: Option<InvestmentReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_optimization: Option<DebtReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_education: Option<Explanation>,
}

impl Analyses {
    pub fn is_empty(&self) -> bool {
        self.income_analysis.is_none()
            && self.budget_plan.is_none()
            && self.investment_advice.is_none()
            && self.debt_optimization.is_none()
            && self.financial_education.is_none()
    }

    pub fn agents_involved(&self) -> Vec<String> {
        let mut agents = Vec::new();
        if self.income_analysis.is_some() {
            agents.push("income_expense_analyzer".to_string());
        }
        if self.budget_plan.is_some() {
            agents.push("budget_planner".to_string());
        }
        if self.investment_advice.is_some() {
            agents.push("investment_advisor".to_string());
        }
        if self.debt_optimization.is_some() {
            agents.push("debt_optimizer".to_string());
        }
        if self.financial_education.is_some() {
            agents.push("financial_educator".to_string());
        }
        agents
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub agent: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "actionType")]
    pub action_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterPlan {
    pub response: String,
    pub agent: String,
    #[serde(rename = "actionType")]
    pub action_type: String,
    pub priority: String,
    pub insights: Vec<Insight>,
}

pub struct MasterStrategist {
    narrator: Arc<dyn Narrator>,
}

impl MasterStrategist {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn synthesize(&self, profile: &UserProfile, analyses: &Analyses) -> MasterPlan {
        info!("Master agent synthesizing comprehensive financial plan");

        if analyses.is_empty() {
            return MasterPlan {
                response:
                    "I apologize, but I couldn't gather enough data to create a comprehensive financial plan."
                        .to_string(),
                agent: "master".to_string(),
                action_type: "review".to_string(),
                priority: "medium".to_string(),
                insights: Vec::new(),
            };
        }

        let response = match self
            .narrator
            .narrate(
                MASTER_PERSONA,
                &synthesis_prompt(profile, analyses),
                agent_temperature("master"),
            )
            .await
        {
            Ok(plan) => format_final_output(&plan, analyses),
            Err(e) => {
                warn!("Plan synthesis failed ({}), using fallback plan", e);
                fallback_plan(analyses)
            }
        };

        MasterPlan {
            response,
            agent: "master".to_string(),
            action_type: action_type(analyses).to_string(),
            priority: priority(analyses).to_string(),
            insights: extract_insights(analyses),
        }
    }
}

/// Primary action, in fixed precedence: debt beats investing beats budgeting.
pub fn action_type(analyses: &Analyses) -> &'static str {
    if analyses.debt_optimization.is_some() {
        "manage_debt"
    } else if analyses.investment_advice.is_some() {
        "invest"
    } else if analyses.budget_plan.is_some() {
        "review_budget"
    } else if analyses.income_analysis.is_some() {
        "optimize_spending"
    } else {
        "review"
    }
}

pub fn priority(analyses: &Analyses) -> &'static str {
    if let Some(debt) = &analyses.debt_optimization {
        if let Some(optimization) = &debt.optimization {
            if optimization.current_debt_situation.debt_to_income_ratio > 40.0 {
                return "high";
            }
        }
    }

    if let Some(income) = &analyses.income_analysis {
        let savings_rate = income.summary_metrics.savings_rate;
        if savings_rate < 0.0 {
            return "high";
        } else if savings_rate < 10.0 {
            return "medium";
        }
    }

    "low"
}

pub fn extract_insights(analyses: &Analyses) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(income) = &analyses.income_analysis {
        let net_flow = income.summary_metrics.net_cash_flow;
        insights.push(Insight {
            agent: "income_expense_analyzer".to_string(),
            title: "Cash Flow Analysis".to_string(),
            description: format!("Monthly net cash flow: ${:.2}", net_flow),
            action_type: if net_flow < 0.0 {
                "optimize_spending".to_string()
            } else {
                "increase_savings".to_string()
            },
        });
    }

    if let Some(budget) = &analyses.budget_plan {
        insights.push(Insight {
            agent: "budget_planner".to_string(),
            title: "Budget Optimization".to_string(),
            description: format!("Current savings rate: {:.1}%", budget.savings_rate),
            action_type: "review_budget".to_string(),
        });
    }

    if let Some(investment) = &analyses.investment_advice {
        insights.push(Insight {
            agent: "investment_advisor".to_string(),
            title: "Investment Strategy".to_string(),
            description: format!("Recommended {} portfolio", investment.advice.risk_profile),
            action_type: "invest".to_string(),
        });
    }

    if let Some(debt) = &analyses.debt_optimization {
        if let Some(optimization) = &debt.optimization {
            insights.push(Insight {
                agent: "debt_optimizer".to_string(),
                title: "Debt Management".to_string(),
                description: format!(
                    "Use {} method for optimal repayment",
                    optimization.recommended_strategy.recommended_method
                ),
                action_type: "manage_debt".to_string(),
            });
        }
    }

    insights
}

fn synthesis_prompt(profile: &UserProfile, analyses: &Analyses) -> String {
    format!(
        r#"SYNTHESIZE A COMPREHENSIVE FINANCIAL PLAN

USER PROFILE:
{}

AVAILABLE ANALYSES:
{}

KEY METRICS AND INSIGHTS:
{}

Create a cohesive, personalized financial plan that:

1. EXECUTIVE SUMMARY: Brief overview of current financial health and key recommendations

2. PRIORITY ACTIONS (What to do now):
   - Immediate steps (next 30 days)
   - Quick wins that provide immediate benefit
   - Critical fixes for any financial risks

3. STRATEGIC RECOMMENDATIONS (What to do next):
   - Budget optimization strategies
   - Debt management approach
   - Investment strategy alignment
   - Savings acceleration tactics

4. IMPLEMENTATION ROADMAP:
   - Month 1-3: Foundation building
   - Month 4-6: Debt reduction and savings growth
   - Month 7-12: Investment optimization
   - Year 2+: Long-term wealth building

5. RISK MANAGEMENT:
   - Emergency fund status and recommendations
   - Insurance considerations
   - Market risk exposure
   - Liquidity needs

6. PROGRESS TRACKING:
   - Key metrics to monitor monthly
   - Milestone celebrations
   - Warning signs to watch for

Make this plan SPECIFIC, ACTIONABLE, and PERSONALIZED. Use concrete numbers and timelines.
Focus on practical steps the user can implement immediately."#,
        profile.context_summary(),
        analyses_summary(analyses),
        key_metrics(analyses),
    )
}

fn analyses_summary(analyses: &Analyses) -> String {
    let mut parts = Vec::new();

    if let Some(income) = &analyses.income_analysis {
        parts.push(format!(
            "- Income Analysis: Net cash flow ${:.2} monthly",
            income.summary_metrics.net_cash_flow
        ));
    }
    if let Some(budget) = &analyses.budget_plan {
        parts.push(format!(
            "- Budget Plan: Recommended savings rate {:.1}%",
            budget.savings_rate
        ));
    }
    if let Some(investment) = &analyses.investment_advice {
        parts.push(format!(
            "- Investment Advice: Risk-appropriate {} portfolio",
            investment.advice.risk_profile
        ));
    }
    if let Some(debt) = &analyses.debt_optimization {
        if let Some(optimization) = &debt.optimization {
            parts.push(format!(
                "- Debt Optimization: Optimal strategy is the {} method",
                optimization.recommended_strategy.recommended_method
            ));
        }
    }

    if parts.is_empty() {
        "No detailed analyses available".to_string()
    } else {
        parts.join("\n")
    }
}

fn key_metrics(analyses: &Analyses) -> String {
    let mut metrics = Vec::new();

    if let Some(income) = &analyses.income_analysis {
        let summary = &income.summary_metrics;
        if summary.net_cash_flow != 0.0 {
            metrics.push(format!(
                "Monthly Net Cash Flow: ${:.2}",
                summary.net_cash_flow
            ));
        }
        if summary.savings_rate != 0.0 {
            metrics.push(format!("Savings Rate: {:.1}%", summary.savings_rate));
        }
    }

    if let Some(budget) = &analyses.budget_plan {
        let savings_target = match &budget.budget_allocation {
            BudgetAllocation::DebtFocused { savings, .. } => *savings,
            BudgetAllocation::Balanced { savings, .. } => *savings,
        };
        if savings_target > 0.0 {
            metrics.push(format!(
                "Monthly Savings Target: ${:.2}",
                round2(savings_target)
            ));
        }
    }

    if let Some(debt) = &analyses.debt_optimization {
        if let Some(optimization) = &debt.optimization {
            metrics.push(format!(
                "Total Debt: ${:.2}",
                optimization.current_debt_situation.total_debt
            ));
        }
    }

    if metrics.is_empty() {
        "Key metrics being calculated...".to_string()
    } else {
        metrics.join("\n")
    }
}

fn format_final_output(raw_plan: &str, analyses: &Analyses) -> String {
    let header = format!("YOUR COMPREHENSIVE FINANCIAL PLAN\n{}\n\n", "=".repeat(60));

    let sources: Vec<String> = analyses
        .agents_involved()
        .iter()
        .map(|a| {
            a.split('_')
                .map(|w| {
                    let mut chars = w.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();

    let footer = if sources.is_empty() {
        String::new()
    } else {
        format!("\n\nAnalysis based on: {}", sources.join(", "))
    };

    format!("{}{}{}", header, raw_plan, footer)
}

/// Deterministic plan assembled from the numbers when synthesis fails.
fn fallback_plan(analyses: &Analyses) -> String {
    let mut parts =
        vec!["I've analyzed your financial situation and here are my key recommendations:".to_string()];

    if let Some(income) = &analyses.income_analysis {
        parts.push("\nINCOME & EXPENSES:".to_string());
        let net_flow = income.summary_metrics.net_cash_flow;
        if net_flow > 0.0 {
            parts.push(format!("- You're saving ${:.2} monthly - great job!", net_flow));
        } else {
            parts.push(format!(
                "- You're overspending by ${:.2} monthly - let's fix this",
                net_flow.abs()
            ));
        }
    }

    if let Some(budget) = &analyses.budget_plan {
        parts.push("\nBUDGET PLANNING:".to_string());
        parts.push(format!(
            "- Target savings rate: {:.1}% of income",
            budget.savings_rate
        ));
    }

    if let Some(investment) = &analyses.investment_advice {
        parts.push("\nINVESTMENT STRATEGY:".to_string());
        parts.push(format!(
            "- Recommended {} risk portfolio",
            investment.advice.risk_profile
        ));
    }

    if let Some(debt) = &analyses.debt_optimization {
        if let Some(optimization) = &debt.optimization {
            parts.push("\nDEBT MANAGEMENT:".to_string());
            parts.push(format!(
                "- Use {} method for fastest results",
                optimization.recommended_strategy.recommended_method
            ));
        }
    }

    parts.push("\nNEXT STEPS:".to_string());
    parts.push("1. Review your monthly spending patterns".to_string());
    parts.push("2. Set up automatic savings transfers".to_string());
    parts.push("3. Create a debt repayment schedule".to_string());
    parts.push("4. Start investing with your risk profile".to_string());

    parts.join("\n")
}
