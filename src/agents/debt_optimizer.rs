//! Debt optimization
//!
//! Runs the repayment simulations and narrates the chosen strategy. A debt-free
//! profile gets a congratulatory result instead of an empty plan.

use crate::config::agent_temperature;
use crate::debt::{optimize_repayment, DebtOptimization};
use crate::models::UserProfile;
use crate::narrative::Narrator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

const PERSONA: &str = r#"You are a debt management expert specializing in optimizing repayment strategies.

Your expertise:
- Debt snowball vs avalanche method optimization
- Interest cost minimization strategies
- Debt consolidation evaluation
- Cash flow optimization for debt repayment
- Behavioral psychology in debt payoff

Provide mathematically optimal strategies while considering psychological factors.
Always calculate total interest savings and payoff timelines."#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub optimization: Option<DebtOptimization>,
    pub detailed_recommendations: String,
}

pub struct DebtOptimizer {
    narrator: Arc<dyn Narrator>,
}

impl DebtOptimizer {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn optimize(&self, profile: &UserProfile) -> DebtReport {
        let Some(optimization) = optimize_repayment(&profile.debts, profile) else {
            return DebtReport {
                error: None,
                optimization: None,
                detailed_recommendations:
                    "Congratulations! You have no outstanding debts. Focus on building your savings and investments."
                        .to_string(),
            };
        };

        let detailed_recommendations = match self
            .narrator
            .narrate(
                PERSONA,
                &optimization_prompt(profile, &optimization),
                agent_temperature("optimizer"),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Debt narration failed: {}", e);
                super::NARRATIVE_FALLBACK.to_string()
            }
        };

        DebtReport {
            error: None,
            optimization: Some(optimization),
            detailed_recommendations,
        }
    }
}

fn optimization_prompt(profile: &UserProfile, optimization: &DebtOptimization) -> String {
    let situation = &optimization.current_debt_situation;
    let strategy = &optimization.recommended_strategy;
    let consolidation = &optimization.consolidation_options;

    let consolidation_block = if consolidation.options.is_empty() {
        "No consolidation options recommended".to_string()
    } else {
        let lines: Vec<String> = consolidation
            .options
            .iter()
            .map(|o| {
                format!(
                    "- {}: {}% rate, Save ${:.2}",
                    o.kind, o.estimated_rate, o.potential_savings
                )
            })
            .collect();
        format!(
            "Recommended: {}\n{}",
            consolidation.recommended,
            lines.join("\n")
        )
    };

    format!(
        r#"Create a comprehensive debt optimization plan based on:

CURRENT DEBT SITUATION:
- Total Debt: ${:.2}
- Weighted Interest Rate: {}%
- Debt-to-Income Ratio: {}%
- Number of Debts: {}

RECOMMENDED STRATEGY: {} Method
- Rationale: {}
- Interest Savings: ${:.2}

CONSOLIDATION ANALYSIS:
{}

USER PROFILE:
- Monthly Income: ${:.2}
- Risk Tolerance: {}

Please provide:
1. Step-by-step repayment instructions
2. Monthly payment allocations
3. Timeline expectations
4. Cash flow management tips
5. Behavioral strategies for staying motivated
6. Warning signs and when to seek help
7. Progress tracking methods

Be encouraging yet realistic about the journey ahead."#,
        situation.total_debt,
        situation.weighted_interest_rate,
        situation.debt_to_income_ratio,
        situation.number_of_debts,
        strategy.recommended_method.to_uppercase(),
        strategy.rationale,
        strategy.interest_savings,
        consolidation_block,
        profile.monthly_income(),
        profile.risk_tolerance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Debt;
    use crate::narrative::MockNarrator;

    fn indebted_profile() -> UserProfile {
        UserProfile {
            annual_income: 60_000.0,
            monthly_expenses: 3000.0,
            savings: 5000.0,
            debts: vec![Debt {
                name: "credit card".to_string(),
                balance: 8000.0,
                interest_rate: 22.0,
                minimum_payment: 200.0,
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_debt_free_profile_gets_congratulations() {
        let optimizer = DebtOptimizer::new(Arc::new(MockNarrator::replying("unused")));
        let report = optimizer.optimize(&UserProfile::default()).await;
        assert!(report.optimization.is_none());
        assert!(report.detailed_recommendations.contains("Congratulations"));
    }

    #[tokio::test]
    async fn test_report_carries_plans() {
        let optimizer = DebtOptimizer::new(Arc::new(MockNarrator::replying("Pay it down.")));
        let report = optimizer.optimize(&indebted_profile()).await;

        let optimization = report.optimization.expect("optimization expected");
        assert_eq!(optimization.current_debt_situation.total_debt, 8000.0);
        assert!(!optimization.snowball_method.payoff_plan.is_empty());
        assert_eq!(report.detailed_recommendations, "Pay it down.");
    }

    #[tokio::test]
    async fn test_report_degrades_on_failure() {
        let optimizer = DebtOptimizer::new(Arc::new(MockNarrator::failing()));
        let report = optimizer.optimize(&indebted_profile()).await;
        assert!(report.optimization.is_some());
        assert_eq!(
            report.detailed_recommendations,
            crate::agents::NARRATIVE_FALLBACK
        );
    }
}
