//! Investment advice
//!
//! Deterministic portfolio construction narrated into vehicle-level
//! recommendations.

use crate::config::agent_temperature;
use crate::investment::{build_advice, InvestmentAdvice};
use crate::models::UserProfile;
use crate::narrative::Narrator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

const PERSONA: &str = r#"You are a certified investment advisor with expertise in portfolio management and financial markets.

Your expertise:
- Modern Portfolio Theory and asset allocation
- Risk assessment and management
- Tax-efficient investing strategies
- Retirement planning and compound growth
- Behavioral finance and investor psychology

Provide evidence-based investment recommendations tailored to the user's risk profile and goals.
Always emphasize diversification, long-term thinking, and risk management."#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub advice: InvestmentAdvice,
    pub recommendations: String,
}

pub struct InvestmentAdvisor {
    narrator: Arc<dyn Narrator>,
}

impl InvestmentAdvisor {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn provide_advice(&self, profile: &UserProfile) -> InvestmentReport {
        let advice = build_advice(profile);

        let recommendations = match self
            .narrator
            .narrate(
                PERSONA,
                &advice_prompt(profile, &advice),
                agent_temperature("advisor"),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Investment narration failed: {}", e);
                super::NARRATIVE_FALLBACK.to_string()
            }
        };

        InvestmentReport {
            error: None,
            advice,
            recommendations,
        }
    }
}

fn advice_prompt(profile: &UserProfile, advice: &InvestmentAdvice) -> String {
    let allocation: Vec<String> = advice
        .portfolio_allocation
        .iter()
        .map(|(asset, pct)| format!("- {}: {}%", asset, pct))
        .collect();
    let goals: Vec<String> = profile
        .financial_goals
        .iter()
        .map(|g| format!("- {}: ${:.2}", g.name, g.target))
        .collect();

    format!(
        r#"Create personalized investment recommendations based on:

USER PROFILE:
- Age: {}
- Risk Profile: {}
- Time Horizon: {} years
- Investment Experience: {}

INVESTMENT STRATEGY:
{} - {}

PORTFOLIO ALLOCATION:
{}

FINANCIAL GOALS:
{}

Please provide:
1. Specific investment vehicle recommendations (ETFs, mutual funds, etc.)
2. Asset allocation rationale
3. Risk management strategies
4. Tax-efficient investing tips
5. Rebalancing schedule and methodology
6. Common pitfalls to avoid
7. Monitoring and adjustment guidelines

Focus on practical implementation and long-term success."#,
        profile.age,
        advice.risk_profile,
        advice.time_horizon,
        profile.investment_experience,
        advice.investment_strategy.name,
        advice.investment_strategy.focus,
        allocation.join("\n"),
        goals.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::RiskProfile;
    use crate::narrative::MockNarrator;

    #[tokio::test]
    async fn test_report_includes_narrative_and_numbers() {
        let advisor = InvestmentAdvisor::new(Arc::new(MockNarrator::replying("Buy index funds.")));
        let profile = UserProfile {
            age: 25,
            time_horizon: 20,
            risk_tolerance: "high".to_string(),
            investment_experience: "expert".to_string(),
            ..Default::default()
        };

        let report = advisor.provide_advice(&profile).await;
        assert_eq!(report.recommendations, "Buy index funds.");
        assert_eq!(report.advice.risk_profile, RiskProfile::Aggressive);
        assert!(report.advice.portfolio_allocation.contains_key("Alternatives"));
    }

    #[tokio::test]
    async fn test_report_degrades_on_failure() {
        let advisor = InvestmentAdvisor::new(Arc::new(MockNarrator::failing()));
        let report = advisor.provide_advice(&UserProfile::default()).await;
        assert_eq!(report.recommendations, crate::agents::NARRATIVE_FALLBACK);
        assert!(report.error.is_none());
    }
}
