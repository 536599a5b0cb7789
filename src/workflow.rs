//! Request pipeline
//!
//! Route the question, run the specialist(s), synthesize. Education is
//! terminal; everything else flows through the master strategist.
//! Computational errors never escape: callers always get a result object.

use crate::agents::master::{Analyses, MASTER_PERSONA};
use crate::agents::{
    BudgetPlanner, DebtOptimizer, Educator, IncomeExpenseAnalyzer, Insight, InvestmentAdvisor,
    MasterStrategist,
};
use crate::classifier::{IntentModel, IntentRouter};
use crate::config::agent_temperature;
use crate::models::{AnalysisType, UserProfile};
use crate::narrative::Narrator;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Intent labels come from the same narrator backend, speaking as the master
/// strategist.
struct NarratorIntentModel {
    narrator: Arc<dyn Narrator>,
}

#[async_trait]
impl IntentModel for NarratorIntentModel {
    async fn determine(&self, prompt: &str) -> Result<String> {
        self.narrator
            .narrate(MASTER_PERSONA, prompt, agent_temperature("master"))
            .await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub final_output: String,
    pub agent: String,
    pub action_type: Option<String>,
    pub priority: String,
    pub insights: Vec<Insight>,
    pub analysis_type: AnalysisType,
    pub agents_involved: Vec<String>,
    pub detailed_analysis: Analyses,
}

pub struct AdvisorWorkflow {
    router: IntentRouter<NarratorIntentModel>,
    income_analyzer: IncomeExpenseAnalyzer,
    budget_planner: BudgetPlanner,
    investment_advisor: InvestmentAdvisor,
    debt_optimizer: DebtOptimizer,
    educator: Educator,
    master: MasterStrategist,
}

impl AdvisorWorkflow {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self {
            router: IntentRouter::new(NarratorIntentModel {
                narrator: narrator.clone(),
            }),
            income_analyzer: IncomeExpenseAnalyzer::new(narrator.clone()),
            budget_planner: BudgetPlanner::new(narrator.clone()),
            investment_advisor: InvestmentAdvisor::new(narrator.clone()),
            debt_optimizer: DebtOptimizer::new(narrator.clone()),
            educator: Educator::new(narrator.clone()),
            master: MasterStrategist::new(narrator),
        }
    }

    pub async fn process(&self, user_input: &str, profile: &UserProfile) -> WorkflowResult {
        let analysis_type = self.router.route(user_input, profile).await;
        info!("Workflow routing to: {}", analysis_type);

        if analysis_type == AnalysisType::FinancialEducation {
            // Terminal: explanations skip synthesis entirely.
            let explanation = self.educator.explain(user_input, profile).await;
            let final_output = explanation.explanation.clone();
            return WorkflowResult {
                final_output,
                agent: "financial_educator".to_string(),
                action_type: Some("start_learning".to_string()),
                priority: "medium".to_string(),
                insights: Vec::new(),
                analysis_type,
                agents_involved: vec!["financial_educator".to_string()],
                detailed_analysis: Analyses {
                    financial_education: Some(explanation),
                    ..Default::default()
                },
            };
        }

        let mut analyses = Analyses::default();
        match analysis_type {
            AnalysisType::IncomeExpense => {
                analyses.income_analysis =
                    Some(self.income_analyzer.analyze(&profile.transactions).await);
            }
            AnalysisType::BudgetPlanning => {
                analyses.budget_plan = Some(self.budget_planner.create_plan(profile).await);
            }
            AnalysisType::InvestmentAdvice => {
                analyses.investment_advice =
                    Some(self.investment_advisor.provide_advice(profile).await);
            }
            AnalysisType::DebtOptimization => {
                analyses.debt_optimization = Some(self.debt_optimizer.optimize(profile).await);
            }
            AnalysisType::Comprehensive => {
                info!("Running comprehensive analysis (all specialists)");
                analyses.income_analysis =
                    Some(self.income_analyzer.analyze(&profile.transactions).await);
                analyses.budget_plan = Some(self.budget_planner.create_plan(profile).await);
                analyses.investment_advice =
                    Some(self.investment_advisor.provide_advice(profile).await);
                analyses.debt_optimization = Some(self.debt_optimizer.optimize(profile).await);
            }
            AnalysisType::FinancialEducation => unreachable!("handled above"),
        }

        let plan = self.master.synthesize(profile, &analyses).await;
        let agents_involved = {
            let involved = analyses.agents_involved();
            if involved.is_empty() {
                vec![plan.agent.clone()]
            } else {
                involved
            }
        };

        WorkflowResult {
            final_output: plan.response,
            agent: plan.agent,
            action_type: Some(plan.action_type),
            priority: plan.priority,
            insights: plan.insights,
            analysis_type,
            agents_involved,
            detailed_analysis: analyses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Debt, Transaction};
    use crate::narrative::MockNarrator;

    fn workflow(reply: &str) -> AdvisorWorkflow {
        AdvisorWorkflow::new(Arc::new(MockNarrator::replying(reply)))
    }

    fn profile_with_data() -> UserProfile {
        UserProfile {
            age: 32,
            annual_income: 72_000.0,
            monthly_expenses: 4000.0,
            savings: 10_000.0,
            debts: vec![Debt {
                name: "card".to_string(),
                balance: 4000.0,
                interest_rate: 20.0,
                minimum_payment: 120.0,
            }],
            transactions: vec![
                Transaction {
                    amount: 6000.0,
                    description: "salary".to_string(),
                    category: String::new(),
                    date: "2024-03-01".to_string(),
                },
                Transaction {
                    amount: -1500.0,
                    description: "rent payment".to_string(),
                    category: String::new(),
                    date: "2024-03-02".to_string(),
                },
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_debt_question_routes_to_debt_optimizer() {
        // Mock reply "debt" doubles as the routing label and the narrative.
        let workflow = workflow("debt");
        let result = workflow
            .process("how do I pay off my loans", &profile_with_data())
            .await;

        assert_eq!(result.analysis_type, AnalysisType::DebtOptimization);
        assert!(result.detailed_analysis.debt_optimization.is_some());
        assert_eq!(result.agents_involved, vec!["debt_optimizer".to_string()]);
        assert_eq!(result.action_type.as_deref(), Some("manage_debt"));
    }

    #[tokio::test]
    async fn test_comprehensive_runs_all_specialists() {
        let workflow = workflow("comprehensive");
        let result = workflow
            .process("review my whole situation", &profile_with_data())
            .await;

        assert_eq!(result.analysis_type, AnalysisType::Comprehensive);
        let analyses = &result.detailed_analysis;
        assert!(analyses.income_analysis.is_some());
        assert!(analyses.budget_plan.is_some());
        assert!(analyses.investment_advice.is_some());
        assert!(analyses.debt_optimization.is_some());
        assert_eq!(result.agents_involved.len(), 4);
    }

    #[tokio::test]
    async fn test_education_is_terminal() {
        let workflow = workflow("financial_education");
        let result = workflow
            .process("what is compound interest", &profile_with_data())
            .await;

        assert_eq!(result.analysis_type, AnalysisType::FinancialEducation);
        assert_eq!(result.agent, "financial_educator");
        assert!(result.detailed_analysis.financial_education.is_some());
        assert!(result.detailed_analysis.income_analysis.is_none());
        assert_eq!(result.action_type.as_deref(), Some("start_learning"));
    }

    #[tokio::test]
    async fn test_total_narrator_failure_still_produces_result() {
        let workflow = AdvisorWorkflow::new(Arc::new(MockNarrator::failing()));
        let result = workflow
            .process("give me a budget plan", &profile_with_data())
            .await;

        // Routing fell back to keywords; budget plan ran; synthesis fell back.
        assert_eq!(result.analysis_type, AnalysisType::BudgetPlanning);
        assert!(result.detailed_analysis.budget_plan.is_some());
        assert!(!result.final_output.is_empty());
    }
}
