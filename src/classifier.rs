//! Intent routing
//!
//! Decides which specialist a free-text question goes to. The generative
//! model proposes a label; everything after that is pure keyword matching so
//! routing stays deterministic and unit-testable, and a model failure simply
//! falls back to matching the raw question.

use crate::models::{AnalysisType, UserProfile};
use crate::Result;
use async_trait::async_trait;
use tracing::{info, warn};

/// Strategy seam for the model call that proposes an analysis label.
#[async_trait]
pub trait IntentModel: Send + Sync {
    async fn determine(&self, prompt: &str) -> Result<String>;
}

/// Ordered label table; first substring hit wins. Order matters: broader
/// words like "what" sit below the domain-specific labels.
const LABEL_MAP: &[(&str, AnalysisType)] = &[
    ("income", AnalysisType::IncomeExpense),
    ("expense", AnalysisType::IncomeExpense),
    ("spending", AnalysisType::IncomeExpense),
    ("cashflow", AnalysisType::IncomeExpense),
    ("budget", AnalysisType::BudgetPlanning),
    ("savings", AnalysisType::BudgetPlanning),
    ("allocation", AnalysisType::BudgetPlanning),
    ("investment", AnalysisType::InvestmentAdvice),
    ("portfolio", AnalysisType::InvestmentAdvice),
    ("retirement", AnalysisType::InvestmentAdvice),
    ("stocks", AnalysisType::InvestmentAdvice),
    ("debt", AnalysisType::DebtOptimization),
    ("loan", AnalysisType::DebtOptimization),
    ("repayment", AnalysisType::DebtOptimization),
    ("education", AnalysisType::FinancialEducation),
    ("explain", AnalysisType::FinancialEducation),
    ("what", AnalysisType::FinancialEducation),
    ("how", AnalysisType::FinancialEducation),
    ("comprehensive", AnalysisType::Comprehensive),
    ("general", AnalysisType::Comprehensive),
];

/// Map the model's answer to an analysis type, falling back to keyword
/// matching over the raw user input when the label is unrecognized.
pub fn map_label(label: &str, user_input: &str) -> AnalysisType {
    let label = label.trim().to_lowercase();

    for (key, analysis_type) in LABEL_MAP {
        if label.contains(key) {
            return *analysis_type;
        }
    }

    let input = user_input.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| input.contains(w));

    if any(&["spend", "expense", "income", "cash flow"]) {
        AnalysisType::IncomeExpense
    } else if any(&["budget", "save", "allocation"]) {
        AnalysisType::BudgetPlanning
    } else if any(&["invest", "stock", "portfolio", "return"]) {
        AnalysisType::InvestmentAdvice
    } else if any(&["debt", "loan", "repay", "credit"]) {
        AnalysisType::DebtOptimization
    } else if any(&["explain", "what is", "how does", "why"]) {
        AnalysisType::FinancialEducation
    } else {
        AnalysisType::Comprehensive
    }
}

/// Keyword-only classification, used when the model call itself fails.
pub fn classify(user_input: &str) -> AnalysisType {
    let input = user_input.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| input.contains(w));

    if any(&["budget", "save", "spending plan"]) {
        AnalysisType::BudgetPlanning
    } else if any(&["invest", "stock", "retirement"]) {
        AnalysisType::InvestmentAdvice
    } else if any(&["debt", "loan", "credit card"]) {
        AnalysisType::DebtOptimization
    } else if any(&["explain", "what is", "how to"]) {
        AnalysisType::FinancialEducation
    } else if any(&["spending", "expense", "income"]) {
        AnalysisType::IncomeExpense
    } else {
        AnalysisType::Comprehensive
    }
}

/// Routes questions using the model with keyword fallbacks.
pub struct IntentRouter<M> {
    model: M,
}

impl<M: IntentModel> IntentRouter<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn route(&self, user_input: &str, profile: &UserProfile) -> AnalysisType {
        let preview: String = user_input.chars().take(100).collect();
        info!("Routing request: {}...", preview);

        let prompt = routing_prompt(user_input, profile);

        let analysis_type = match self.model.determine(&prompt).await {
            Ok(label) => {
                info!("Model proposed analysis type: {}", label.trim());
                map_label(&label, user_input)
            }
            Err(e) => {
                warn!("Intent model failed ({}), using keyword fallback", e);
                classify(user_input)
            }
        };

        // A comprehensive review needs data to review. Without any, the best
        // we can do is teach.
        if analysis_type == AnalysisType::Comprehensive && profile.is_empty() {
            return AnalysisType::FinancialEducation;
        }

        analysis_type
    }
}

fn routing_prompt(user_input: &str, profile: &UserProfile) -> String {
    format!(
        r#"User Input: "{}"

User Financial Context:
{}

Based on the user's input and financial context, determine the MOST appropriate analysis type.

Available Analysis Types:
- income_expense: For questions about spending patterns, cash flow, expense tracking, income analysis
- budget_planning: For budget creation, allocation optimization, savings goals, spending limits
- investment_advice: For investing, portfolios, stocks, returns, retirement planning, asset allocation
- debt_optimization: For loans, credit cards, debt repayment, interest reduction, consolidation
- financial_education: For explaining concepts, "why" questions, learning, terminology
- comprehensive: For general financial planning or when multiple areas need analysis

Return ONLY the analysis type as a single word from the available options."#,
        user_input,
        profile.context_summary()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisorError;

    struct FixedModel(Option<String>);

    #[async_trait]
    impl IntentModel for FixedModel {
        async fn determine(&self, _prompt: &str) -> Result<String> {
            self.0
                .clone()
                .ok_or_else(|| AdvisorError::LlmError("model unavailable".to_string()))
        }
    }

    fn funded_profile() -> UserProfile {
        UserProfile {
            annual_income: 60_000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_map_label_direct_matches() {
        assert_eq!(
            map_label("debt_optimization", "anything"),
            AnalysisType::DebtOptimization
        );
        assert_eq!(
            map_label("  Budget_Planning\n", "anything"),
            AnalysisType::BudgetPlanning
        );
        assert_eq!(
            map_label("investment_advice", "anything"),
            AnalysisType::InvestmentAdvice
        );
    }

    #[test]
    fn test_map_label_falls_back_to_input_keywords() {
        assert_eq!(
            map_label("hmm, unclear", "how should I repay my credit card?"),
            AnalysisType::DebtOptimization
        );
        assert_eq!(
            map_label("???", "where does my spending go"),
            AnalysisType::IncomeExpense
        );
    }

    #[test]
    fn test_map_label_defaults_comprehensive() {
        assert_eq!(
            map_label("gibberish", "hello there"),
            AnalysisType::Comprehensive
        );
    }

    #[test]
    fn test_classify_keyword_routes() {
        assert_eq!(classify("help me budget"), AnalysisType::BudgetPlanning);
        assert_eq!(
            classify("should I invest in stocks?"),
            AnalysisType::InvestmentAdvice
        );
        assert_eq!(
            classify("my credit card is killing me"),
            AnalysisType::DebtOptimization
        );
        assert_eq!(
            classify("what is compound interest"),
            AnalysisType::FinancialEducation
        );
        assert_eq!(
            classify("track my expense history"),
            AnalysisType::IncomeExpense
        );
        assert_eq!(classify("hi"), AnalysisType::Comprehensive);
    }

    #[tokio::test]
    async fn test_router_uses_model_label() {
        let router = IntentRouter::new(FixedModel(Some("debt".to_string())));
        let routed = router.route("help", &funded_profile()).await;
        assert_eq!(routed, AnalysisType::DebtOptimization);
    }

    #[tokio::test]
    async fn test_router_falls_back_when_model_fails() {
        let router = IntentRouter::new(FixedModel(None));
        let routed = router
            .route("I want a budget for groceries", &funded_profile())
            .await;
        assert_eq!(routed, AnalysisType::BudgetPlanning);
    }

    #[tokio::test]
    async fn test_empty_profile_routes_comprehensive_to_education() {
        let router = IntentRouter::new(FixedModel(Some("comprehensive".to_string())));
        let routed = router.route("help me", &UserProfile::default()).await;
        assert_eq!(routed, AnalysisType::FinancialEducation);

        // With data the comprehensive route stands.
        let routed = router.route("help me", &funded_profile()).await;
        assert_eq!(routed, AnalysisType::Comprehensive);
    }
}
