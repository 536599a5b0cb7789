//! Financial education
//!
//! Explains concepts in plain language. Concept extraction tries a local
//! keyword table before asking the model, so common questions never need an
//! extra round trip.

use crate::config::agent_temperature;
use crate::models::{FinancialGoal, UserProfile};
use crate::narrative::Narrator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

const PERSONA: &str = r#"You are a patient, knowledgeable financial educator who makes complex concepts accessible.

Your teaching philosophy:
- Use simple, clear language without financial jargon
- Provide relatable analogies and real-world examples
- Break down complex ideas into digestible pieces
- Connect concepts to the user's personal situation
- Be encouraging and non-judgmental

Always start with the basics and build up to more complex ideas.
Use the "teach a 12-year-old" test for clarity."#;

const APOLOGY: &str = "I apologize, but I'm having trouble explaining that concept right now. \
                       Please try rephrasing your question.";

/// Well-known concepts and the question keywords that signal them.
const CONCEPT_KEYWORDS: &[(&str, &[&str])] = &[
    ("compound interest", &["compound", "interest", "growth"]),
    ("diversification", &["diversify", "diversification", "eggs", "basket"]),
    ("asset allocation", &["asset", "allocation", "mix"]),
    ("risk tolerance", &["risk", "tolerance"]),
    ("emergency fund", &["emergency", "rainy day"]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub age: u32,
    pub income_level: String,
    pub financial_goals: Vec<FinancialGoal>,
    pub investment_experience: String,
    pub risk_tolerance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub concept: String,
    pub explanation: String,
    pub user_context: UserContext,
    pub success: bool,
}

pub struct Educator {
    narrator: Arc<dyn Narrator>,
}

impl Educator {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn explain(&self, user_input: &str, profile: &UserProfile) -> Explanation {
        let preview: String = user_input.chars().take(100).collect();
        info!("Explaining financial concept: {}...", preview);

        let concept = self.extract_concept(user_input).await;
        let user_context = user_context(profile);

        match self
            .narrator
            .narrate(
                PERSONA,
                &explanation_prompt(&concept, user_input, &user_context),
                agent_temperature("educator"),
            )
            .await
        {
            Ok(explanation) => Explanation {
                error: None,
                concept,
                explanation,
                user_context,
                success: true,
            },
            Err(e) => {
                error!("Error explaining concept: {}", e);
                Explanation {
                    error: Some(e.to_string()),
                    concept,
                    explanation: APOLOGY.to_string(),
                    user_context,
                    success: false,
                }
            }
        }
    }

    async fn extract_concept(&self, user_input: &str) -> String {
        if let Some(concept) = match_known_concept(user_input) {
            return concept.to_string();
        }

        let prompt = format!(
            r#"The user asked: "{}"

What specific financial concept are they asking about?
Return only the concept name (1-3 words maximum).

Common financial concepts include:
- Compound interest
- Diversification
- Asset allocation
- Risk tolerance
- Emergency fund
- Budgeting
- Investing
- Debt management
- Retirement planning
- Credit scores
- Inflation"#,
            user_input
        );

        match self
            .narrator
            .narrate(
                "Identify the financial concept in the user's question. Return only the concept name.",
                &prompt,
                agent_temperature("educator"),
            )
            .await
        {
            Ok(concept) => concept.trim().to_lowercase(),
            Err(_) => "general financial literacy".to_string(),
        }
    }
}

/// Keyword table lookup; first concept with any keyword hit wins.
pub fn match_known_concept(user_input: &str) -> Option<&'static str> {
    let input = user_input.to_lowercase();
    CONCEPT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| input.contains(k)))
        .map(|(concept, _)| *concept)
}

pub fn user_context(profile: &UserProfile) -> UserContext {
    UserContext {
        age: profile.age,
        income_level: categorize_income(profile.annual_income).to_string(),
        financial_goals: profile.financial_goals.clone(),
        investment_experience: profile.investment_experience.clone(),
        risk_tolerance: profile.risk_tolerance.clone(),
    }
}

/// Income bucket used to pick context-appropriate examples.
pub fn categorize_income(income: f64) -> &'static str {
    if income == 0.0 {
        "unknown"
    } else if income < 30_000.0 {
        "low"
    } else if income < 75_000.0 {
        "medium"
    } else if income < 150_000.0 {
        "high"
    } else {
        "very_high"
    }
}

fn explanation_prompt(concept: &str, original_question: &str, context: &UserContext) -> String {
    format!(
        r#"The user asked: "{}"

They want to understand: {}

USER CONTEXT:
- Age: {}
- Financial Experience: {}
- Income Level: {}
- Risk Tolerance: {}

Please provide a clear, engaging explanation that:

1. STARTS WITH A SIMPLE DEFINITION (1-2 sentences maximum)
2. USES A RELATABLE ANALOGY from everyday life
3. EXPLAINS WHY IT MATTERS for their personal finances
4. PROVIDES A CONCRETE EXAMPLE with numbers they can understand
5. CONNECTS TO THEIR SPECIFIC SITUATION based on their context
6. HIGHLIGHTS KEY TAKEAWAYS and actionable next steps
7. WARNS ABOUT COMMON MISCONCEPTIONS or pitfalls to avoid

Make it conversational and encouraging. Use bullet points for clarity when helpful.
Adjust the complexity based on their experience level."#,
        original_question,
        concept,
        context.age,
        context.investment_experience,
        context.income_level,
        context.risk_tolerance,
    )
}
