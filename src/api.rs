//! REST API server
//!
//! HTTP boundary in front of the advisor workflow, plus direct specialist
//! endpoints and a what-if scenario calculator for the front end.

use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::agents::{BudgetPlanner, DebtOptimizer, Insight, InvestmentAdvisor};
use crate::agents::master::Analyses;
use crate::models::{AnalysisType, UserProfile};
use crate::narrative::Narrator;
use crate::workflow::AdvisorWorkflow;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub user_input: String,
    #[serde(default)]
    pub user_profile: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct WhatIfScenarioRequest {
    pub user_profile: UserProfile,
    pub scenario_type: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

/// =============================
/// Response Models
/// =============================

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub final_output: String,
    pub agent: String,
    #[serde(rename = "actionType")]
    pub action_type: Option<String>,
    pub priority: String,
    pub insights: Vec<Insight>,
    pub analysis_type: AnalysisType,
    pub agents_involved: Vec<String>,
    pub detailed_analysis: Analyses,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub workflow: Arc<AdvisorWorkflow>,
    pub narrator: Arc<dyn Narrator>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "FinWise Advisor Core",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Main Processing Endpoint
/// =============================

async fn process_request(
    State(state): State<ApiState>,
    Json(req): Json<ProcessRequest>,
) -> (StatusCode, Json<ProcessResponse>) {
    let preview: String = req.user_input.chars().take(100).collect();
    info!("Processing request: {}...", preview);

    let result = state.workflow.process(&req.user_input, &req.user_profile).await;

    (
        StatusCode::OK,
        Json(ProcessResponse {
            success: true,
            final_output: result.final_output,
            agent: result.agent,
            action_type: result.action_type,
            priority: result.priority,
            insights: result.insights,
            analysis_type: result.analysis_type,
            agents_involved: result.agents_involved,
            detailed_analysis: result.detailed_analysis,
        }),
    )
}

/// =============================
/// Direct Specialist Endpoints
/// =============================

async fn budget_endpoint(
    State(state): State<ApiState>,
    Json(profile): Json<UserProfile>,
) -> (StatusCode, Json<ApiResponse>) {
    let planner = BudgetPlanner::new(state.narrator.clone());
    let plan = planner.create_plan(&profile).await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            serde_json::json!({ "budget_plan": plan }),
        )),
    )
}

async fn investment_endpoint(
    State(state): State<ApiState>,
    Json(profile): Json<UserProfile>,
) -> (StatusCode, Json<ApiResponse>) {
    let advisor = InvestmentAdvisor::new(state.narrator.clone());
    let advice = advisor.provide_advice(&profile).await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            serde_json::json!({ "investment_advice": advice }),
        )),
    )
}

async fn debt_endpoint(
    State(state): State<ApiState>,
    Json(profile): Json<UserProfile>,
) -> (StatusCode, Json<ApiResponse>) {
    let optimizer = DebtOptimizer::new(state.narrator.clone());
    let plan = optimizer.optimize(&profile).await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            serde_json::json!({ "debt_plan": plan }),
        )),
    )
}

/// =============================
/// What-If Scenarios
/// =============================

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryAdjustment {
    pub category: String,
    pub reduction: f64,
}

#[derive(Debug, Serialize)]
pub struct ScenarioImpact {
    #[serde(rename = "originalBudget")]
    pub original_budget: f64,
    #[serde(rename = "newBudget")]
    pub new_budget: f64,
    #[serde(rename = "savingsImpact")]
    pub savings_impact: f64,
    #[serde(rename = "goalDelay")]
    pub goal_delay: i64,
    pub adjustments: Vec<CategoryAdjustment>,
}

/// Pure scenario math: how a recurring expense or income change shifts the
/// monthly surplus and goal timelines.
pub fn scenario_impact(profile: &UserProfile, scenario_type: &str, amount: f64) -> ScenarioImpact {
    let original_budget = profile.monthly_income() - profile.monthly_expenses;

    let mut impact = ScenarioImpact {
        original_budget,
        new_budget: original_budget,
        savings_impact: 0.0,
        goal_delay: 0,
        adjustments: Vec::new(),
    };

    // Goal delay assumes 30% of surplus flows to goals.
    let months_per_amount = |a: f64| {
        if original_budget > 0.0 {
            (a / (original_budget * 0.3)).round() as i64
        } else {
            0
        }
    };

    match scenario_type {
        "expense" => {
            impact.new_budget = original_budget - amount;
            impact.savings_impact = -amount;
            impact.goal_delay = months_per_amount(amount);

            if amount > 1000.0 {
                impact.adjustments = vec![
                    CategoryAdjustment {
                        category: "Entertainment".to_string(),
                        reduction: amount * 0.3,
                    },
                    CategoryAdjustment {
                        category: "Dining Out".to_string(),
                        reduction: amount * 0.2,
                    },
                    CategoryAdjustment {
                        category: "Shopping".to_string(),
                        reduction: amount * 0.5,
                    },
                ];
            }
        }
        "income" => {
            impact.new_budget = original_budget + amount;
            impact.savings_impact = amount * 0.7;
            impact.goal_delay = -months_per_amount(amount);
        }
        _ => {}
    }

    impact
}

async fn what_if_endpoint(
    Json(req): Json<WhatIfScenarioRequest>,
) -> (StatusCode, Json<ScenarioImpact>) {
    info!(
        "What-if scenario: {} of ${:.2} ({})",
        req.scenario_type, req.amount, req.description
    );
    (
        StatusCode::OK,
        Json(scenario_impact(&req.user_profile, &req.scenario_type, req.amount)),
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(workflow: Arc<AdvisorWorkflow>, narrator: Arc<dyn Narrator>) -> Router {
    let state = ApiState { workflow, narrator };

    Router::new()
        .route("/health", get(health))
        .route("/api/agents/process", post(process_request))
        .route("/api/agents/budget", post(budget_endpoint))
        .route("/api/agents/investment", post(investment_endpoint))
        .route("/api/agents/debt", post(debt_endpoint))
        .route("/api/agents/what-if-scenario", post(what_if_endpoint))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    workflow: Arc<AdvisorWorkflow>,
    narrator: Arc<dyn Narrator>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(workflow, narrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Advisor API listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            annual_income: 72_000.0, // 6000/mo
            monthly_expenses: 4000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_expense_scenario() {
        let impact = scenario_impact(&profile(), "expense", 600.0);
        assert_eq!(impact.original_budget, 2000.0);
        assert_eq!(impact.new_budget, 1400.0);
        assert_eq!(impact.savings_impact, -600.0);
        assert_eq!(impact.goal_delay, 1);
        assert!(impact.adjustments.is_empty());
    }

    #[test]
    fn test_large_expense_suggests_adjustments() {
        let impact = scenario_impact(&profile(), "expense", 2000.0);
        assert_eq!(impact.adjustments.len(), 3);
        assert_eq!(impact.adjustments[0].category, "Entertainment");
        assert_eq!(impact.adjustments[0].reduction, 600.0);
        assert_eq!(impact.adjustments[2].reduction, 1000.0);
        assert_eq!(impact.goal_delay, 3);
    }

    #[test]
    fn test_income_scenario() {
        let impact = scenario_impact(&profile(), "income", 1000.0);
        assert_eq!(impact.new_budget, 3000.0);
        assert_eq!(impact.savings_impact, 700.0);
        assert_eq!(impact.goal_delay, -2);
    }

    #[test]
    fn test_unknown_scenario_is_neutral() {
        let impact = scenario_impact(&profile(), "investment", 1000.0);
        assert_eq!(impact.new_budget, impact.original_budget);
        assert_eq!(impact.savings_impact, 0.0);
    }

    #[test]
    fn test_zero_surplus_guards_goal_delay() {
        let broke = UserProfile::default();
        let impact = scenario_impact(&broke, "expense", 500.0);
        assert_eq!(impact.goal_delay, 0);
    }
}
