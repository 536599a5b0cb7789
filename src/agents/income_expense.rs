//! Income and expense analysis
//!
//! Full transaction pipeline: categorize, split, find recurring patterns and
//! anomalies, score financial health, then narrate.

use crate::config::agent_temperature;
use crate::models::Transaction;
use crate::narrative::Narrator;
use crate::transactions::{
    category_percentages, detect_anomalies, financial_metrics, identify_recurring,
    monthly_breakdown, split_by_flow, Anomaly, FinancialMetrics, MonthlyBreakdown,
    RecurringTransactions,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

const PERSONA: &str = r#"You are a financial analyst specializing in income and expense analysis.

Your expertise:
- Analyzing spending patterns and identifying trends
- Cash flow optimization and expense reduction strategies
- Income stream analysis and diversification opportunities
- Financial health assessment through ratio analysis
- Anomaly detection and fraud pattern identification

Provide data-driven insights with specific, actionable recommendations.
Highlight both financial strengths and areas for improvement.
Use concrete numbers and percentages to support your analysis.
Focus on practical steps the user can take immediately."#;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patterns {
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    pub opportunities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub net_cash_flow: f64,
    pub savings_rate: f64,
    pub financial_health: String,
    pub key_strengths: usize,
    pub key_concerns: usize,
    pub optimization_opportunities: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomeAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub financial_metrics: FinancialMetrics,
    pub category_analysis: BTreeMap<String, f64>,
    pub anomalies: Vec<Anomaly>,
    pub recurring_transactions: RecurringTransactions,
    pub time_period_analysis: MonthlyBreakdown,
    pub patterns_detected: Patterns,
    pub insights: String,
    pub summary_metrics: SummaryMetrics,
    pub health_score: u8,
}

pub struct IncomeExpenseAnalyzer {
    narrator: Arc<dyn Narrator>,
}

impl IncomeExpenseAnalyzer {
    pub fn new(narrator: Arc<dyn Narrator>) -> Self {
        Self { narrator }
    }

    pub async fn analyze(&self, transactions: &[Transaction]) -> IncomeAnalysis {
        info!(
            "Analyzing {} transactions for financial insights",
            transactions.len()
        );

        if transactions.is_empty() {
            return empty_analysis();
        }

        let split = split_by_flow(transactions);
        let recurring = identify_recurring(transactions);
        let periods = monthly_breakdown(transactions);
        let anomalies = detect_anomalies(transactions, 2.0);
        let category_analysis = category_percentages(&split.expenses);
        let metrics = financial_metrics(&split, &recurring, periods.months_analyzed);
        let patterns = detect_patterns(&metrics, &category_analysis);

        let insights = match self
            .narrator
            .narrate(
                PERSONA,
                &insights_prompt(&metrics, &category_analysis, &patterns, anomalies.len()),
                agent_temperature("analyzer"),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Income insight narration failed: {}", e);
                super::NARRATIVE_FALLBACK.to_string()
            }
        };

        IncomeAnalysis {
            error: None,
            summary_metrics: summary_metrics(&metrics, &patterns),
            health_score: health_score(&metrics, &patterns),
            financial_metrics: metrics,
            category_analysis,
            anomalies,
            recurring_transactions: recurring,
            time_period_analysis: periods,
            patterns_detected: patterns,
            insights,
        }
    }
}

fn empty_analysis() -> IncomeAnalysis {
    IncomeAnalysis {
        insights: "No transaction data available for analysis. Please provide data to generate insights."
            .to_string(),
        summary_metrics: SummaryMetrics {
            financial_health: "Unknown".to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Rule-based strengths, concerns, and optimization opportunities.
pub fn detect_patterns(
    metrics: &FinancialMetrics,
    category_analysis: &BTreeMap<String, f64>,
) -> Patterns {
    let mut patterns = Patterns::default();

    let sr = metrics.savings_rate;
    if sr >= 20.0 {
        patterns
            .strengths
            .push("Excellent savings rate (>=20%)".to_string());
    } else if sr >= 10.0 {
        patterns
            .strengths
            .push("Good savings rate (10-20%)".to_string());
    } else if sr < 0.0 {
        patterns
            .concerns
            .push("Negative savings rate - spending exceeds income".to_string());
    }

    let fr = metrics.fixed_expense_ratio;
    if fr > 50.0 {
        patterns
            .concerns
            .push("High fixed expenses (>50% of income)".to_string());
    } else if fr < 30.0 {
        patterns
            .strengths
            .push("Low fixed expenses (<30% of income)".to_string());
    }

    for (category, pct) in category_analysis {
        if *pct > 30.0 {
            patterns.concerns.push(format!(
                "High spending in {} ({}% of expenses)",
                category, pct
            ));
        } else if *pct < 5.0 {
            patterns.opportunities.push(format!(
                "Low spending in {} - optimization possible",
                category
            ));
        }
    }

    let flow = metrics.net_cash_flow;
    if flow > 0.0 {
        patterns
            .strengths
            .push(format!("Positive cash flow: ${:.2} monthly", flow));
    } else {
        patterns.concerns.push(format!(
            "Negative cash flow: ${:.2} monthly deficit",
            flow.abs()
        ));
    }

    patterns
}

pub fn summary_metrics(metrics: &FinancialMetrics, patterns: &Patterns) -> SummaryMetrics {
    let financial_health = if metrics.savings_rate >= 15.0 {
        "Excellent"
    } else if metrics.savings_rate >= 5.0 {
        "Good"
    } else {
        "Needs Improvement"
    };

    SummaryMetrics {
        net_cash_flow: metrics.net_cash_flow,
        savings_rate: metrics.savings_rate,
        financial_health: financial_health.to_string(),
        key_strengths: patterns.strengths.len(),
        key_concerns: patterns.concerns.len(),
        optimization_opportunities: patterns.opportunities.len(),
    }
}

/// 0-100 composite of savings rate, cash flow direction, fixed-expense load,
/// and the pattern tallies.
pub fn health_score(metrics: &FinancialMetrics, patterns: &Patterns) -> u8 {
    let mut score: i64 = 50;

    let sr = metrics.savings_rate;
    if sr >= 20.0 {
        score += 30;
    } else if sr >= 15.0 {
        score += 25;
    } else if sr >= 10.0 {
        score += 20;
    } else if sr >= 5.0 {
        score += 10;
    } else if sr < 0.0 {
        score -= 20;
    }

    score += if metrics.net_cash_flow > 0.0 { 20 } else { -15 };

    let fr = metrics.fixed_expense_ratio;
    if fr < 40.0 {
        score += 20;
    } else if fr < 50.0 {
        score += 10;
    } else if fr > 60.0 {
        score -= 15;
    }

    score += patterns.strengths.len() as i64 * 2;
    score -= patterns.concerns.len() as i64 * 3;

    score.clamp(0, 100) as u8
}

fn insights_prompt(
    metrics: &FinancialMetrics,
    category_analysis: &BTreeMap<String, f64>,
    patterns: &Patterns,
    anomaly_count: usize,
) -> String {
    let categories: Vec<String> = category_analysis
        .iter()
        .map(|(k, v)| format!("  - {}: {}%", k, v))
        .collect();
    let list = |items: &[String]| {
        if items.is_empty() {
            "None".to_string()
        } else {
            items.join(", ")
        }
    };
    let anomaly_line = if anomaly_count > 0 {
        format!("Anomalies: {} unusual transactions detected", anomaly_count)
    } else {
        "No anomalies detected".to_string()
    };

    format!(
        r#"Provide detailed financial insights and recommendations:

FINANCIAL SNAPSHOT:
- Total Monthly Income: ${:.2}
- Total Monthly Expenses: ${:.2}
- Net Cash Flow: ${:.2}
- Savings Rate: {}%
- Fixed Expenses: ${:.2} ({}% of income)

SPENDING BY CATEGORY:
{}

PATTERNS DETECTED:
Strengths: {}
Concerns: {}
Opportunities: {}
{}

Please provide:
1. EXECUTIVE SUMMARY
2. CASH FLOW ANALYSIS
3. SPENDING OPTIMIZATION
4. SAVINGS STRATEGY
5. IMMEDIATE ACTIONS
6. LONG-TERM RECOMMENDATIONS"#,
        metrics.total_income,
        metrics.total_expenses,
        metrics.net_cash_flow,
        metrics.savings_rate,
        metrics.fixed_expenses,
        metrics.fixed_expense_ratio,
        categories.join("\n"),
        list(&patterns.strengths),
        list(&patterns.concerns),
        list(&patterns.opportunities),
        anomaly_line,
    )
}
