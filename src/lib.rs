//! FinWise Advisor Core
//!
//! A request-scoped financial advisory engine:
//! - Routes free-text questions to specialist analysis agents
//! - Runs deterministic financial math (budgets, debt payoff, portfolios)
//! - Narrates the numbers through a generative backend
//! - Degrades gracefully: every request gets a structured response
//!
//! PIPELINE:
//! INPUT → ROUTE → ANALYZE (1..n specialists) → SYNTHESIZE → RESPOND

pub mod agents;
pub mod api;
pub mod budget;
pub mod calculators;
pub mod classifier;
pub mod config;
pub mod debt;
pub mod error;
pub mod gemini;
pub mod investment;
pub mod models;
pub mod narrative;
pub mod rate_limit;
pub mod transactions;
pub mod workflow;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use workflow::AdvisorWorkflow;
