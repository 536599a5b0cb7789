//! Application settings
//!
//! Loaded once at startup from the environment (.env supported via dotenv).

use crate::error::AdvisorError;
use crate::Result;
use std::env;

pub const MODEL_NAME: &str = "gemini-2.0-flash";

/// Financial planning constants shared across the specialists.
pub const EMERGENCY_FUND_MONTHS: f64 = 3.0;
pub const DEFAULT_SAVINGS_RATE: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct Settings {
    pub gemini_api_key: String,
    pub port: u16,
    /// Conservative throttle for the generative backend.
    pub llm_calls_per_minute: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();

        let port = env::var("PORT")
            .or_else(|_| env::var("API_PORT"))
            .unwrap_or_else(|_| "8001".to_string())
            .parse()
            .map_err(|e| AdvisorError::ConfigError(format!("Invalid PORT value: {}", e)))?;

        let llm_calls_per_minute = env::var("LLM_CALLS_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        Ok(Self {
            gemini_api_key,
            port,
            llm_calls_per_minute,
        })
    }

    pub fn validate_api_key(&self) -> Result<()> {
        if self.gemini_api_key.is_empty() {
            return Err(AdvisorError::ConfigError(
                "GEMINI_API_KEY environment variable is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-specialist sampling temperature for the generative backend.
pub fn agent_temperature(agent: &str) -> f32 {
    match agent {
        "educator" => 0.3,
        _ => 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_temperatures() {
        assert_eq!(agent_temperature("educator"), 0.3);
        assert_eq!(agent_temperature("master"), 0.1);
        assert_eq!(agent_temperature("unknown"), 0.1);
    }
}
