//! Portfolio construction
//!
//! Maps a risk profile onto a strategy, a model allocation, and expected
//! return figures. All tables are long-term historical averages, not live
//! market data.

use crate::calculators::{risk_profile, round2, RiskProfile};
use crate::models::UserProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentStrategy {
    pub name: String,
    pub focus: String,
    pub approach: String,
    pub rebalancing: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedReturns {
    pub expected_annual_return: f64,
    pub inflation_adjusted_return: f64,
    pub compounded_5yr: f64,
    pub compounded_10yr: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentAdvice {
    pub risk_profile: RiskProfile,
    pub investment_strategy: InvestmentStrategy,
    /// Asset class -> percentage of portfolio. Sums to 100.
    pub portfolio_allocation: BTreeMap<String, f64>,
    pub expected_returns: ExpectedReturns,
    pub time_horizon: u32,
}

/// Long-term average annual returns by asset class, in percent.
const ASSET_RETURNS: &[(&str, f64)] = &[
    ("US Stocks", 9.0),
    ("International Stocks", 7.5),
    ("Bonds", 4.5),
    ("Real Estate", 6.0),
    ("Cash", 2.0),
    ("Alternatives", 8.0),
];

pub fn build_advice(profile: &UserProfile) -> InvestmentAdvice {
    info!("Generating investment advice for user profile");

    let risk = risk_profile(
        profile.age,
        &profile.investment_experience,
        profile.time_horizon,
        &profile.risk_tolerance,
    );
    let strategy = investment_strategy(profile, risk);
    let allocation = portfolio_allocation(risk, &profile.investment_experience);
    let returns = expected_returns(&allocation, risk);

    InvestmentAdvice {
        risk_profile: risk,
        investment_strategy: strategy,
        portfolio_allocation: allocation,
        expected_returns: returns,
        time_horizon: profile.time_horizon,
    }
}

pub fn investment_strategy(profile: &UserProfile, risk: RiskProfile) -> InvestmentStrategy {
    let mut strategy = match risk {
        RiskProfile::Conservative => InvestmentStrategy {
            name: "Capital Preservation".to_string(),
            focus: "Low-risk income generation and principal protection".to_string(),
            approach: "Income-focused with bond heavy allocation".to_string(),
            rebalancing: "Annual rebalancing with focus on quality".to_string(),
        },
        RiskProfile::Moderate => InvestmentStrategy {
            name: "Balanced Growth".to_string(),
            focus: "Balanced approach between growth and income".to_string(),
            approach: "60-70% equities with diversified bond exposure".to_string(),
            rebalancing: "Semi-annual rebalancing with tactical adjustments".to_string(),
        },
        RiskProfile::Aggressive => InvestmentStrategy {
            name: "Growth Maximization".to_string(),
            focus: "Long-term capital appreciation".to_string(),
            approach: "80-90% equities with growth focus".to_string(),
            rebalancing: "Quarterly review with strategic tilts".to_string(),
        },
    };

    // Age and horizon override the stock approach text.
    if profile.age < 40 && profile.time_horizon > 15 {
        strategy.approach = "More aggressive growth orientation".to_string();
    } else if profile.age > 55 {
        strategy.approach = "More conservative capital preservation".to_string();
    }

    strategy
}

pub fn portfolio_allocation(
    risk: RiskProfile,
    investment_experience: &str,
) -> BTreeMap<String, f64> {
    let base: &[(&str, f64)] = match risk {
        RiskProfile::Conservative => &[
            ("US Stocks", 30.0),
            ("International Stocks", 10.0),
            ("Bonds", 45.0),
            ("Real Estate", 10.0),
            ("Cash", 5.0),
        ],
        RiskProfile::Moderate => &[
            ("US Stocks", 50.0),
            ("International Stocks", 20.0),
            ("Bonds", 20.0),
            ("Real Estate", 7.0),
            ("Cash", 3.0),
        ],
        RiskProfile::Aggressive => &[
            ("US Stocks", 60.0),
            ("International Stocks", 25.0),
            ("Bonds", 10.0),
            ("Real Estate", 3.0),
            ("Cash", 2.0),
        ],
    };

    let mut allocation: BTreeMap<String, f64> =
        base.iter().map(|(k, v)| (k.to_string(), *v)).collect();

    // Experienced investors carve an alternatives sleeve out of US equities.
    if investment_experience == "expert" {
        if let Some(us) = allocation.get_mut("US Stocks") {
            *us -= 5.0;
        }
        allocation.insert("Alternatives".to_string(), 5.0);
    }

    allocation
}

pub fn expected_returns(
    allocation: &BTreeMap<String, f64>,
    risk: RiskProfile,
) -> ExpectedReturns {
    let mut total_return = 0.0;
    for (asset, weight) in allocation {
        if let Some((_, ret)) = ASSET_RETURNS.iter().find(|(name, _)| name == asset) {
            total_return += weight / 100.0 * ret;
        }
    }

    let adjustment = match risk {
        RiskProfile::Conservative => -1.0,
        RiskProfile::Moderate => 0.0,
        RiskProfile::Aggressive => 0.5,
    };
    let adjusted = total_return + adjustment;

    ExpectedReturns {
        expected_annual_return: round2(adjusted),
        inflation_adjusted_return: round2(adjusted - 2.5),
        compounded_5yr: round2(((1.0 + adjusted / 100.0).powi(5) - 1.0) * 100.0),
        compounded_10yr: round2(((1.0 + adjusted / 100.0).powi(10) - 1.0) * 100.0),
    }
}
