//! Transaction categorization, aggregation, and anomaly detection
//!
//! Pure in-memory computations over bounded transaction lists. Keyword rules
//! are deterministic; no LLM is involved at this layer.

use crate::models::Transaction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered keyword rules: the first category whose keyword appears in the
/// lower-cased description wins.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "Food & Dining",
        &["zomato", "swiggy", "restaurant", "grocery", "bigbasket", "lunch", "dinner"],
    ),
    (
        "Transportation",
        &["uber", "ola", "metro", "taxi", "fuel", "petrol", "ride"],
    ),
    (
        "Shopping",
        &["amazon", "flipkart", "myntra", "mall", "store", "purchase", "buy"],
    ),
    (
        "Utilities",
        &["electricity", "water bill", "internet", "airtel", "jio", "phone bill"],
    ),
    (
        "Entertainment",
        &["netflix", "prime video", "spotify", "movie", "concert", "show"],
    ),
    ("Rent", &["rent", "landlord", "apartment", "housing"]),
    (
        "Income",
        &["salary", "bonus", "freelance", "income", "payment", "credited"],
    ),
    (
        "Healthcare",
        &["doctor", "hospital", "pharmacy", "medicine", "health", "clinic"],
    ),
    (
        "Education",
        &["school", "college", "tuition", "course", "education", "university"],
    ),
    (
        "Travel",
        &["flight", "hotel", "booking", "trip", "vacation", "travel"],
    ),
    (
        "Miscellaneous",
        &["gift", "donation", "charity", "miscellaneous", "other"],
    ),
];

/// Assign a spending category from the description. Defaults to Miscellaneous.
pub fn categorize(description: &str) -> &'static str {
    let description = description.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| description.contains(kw)) {
            return category;
        }
    }
    "Miscellaneous"
}

//
// ================= Flow-type split =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowSplit {
    pub income: Vec<Transaction>,
    pub expenses: Vec<Transaction>,
    pub investments: Vec<Transaction>,
    pub transfers: Vec<Transaction>,
}

/// Split transactions into income / investments / transfers / expenses by
/// sign and description keywords.
pub fn split_by_flow(transactions: &[Transaction]) -> FlowSplit {
    let mut split = FlowSplit::default();

    for t in transactions {
        let description = t.description.to_lowercase();
        let contains_any =
            |keywords: &[&str]| keywords.iter().any(|kw| description.contains(kw));

        if t.amount > 0.0 && contains_any(&["salary", "deposit", "income", "payment"]) {
            split.income.push(t.clone());
        } else if t.amount < 0.0 && contains_any(&["investment", "stock", "etf", "mutual"]) {
            split.investments.push(t.clone());
        } else if contains_any(&["transfer", "move"]) {
            split.transfers.push(t.clone());
        } else {
            split.expenses.push(t.clone());
        }
    }

    split
}

//
// ================= Recurring detection =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringEntry {
    pub description: String,
    pub amount: f64,
    /// Assumed cadence for any repeated (description, amount) pair; date
    /// deltas are not verified.
    pub frequency: String,
    pub occurrences: usize,
    pub last_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurringTransactions {
    pub income: Vec<RecurringEntry>,
    pub expenses: Vec<RecurringEntry>,
}

/// Any (lower-cased description, |amount|) pair seen at least twice counts as
/// recurring and is labelled monthly.
pub fn identify_recurring(transactions: &[Transaction]) -> RecurringTransactions {
    let mut groups: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
    for t in transactions {
        let key = format!("{}_{}", t.description.to_lowercase(), t.amount.abs());
        groups.entry(key).or_default().push(t);
    }

    let mut recurring = RecurringTransactions::default();
    for group in groups.values() {
        if group.len() < 2 {
            continue;
        }
        let first = group[0];
        let entry = RecurringEntry {
            description: first.description.clone(),
            amount: first.amount.abs(),
            frequency: "monthly".to_string(),
            occurrences: group.len(),
            last_date: group
                .iter()
                .map(|t| t.date.as_str())
                .max()
                .unwrap_or_default()
                .to_string(),
        };
        if first.amount > 0.0 {
            recurring.income.push(entry);
        } else {
            recurring.expenses.push(entry);
        }
    }

    recurring
}

//
// ================= Anomaly detection =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub description: String,
    pub amount: f64,
    pub date: String,
    pub z_score: f64,
    pub anomaly_type: String,
}

pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.0;

/// Flag transactions whose absolute amount sits more than `threshold`
/// standard deviations from the mean. Requires at least 10 transactions;
/// a zero standard deviation yields no flags.
pub fn detect_anomalies(transactions: &[Transaction], threshold: f64) -> Vec<Anomaly> {
    if transactions.len() < 10 {
        return Vec::new();
    }

    let amounts: Vec<f64> = transactions.iter().map(|t| t.amount.abs()).collect();
    let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
    // Sample standard deviation (n-1), matching typical statistics tooling.
    let variance =
        amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (amounts.len() - 1) as f64;
    let std = variance.sqrt();

    transactions
        .iter()
        .filter_map(|t| {
            let z_score = if std > 0.0 {
                (t.amount.abs() - mean) / std
            } else {
                0.0
            };
            if z_score > threshold {
                Some(Anomaly {
                    description: t.description.clone(),
                    amount: t.amount,
                    date: t.date.clone(),
                    z_score: crate::calculators::round2(z_score),
                    anomaly_type: if t.amount > 0.0 {
                        "high_value".to_string()
                    } else {
                        "high_spending".to_string()
                    },
                })
            } else {
                None
            }
        })
        .collect()
}

//
// ================= Monthly aggregation =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    pub monthly_breakdown: BTreeMap<String, MonthlyTotals>,
    pub analysis_period: String,
    pub months_analyzed: usize,
}

/// Group income/expense totals by calendar month. Unparseable dates are
/// skipped silently.
pub fn monthly_breakdown(transactions: &[Transaction]) -> MonthlyBreakdown {
    let mut months: BTreeMap<String, MonthlyTotals> = BTreeMap::new();

    for t in transactions {
        let Ok(date) = NaiveDate::parse_from_str(&t.date, "%Y-%m-%d") else {
            continue;
        };
        let key = date.format("%Y-%m").to_string();
        let entry = months.entry(key).or_default();
        if t.amount > 0.0 {
            entry.income += t.amount;
        } else {
            entry.expenses += t.amount.abs();
        }
    }

    let analysis_period = match (months.keys().next(), months.keys().last()) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => String::new(),
    };

    MonthlyBreakdown {
        months_analyzed: months.len(),
        analysis_period,
        monthly_breakdown: months,
    }
}

//
// ================= Category analysis =================
//

/// Percentage of total expense volume per category, for expense transactions.
pub fn category_percentages(expenses: &[Transaction]) -> BTreeMap<String, f64> {
    let total: f64 = expenses.iter().map(|t| t.amount.abs()).sum();
    if total <= 0.0 {
        return BTreeMap::new();
    }

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for t in expenses {
        let category = if t.category.is_empty() {
            categorize(&t.description).to_string()
        } else {
            t.category.clone()
        };
        *totals.entry(category).or_default() += t.amount.abs();
    }

    totals
        .into_iter()
        .map(|(k, v)| (k, ((v / total) * 1000.0).round() / 10.0))
        .collect()
}

//
// ================= Financial metrics =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_cash_flow: f64,
    pub savings_rate: f64,
    pub fixed_expenses: f64,
    pub discretionary_expenses: f64,
    pub fixed_expense_ratio: f64,
    pub discretionary_ratio: f64,
    pub average_monthly_income: f64,
    pub average_monthly_expenses: f64,
}

pub fn financial_metrics(
    split: &FlowSplit,
    recurring: &RecurringTransactions,
    months_analyzed: usize,
) -> FinancialMetrics {
    let total_income: f64 = split
        .income
        .iter()
        .filter(|t| t.amount > 0.0)
        .map(|t| t.amount)
        .sum();
    let total_expenses: f64 = split
        .expenses
        .iter()
        .filter(|t| t.amount < 0.0)
        .map(|t| t.amount.abs())
        .sum();

    let net_cash_flow = total_income - total_expenses;
    let savings_rate = if total_income > 0.0 {
        net_cash_flow / total_income * 100.0
    } else {
        0.0
    };

    let fixed_expenses: f64 = recurring.expenses.iter().map(|e| e.amount).sum();
    let discretionary = total_expenses - fixed_expenses;
    let ratio = |part: f64| {
        if total_income > 0.0 {
            part / total_income * 100.0
        } else {
            0.0
        }
    };

    let months = months_analyzed.max(1) as f64;
    let r2 = crate::calculators::round2;

    FinancialMetrics {
        total_income: r2(total_income),
        total_expenses: r2(total_expenses),
        net_cash_flow: r2(net_cash_flow),
        savings_rate: (savings_rate * 10.0).round() / 10.0,
        fixed_expenses: r2(fixed_expenses),
        discretionary_expenses: r2(discretionary),
        fixed_expense_ratio: (ratio(fixed_expenses) * 10.0).round() / 10.0,
        discretionary_ratio: (ratio(discretionary) * 10.0).round() / 10.0,
        average_monthly_income: r2(total_income / months),
        average_monthly_expenses: r2(total_expenses / months),
    }
}

//
// ================= Financial ratios =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialRatios {
    pub savings_rate: f64,
    pub debt_to_income: f64,
    pub net_worth: f64,
    pub emergency_fund_months: f64,
}

pub fn financial_ratios(
    income: f64,
    expenses: f64,
    debts: &[crate::models::Debt],
    assets: f64,
) -> FinancialRatios {
    let total_debt: f64 = debts.iter().map(|d| d.balance).sum();
    let monthly_payments: f64 = debts.iter().map(|d| d.minimum_payment).sum();
    let r2 = crate::calculators::round2;

    FinancialRatios {
        savings_rate: if income > 0.0 {
            r2((income - expenses) / income * 100.0)
        } else {
            0.0
        },
        debt_to_income: if income > 0.0 {
            r2(monthly_payments / income * 100.0)
        } else {
            0.0
        },
        net_worth: r2(assets - total_debt),
        emergency_fund_months: if expenses > 0.0 {
            ((assets / expenses) * 10.0).round() / 10.0
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(amount: f64, description: &str, date: &str) -> Transaction {
        Transaction {
            amount,
            description: description.to_string(),
            category: String::new(),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_categorize_first_match_wins() {
        assert_eq!(categorize("Uber ride downtown"), "Transportation");
        assert_eq!(categorize("NETFLIX subscription"), "Entertainment");
        assert_eq!(categorize("monthly rent to landlord"), "Rent");
        assert_eq!(categorize("cryptic wire 0x3f"), "Miscellaneous");
        // "grocery store": Food & Dining is listed before Shopping.
        assert_eq!(categorize("grocery store run"), "Food & Dining");
    }

    #[test]
    fn test_split_by_flow() {
        let txns = vec![
            txn(3000.0, "Salary credited", "2024-01-01"),
            txn(-120.0, "grocery run", "2024-01-03"),
            txn(-500.0, "index ETF investment", "2024-01-05"),
            txn(-200.0, "transfer to savings", "2024-01-07"),
        ];
        let split = split_by_flow(&txns);
        assert_eq!(split.income.len(), 1);
        assert_eq!(split.expenses.len(), 1);
        assert_eq!(split.investments.len(), 1);
        assert_eq!(split.transfers.len(), 1);
    }

    #[test]
    fn test_recurring_requires_two_occurrences() {
        let txns = vec![
            txn(-15.99, "Netflix", "2024-01-10"),
            txn(-15.99, "Netflix", "2024-02-10"),
            txn(-80.0, "one-off dinner", "2024-01-12"),
        ];
        let recurring = identify_recurring(&txns);
        assert_eq!(recurring.expenses.len(), 1);
        assert_eq!(recurring.expenses[0].occurrences, 2);
        assert_eq!(recurring.expenses[0].last_date, "2024-02-10");
        assert!(recurring.income.is_empty());
    }

    #[test]
    fn test_recurring_assumes_monthly_without_checking_dates() {
        // Known simplification: two same-day duplicates are still labelled
        // "monthly" because date deltas are never inspected.
        let txns = vec![
            txn(-50.0, "gym", "2024-03-01"),
            txn(-50.0, "gym", "2024-03-02"),
        ];
        let recurring = identify_recurring(&txns);
        assert_eq!(recurring.expenses[0].frequency, "monthly");
    }

    #[test]
    fn test_anomalies_require_ten_transactions() {
        let txns: Vec<Transaction> = (0..9)
            .map(|i| txn(-100.0, "coffee", &format!("2024-01-{:02}", i + 1)))
            .collect();
        assert!(detect_anomalies(&txns, DEFAULT_ANOMALY_THRESHOLD).is_empty());
    }

    #[test]
    fn test_anomaly_outlier_is_flagged() {
        let mut txns: Vec<Transaction> = (0..11)
            .map(|i| txn(-100.0, "coffee", &format!("2024-01-{:02}", i + 1)))
            .collect();
        txns.push(txn(-5_000.0, "jewelry splurge", "2024-01-20"));

        let anomalies = detect_anomalies(&txns, DEFAULT_ANOMALY_THRESHOLD);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].anomaly_type, "high_spending");
        assert!(anomalies[0].z_score > DEFAULT_ANOMALY_THRESHOLD);
    }

    #[test]
    fn test_anomaly_positive_outlier_is_high_value() {
        let mut txns: Vec<Transaction> = (0..11)
            .map(|i| txn(-100.0, "coffee", &format!("2024-01-{:02}", i + 1)))
            .collect();
        txns.push(txn(8_000.0, "annual bonus", "2024-01-25"));

        let anomalies = detect_anomalies(&txns, DEFAULT_ANOMALY_THRESHOLD);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].anomaly_type, "high_value");
    }

    #[test]
    fn test_anomaly_zero_std_flags_nothing() {
        let txns: Vec<Transaction> = (0..12)
            .map(|i| txn(-100.0, "coffee", &format!("2024-01-{:02}", i + 1)))
            .collect();
        assert!(detect_anomalies(&txns, DEFAULT_ANOMALY_THRESHOLD).is_empty());
    }

    #[test]
    fn test_monthly_breakdown_skips_bad_dates() {
        let txns = vec![
            txn(3000.0, "salary", "2024-01-01"),
            txn(-500.0, "rent", "2024-01-02"),
            txn(-500.0, "rent", "2024-02-02"),
            txn(-999.0, "ghost", "not-a-date"),
        ];
        let breakdown = monthly_breakdown(&txns);
        assert_eq!(breakdown.months_analyzed, 2);
        assert_eq!(breakdown.analysis_period, "2024-01 to 2024-02");
        assert_eq!(breakdown.monthly_breakdown["2024-01"].income, 3000.0);
        assert_eq!(breakdown.monthly_breakdown["2024-01"].expenses, 500.0);
    }

    #[test]
    fn test_category_percentages_sum_to_100() {
        let txns = vec![
            txn(-600.0, "rent", "2024-01-01"),
            txn(-300.0, "grocery", "2024-01-02"),
            txn(-100.0, "netflix", "2024-01-03"),
        ];
        let pct = category_percentages(&txns);
        let sum: f64 = pct.values().sum();
        assert!((sum - 100.0).abs() < 0.5);
        assert_eq!(pct["Rent"], 60.0);
    }

    #[test]
    fn test_financial_ratios_zero_income_guarded() {
        let ratios = financial_ratios(0.0, 0.0, &[], 5_000.0);
        assert_eq!(ratios.savings_rate, 0.0);
        assert_eq!(ratios.debt_to_income, 0.0);
        assert_eq!(ratios.emergency_fund_months, 0.0);
        assert_eq!(ratios.net_worth, 5_000.0);
    }

    #[test]
    fn test_financial_metrics_from_split() {
        let txns = vec![
            txn(4000.0, "salary credited", "2024-01-01"),
            txn(-1000.0, "rent", "2024-01-02"),
            txn(-1000.0, "rent", "2024-02-02"),
        ];
        let split = split_by_flow(&txns);
        let recurring = identify_recurring(&txns);
        let metrics = financial_metrics(&split, &recurring, 2);

        assert_eq!(metrics.total_income, 4000.0);
        assert_eq!(metrics.total_expenses, 2000.0);
        assert_eq!(metrics.net_cash_flow, 2000.0);
        assert_eq!(metrics.savings_rate, 50.0);
        assert_eq!(metrics.fixed_expenses, 1000.0);
        assert_eq!(metrics.average_monthly_expenses, 1000.0);
    }
}
