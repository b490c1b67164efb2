//! Personal finance dashboards: budget planner, expense analyzer, health score.
//!
//! Sample data only; the derived figures are computed, not stored.

use serde::Serialize;

// ===== Budget planner =====

#[derive(Debug, Clone, Copy)]
pub struct BudgetCategory {
    pub name: &'static str,
    pub budgeted: u64,
    pub spent: u64,
}

pub const BUDGET_CATEGORIES: &[BudgetCategory] = &[
    BudgetCategory { name: "Food & Dining", budgeted: 15000, spent: 18500 },
    BudgetCategory { name: "Transportation", budgeted: 8000, spent: 6200 },
    BudgetCategory { name: "Entertainment", budgeted: 5000, spent: 4100 },
    BudgetCategory { name: "Shopping", budgeted: 12000, spent: 14800 },
    BudgetCategory { name: "Bills & Utilities", budgeted: 20000, spent: 19500 },
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum BudgetStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Near Limit")]
    NearLimit,
    #[serde(rename = "Over Budget")]
    OverBudget,
}

impl BudgetStatus {
    pub fn from_usage(percent: f64) -> Self {
        if percent > 100.0 {
            BudgetStatus::OverBudget
        } else if percent > 80.0 {
            BudgetStatus::NearLimit
        } else {
            BudgetStatus::OnTrack
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryUsage {
    pub name: &'static str,
    pub budgeted: u64,
    pub spent: u64,
    pub usage_percent: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub categories: Vec<CategoryUsage>,
    pub total_budgeted: u64,
    pub total_spent: u64,
    /// Positive when under budget, negative when over
    pub remaining: i64,
    pub overall_usage_percent: f64,
}

pub fn usage_percent(budgeted: u64, spent: u64) -> f64 {
    if budgeted == 0 {
        return 0.0;
    }
    spent as f64 / budgeted as f64 * 100.0
}

pub fn budget_summary(categories: &[BudgetCategory]) -> BudgetSummary {
    let usage: Vec<CategoryUsage> = categories
        .iter()
        .map(|c| {
            let percent = usage_percent(c.budgeted, c.spent);
            CategoryUsage {
                name: c.name,
                budgeted: c.budgeted,
                spent: c.spent,
                usage_percent: round1(percent),
                status: BudgetStatus::from_usage(percent),
            }
        })
        .collect();

    let total_budgeted: u64 = categories.iter().map(|c| c.budgeted).sum();
    let total_spent: u64 = categories.iter().map(|c| c.spent).sum();

    BudgetSummary {
        categories: usage,
        total_budgeted,
        total_spent,
        remaining: total_budgeted as i64 - total_spent as i64,
        overall_usage_percent: round1(usage_percent(total_budgeted, total_spent)),
    }
}

// ===== Expense analyzer =====

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Transaction {
    pub date: &'static str,
    pub amount: u64,
    pub merchant: &'static str,
    pub category: &'static str,
    pub method: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpendingPattern {
    pub category: &'static str,
    pub amount: u64,
    pub trend: Trend,
    /// Month-over-month change, percent
    pub change: i32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IncomeStatus {
    Received,
    Pending,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct IrregularIncome {
    pub source: &'static str,
    pub amount: u64,
    pub date: &'static str,
    pub status: IncomeStatus,
}

pub const TRANSACTIONS: &[Transaction] = &[
    Transaction { date: "2024-01-15", amount: 2500, merchant: "Swiggy", category: "Food", method: "UPI" },
    Transaction { date: "2024-01-14", amount: 850, merchant: "Uber", category: "Transport", method: "Card" },
    Transaction { date: "2024-01-13", amount: 1200, merchant: "Amazon", category: "Shopping", method: "UPI" },
    Transaction { date: "2024-01-12", amount: 45000, merchant: "Rent Transfer", category: "Bills", method: "NEFT" },
];

pub const SPENDING_PATTERNS: &[SpendingPattern] = &[
    SpendingPattern { category: "Food & Dining", amount: 18500, trend: Trend::Up, change: 23 },
    SpendingPattern { category: "Bills & Utilities", amount: 19500, trend: Trend::Stable, change: 0 },
    SpendingPattern { category: "Shopping", amount: 14800, trend: Trend::Up, change: 12 },
    SpendingPattern { category: "Transportation", amount: 6200, trend: Trend::Down, change: -15 },
];

pub const IRREGULAR_INCOME: &[IrregularIncome] = &[
    IrregularIncome { source: "Freelance Project", amount: 25000, date: "2024-01-10", status: IncomeStatus::Received },
    IrregularIncome { source: "Bonus Payment", amount: 15000, date: "2024-01-05", status: IncomeStatus::Pending },
    IrregularIncome { source: "Investment Returns", amount: 3200, date: "2024-01-03", status: IncomeStatus::Received },
];

#[derive(Debug, Clone, Serialize)]
pub struct PatternShare {
    #[serde(flatten)]
    pub pattern: SpendingPattern,
    pub share_percent: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseSummary {
    pub transactions: Vec<Transaction>,
    pub transaction_total: u64,
    pub patterns: Vec<PatternShare>,
    pub income: Vec<IrregularIncome>,
    pub income_received: u64,
    pub income_pending: u64,
}

pub fn expense_summary(
    transactions: &[Transaction],
    patterns: &[SpendingPattern],
    income: &[IrregularIncome],
) -> ExpenseSummary {
    let pattern_total: u64 = patterns.iter().map(|p| p.amount).sum();
    let shares = patterns
        .iter()
        .map(|p| PatternShare {
            pattern: *p,
            share_percent: if pattern_total == 0 {
                0
            } else {
                (p.amount as f64 / pattern_total as f64 * 100.0).round() as u32
            },
        })
        .collect();

    let income_with = |status: IncomeStatus| -> u64 {
        income
            .iter()
            .filter(|i| i.status == status)
            .map(|i| i.amount)
            .sum()
    };

    ExpenseSummary {
        transactions: transactions.to_vec(),
        transaction_total: transactions.iter().map(|t| t.amount).sum(),
        patterns: shares,
        income: income.to_vec(),
        income_received: income_with(IncomeStatus::Received),
        income_pending: income_with(IncomeStatus::Pending),
    }
}

// ===== Health score =====

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealthMetric {
    pub name: &'static str,
    pub score: u32,
}

pub const HEALTH_METRICS: &[HealthMetric] = &[
    HealthMetric { name: "Cash Flow", score: 85 },
    HealthMetric { name: "Savings Rate", score: 72 },
    HealthMetric { name: "Debt Health", score: 90 },
    HealthMetric { name: "Goal Progress", score: 65 },
];

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum HealthBadge {
    Excellent,
    Good,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl HealthBadge {
    pub fn for_score(score: u32) -> Self {
        match score {
            s if s >= 80 => HealthBadge::Excellent,
            s if s >= 60 => HealthBadge::Good,
            _ => HealthBadge::NeedsAttention,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatedMetric {
    pub name: &'static str,
    pub score: u32,
    pub badge: HealthBadge,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub overall: u32,
    pub badge: HealthBadge,
    pub metrics: Vec<RatedMetric>,
}

/// Overall score is the rounded mean of the metric scores.
pub fn health_report(metrics: &[HealthMetric]) -> HealthReport {
    let overall = if metrics.is_empty() {
        0
    } else {
        let sum: u32 = metrics.iter().map(|m| m.score).sum();
        (sum as f64 / metrics.len() as f64).round() as u32
    };

    HealthReport {
        overall,
        badge: HealthBadge::for_score(overall),
        metrics: metrics
            .iter()
            .map(|m| RatedMetric {
                name: m.name,
                score: m.score,
                badge: HealthBadge::for_score(m.score),
            })
            .collect(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
