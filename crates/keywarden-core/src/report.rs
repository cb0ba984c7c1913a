// ABOUTME: Sales report aggregation: date-range presets and revenue/cost/profit totals.
// ABOUTME: Pure fold over sale facts; the store supplies the rows, the caller the FX rate.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named reporting periods, resolved against a caller-provided "today"
/// so the resolution stays deterministic and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePreset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
}

impl RangePreset {
    /// Resolve the preset to an inclusive `(start, end)` date pair.
    pub fn resolve(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            RangePreset::Today => (today, today),
            RangePreset::Yesterday => {
                let y = today - Days::new(1);
                (y, y)
            }
            RangePreset::Last7Days => (today - Days::new(6), today),
            RangePreset::Last30Days => (today - Days::new(29), today),
            RangePreset::ThisMonth => (today.with_day(1).unwrap_or(today), today),
            RangePreset::LastMonth => {
                let first_of_this = today.with_day(1).unwrap_or(today);
                let end = first_of_this - Days::new(1);
                (end.with_day(1).unwrap_or(end), end)
            }
        }
    }
}

/// One sold key joined with its category's default costs, as returned
/// by the store's report query.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleFact {
    pub category: String,
    pub price_brl: Option<f64>,
    pub price_usd: Option<f64>,
    pub cost_brl: Option<f64>,
    pub cost_usd: Option<f64>,
}

/// Per-category report row. All monetary values are in BRL after
/// converting the USD components with the report's exchange rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub sales: usize,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub mean_profit: f64,
}

/// Aggregated sales report over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub sales: usize,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
    pub by_category: Vec<CategoryBreakdown>,
}

/// Fold sale facts into a summary, converting USD amounts to BRL with
/// `usd_brl_rate`. Categories are reported in sorted name order.
pub fn summarize(facts: &[SaleFact], usd_brl_rate: f64) -> SalesSummary {
    struct Bucket {
        sales: usize,
        revenue: f64,
        cost: f64,
    }

    let mut buckets: BTreeMap<&str, Bucket> = BTreeMap::new();
    let mut revenue = 0.0;
    let mut cost = 0.0;

    for fact in facts {
        let fact_revenue =
            fact.price_brl.unwrap_or(0.0) + fact.price_usd.unwrap_or(0.0) * usd_brl_rate;
        let fact_cost = fact.cost_brl.unwrap_or(0.0) + fact.cost_usd.unwrap_or(0.0) * usd_brl_rate;
        revenue += fact_revenue;
        cost += fact_cost;

        let bucket = buckets.entry(fact.category.as_str()).or_insert(Bucket {
            sales: 0,
            revenue: 0.0,
            cost: 0.0,
        });
        bucket.sales += 1;
        bucket.revenue += fact_revenue;
        bucket.cost += fact_cost;
    }

    let by_category = buckets
        .into_iter()
        .map(|(name, b)| {
            let profit = b.revenue - b.cost;
            CategoryBreakdown {
                category: name.to_string(),
                sales: b.sales,
                revenue: b.revenue,
                cost: b.cost,
                profit,
                mean_profit: if b.sales > 0 {
                    profit / b.sales as f64
                } else {
                    0.0
                },
            }
        })
        .collect();

    SalesSummary {
        sales: facts.len(),
        revenue,
        cost,
        profit: revenue - cost,
        by_category,
    }
}
