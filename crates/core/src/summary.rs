use serde::{Deserialize, Serialize};

use super::money::Money;

/// Spending for one category, as a positive amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Money,
}

/// Spending for one calendar month (`YYYY-MM`), as a positive amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub amount: Money,
}

/// Aggregates over every stored transaction.
///
/// `total_spending` is reported as a positive number; `net` keeps its sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_spending: Money,
    pub total_income: Money,
    pub net: Money,
    pub category_breakdown: Vec<CategoryTotal>,
    pub monthly_spending: Vec<MonthlyTotal>,
}

impl Summary {
    /// Builds the headline figures from the signed sums of outflows and inflows.
    pub fn from_signed_totals(
        outflows: Money,
        inflows: Money,
        category_breakdown: Vec<CategoryTotal>,
        monthly_spending: Vec<MonthlyTotal>,
    ) -> Self {
        Summary {
            total_spending: outflows.abs(),
            total_income: inflows,
            net: outflows + inflows,
            category_breakdown,
            monthly_spending,
        }
    }
}
