use axum::{extract::State, Json};
use finboard_core::Summary;
use serde::Serialize;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct LabeledAmount {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct MonthAmount {
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub total_spending: f64,
    pub total_income: f64,
    pub net: f64,
    pub category_breakdown: Vec<LabeledAmount>,
    pub monthly_spending: Vec<MonthAmount>,
}

impl From<Summary> for SummaryResponse {
    fn from(s: Summary) -> Self {
        Self {
            total_spending: s.total_spending.to_f64(),
            total_income: s.total_income.to_f64(),
            net: s.net.to_f64(),
            category_breakdown: s
                .category_breakdown
                .into_iter()
                .map(|c| LabeledAmount {
                    category: c.category,
                    amount: c.amount.to_f64(),
                })
                .collect(),
            monthly_spending: s
                .monthly_spending
                .into_iter()
                .map(|m| MonthAmount {
                    month: m.month,
                    amount: m.amount.to_f64(),
                })
                .collect(),
        }
    }
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = finboard_storage::summary(&state.pool).await?;
    Ok(Json(summary.into()))
}
