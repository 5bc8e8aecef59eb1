//! Category labels assigned during import.

pub const FOOD_AND_DINING: &str = "Food & Dining";
pub const SHOPPING: &str = "Shopping";
pub const TRANSPORTATION: &str = "Transportation";
pub const ENTERTAINMENT: &str = "Entertainment";
pub const BILLS_AND_UTILITIES: &str = "Bills & Utilities";
pub const HEALTH_AND_WELLNESS: &str = "Health & Wellness";

/// Label for transactions no rule matched.
pub const OTHER: &str = "Other";
