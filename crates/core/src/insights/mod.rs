//! Insights module - per-transaction display metrics.

mod insights_calculator;

pub use insights_calculator::{
    category_trend, description_frequency, month_percentage, normalize_description,
};
