#![doc = include_str!("../README.md")]

pub mod aggregate;
pub mod error;
pub mod insights;
pub mod report;
pub mod table;
pub mod usd;

pub use aggregate::{
    by_category, by_day, by_product, summarize, top_products, CategoryTotals, DailyTotals,
    ProductTotals, Summary, DEFAULT_TOP_PRODUCTS,
};
pub use error::{Result, SalesError};
pub use report::{render, Report};
pub use table::{SalesRecord, SalesTable};
pub use usd::Usd;
