//! Ad-hoc questions about a [`SalesTable`] that don't fit a group-by.

use crate::{
    error::{Result, SalesError},
    table::{SalesRecord, SalesTable},
    usd::Usd,
};

/// Default profit margin, in percent, used by [`estimated_profit`].
pub const DEFAULT_MARGIN_PERCENT: u32 = 30;

/// Records selling fewer units than this count as low sales by default.
pub const DEFAULT_LOW_SALES_THRESHOLD: u32 = 10;

/// Returns the record with the highest unit price, or `None` for an empty
/// table. The earliest such record wins a tie.
#[must_use]
pub fn most_expensive(table: &SalesTable) -> Option<&SalesRecord> {
    table
        .records()
        .iter()
        .reduce(|best, r| if r.price > best.price { r } else { best })
}

/// Estimates total profit as `margin_percent`% of total revenue, rounded
/// to the nearest cent.
///
/// # Errors
///
/// Returns [`SalesError::InvalidArgument`] if `margin_percent` is over 100.
pub fn estimated_profit(table: &SalesTable, margin_percent: u32) -> Result<Usd> {
    if margin_percent > 100 {
        return Err(SalesError::InvalidArgument(format!(
            "margin of {margin_percent}% is over 100%"
        )));
    }
    let revenue: Usd = table.records().iter().map(|r| r.revenue).sum();
    revenue.percent(margin_percent).ok_or_else(|| {
        SalesError::InvalidArgument(format!("profit at {margin_percent}% is out of range"))
    })
}

/// Returns the records with a quantity below `threshold`, in table order.
#[must_use]
pub fn low_sales(table: &SalesTable, threshold: u32) -> Vec<&SalesRecord> {
    table
        .records()
        .iter()
        .filter(|r| r.quantity < threshold)
        .collect()
}
