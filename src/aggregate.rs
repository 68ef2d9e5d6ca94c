//! Group-by rollups over a [`SalesTable`].
//!
//! Every function here borrows the table and returns freshly computed
//! values, so calling one twice on the same table gives the same answer.
//! Revenue is summed at the precision it was loaded with, and each total is
//! rounded to cents once the sum is complete.

use chrono::NaiveDate;

use std::collections::{BTreeMap, HashMap};

use crate::{
    error::{Result, SalesError},
    table::{SalesRecord, SalesTable},
    usd::Usd,
};

/// Number of products reported by [`top_products`] when no other limit is
/// given.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Sales totals for one product category.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CategoryTotals {
    pub category: String,
    pub total_revenue: Usd,
    pub total_quantity: u64,
    pub transaction_count: usize,
}

/// Sales totals for one product.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProductTotals {
    pub product: String,
    pub total_revenue: Usd,
    pub total_quantity: u64,
}

/// Sales totals for one calendar day.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub total_revenue: Usd,
    pub total_items_sold: u64,
}

/// Overall statistics for a whole table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    pub total_revenue: Usd,
    pub transaction_count: usize,
    pub total_quantity_sold: u64,
    /// Mean revenue per record, rounded to the nearest cent.
    pub average_transaction_value: Usd,
    pub date_range_start: NaiveDate,
    pub date_range_end: NaiveDate,
}

/// Groups `records` by `key`, keeping groups in order of first appearance.
///
/// `new` creates the accumulator for a key the first time it is seen, and
/// `add` folds each record into its group's accumulator.
fn group_in_order<'a, T>(
    records: &'a [SalesRecord],
    key: impl Fn(&'a SalesRecord) -> &'a str,
    new: impl Fn(&str) -> T,
    mut add: impl FnMut(&mut T, &SalesRecord),
) -> Vec<T> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups = Vec::new();
    for record in records {
        let k = key(record);
        let i = *index.entry(k).or_insert_with(|| {
            groups.push(new(k));
            groups.len() - 1
        });
        add(&mut groups[i], record);
    }
    groups
}

/// Returns revenue, quantity and transaction count per category, highest
/// revenue first.
///
/// Categories with equal revenue stay in the order they first appear in the
/// table.
#[must_use]
pub fn by_category(table: &SalesTable) -> Vec<CategoryTotals> {
    let mut totals = group_in_order(
        table.records(),
        |r| r.category.as_str(),
        |category| CategoryTotals {
            category: category.to_string(),
            ..CategoryTotals::default()
        },
        |t, r| {
            t.total_revenue += r.revenue;
            t.total_quantity += u64::from(r.quantity);
            t.transaction_count += 1;
        },
    );
    for t in &mut totals {
        t.total_revenue = t.total_revenue.round_to_cents();
    }
    totals.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    totals
}

/// Returns revenue and quantity for every product, highest revenue first.
///
/// Products with equal revenue stay in the order they first appear in the
/// table.
#[must_use]
pub fn by_product(table: &SalesTable) -> Vec<ProductTotals> {
    let mut totals = group_in_order(
        table.records(),
        |r| r.product.as_str(),
        |product| ProductTotals {
            product: product.to_string(),
            ..ProductTotals::default()
        },
        |t, r| {
            t.total_revenue += r.revenue;
            t.total_quantity += u64::from(r.quantity);
        },
    );
    for t in &mut totals {
        t.total_revenue = t.total_revenue.round_to_cents();
    }
    totals.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    totals
}

/// Returns the `n` best-selling products by revenue.
///
/// If the table has fewer than `n` distinct products, all of them are
/// returned.
///
/// # Errors
///
/// Returns [`SalesError::InvalidArgument`] if `n` is zero.
pub fn top_products(table: &SalesTable, n: usize) -> Result<Vec<ProductTotals>> {
    if n == 0 {
        return Err(SalesError::InvalidArgument(
            "number of top products must be at least 1".into(),
        ));
    }
    let mut totals = by_product(table);
    totals.truncate(n);
    Ok(totals)
}

/// Returns revenue and items sold for each date in the table, in
/// chronological order.
///
/// Days with no sales are not included.
#[must_use]
pub fn by_day(table: &SalesTable) -> Vec<DailyTotals> {
    let mut days: BTreeMap<NaiveDate, (Usd, u64)> = BTreeMap::new();
    for r in table.records() {
        let (revenue, items) = days.entry(r.date).or_default();
        *revenue += r.revenue;
        *items += u64::from(r.quantity);
    }
    days.into_iter()
        .map(|(date, (total_revenue, total_items_sold))| DailyTotals {
            date,
            total_revenue: total_revenue.round_to_cents(),
            total_items_sold,
        })
        .collect()
}

/// Computes overall statistics for `table`.
///
/// # Errors
///
/// Returns [`SalesError::EmptyInput`] if the table has no records, since
/// there is no average or date range to report.
pub fn summarize(table: &SalesTable) -> Result<Summary> {
    let records = table.records();
    let dates = records.iter().map(|r| r.date);
    let (Some(date_range_start), Some(date_range_end)) = (dates.clone().min(), dates.max()) else {
        return Err(SalesError::EmptyInput);
    };
    let total_revenue: Usd = records.iter().map(|r| r.revenue).sum();
    let average_transaction_value = total_revenue
        .mean(records.len())
        .ok_or(SalesError::EmptyInput)?;
    Ok(Summary {
        total_revenue: total_revenue.round_to_cents(),
        transaction_count: records.len(),
        total_quantity_sold: records.iter().map(|r| u64::from(r.quantity)).sum(),
        average_transaction_value,
        date_range_start,
        date_range_end,
    })
}
