use std::fmt::{self, Display};

use crate::{
    aggregate::{
        by_category, by_day, summarize, top_products, CategoryTotals, DailyTotals, ProductTotals,
        Summary, DEFAULT_TOP_PRODUCTS,
    },
    error::Result,
    insights::{estimated_profit, low_sales, most_expensive},
    table::{SalesRecord, SalesTable},
    usd::Usd,
};

const REPORT_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 26;

/// A sales analysis report, ready for printing.
///
/// To build a report from a table, use [`Report::new`], and optionally add
/// the insights section with [`Report::with_insights`].
///
/// To get a printable version of the report, use its [`Display`]
/// implementation.
#[derive(Debug)]
pub struct Report {
    summary: Summary,
    categories: Vec<CategoryTotals>,
    top_products: Vec<ProductTotals>,
    daily: Option<Vec<DailyTotals>>,
    insights: Option<Insights>,
}

#[derive(Debug)]
struct Insights {
    most_expensive: Option<SalesRecord>,
    margin_percent: u32,
    estimated_profit: Usd,
    low_sales_threshold: u32,
    low_sales: Vec<SalesRecord>,
}

impl Report {
    /// Runs each aggregation over `table` once. The daily breakdown is only
    /// computed, and shown, if `verbose` is set.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SalesError::EmptyInput`] if `table` has no records.
    pub fn new(table: &SalesTable, verbose: bool) -> Result<Self> {
        Ok(Self {
            summary: summarize(table)?,
            categories: by_category(table),
            top_products: top_products(table, DEFAULT_TOP_PRODUCTS)?,
            daily: verbose.then(|| by_day(table)),
            insights: None,
        })
    }

    /// Adds an insights section: the most expensive product, estimated
    /// profit at `margin_percent`, and the transactions selling fewer than
    /// `low_sales_threshold` units.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SalesError::InvalidArgument`] if `margin_percent` is
    /// over 100.
    pub fn with_insights(
        mut self,
        table: &SalesTable,
        margin_percent: u32,
        low_sales_threshold: u32,
    ) -> Result<Self> {
        self.insights = Some(Insights {
            most_expensive: most_expensive(table).cloned(),
            margin_percent,
            estimated_profit: estimated_profit(table, margin_percent)?,
            low_sales_threshold,
            low_sales: low_sales(table, low_sales_threshold)
                .into_iter()
                .cloned()
                .collect(),
        });
        Ok(self)
    }
}

/// Renders the standard report for `table`, including the daily breakdown
/// if `verbose` is set.
///
/// # Errors
///
/// Returns [`crate::SalesError::EmptyInput`] if `table` has no records.
pub fn render(table: &SalesTable, verbose: bool) -> Result<String> {
    Ok(Report::new(table, verbose)?.to_string())
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:=<REPORT_WIDTH$}", "")?;
        writeln!(f, "SALES DATA ANALYSIS REPORT")?;
        writeln!(f, "{:=<REPORT_WIDTH$}", "")?;

        let s = &self.summary;
        section(f, "SUMMARY STATISTICS")?;
        writeln!(f, "{:<LABEL_WIDTH$}${}", "Total Revenue:", s.total_revenue)?;
        writeln!(f, "{:<LABEL_WIDTH$}{}", "Total Transactions:", s.transaction_count)?;
        writeln!(f, "{:<LABEL_WIDTH$}{}", "Total Items Sold:", s.total_quantity_sold)?;
        writeln!(
            f,
            "{:<LABEL_WIDTH$}${}",
            "Avg Transaction Value:", s.average_transaction_value
        )?;
        writeln!(
            f,
            "{:<LABEL_WIDTH$}{} to {}",
            "Date Range:", s.date_range_start, s.date_range_end
        )?;

        section(f, "REVENUE BY CATEGORY")?;
        let table = Table {
            headers: &["Category", "Total Revenue", "Total Quantity", "Transactions"],
            rows: self
                .categories
                .iter()
                .map(|c| {
                    vec![
                        c.category.clone(),
                        c.total_revenue.to_string(),
                        c.total_quantity.to_string(),
                        c.transaction_count.to_string(),
                    ]
                })
                .collect(),
        };
        write!(f, "{table}")?;

        section(f, &format!("TOP {DEFAULT_TOP_PRODUCTS} PRODUCTS BY REVENUE"))?;
        let table = Table {
            headers: &["Product", "Total Revenue", "Total Quantity"],
            rows: self
                .top_products
                .iter()
                .map(|p| {
                    vec![
                        p.product.clone(),
                        p.total_revenue.to_string(),
                        p.total_quantity.to_string(),
                    ]
                })
                .collect(),
        };
        write!(f, "{table}")?;

        if let Some(daily) = &self.daily {
            section(f, "DAILY REVENUE BREAKDOWN")?;
            let table = Table {
                headers: &["Date", "Total Revenue", "Total Items Sold"],
                rows: daily
                    .iter()
                    .map(|d| {
                        vec![
                            d.date.to_string(),
                            d.total_revenue.to_string(),
                            d.total_items_sold.to_string(),
                        ]
                    })
                    .collect(),
            };
            write!(f, "{table}")?;
        }

        if let Some(insights) = &self.insights {
            write!(f, "{insights}")?;
        }

        writeln!(f)?;
        writeln!(f, "{:=<REPORT_WIDTH$}", "")
    }
}

impl Display for Insights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "INSIGHTS")?;
        if let Some(r) = &self.most_expensive {
            writeln!(
                f,
                "{:<LABEL_WIDTH$}{} at ${}",
                "Most Expensive Product:", r.product, r.price
            )?;
        }
        let label = format!("Estimated Profit ({}%):", self.margin_percent);
        writeln!(f, "{label:<LABEL_WIDTH$}${}", self.estimated_profit)?;
        let label = format!("Low Sales (< {} units):", self.low_sales_threshold);
        writeln!(f, "{label:<LABEL_WIDTH$}{} transactions", self.low_sales.len())?;
        if self.low_sales.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        let table = Table {
            headers: &["Product", "Date", "Quantity", "Revenue"],
            rows: self
                .low_sales
                .iter()
                .map(|r| {
                    vec![
                        r.product.clone(),
                        r.date.to_string(),
                        r.quantity.to_string(),
                        r.revenue.to_string(),
                    ]
                })
                .collect(),
        };
        write!(f, "{table}")
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(f, "{:-<REPORT_WIDTH$}", "")
}

/// A plain-text table: the first column left-aligned, the rest right-aligned.
struct Table<'a> {
    headers: &'a [&'a str],
    rows: Vec<Vec<String>>,
}

impl Table<'_> {
    fn write_row<'c>(
        f: &mut fmt::Formatter<'_>,
        widths: &[usize],
        cells: impl IntoIterator<Item = &'c str>,
    ) -> fmt::Result {
        for (i, (cell, width)) in cells.into_iter().zip(widths.iter().copied()).enumerate() {
            if i == 0 {
                write!(f, "{cell:<width$}")?;
            } else {
                write!(f, "  {cell:>width$}")?;
            }
        }
        writeln!(f)
    }
}

impl Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .fold(h.chars().count(), |w, row| w.max(row[i].chars().count()))
            })
            .collect();
        let length = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        Self::write_row(f, &widths, self.headers.iter().copied())?;
        writeln!(f, "{:-<length$}", "")?;
        for row in &self.rows {
            Self::write_row(f, &widths, row.iter().map(String::as_str))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::table::sample_table;

    const SAMPLE_REPORT: &str = "\
============================================================
SALES DATA ANALYSIS REPORT
============================================================

SUMMARY STATISTICS
------------------------------------------------------------
Total Revenue:            $2,625.00
Total Transactions:       3
Total Items Sold:         17
Avg Transaction Value:    $875.00
Date Range:               2024-01-01 to 2024-01-03

REVENUE BY CATEGORY
------------------------------------------------------------
Category     Total Revenue  Total Quantity  Transactions
--------------------------------------------------------
Electronics       2,625.00              17             3

TOP 5 PRODUCTS BY REVENUE
------------------------------------------------------------
Product   Total Revenue  Total Quantity
---------------------------------------
Laptop         2,000.00               2
Keyboard         375.00               5
Mouse            250.00              10

============================================================
";

    const SAMPLE_DAILY: &str = "
DAILY REVENUE BREAKDOWN
------------------------------------------------------------
Date        Total Revenue  Total Items Sold
-------------------------------------------
2024-01-01       2,000.00                 2
2024-01-02         250.00                10
2024-01-03         375.00                 5
";

    #[test]
    fn render_fn_produces_fixed_layout() {
        assert_eq!(render(&sample_table(), false).unwrap(), SAMPLE_REPORT);
    }

    #[test]
    fn render_fn_adds_daily_breakdown_when_verbose() {
        let report = render(&sample_table(), true).unwrap();
        let (head, tail) = SAMPLE_REPORT.split_at(SAMPLE_REPORT.len() - REPORT_WIDTH - 2);
        assert_eq!(report, format!("{head}{SAMPLE_DAILY}{tail}"));
    }

    #[test]
    fn render_fn_returns_error_for_empty_table() {
        assert!(render(&SalesTable::default(), false).is_err());
    }

    #[test]
    fn report_shows_only_top_five_products() {
        let table = SalesTable::load("testdata/catalog.csv").unwrap();
        let report = Report::new(&table, false).unwrap().to_string();
        for product in ["Espresso Machine", "Grinder", "Kettle", "Coffee Beans", "Mug"] {
            assert!(report.contains(product), "missing {product}:\n{report}");
        }
        assert!(!report.contains("Tamper"), "report:\n{report}");
        assert!(!report.contains("Filter Papers"), "report:\n{report}");
        assert!(report.contains("Espresso Machine         350.00"), "report:\n{report}");
        assert!(!report.contains("DAILY REVENUE BREAKDOWN"));
        assert!(!report.contains("INSIGHTS"));
    }

    #[test]
    fn with_insights_fn_adds_insights_section() {
        let table = sample_table();
        let report = Report::new(&table, false)
            .unwrap()
            .with_insights(&table, 30, 10)
            .unwrap()
            .to_string();
        let want = "
INSIGHTS
------------------------------------------------------------
Most Expensive Product:   Laptop at $1,000.00
Estimated Profit (30%):   $787.50
Low Sales (< 10 units):   2 transactions

Product         Date  Quantity   Revenue
----------------------------------------
Laptop    2024-01-01         2  2,000.00
Keyboard  2024-01-03         5    375.00
";
        assert!(report.contains(want), "report:\n{report}");
    }

    #[test]
    fn with_insights_fn_rejects_bad_margin() {
        let table = sample_table();
        let report = Report::new(&table, false).unwrap();
        assert!(report.with_insights(&table, 150, 10).is_err());
    }
}
