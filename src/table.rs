use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use serde::{Deserialize, Deserializer};

use std::{fs::File, io, path::Path};

use crate::{
    error::{Result, SalesError},
    usd::Usd,
};

/// The columns every sales data file must have, in any order.
pub const COLUMNS: [&str; 6] = ["date", "product", "category", "quantity", "price", "revenue"];

/// One row of sales data.
///
/// `revenue` is taken from the input as given; it is not checked against
/// `quantity * price`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SalesRecord {
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub product: String,
    pub category: String,
    pub quantity: u32,
    pub price: Usd,
    pub revenue: Usd,
}

/// Holds sales data loaded from a single file.
///
/// To load a table from a CSV file, use [`SalesTable::load`]. Once built, a
/// table is never modified: the aggregation functions in
/// [`crate::aggregate`] only borrow it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
}

impl SalesTable {
    /// Reads sales data from the CSV file at `path`.
    ///
    /// The file must start with a header row naming the columns in
    /// [`COLUMNS`]; they may appear in any order, and other columns are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns:
    /// * [`SalesError::NotFound`] if there is no file at `path`
    /// * [`SalesError::MissingColumn`] if the header lacks a required column
    /// * [`SalesError::Parse`] if a date, quantity or amount is malformed
    /// * [`SalesError::Load`] for any other I/O or CSV error
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("loading sales data from {}", path.display());
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SalesError::NotFound(path.to_path_buf()),
            _ => SalesError::Load {
                path: path.to_path_buf(),
                source: err.into(),
            },
        })?;
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(file);
        let headers = rdr.headers().map_err(|err| classify(path, err))?;
        if let Some(column) = COLUMNS.into_iter().find(|c| !headers.iter().any(|h| h == *c)) {
            return Err(SalesError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: SalesRecord = result.map_err(|err| {
                debug!("rejected row in {}: {err}", path.display());
                classify(path, err)
            })?;
            records.push(record);
        }
        info!("loaded {} records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    #[must_use]
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<SalesRecord> for SalesTable {
    fn from_iter<I: IntoIterator<Item = SalesRecord>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}

/// Parses a calendar date in `YYYY-MM-DD` or `YYYY/MM/DD` format.
///
/// Date-times such as `2024-01-01 09:30:00` are also accepted; the time of
/// day is discarded.
///
/// # Errors
///
/// Returns an error if `s` matches none of the accepted formats.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
    const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let s = s.trim();
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Ok(date);
    }
    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(dt.date());
    }
    bail!("invalid date {s:?} (expected YYYY-MM-DD)")
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).map_err(serde::de::Error::custom)
}

/// Sorts a CSV error into a row parse failure or a general load failure.
fn classify(path: &Path, err: csv::Error) -> SalesError {
    let message = match err.kind() {
        csv::ErrorKind::Deserialize { err: de, .. } => Some(de.to_string()),
        _ => None,
    };
    match message {
        Some(message) => SalesError::Parse {
            path: path.to_path_buf(),
            line: err.position().map_or(0, csv::Position::line),
            message,
        },
        None => SalesError::Load {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

#[cfg(test)]
pub(crate) fn record(
    date: &str,
    product: &str,
    category: &str,
    quantity: u32,
    price: &str,
    revenue: &str,
) -> SalesRecord {
    SalesRecord {
        date: parse_date(date).unwrap(),
        product: product.into(),
        category: category.into(),
        quantity,
        price: price.parse().unwrap(),
        revenue: revenue.parse().unwrap(),
    }
}

/// The three-row table used throughout the tests.
#[cfg(test)]
pub(crate) fn sample_table() -> SalesTable {
    SalesTable::from_records(vec![
        record("2024-01-01", "Laptop", "Electronics", 2, "1000.00", "2000.00"),
        record("2024-01-02", "Mouse", "Electronics", 10, "25.00", "250.00"),
        record("2024-01-03", "Keyboard", "Electronics", 5, "75.00", "375.00"),
    ])
}
