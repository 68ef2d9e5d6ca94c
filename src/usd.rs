use anyhow::bail;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

/// Largest amount accepted from input. Summing fewer than 7.9e10 such
/// amounts cannot overflow a [`Decimal`].
const MAX_AMOUNT: Decimal = dec!(1000000000000000000);

/// Represents a non-negative amount of money in USD currency.
///
/// Amounts keep the full precision they were parsed with, so totals are
/// summed exactly and only rounded to cents afterwards, with
/// [`Usd::round_to_cents`]. The [`Display`] implementation formats the amount
/// as dollars to 2 decimal places with thousands separators, for example
/// `2,625.00`, and respects width and alignment flags.
#[derive(Clone, Copy, Default, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Usd(Decimal);

impl Usd {
    /// Rounds to the nearest cent, with ties going to the even cent.
    #[must_use]
    pub fn round_to_cents(self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Returns the mean of `self` over `count` items, rounded to the
    /// nearest cent, or `None` if `count` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_analysis::Usd;
    /// let total: Usd = "10.00".parse().unwrap();
    /// assert_eq!(total.mean(3), Some("3.33".parse().unwrap()));
    /// assert_eq!(total.mean(0), None);
    /// ```
    #[must_use]
    pub fn mean(self, count: usize) -> Option<Self> {
        if count == 0 {
            return None;
        }
        Some(Self(self.0 / Decimal::from(count)).round_to_cents())
    }

    /// Returns `percent`% of `self`, rounded to the nearest cent, or `None`
    /// if the result is too large to represent.
    #[must_use]
    pub fn percent(self, percent: u32) -> Option<Self> {
        self.0
            .checked_mul(Decimal::new(i64::from(percent), 2))
            .map(|amount| Self(amount).round_to_cents())
    }
}

impl Debug for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rounded = format!("{:.2}", self.0.round_dp(2));
        let (dollars, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
        let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
        for (i, ch) in dollars.chars().enumerate() {
            if i > 0 && (dollars.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        f.pad(&format!("{grouped}.{cents}"))
    }
}

impl FromStr for Usd {
    type Err = anyhow::Error;

    /// Parses amounts such as `1000`, `25.5`, `0.004`, `1,234.56` or `$75.00`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let amount = trimmed.strip_prefix('$').unwrap_or(trimmed);
        if amount.starts_with('-') {
            bail!("negative amount {s:?}");
        }
        let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
        let Some(whole) = strip_separators(whole) else {
            bail!("misplaced thousands separator in amount {s:?}");
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(&whole) || !all_digits(frac) {
            bail!("invalid amount {s:?}");
        }
        if whole.trim_start_matches('0').len() > 19 {
            bail!("amount {s:?} out of range");
        }
        let whole = if whole.is_empty() { "0" } else { whole.as_str() };
        let frac = if frac.is_empty() { "0" } else { frac };
        let value = Decimal::from_str(&format!("{whole}.{frac}"))?;
        if value > MAX_AMOUNT {
            bail!("amount {s:?} out of range");
        }
        Ok(Self(value))
    }
}

/// Removes thousands separators from the whole-number part of an amount.
///
/// Returns `None` unless every `,` is followed by exactly three characters
/// and the first group has one to three.
fn strip_separators(whole: &str) -> Option<String> {
    let mut groups = whole.split(',');
    let first = groups.next().unwrap_or_default();
    let mut digits = first.to_string();
    for group in groups {
        if first.is_empty() || first.len() > 3 || group.len() != 3 {
            return None;
        }
        digits.push_str(group);
    }
    Some(digits)
}

// Amounts are at most MAX_AMOUNT, so these sums stay in range.
impl Add for Usd {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Usd {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn from_str_fn_parses_plain_and_formatted_amounts() {
        assert_eq!(Usd::from_str("1000.00").unwrap(), Usd(dec!(1000)));
        assert_eq!(Usd::from_str("25").unwrap(), Usd(dec!(25)));
        assert_eq!(Usd::from_str("12.5").unwrap(), Usd(dec!(12.50)));
        assert_eq!(Usd::from_str(".75").unwrap(), Usd(dec!(0.75)));
        assert_eq!(Usd::from_str("$3,409.15").unwrap(), Usd(dec!(3409.15)));
        assert_eq!(Usd::from_str("1,234,567").unwrap(), Usd(dec!(1234567)));
        assert_eq!(Usd::from_str(" 7.10 ").unwrap(), Usd(dec!(7.1)));
    }

    #[test]
    fn from_str_fn_keeps_sub_cent_precision() {
        assert_eq!(Usd::from_str("0.004").unwrap(), Usd(dec!(0.004)));
        assert_eq!(Usd::from_str("19.999").unwrap(), Usd(dec!(19.999)));
    }

    #[test]
    fn from_str_fn_rejects_bad_amounts() {
        for bad in ["", ".", "$", "abc", "-5.00", "1.2.3", "12a", "1e3", "1.5,0"] {
            assert!(Usd::from_str(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn from_str_fn_rejects_misplaced_separators() {
        for bad in ["1,2,3", ",123", "1234,567", "12,34.00", "1,2345"] {
            assert!(Usd::from_str(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn from_str_fn_rejects_amounts_out_of_range() {
        assert!(Usd::from_str("50000000000000000.00").is_ok());
        assert!(Usd::from_str("1000000000000000000.01").is_err());
        assert!(Usd::from_str("99999999999999999999999999999999").is_err());
    }

    #[test]
    fn display_rounds_to_cents_with_thousands_separators() {
        assert_eq!(Usd(dec!(2625)).to_string(), "2,625.00");
        assert_eq!(Usd(dec!(0.05)).to_string(), "0.05");
        assert_eq!(Usd(dec!(999.99)).to_string(), "999.99");
        assert_eq!(Usd(dec!(1234567.891)).to_string(), "1,234,567.89");
        assert_eq!(Usd(dec!(0.004)).to_string(), "0.00");
        assert_eq!(format!("{:>10}", Usd(dec!(875))), "    875.00");
    }

    #[test]
    fn round_to_cents_fn_rounds_ties_to_even() {
        assert_eq!(Usd(dec!(0.012)).round_to_cents(), Usd(dec!(0.01)));
        assert_eq!(Usd(dec!(0.125)).round_to_cents(), Usd(dec!(0.12)));
        assert_eq!(Usd(dec!(0.135)).round_to_cents(), Usd(dec!(0.14)));
    }

    #[test]
    fn mean_fn_does_not_overflow_for_large_amounts() {
        let total = Usd(dec!(50000000000000000));
        assert_eq!(total.mean(1), Some(total));
        assert_eq!(total.mean(4), Some(Usd(dec!(12500000000000000))));
    }

    #[test]
    fn percent_fn_rounds_to_nearest_cent() {
        assert_eq!(Usd(dec!(2625)).percent(30), Some(Usd(dec!(787.50))));
        assert_eq!(Usd(dec!(0.05)).percent(30), Some(Usd(dec!(0.02))));
        assert_eq!(Usd(dec!(12.34)).percent(0), Some(Usd::default()));
        assert_eq!(Usd(MAX_AMOUNT).percent(100), Some(Usd(MAX_AMOUNT)));
    }

    #[test]
    fn amounts_sum_exactly() {
        let total: Usd = [Usd(dec!(0.004)), Usd(dec!(0.004)), Usd(dec!(0.004))]
            .into_iter()
            .sum();
        assert_eq!(total, Usd(dec!(0.012)));
    }
}
