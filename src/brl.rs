use anyhow::bail;
use serde_with::DeserializeFromStr;

use std::{
    fmt::{Debug, Display},
    ops::{AddAssign, Div},
    str::FromStr,
};

/// Represents an amount of money in BRL currency.
///
/// The amount is stored internally as an integer number of centavos, but the
/// [`Display`] implementation formats it for display with thousands
/// separators and 2 decimal places.
#[derive(Clone, Copy, Default, DeserializeFromStr, Eq, PartialEq, Ord, PartialOrd)]
pub struct Brl(i64);

impl Brl {
    /// Returns the amount as an integer number of centavos.
    #[must_use]
    pub fn cents(self) -> i64 {
        self.0
    }
}

impl Debug for Brl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Brl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(
            f,
            "{sign}{}.{:02}",
            group_thousands(cents / 100),
            cents % 100
        )
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl FromStr for Brl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let cleaned = s.trim().replace(',', "");
        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            bail!("empty amount: {s:?}");
        }
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            bail!("bad decimal part in amount: {s:?}");
        }
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse()? };
        let frac_cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>()? * 10,
            2 => frac.parse::<i64>()?,
            // extra decimal digits round to the nearest centavo
            _ => frac[..2].parse::<i64>()? + i64::from(frac.as_bytes()[2] >= b'5'),
        };
        let cents = whole * 100 + frac_cents;
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl AddAssign for Brl {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Div<usize> for Brl {
    type Output = Self;

    /// Divides the amount by `rhs`, rounding to the nearest centavo.
    fn div(self, rhs: usize) -> Self::Output {
        Self((self.0 as f64 / rhs as f64).round() as i64)
    }
}
